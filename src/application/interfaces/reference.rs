use crate::error::AppError;
use crate::model::requests::InvoiceKind;
use async_trait::async_trait;
use serde_json::Value;

/// Interface for reference data lookups
///
/// Absence is an expected outcome here: a missing code or an empty
/// collection yields `Ok(None)`, never an error.
#[async_trait]
pub trait ReferenceService: Send + Sync {
    /// Finds the record of `collection` whose `code` equals `code`
    ///
    /// Scans one bounded page of the collection.
    async fn find_by_code(&self, collection: &str, code: &str) -> Result<Option<Value>, AppError>;

    /// Identifier of the record of `collection` whose `code` equals `code`
    async fn lookup_id_by_code(
        &self,
        collection: &str,
        code: &str,
    ) -> Result<Option<String>, AppError>;

    /// Contact account identifier for a contact code
    async fn lookup_contact_by_code(&self, code: &str) -> Result<Option<String>, AppError>;

    /// `field` of the first record of `collection`
    async fn get_default_id(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Option<String>, AppError>;

    /// First available legal entity
    async fn get_default_legal_entity(&self) -> Result<Option<String>, AppError>;

    /// Document type of the first existing invoice of this kind
    async fn get_default_doc_type(&self, kind: InvoiceKind) -> Result<Option<String>, AppError>;
}
