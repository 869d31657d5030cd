use crate::error::AppError;
use crate::model::requests::{DocumentUpdate, InvoiceDraft, InvoiceKind, WorkflowAction};
use async_trait::async_trait;
use serde_json::Value;

/// Interface for document writes and workflow transitions
///
/// Every operation returns the full record; when the upstream answers with
/// an empty body or a bare identifier, the record is fetched once more.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Gets a document by identifier or reference
    async fn get_document(&self, document_id: &str) -> Result<Value, AppError>;

    /// Creates an invoice, resolving unset identifiers first
    ///
    /// # Errors
    /// * `AppError::Validation` if a required field is missing or a default
    ///   cannot be resolved. Nothing is submitted in that case.
    async fn create_invoice(
        &self,
        kind: InvoiceKind,
        draft: &InvoiceDraft,
    ) -> Result<Value, AppError>;

    /// Updates a draft document with the provided fields
    async fn update_document(
        &self,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<Value, AppError>;

    /// Applies a workflow transition to a document
    async fn transition(&self, document_id: &str, action: WorkflowAction)
    -> Result<Value, AppError>;

    /// Posts a draft document
    async fn post_document(
        &self,
        document_id: &str,
        posting_date: Option<&str>,
    ) -> Result<Value, AppError> {
        let action = WorkflowAction::Post {
            posting_date: posting_date.map(str::to_string),
        };
        self.transition(document_id, action).await
    }

    /// Approves a document
    async fn approve_document(
        &self,
        document_id: &str,
        note: Option<&str>,
    ) -> Result<Value, AppError> {
        let action = WorkflowAction::Approve {
            note: note.map(str::to_string),
        };
        self.transition(document_id, action).await
    }

    /// Reverses a posted document
    async fn reverse_document(
        &self,
        document_id: &str,
        reversal_date: &str,
        reason: Option<&str>,
    ) -> Result<Value, AppError> {
        let action = WorkflowAction::Reverse {
            reversal_date: reversal_date.to_string(),
            reason: reason.map(str::to_string),
        };
        self.transition(document_id, action).await
    }

    /// Generic create for any resource (e.g. `department`)
    async fn create_resource(&self, endpoint: &str, body: Value) -> Result<Value, AppError>;

    /// Generic update for any resource, sent as POST (e.g. `department/12`)
    async fn update_resource(&self, endpoint: &str, body: Value) -> Result<Value, AppError>;
}
