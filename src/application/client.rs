/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use crate::application::config::Config;
use crate::application::interfaces::document::DocumentService;
use crate::application::interfaces::reference::ReferenceService;
use crate::constants::{DEFAULT_CURRENCY, LOOKUP_PAGE_SIZE};
use crate::error::AppError;
use crate::model::http::HttpClient;
use crate::model::requests::{
    DocumentUpdate, InvoiceDraft, InvoiceKind, InvoicePayload, WorkflowAction,
};
use crate::model::responses::{bare_identifier, is_bare_result, is_empty_result, items, str_field};
use crate::model::utils::is_opaque_identifier;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// High level iplicit client
///
/// Built once by the process entry point and shared by reference with every
/// consumer.
pub struct Client {
    http_client: Arc<HttpClient>,
}

impl Client {
    /// Creates a client around an existing request core
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self { http_client }
    }

    /// Creates a client, its session manager and its transport from the configuration
    ///
    /// # Errors
    /// * `AppError::Connection` if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(Arc::new(HttpClient::from_config(config)?)))
    }

    /// Request core used by this client
    #[must_use]
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Fetches one page of a collection; a missing collection is `None`
    async fn fetch_page(&self, collection: &str, page_size: u32) -> Result<Option<Value>, AppError> {
        match self
            .http_client
            .get(collection, &[("maxRecordCount", page_size.to_string())])
            .await
        {
            Ok(page) => Ok(Some(page)),
            Err(AppError::NotFound { url }) => {
                debug!("Collection not found: {}", url);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the identifier for a contact given as identifier or code
    async fn resolve_contact(&self, value: &str) -> Result<Option<String>, AppError> {
        if is_opaque_identifier(value) {
            return Ok(Some(value.to_string()));
        }
        self.lookup_contact_by_code(value).await
    }

    /// Fetches the full record when `response` is only an identifier
    async fn complete_created(&self, collection: &str, response: Value) -> Result<Value, AppError> {
        match bare_identifier(&response) {
            Some(id) => {
                debug!("Create returned bare identifier {}, fetching record", id);
                self.http_client.get(&format!("{collection}/{id}"), &[]).await
            }
            None => Ok(response),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required(value: &Option<String>, field: &str) -> Result<String, AppError> {
    present(value)
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("{field} is required")))
}

#[async_trait]
impl ReferenceService for Client {
    async fn find_by_code(&self, collection: &str, code: &str) -> Result<Option<Value>, AppError> {
        let Some(page) = self.fetch_page(collection, LOOKUP_PAGE_SIZE).await? else {
            return Ok(None);
        };
        let found = items(&page)
            .iter()
            .find(|item| str_field(item, "code") == Some(code))
            .cloned();
        if found.is_none() {
            debug!("No {} with code {}", collection, code);
        }
        Ok(found)
    }

    async fn lookup_id_by_code(
        &self,
        collection: &str,
        code: &str,
    ) -> Result<Option<String>, AppError> {
        let record = self.find_by_code(collection, code).await?;
        Ok(record
            .as_ref()
            .and_then(|r| str_field(r, "id"))
            .map(str::to_string))
    }

    async fn lookup_contact_by_code(&self, code: &str) -> Result<Option<String>, AppError> {
        self.lookup_id_by_code("contactaccount", code).await
    }

    async fn get_default_id(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Option<String>, AppError> {
        let Some(page) = self.fetch_page(collection, 1).await? else {
            return Ok(None);
        };
        Ok(items(&page)
            .first()
            .and_then(|item| str_field(item, field))
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    async fn get_default_legal_entity(&self) -> Result<Option<String>, AppError> {
        self.get_default_id("legalentity", "id").await
    }

    async fn get_default_doc_type(&self, kind: InvoiceKind) -> Result<Option<String>, AppError> {
        self.get_default_id(kind.collection(), "docTypeId").await
    }
}

#[async_trait]
impl DocumentService for Client {
    async fn get_document(&self, document_id: &str) -> Result<Value, AppError> {
        self.http_client
            .get(&format!("document/{document_id}"), &[])
            .await
    }

    async fn create_invoice(
        &self,
        kind: InvoiceKind,
        draft: &InvoiceDraft,
    ) -> Result<Value, AppError> {
        let doc_date = required(&draft.doc_date, "docDate")?;
        let due_date = required(&draft.due_date, "dueDate")?;
        let contact = present(&draft.contact_account_id).ok_or_else(|| {
            AppError::validation("contactAccountId is required (identifier or contact code)")
        })?;

        let contact_account_id = self.resolve_contact(contact).await?.ok_or_else(|| {
            AppError::validation(format!("contact account with code '{contact}' not found"))
        })?;

        let doc_type_id = match present(&draft.doc_type_id) {
            Some(id) => id.to_string(),
            None => self.get_default_doc_type(kind).await?.ok_or_else(|| {
                AppError::validation(
                    "could not determine default document type; provide docTypeId",
                )
            })?,
        };

        let legal_entity_id = match present(&draft.legal_entity_id) {
            Some(id) => id.to_string(),
            None => self.get_default_legal_entity().await?.ok_or_else(|| {
                AppError::validation(
                    "could not determine default legal entity; provide legalEntityId",
                )
            })?,
        };

        let payload = InvoicePayload {
            contact_account_id,
            doc_type_id,
            legal_entity_id,
            doc_date,
            due_date,
            currency: present(&draft.currency)
                .unwrap_or(DEFAULT_CURRENCY)
                .to_string(),
            description: draft.description.clone(),
            their_doc_no: match kind {
                InvoiceKind::Purchase => draft.their_doc_no.clone(),
                InvoiceKind::Sale => None,
            },
            reference: match kind {
                InvoiceKind::Purchase => None,
                InvoiceKind::Sale => draft.reference.clone(),
            },
            payment_terms_id: draft.payment_terms_id.clone(),
            project_id: draft.project_id.clone(),
            details: draft.lines.clone(),
        };

        info!("Creating {} for contact {}", kind, payload.contact_account_id);
        let response = self
            .http_client
            .post(kind.collection(), serde_json::to_value(&payload)?)
            .await?;
        self.complete_created(kind.collection(), response).await
    }

    async fn update_document(
        &self,
        document_id: &str,
        update: &DocumentUpdate,
    ) -> Result<Value, AppError> {
        if update.is_empty() {
            return Err(AppError::validation(
                "at least one field must be provided to update",
            ));
        }

        let mut update = update.clone();
        if let Some(contact) = present(&update.contact_account_id).map(str::to_string) {
            // An unknown code is sent unchanged and left to the upstream to reject
            if let Some(id) = self.resolve_contact(&contact).await? {
                update.contact_account_id = Some(id);
            }
        }

        let path = format!("document/{document_id}");
        info!("Updating document {}", document_id);
        let response = self
            .http_client
            .patch(&path, serde_json::to_value(&update)?)
            .await?;

        if is_empty_result(&response) {
            debug!("Update returned no content, fetching document {}", document_id);
            return self.http_client.get(&path, &[]).await;
        }
        Ok(response)
    }

    async fn transition(
        &self,
        document_id: &str,
        action: WorkflowAction,
    ) -> Result<Value, AppError> {
        info!("Applying {} to document {}", action.segment(), document_id);
        let response = self
            .http_client
            .post(
                &format!("document/{document_id}/{}", action.segment()),
                action.body(),
            )
            .await?;

        if is_bare_result(&response) {
            debug!(
                "{} returned no record, fetching document {}",
                action.segment(),
                document_id
            );
            return self.get_document(document_id).await;
        }
        Ok(response)
    }

    async fn create_resource(&self, endpoint: &str, body: Value) -> Result<Value, AppError> {
        self.http_client.post(endpoint, body).await
    }

    async fn update_resource(&self, endpoint: &str, body: Value) -> Result<Value, AppError> {
        self.http_client.post(endpoint, body).await
    }
}
