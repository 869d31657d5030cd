/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// Invoice flavours that share the create-with-defaults flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceKind {
    /// Supplier invoice
    Purchase,
    /// Customer invoice
    Sale,
}

impl InvoiceKind {
    /// Collection path of this kind of invoice
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            InvoiceKind::Purchase => "purchaseinvoice",
            InvoiceKind::Sale => "saleinvoice",
        }
    }

    /// Document class name used by the upstream API
    #[must_use]
    pub fn doc_class(&self) -> &'static str {
        match self {
            InvoiceKind::Purchase => "PurchaseInvoice",
            InvoiceKind::Sale => "SaleInvoice",
        }
    }
}

impl fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.doc_class())
    }
}

/// Partial invoice supplied by the caller
///
/// Unset identifiers are resolved before submission: `docTypeId` and
/// `legalEntityId` fall back to defaults, and a short `contactAccountId` is
/// looked up as a contact code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    /// Contact account identifier or code
    pub contact_account_id: Option<String>,
    /// Document type identifier
    pub doc_type_id: Option<String>,
    /// Legal entity identifier
    pub legal_entity_id: Option<String>,
    /// Document date, `YYYY-MM-DD`
    pub doc_date: Option<String>,
    /// Due date, `YYYY-MM-DD`
    pub due_date: Option<String>,
    /// ISO currency code, `GBP` when unset
    pub currency: Option<String>,
    pub description: Option<String>,
    /// Supplier's document number (purchase invoices)
    pub their_doc_no: Option<String>,
    /// Customer reference (sale invoices)
    pub reference: Option<String>,
    pub payment_terms_id: Option<String>,
    pub project_id: Option<String>,
    /// Invoice lines, sent upstream as `details`
    pub lines: Option<Vec<Value>>,
}

/// Invoice body with every identifier resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub contact_account_id: String,
    pub doc_type_id: String,
    pub legal_entity_id: String,
    pub doc_date: String,
    pub due_date: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub their_doc_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<Value>>,
}

/// Fields to change on a draft document. Only the provided ones are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub their_doc_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Contact account identifier or code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_account_id: Option<String>,
    /// Replacement lines, sent upstream as `details`
    #[serde(
        rename(serialize = "details"),
        alias = "details",
        skip_serializing_if = "Option::is_none"
    )]
    pub lines: Option<Vec<Value>>,
}

impl DocumentUpdate {
    /// Whether no field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &DocumentUpdate::default()
    }
}

/// State-changing operation on a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowAction {
    /// Finalise a draft, optionally on a given posting date
    Post { posting_date: Option<String> },
    /// Approve a document, optionally with a note
    Approve { note: Option<String> },
    /// Create a reversing entry for a posted document
    Reverse {
        reversal_date: String,
        reason: Option<String>,
    },
}

impl WorkflowAction {
    /// Last path segment of the transition endpoint
    #[must_use]
    pub fn segment(&self) -> &'static str {
        match self {
            WorkflowAction::Post { .. } => "post",
            WorkflowAction::Approve { .. } => "approve",
            WorkflowAction::Reverse { .. } => "reverse",
        }
    }

    /// JSON body of the transition call
    #[must_use]
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        match self {
            WorkflowAction::Post { posting_date } => {
                if let Some(date) = posting_date {
                    body.insert("postingDate".to_string(), json!(date));
                }
            }
            WorkflowAction::Approve { note } => {
                if let Some(note) = note {
                    body.insert("note".to_string(), json!(note));
                }
            }
            WorkflowAction::Reverse {
                reversal_date,
                reason,
            } => {
                body.insert("reversalDate".to_string(), json!(reversal_date));
                if let Some(reason) = reason {
                    body.insert("reason".to_string(), json!(reason));
                }
            }
        }
        Value::Object(body)
    }
}
