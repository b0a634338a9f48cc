use serde::{Deserialize, Serialize};

use crate::ingest::DocumentCategory;
use crate::profile::{ApplicationStatus, LoanDocument};

/// Body of `POST /kyc-docs/add`.
///
/// `access_codes` is positionally paired with `documents`; an empty string
/// means the document has no access code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDocumentsRequest {
    pub borrower_id: String,
    pub documents: Vec<String>,
    pub document_type: DocumentCategory,
    pub access_codes: Vec<String>,
}

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `PUT /bank-detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetail {
    pub borrower_id: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
}

/// Response of `GET /loan-application/{id}/details`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanApplicationDetails {
    pub id: String,
    pub application_status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenure_months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    pub loan_documents: Vec<LoanDocument>,
}
