use serde::{Deserialize, Serialize};

/// Read-only verification snapshot for one borrower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BorrowerProfile {
    pub aadhaar_verified: bool,
    pub pan_verified: bool,
    pub employment_details: Option<EmploymentRecord>,
    pub bank_details_available: bool,
    pub kyc_documents: Vec<KycDocument>,
    pub payslips: Option<SupportingDocument>,
    pub bank_statement: Option<SupportingDocument>,
    pub residence_proof: Option<SupportingDocument>,
    pub loan_progress: LoanProgress,
    pub application_status: ApplicationStatus,
    pub loan_documents: Vec<LoanDocument>,
}

impl BorrowerProfile {
    /// Returns true when the application reached a terminal negative state.
    pub fn is_rejected(&self) -> bool {
        self.application_status == ApplicationStatus::Rejected
    }

    /// Returns true when the application was approved without conditions.
    pub fn is_approved(&self) -> bool {
        self.application_status == ApplicationStatus::Approved
    }

    /// Returns the KYC document of the given type, if the backend has one.
    pub fn kyc_document(&self, document_type: KycDocumentType) -> Option<&KycDocument> {
        self.kyc_documents
            .iter()
            .find(|d| d.document_type == document_type)
    }
}

/// Employment information recorded against a borrower.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmploymentRecord {
    pub employer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_email: Option<String>,
}

/// Identity document types verified during KYC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycDocumentType {
    Pan,
    Aadhaar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycDocument {
    pub document_type: KycDocumentType,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub document_urls: Vec<String>,
    #[serde(default)]
    pub document_number: String,
}

/// Payslips, bank statement or residence proof on file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportingDocument {
    pub verified: bool,
    pub document_urls: Vec<String>,
}

/// Backend-computed milestone flags.
///
/// Flags only move from false to true within one application; a fresh
/// application starts over with all of them false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct LoanProgress {
    pub aadhaar_verified: bool,
    pub pan_verified: bool,
    pub kyc_done: bool,
    pub eligibility_passed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    InReview,
    Approved,
    ApprovedWithCondition,
    Rejected,
    Disbursed,
    Defaulted,
    Closed,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InReview => "IN_REVIEW",
            Self::Approved => "APPROVED",
            Self::ApprovedWithCondition => "APPROVED_WITH_CONDITION",
            Self::Rejected => "REJECTED",
            Self::Disbursed => "DISBURSED",
            Self::Defaulted => "DEFAULTED",
            Self::Closed => "CLOSED",
        }
    }
}

/// Document tied to the active loan application (distinct from KYC documents).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanDocument {
    pub verified: bool,
}
