//! Types for the ingestion pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::DocumentFile;

/// Kind of supporting document. Serialized as the backend's `documentType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentCategory {
    Payslip,
    BankStatement,
    EmployeeId,
    ResidenceProof,
}

impl DocumentCategory {
    pub const ALL: [DocumentCategory; 4] = [
        Self::Payslip,
        Self::BankStatement,
        Self::EmployeeId,
        Self::ResidenceProof,
    ];

    /// Wire name, e.g. "BANK_STATEMENT".
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payslip => "PAYSLIP",
            Self::BankStatement => "BANK_STATEMENT",
            Self::EmployeeId => "EMPLOYEE_ID",
            Self::ResidenceProof => "RESIDENCE_PROOF",
        }
    }

    /// First segment of the object key.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Payslip => "payslips",
            Self::BankStatement => "bank-statements",
            Self::EmployeeId => "employee-id",
            Self::ResidenceProof => "residence-proof",
        }
    }

    /// Content types accepted for this category.
    ///
    /// Bank statements are issued as (often password-protected) PDFs; the
    /// other categories are commonly photographed.
    pub fn accepted_content_types(&self) -> &'static [&'static str] {
        match self {
            Self::BankStatement => &["application/pdf"],
            Self::Payslip | Self::EmployeeId | Self::ResidenceProof => {
                &["application/pdf", "image/jpeg", "image/png"]
            }
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    /// Accepts the wire name or the key prefix, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| {
                c.as_str() == normalized
                    || c.key_prefix().to_ascii_uppercase().replace('-', "_") == normalized
            })
            .ok_or_else(|| format!("Unknown document category: {}", s))
    }
}

/// One attached file waiting to be uploaded.
///
/// Owned by a single form session; never shared between submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub file: DocumentFile,
    pub category: DocumentCategory,
    /// Password protecting the document (e.g. a locked PDF).
    pub access_code: Option<String>,
}

impl UploadTask {
    pub fn new(file: DocumentFile, category: DocumentCategory) -> Self {
        Self {
            file,
            category,
            access_code: None,
        }
    }

    pub fn with_access_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.access_code = if code.is_empty() { None } else { Some(code) };
        self
    }
}

/// A successfully uploaded file. Consumed by the submitter, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub category: DocumentCategory,
    pub url: String,
    pub original_file_name: String,
    pub key: String,
    #[serde(skip)]
    pub access_code: Option<String>,
}

/// Upload results of one category, ready for a single backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUploads {
    pub category: DocumentCategory,
    pub urls: Vec<String>,
    pub access_codes: Vec<Option<String>>,
}

/// Groups results by category in order of first appearance, keeping input
/// order inside each group.
pub fn group_by_category(results: &[UploadResult]) -> Vec<CategoryUploads> {
    let mut groups: Vec<CategoryUploads> = category_order(results.iter().map(|r| r.category))
        .into_iter()
        .map(|category| CategoryUploads {
            category,
            urls: Vec::new(),
            access_codes: Vec::new(),
        })
        .collect();
    for result in results {
        if let Some(group) = groups.iter_mut().find(|g| g.category == result.category) {
            group.urls.push(result.url.clone());
            group.access_codes.push(result.access_code.clone());
        }
    }
    groups
}

/// Distinct categories in order of first appearance.
pub fn category_order(categories: impl IntoIterator<Item = DocumentCategory>) -> Vec<DocumentCategory> {
    let mut order = Vec::new();
    for category in categories {
        if !order.contains(&category) {
            order.push(category);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(category: DocumentCategory, url: &str) -> UploadResult {
        UploadResult {
            category,
            url: url.to_string(),
            original_file_name: url.to_string(),
            key: url.to_string(),
            access_code: None,
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("PAYSLIP".parse::<DocumentCategory>().unwrap(), DocumentCategory::Payslip);
        assert_eq!(
            "bank_statement".parse::<DocumentCategory>().unwrap(),
            DocumentCategory::BankStatement
        );
        assert_eq!(
            "bank-statements".parse::<DocumentCategory>().unwrap(),
            DocumentCategory::BankStatement
        );
        assert_eq!(
            "residence-proof".parse::<DocumentCategory>().unwrap(),
            DocumentCategory::ResidenceProof
        );
        assert!("passport".parse::<DocumentCategory>().is_err());
    }

    #[test]
    fn test_category_wire_name_matches_serde() {
        for category in DocumentCategory::ALL {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, serde_json::json!(category.as_str()));
        }
    }

    #[test]
    fn test_empty_access_code_is_none() {
        let file = DocumentFile::new("a.pdf", "application/pdf", vec![1]);
        let task = UploadTask::new(file, DocumentCategory::BankStatement).with_access_code("");
        assert!(task.access_code.is_none());
    }

    #[test]
    fn test_group_by_category_preserves_order() {
        let results = vec![
            result(DocumentCategory::BankStatement, "s1"),
            result(DocumentCategory::Payslip, "p1"),
            result(DocumentCategory::BankStatement, "s2"),
            result(DocumentCategory::Payslip, "p2"),
        ];
        let groups = group_by_category(&results);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, DocumentCategory::BankStatement);
        assert_eq!(groups[0].urls, vec!["s1", "s2"]);
        assert_eq!(groups[1].category, DocumentCategory::Payslip);
        assert_eq!(groups[1].urls, vec!["p1", "p2"]);
    }

    #[test]
    fn test_category_order_first_appearance() {
        let order = category_order([
            DocumentCategory::EmployeeId,
            DocumentCategory::Payslip,
            DocumentCategory::EmployeeId,
            DocumentCategory::BankStatement,
        ]);
        assert_eq!(
            order,
            vec![
                DocumentCategory::EmployeeId,
                DocumentCategory::Payslip,
                DocumentCategory::BankStatement
            ]
        );
    }

    #[test]
    fn test_group_by_category_empty() {
        assert!(group_by_category(&[]).is_empty());
    }
}
