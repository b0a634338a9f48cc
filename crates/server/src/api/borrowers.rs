//! Borrower form endpoints: employment, bank detail and loan application.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::Deserialize;
use tracing::info;

use loanport_core::backend::{Ack, BankDetail, LoanApplicationDetails};
use loanport_core::profile::EmploymentRecord;

use super::error::ApiError;
use crate::state::AppState;

static IFSC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap());
static ACCOUNT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{9,18}$").unwrap());

/// `PUT /borrowers/{id}/employment`
pub async fn update_employment(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<String>,
    Json(employment): Json<EmploymentRecord>,
) -> Result<Json<Ack>, ApiError> {
    validate_employment(&employment)?;
    let ack = state
        .backend()
        .update_employment(&borrower_id, &employment)
        .await?;
    info!(borrower_id = %borrower_id, "Employment details updated");
    Ok(Json(ack))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailRequest {
    pub account_holder_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    #[serde(default)]
    pub bank_name: Option<String>,
}

/// `PUT /borrowers/{id}/bank-detail`
pub async fn update_bank_detail(
    State(state): State<Arc<AppState>>,
    Path(borrower_id): Path<String>,
    Json(request): Json<BankDetailRequest>,
) -> Result<Json<Ack>, ApiError> {
    let detail = validate_bank_detail(borrower_id, request)?;
    let ack = state.backend().update_bank_detail(&detail).await?;
    info!(borrower_id = %detail.borrower_id, "Bank details updated");
    Ok(Json(ack))
}

/// `GET /loan-applications/{id}`
pub async fn get_loan_application(
    State(state): State<Arc<AppState>>,
    Path(application_id): Path<String>,
) -> Result<Json<LoanApplicationDetails>, ApiError> {
    let details = state
        .backend()
        .loan_application_details(&application_id)
        .await?;
    Ok(Json(details))
}

fn validate_employment(employment: &EmploymentRecord) -> Result<(), ApiError> {
    if employment.employer_name.trim().is_empty() {
        return Err(ApiError::bad_request("Employer name is required"));
    }
    if let Some(income) = employment.monthly_income {
        if !income.is_finite() || income < 0.0 {
            return Err(ApiError::bad_request("Monthly income must be a positive amount"));
        }
    }
    if let Some(email) = &employment.official_email {
        if !email.contains('@') {
            return Err(ApiError::bad_request("Official email is not a valid address"));
        }
    }
    Ok(())
}

fn validate_bank_detail(
    borrower_id: String,
    request: BankDetailRequest,
) -> Result<BankDetail, ApiError> {
    let account_holder_name = request.account_holder_name.trim().to_string();
    if account_holder_name.is_empty() {
        return Err(ApiError::bad_request("Account holder name is required"));
    }
    let account_number = request.account_number.trim().to_string();
    if !ACCOUNT_NUMBER.is_match(&account_number) {
        return Err(ApiError::bad_request("Account number must be 9 to 18 digits"));
    }
    let ifsc_code = request.ifsc_code.trim().to_ascii_uppercase();
    if !IFSC.is_match(&ifsc_code) {
        return Err(ApiError::bad_request("IFSC code is not valid"));
    }

    Ok(BankDetail {
        borrower_id,
        account_holder_name,
        account_number,
        ifsc_code,
        bank_name: request.bank_name.filter(|n| !n.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_request(account_number: &str, ifsc: &str) -> BankDetailRequest {
        BankDetailRequest {
            account_holder_name: " A Borrower ".to_string(),
            account_number: account_number.to_string(),
            ifsc_code: ifsc.to_string(),
            bank_name: Some(String::new()),
        }
    }

    #[test]
    fn test_bank_detail_normalized() {
        let detail =
            validate_bank_detail("b-1".to_string(), bank_request("001234567890", "hdfc0001234"))
                .unwrap();
        assert_eq!(detail.account_holder_name, "A Borrower");
        assert_eq!(detail.ifsc_code, "HDFC0001234");
        assert!(detail.bank_name.is_none());
    }

    #[test]
    fn test_bank_detail_rejects_bad_input() {
        assert!(validate_bank_detail("b-1".to_string(), bank_request("12ab", "HDFC0001234")).is_err());
        assert!(
            validate_bank_detail("b-1".to_string(), bank_request("001234567890", "HDFC1001234"))
                .is_err()
        );
    }

    #[test]
    fn test_employment_requires_employer() {
        let err = validate_employment(&EmploymentRecord::default()).unwrap_err();
        assert_eq!(err.message, "Employer name is required");

        let ok = EmploymentRecord {
            employer_name: "Acme".to_string(),
            monthly_income: Some(50_000.0),
            official_email: Some("me@acme.test".to_string()),
            ..Default::default()
        };
        assert!(validate_employment(&ok).is_ok());
    }
}
