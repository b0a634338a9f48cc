//! The fixed onboarding stage table and its derivation rules.

use serde::Serialize;

use crate::profile::BorrowerProfile;

/// Number of stages on the stepper. Ids run from 1 to this value.
pub const STAGE_COUNT: usize = 7;

/// One row of the stage table.
///
/// `approved_label` replaces `label` when the application status is
/// `APPROVED`; `is_complete` reads the completion flag from the profile.
#[derive(Debug, Clone, Copy)]
pub struct StageDefinition {
    pub id: u8,
    pub label: &'static str,
    pub approved_label: Option<&'static str>,
    pub is_complete: fn(&BorrowerProfile) -> bool,
}

impl StageDefinition {
    fn label_for(&self, profile: &BorrowerProfile) -> &'static str {
        match self.approved_label {
            Some(label) if profile.is_approved() => label,
            _ => self.label,
        }
    }

    fn evaluate(&self, profile: &BorrowerProfile) -> Stage {
        Stage {
            id: self.id,
            label: self.label_for(profile).to_string(),
            completed: (self.is_complete)(profile),
        }
    }
}

/// Stage ids are stable identifiers shared with the UI; never reorder.
pub static STAGE_TABLE: [StageDefinition; STAGE_COUNT] = [
    StageDefinition {
        id: 1,
        label: "Profile Creation",
        approved_label: None,
        is_complete: |_| true,
    },
    StageDefinition {
        id: 2,
        label: "Aadhar Verified",
        approved_label: None,
        is_complete: |p| p.loan_progress.aadhaar_verified,
    },
    StageDefinition {
        id: 3,
        label: "Pan Verified",
        approved_label: None,
        is_complete: |p| p.loan_progress.pan_verified,
    },
    StageDefinition {
        id: 4,
        label: "Documents Uploaded",
        approved_label: None,
        is_complete: documents_uploaded,
    },
    StageDefinition {
        id: 5,
        label: "KYC Verification",
        approved_label: Some("KYC Verified !"),
        is_complete: |p| p.loan_progress.kyc_done,
    },
    StageDefinition {
        id: 6,
        label: "Credit Check in Progress",
        approved_label: Some("Credit Check Completed"),
        is_complete: |p| p.loan_progress.eligibility_passed,
    },
    StageDefinition {
        id: 7,
        label: "Loan Approval",
        approved_label: Some("Loan Approved"),
        is_complete: BorrowerProfile::is_approved,
    },
];

/// A rejected application never shows its documents as done, whatever
/// their individual verification state.
fn documents_uploaded(profile: &BorrowerProfile) -> bool {
    if profile.is_rejected() {
        return false;
    }
    !profile.loan_documents.is_empty() && profile.loan_documents.iter().all(|d| d.verified)
}

/// A derived stepper entry. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: u8,
    pub label: String,
    pub completed: bool,
}

/// Derives the ordered stage list for a profile.
pub fn derive_stages(profile: &BorrowerProfile) -> Vec<Stage> {
    STAGE_TABLE.iter().map(|def| def.evaluate(profile)).collect()
}

/// Returns the highest completed stage id, or 0 when nothing is completed.
///
/// Stages are not contiguous (stage 4 can be forced off while later stages
/// are on), so this is a backward scan rather than a count.
pub fn current_stage(stages: &[Stage]) -> u8 {
    stages
        .iter()
        .rev()
        .find(|s| s.completed)
        .map(|s| s.id)
        .unwrap_or(0)
}
