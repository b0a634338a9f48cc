//! Next-screen resolution.

use serde::{Serialize, Serializer};

use crate::profile::BorrowerProfile;

/// Screens the borrower can be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Aadhaar,
    Pan,
    EmploymentInfo,
    BankInfo,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Aadhaar => "/kyc/aadhaar",
            Self::Pan => "/kyc/pan",
            Self::EmploymentInfo => "/employment-info",
            Self::BankInfo => "/bank-info",
            Self::Dashboard => "/dashboard",
        }
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

/// Ordered gates; the first unmet one decides the route.
///
/// Employment and bank steps sit behind both identity checks even though the
/// flags are independent. Do not reorder.
const GATES: [(fn(&BorrowerProfile) -> bool, Route); 4] = [
    (|p| p.aadhaar_verified, Route::Aadhaar),
    (|p| p.pan_verified, Route::Pan),
    (|p| p.employment_details.is_some(), Route::EmploymentInfo),
    (|p| p.bank_details_available, Route::BankInfo),
];

/// Resolves the next screen for a profile.
pub fn resolve_next_route(profile: &BorrowerProfile) -> Route {
    GATES
        .iter()
        .find(|(passed, _)| !passed(profile))
        .map(|(_, route)| *route)
        .unwrap_or(Route::Dashboard)
}
