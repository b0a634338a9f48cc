//! Application progress engine.
//!
//! Pure functions turning a [`BorrowerProfile`] snapshot into:
//! - the seven-stage stepper model ([`derive_stages`]),
//! - the single current stage ([`current_stage`]),
//! - the next screen the borrower must visit ([`resolve_next_route`]).
//!
//! Nothing here performs I/O. Callers fetch a fresh profile, run it through
//! the engine, and discard the result once rendered.

mod routing;
mod stages;

pub use routing::{resolve_next_route, Route};
pub use stages::{current_stage, derive_stages, Stage, StageDefinition, STAGE_COUNT, STAGE_TABLE};

use serde::Serialize;

use crate::profile::BorrowerProfile;

/// Everything the stepper UI needs for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub stages: Vec<Stage>,
    pub current_stage: u8,
    pub next_route: Route,
}

impl ProgressReport {
    pub fn from_profile(profile: &BorrowerProfile) -> Self {
        let stages = derive_stages(profile);
        let current_stage = current_stage(&stages);
        Self {
            stages,
            current_stage,
            next_route: resolve_next_route(profile),
        }
    }
}
