//! Borrower profile snapshot as served by the lending backend.
//!
//! The profile is read-only on this side: every decision the progress engine
//! makes is derived from a freshly fetched snapshot, never from locally
//! mutated flags.

mod types;

pub use types::*;
