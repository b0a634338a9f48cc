//! One submission in flight per borrower.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks which borrowers have a submission running.
///
/// A second submission for the same borrower is refused while the first
/// holds its permit.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGuard {
    active: Arc<Mutex<HashSet<String>>>,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `subject_id`, or returns `None` if it is already claimed.
    pub fn try_acquire(&self, subject_id: &str) -> Option<SubmissionPermit> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(subject_id.to_string()) {
            return None;
        }
        Some(SubmissionPermit {
            active: Arc::clone(&self.active),
            subject_id: subject_id.to_string(),
        })
    }

    pub fn is_active(&self, subject_id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(subject_id)
    }
}

/// Releases the claim when dropped.
#[derive(Debug)]
pub struct SubmissionPermit {
    active: Arc<Mutex<HashSet<String>>>,
    subject_id: String,
}

impl Drop for SubmissionPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.subject_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let guard = SubmissionGuard::new();
        let permit = guard.try_acquire("b-1");
        assert!(permit.is_some());
        assert!(guard.try_acquire("b-1").is_none());
        assert!(guard.try_acquire("b-2").is_some());
    }

    #[test]
    fn test_drop_releases_claim() {
        let guard = SubmissionGuard::new();
        {
            let _permit = guard.try_acquire("b-1").unwrap();
            assert!(guard.is_active("b-1"));
        }
        assert!(!guard.is_active("b-1"));
        assert!(guard.try_acquire("b-1").is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = SubmissionGuard::new();
        let other = guard.clone();
        let _permit = guard.try_acquire("b-1").unwrap();
        assert!(other.try_acquire("b-1").is_none());
    }
}
