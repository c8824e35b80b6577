//! Content-hash change detection for monitored pages.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hex digest of page content.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// How the current content relates to the last recorded digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    /// No digest was recorded before.
    FirstSight,
    Unchanged,
    Changed,
}

impl ChangeState {
    /// Compare a previously stored digest against a fresh one.
    pub fn assess(previous: Option<&str>, current: &str) -> Self {
        match previous {
            None => Self::FirstSight,
            Some(prev) if prev == current => Self::Unchanged,
            Some(_) => Self::Changed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstSight => "first_sight",
            Self::Unchanged => "unchanged",
            Self::Changed => "changed",
        }
    }
}

/// What a single-page crawl does the first time it sees a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSightPolicy {
    /// Treat the whole page as new content and emit a notice.
    #[default]
    Extract,
    /// Only record the digest; notices start with the first change.
    RecordOnly,
}

impl FirstSightPolicy {
    /// Whether a single-page crawl in `state` should produce a notice.
    pub fn should_extract(&self, state: ChangeState) -> bool {
        match state {
            ChangeState::Changed => true,
            ChangeState::Unchanged => false,
            ChangeState::FirstSight => *self == Self::Extract,
        }
    }
}
