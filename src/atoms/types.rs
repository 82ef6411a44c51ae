// ── Propatch Atoms: Pure Data Types ────────────────────────────────────────
// Plain struct/enum definitions. No I/O, no imports from engine/.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::PatchError;

/// Result set of `Store::select`: one `Vec<String>` per row, columns in
/// query order, SQL NULL rendered as `NULL_MARKER`.
pub type Rows = Vec<Vec<String>>;

/// The one `settings` row this crate works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRow {
    pub key: String,
    pub value: String,
}

/// Licence tier stored at `additional.proStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProStatus {
    Free,
    Test,
    Pro,
}

impl ProStatus {
    pub const ALL: [ProStatus; 3] = [ProStatus::Free, ProStatus::Test, ProStatus::Pro];

    pub fn as_str(self) -> &'static str {
        match self {
            ProStatus::Free => "free",
            ProStatus::Test => "test",
            ProStatus::Pro => "pro",
        }
    }

    /// Every legal state moves to `Pro`; `Pro` loops on itself.
    pub fn transition(self) -> ProStatus {
        ProStatus::Pro
    }
}

impl fmt::Display for ProStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProStatus {
    type Err = PatchError;

    // Exact, case-sensitive match. Anything else is foreign state.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PatchError::InvalidState(s.to_string()))
    }
}

/// What a successful patch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchOutcome {
    pub previous: ProStatus,
    pub current: ProStatus,
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}
