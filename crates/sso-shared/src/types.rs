//! Common types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credential repository an identity was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStore {
    /// Staff / RBAC users
    Staff,
    /// Admissions users kept in the secondary organization database
    Applicant,
    /// Student credentials
    Student,
}

impl SourceStore {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStore::Staff => "staff",
            SourceStore::Applicant => "applicant",
            SourceStore::Student => "student",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "staff" => Some(SourceStore::Staff),
            "applicant" => Some(SourceStore::Applicant),
            "student" => Some(SourceStore::Student),
            _ => None,
        }
    }
}

impl fmt::Display for SourceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
