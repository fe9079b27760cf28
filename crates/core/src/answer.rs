//! The orchestrator's response unit.

use serde::{Deserialize, Serialize};

use crate::error::Rejection;

/// Where the data behind an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Served from the fact store without a successful refresh
    Cache,
    /// Freshly fetched from the provider chain during this request
    ExternalFetch,
    /// No answer was given
    Rejected,
}

impl Provenance {
    /// Label shown next to answers in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cache => "Knowledge Base",
            Self::ExternalFetch => "Live API",
            Self::Rejected => "N/A",
        }
    }
}

/// A single answer to a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnswer {
    pub text: String,
    pub provenance: Provenance,
    /// 1.0 when answered, 0.0 when rejected
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
}

impl AgentAnswer {
    pub fn answered(text: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            text: text.into(),
            provenance,
            confidence: 1.0,
            rejection: None,
        }
    }

    pub fn rejected(reason: Rejection) -> Self {
        Self {
            text: reason.to_string(),
            provenance: Provenance::Rejected,
            confidence: 0.0,
            rejection: Some(reason),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}
