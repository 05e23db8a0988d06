//! Human models returned by the Procuret API.

use serde::{Deserialize, Serialize};

/// Summary of a human agent: their identifier and full name.
///
/// Decoded and encoded through [`procuret_core::Codable`]; fields are read-only
/// once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HumanHeadline {
    agent_id: i64,
    full_name: String,
}

impl HumanHeadline {
    /// Create a headline.
    #[must_use]
    pub fn new(agent_id: i64, full_name: impl Into<String>) -> Self {
        Self {
            agent_id,
            full_name: full_name.into(),
        }
    }

    /// Agent identifier.
    #[must_use]
    pub const fn agent_id(&self) -> i64 {
        self.agent_id
    }

    /// Full name of the agent.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}
