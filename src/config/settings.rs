use serde::{Deserialize, Serialize};

/// Tunables for a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Maximum nesting of type resolution before the branch is cut with an error node.
    pub max_depth: usize,
    /// Reuse one node for repeated (type, layer) requests within a pass.
    pub share_nodes: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: 64,
            share_nodes: true,
        }
    }
}

impl ResolverSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
