use serde::{Deserialize, Serialize};

/// Name recorded for the training objective. The policy is trained to
/// reproduce its own sampled move; outcome rewards play no part.
pub const SELF_IMITATION_OBJECTIVE: &str = "self-imitation";

/// Name and dimensions of one parameter tensor of a policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub shape: Vec<usize>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, shape: &[usize]) -> Self {
        ParamSpec {
            name: name.into(),
            shape: shape.to_vec(),
        }
    }
}

/// Run information written to `metadata.json` next to the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub board_size: usize,
    pub episodes: usize,
    pub learning_rate: f64,
    pub total_moves: usize,
    pub timestamp: u64,
    #[serde(default = "default_objective")]
    pub objective: String,
    /// Parameters stored in the weights file
    #[serde(default)]
    pub parameters: Vec<ParamSpec>,
}

fn default_objective() -> String {
    SELF_IMITATION_OBJECTIVE.to_string()
}
