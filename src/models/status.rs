use serde::{Deserialize, Serialize};

// Lifecycle of the most recent save attempt
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Success,
    Error(String),
}

impl SaveStatus {
    pub fn is_saving(&self) -> bool {
        matches!(self, SaveStatus::Saving)
    }
}

// Progress of the initial preferences load
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready)
    }
}
