//! Remote preferences endpoint contract.

use crate::error::EndpointError;
use crate::models::preferences::PreferencesState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(test)]
pub(crate) mod mock;
mod simulated;

pub use simulated::{SimulatedEndpoint, SIMULATED_SAVE_ERROR};

/// Acknowledgement of a successful save, echoing what the backend stored.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SaveAck {
    pub state: PreferencesState,
}

/// Asynchronous read/write access to a user's stored preferences.
///
/// Neither call can be cancelled once issued.
#[async_trait]
pub trait PreferencesEndpoint: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<PreferencesState, EndpointError>;

    async fn save(
        &self,
        user_id: &str,
        state: &PreferencesState,
    ) -> Result<SaveAck, EndpointError>;
}

pub type SharedEndpoint = Arc<dyn PreferencesEndpoint>;
