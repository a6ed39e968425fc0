use super::{PreferencesEndpoint, SaveAck};
use crate::error::EndpointError;
use crate::models::preferences::PreferencesState;
use async_trait::async_trait;
use log::{debug, info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const SIMULATED_SAVE_ERROR: &str = "Simulated server error saving preferences.";

/// In-process stand-in for the preferences backend: fixed latencies and a
/// random fraction of failed saves.
pub struct SimulatedEndpoint {
    load_latency: Duration,
    save_latency: Duration,
    failure_rate: f64,
    saved: Mutex<HashMap<String, PreferencesState>>,
}

impl SimulatedEndpoint {
    pub fn new(load_latency: Duration, save_latency: Duration, failure_rate: f64) -> Self {
        Self {
            load_latency,
            save_latency,
            // NaN would make gen_bool panic
            failure_rate: if failure_rate.is_nan() {
                0.0
            } else {
                failure_rate.clamp(0.0, 1.0)
            },
            saved: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for SimulatedEndpoint {
    fn default() -> Self {
        Self::new(Duration::from_millis(600), Duration::from_millis(1000), 0.2)
    }
}

#[async_trait]
impl PreferencesEndpoint for SimulatedEndpoint {
    async fn load(&self, user_id: &str) -> Result<PreferencesState, EndpointError> {
        tokio::time::sleep(self.load_latency).await;

        let saved = self.saved.lock().unwrap_or_else(|p| p.into_inner());
        let state = saved
            .get(user_id)
            .cloned()
            .unwrap_or_else(PreferencesState::backend_defaults);
        debug!("Loaded preferences for user {}: {:?}", user_id, state);
        Ok(state)
    }

    async fn save(
        &self,
        user_id: &str,
        state: &PreferencesState,
    ) -> Result<SaveAck, EndpointError> {
        tokio::time::sleep(self.save_latency).await;

        if rand::thread_rng().gen_bool(self.failure_rate) {
            warn!("Simulated save failure for user {}", user_id);
            return Err(EndpointError::Server(SIMULATED_SAVE_ERROR.to_string()));
        }

        self.saved
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(user_id.to_string(), state.clone());
        info!("Saved preferences for user {}", user_id);
        Ok(SaveAck {
            state: state.clone(),
        })
    }
}
