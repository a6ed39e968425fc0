use super::{PreferencesEndpoint, SaveAck};
use crate::error::EndpointError;
use crate::models::preferences::PreferencesState;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Scripted endpoint for tests: queued outcomes and latencies, recorded calls.
/// Once a queue runs dry the defaults apply (backend defaults, success, the
/// configured latency).
pub struct MockEndpoint {
    load_latency: Duration,
    save_latency: Duration,
    load_outcomes: Mutex<VecDeque<Result<PreferencesState, EndpointError>>>,
    save_outcomes: Mutex<VecDeque<Result<(), EndpointError>>>,
    save_latencies: Mutex<VecDeque<Duration>>,
    save_calls: Mutex<Vec<PreferencesState>>,
    load_calls: Mutex<usize>,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self {
            load_latency: Duration::from_millis(600),
            save_latency: Duration::from_millis(1000),
            load_outcomes: Mutex::new(VecDeque::new()),
            save_outcomes: Mutex::new(VecDeque::new()),
            save_latencies: Mutex::new(VecDeque::new()),
            save_calls: Mutex::new(Vec::new()),
            load_calls: Mutex::new(0),
        }
    }

    pub fn with_load(self, outcome: Result<PreferencesState, EndpointError>) -> Self {
        self.load_outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_save(self, outcome: Result<(), EndpointError>) -> Self {
        self.save_outcomes.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_save_latency(self, latency: Duration) -> Self {
        self.save_latencies.lock().unwrap().push_back(latency);
        self
    }

    pub fn save_calls(&self) -> Vec<PreferencesState> {
        self.save_calls.lock().unwrap().clone()
    }

    pub fn load_calls(&self) -> usize {
        *self.load_calls.lock().unwrap()
    }
}

#[async_trait]
impl PreferencesEndpoint for MockEndpoint {
    async fn load(&self, _user_id: &str) -> Result<PreferencesState, EndpointError> {
        *self.load_calls.lock().unwrap() += 1;
        let outcome = self
            .load_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(PreferencesState::backend_defaults()));
        tokio::time::sleep(self.load_latency).await;
        outcome
    }

    async fn save(
        &self,
        _user_id: &str,
        state: &PreferencesState,
    ) -> Result<SaveAck, EndpointError> {
        self.save_calls.lock().unwrap().push(state.clone());
        let outcome = self.save_outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()));
        let latency = self
            .save_latencies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.save_latency);
        tokio::time::sleep(latency).await;
        outcome.map(|()| SaveAck {
            state: state.clone(),
        })
    }
}
