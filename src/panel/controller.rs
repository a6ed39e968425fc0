use crate::debounce::Debouncer;
use crate::endpoint::{SaveAck, SharedEndpoint};
use crate::error::{EndpointError, PanelError};
use crate::models::preferences::{NotificationUpdate, PreferencesState};
use crate::models::status::{LoadState, SaveStatus};
use crate::models::theme::ThemeMode;
use crate::panel::validation::{validate, ValidationError};
use crate::panel::view::PanelView;
use crate::theme::SharedThemeHolder;
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, Receiver, Sender};
use tokio::task::JoinHandle;

const UNKNOWN_SAVE_ERROR: &str = "Unknown error";

/// Timer windows driving the panel.
#[derive(Clone, Copy, Debug)]
pub struct PanelTimings {
    /// Quiet period after the last edit before an automatic save fires.
    pub debounce: Duration,
    /// How long the success confirmation stays up before reverting to idle.
    pub success_display: Duration,
}

impl Default for PanelTimings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(750),
            success_display: Duration::from_millis(1200),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SaveTrigger {
    Debounced,
    Manual,
}

impl fmt::Display for SaveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveTrigger::Debounced => f.write_str("debounced"),
            SaveTrigger::Manual => f.write_str("manual"),
        }
    }
}

struct PanelState {
    mounted: bool,
    load: LoadState,
    load_generation: u64,
    preferences: PreferencesState,
    validation_error: Option<ValidationError>,
    save_status: SaveStatus,
    // Sequence number of the most recently dispatched save
    latest_save: u64,
    reversion: Option<JoinHandle<()>>,
    load_task: Option<JoinHandle<()>>,
    theme_sync: Option<JoinHandle<()>>,
}

impl PanelState {
    fn view(&self) -> PanelView {
        PanelView::build(
            &self.load,
            self.preferences.email_notifications,
            self.preferences.push_notifications,
            self.preferences.theme,
            self.validation_error.as_ref().map(ValidationError::message),
            &self.save_status,
        )
    }

    fn ensure_ready(&self) -> Result<(), PanelError> {
        if !self.mounted {
            return Err(PanelError::Unmounted);
        }
        if !self.load.is_ready() {
            return Err(PanelError::NotReady);
        }
        Ok(())
    }
}

struct PanelShared {
    user_id: String,
    endpoint: SharedEndpoint,
    theme: SharedThemeHolder,
    timings: PanelTimings,
    state: Mutex<PanelState>,
    debounced_save: Debouncer<PreferencesState>,
    views: Sender<PanelView>,
}

/// Controller behind the preferences form.
///
/// Owns the form state and coordinates load, edit, validation, the debounced
/// and manual save paths, and the feedback shown to the user. The theme
/// holder stays the source of truth for the page theme; the form keeps a copy
/// that is only ever written together with the holder.
///
/// Dropping the panel unmounts it.
pub struct PreferencesPanel {
    shared: Arc<PanelShared>,
}

impl PreferencesPanel {
    /// Mounts the panel and starts loading the user's preferences. Must be
    /// called from within a tokio runtime.
    pub fn mount(
        user_id: impl Into<String>,
        endpoint: SharedEndpoint,
        theme: SharedThemeHolder,
        timings: PanelTimings,
    ) -> Self {
        let user_id = user_id.into();
        let (views, _) = broadcast::channel(64);

        let shared = Arc::new_cyclic(|weak: &Weak<PanelShared>| {
            let weak = weak.clone();
            PanelShared {
                user_id,
                endpoint,
                theme,
                timings,
                state: Mutex::new(PanelState {
                    mounted: true,
                    load: LoadState::Loading,
                    load_generation: 0,
                    preferences: PreferencesState::unloaded(),
                    validation_error: None,
                    save_status: SaveStatus::Idle,
                    latest_save: 0,
                    reversion: None,
                    load_task: None,
                    theme_sync: None,
                }),
                debounced_save: Debouncer::new(timings.debounce, move |preferences| {
                    if let Some(shared) = weak.upgrade() {
                        shared.dispatch_save(preferences, SaveTrigger::Debounced);
                    }
                }),
                views,
            }
        });

        info!("Mounting preferences panel for user {}", shared.user_id);
        let theme_sync = shared.spawn_theme_sync();
        shared.lock_state().theme_sync = Some(theme_sync);
        shared.start_load();

        Self { shared }
    }

    pub fn view(&self) -> PanelView {
        self.shared.lock_state().view()
    }

    pub fn preferences(&self) -> PreferencesState {
        self.shared.lock_state().preferences.clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.shared.lock_state().save_status.clone()
    }

    pub fn validation_error(&self) -> Option<ValidationError> {
        self.shared.lock_state().validation_error
    }

    pub fn load_state(&self) -> LoadState {
        self.shared.lock_state().load.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.lock_state().mounted
    }

    /// Receives a fresh view after every observable change.
    pub fn subscribe(&self) -> Receiver<PanelView> {
        self.shared.views.subscribe()
    }

    pub fn set_email_notifications(&self, enabled: bool) -> Result<PanelView, PanelError> {
        self.shared
            .edit(|preferences| preferences.email_notifications = enabled)
    }

    pub fn set_push_notifications(&self, enabled: bool) -> Result<PanelView, PanelError> {
        self.shared
            .edit(|preferences| preferences.push_notifications = enabled)
    }

    pub fn toggle_email_notifications(&self) -> Result<PanelView, PanelError> {
        self.shared
            .edit(|preferences| preferences.email_notifications = !preferences.email_notifications)
    }

    pub fn toggle_push_notifications(&self) -> Result<PanelView, PanelError> {
        self.shared
            .edit(|preferences| preferences.push_notifications = !preferences.push_notifications)
    }

    /// Applies both switches in one step, producing a single change.
    pub fn update_notifications(&self, update: NotificationUpdate) -> Result<PanelView, PanelError> {
        self.shared.edit(|preferences| {
            if let Some(email) = update.email_notifications {
                preferences.email_notifications = email;
            }
            if let Some(push) = update.push_notifications {
                preferences.push_notifications = push;
            }
        })
    }

    /// Changes the theme. The holder (and its durable store) is updated
    /// before this returns; only the backend write is debounced.
    pub fn set_theme(&self, mode: ThemeMode) -> Result<PanelView, PanelError> {
        self.shared.edit_theme(|_| mode)
    }

    pub fn toggle_theme(&self) -> Result<PanelView, PanelError> {
        self.shared
            .edit_theme(|current| current.unwrap_or_default().toggled())
    }

    /// Validates and saves right away, bypassing the debounce window. Does not
    /// touch a pending debounced save, which may still fire later.
    pub fn save_now(&self) -> Result<PanelView, PanelError> {
        let preferences = {
            let mut state = self.shared.lock_state();
            state.ensure_ready()?;

            state.validation_error = validate(&state.preferences);
            if let Some(invalid) = state.validation_error {
                debug!("Manual save rejected: {}", invalid);
                let view = state.view();
                drop(state);
                self.shared.publish(view);
                return Err(PanelError::Invalid(invalid));
            }
            state.preferences.clone()
        };

        self.shared.dispatch_save(preferences, SaveTrigger::Manual);
        Ok(self.view())
    }

    /// Re-issues the initial load, e.g. after a load failure.
    pub fn reload(&self) -> Result<PanelView, PanelError> {
        if !self.is_mounted() {
            return Err(PanelError::Unmounted);
        }
        self.shared.debounced_save.cancel();
        self.shared.start_load();
        Ok(self.view())
    }

    /// Cancels the pending debounced save and every timer. Saves already in
    /// flight still complete, but their results are ignored.
    pub fn unmount(&self) {
        self.shared.unmount();
    }
}

impl Drop for PreferencesPanel {
    fn drop(&mut self) {
        self.shared.unmount();
    }
}

impl PanelShared {
    fn lock_state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn publish(&self, view: PanelView) {
        // No subscribers is fine
        let _ = self.views.send(view);
    }

    fn start_load(self: &Arc<Self>) {
        let (generation, view) = {
            let mut state = self.lock_state();
            state.load_generation += 1;
            state.load = LoadState::Loading;
            if let Some(previous) = state.load_task.take() {
                previous.abort();
            }
            (state.load_generation, state.view())
        };
        self.publish(view);
        debug!("Loading preferences for user {}", self.user_id);

        let weak = Arc::downgrade(self);
        let endpoint = self.endpoint.clone();
        let user_id = self.user_id.clone();
        let handle = tokio::spawn(async move {
            let result = endpoint.load(&user_id).await;
            if let Some(shared) = weak.upgrade() {
                shared.finish_load(generation, result);
            }
        });

        let mut state = self.lock_state();
        if state.mounted && state.load_generation == generation {
            state.load_task = Some(handle);
        } else {
            handle.abort();
        }
    }

    fn finish_load(&self, generation: u64, result: Result<PreferencesState, EndpointError>) {
        let mut state = self.lock_state();
        if !state.mounted || state.load_generation != generation {
            debug!("Ignoring superseded preferences load");
            return;
        }
        state.load_task = None;

        match result {
            Ok(preferences) => {
                info!(
                    "Loaded preferences for user {}: email={}, push={}, theme={}",
                    self.user_id,
                    preferences.email_notifications,
                    preferences.push_notifications,
                    preferences
                        .theme
                        .map(|mode| mode.as_str())
                        .unwrap_or("unset")
                );
                if let Some(mode) = preferences.theme {
                    self.theme.set_theme(mode);
                }
                state.preferences = preferences;
                state.load = LoadState::Ready;
                state.validation_error = validate(&state.preferences);
                if let Some(invalid) = state.validation_error {
                    warn!("Loaded preferences are not valid: {}", invalid);
                }
            }
            Err(e) => {
                error!("Failed to load preferences for user {}: {}", self.user_id, e);
                state.load = LoadState::Failed(e.to_string());
            }
        }

        let view = state.view();
        drop(state);
        self.publish(view);
    }

    fn edit<F>(&self, apply: F) -> Result<PanelView, PanelError>
    where
        F: FnOnce(&mut PreferencesState),
    {
        let mut state = self.lock_state();
        state.ensure_ready()?;

        apply(&mut state.preferences);
        self.preferences_changed(&mut state);

        let view = state.view();
        drop(state);
        self.publish(view.clone());
        Ok(view)
    }

    fn edit_theme<F>(&self, choose: F) -> Result<PanelView, PanelError>
    where
        F: FnOnce(Option<ThemeMode>) -> ThemeMode,
    {
        let mut state = self.lock_state();
        state.ensure_ready()?;

        let mode = choose(state.preferences.theme);
        self.apply_theme(&mut state, mode);
        self.preferences_changed(&mut state);

        let view = state.view();
        drop(state);
        self.publish(view.clone());
        Ok(view)
    }

    // The only place the form's theme copy is written after load; the holder
    // is updated in the same step so the two never diverge observably.
    fn apply_theme(&self, state: &mut PanelState, mode: ThemeMode) {
        state.preferences.theme = Some(mode);
        self.theme.set_theme(mode);
    }

    fn preferences_changed(&self, state: &mut PanelState) {
        state.validation_error = validate(&state.preferences);
        match state.validation_error {
            Some(invalid) => debug!("Not scheduling save: {}", invalid),
            None => {
                debug!(
                    "Scheduling save in {}ms",
                    self.debounced_save.delay().as_millis()
                );
                self.debounced_save.trigger(state.preferences.clone());
            }
        }
    }

    fn spawn_theme_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.theme.subscribe();
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) | Err(RecvError::Lagged(_)) => match weak.upgrade() {
                        Some(shared) => shared.sync_theme_from_holder(),
                        None => break,
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    // Compares against the holder's current mode rather than the received
    // event, so stale events from the panel's own writes are no-ops.
    fn sync_theme_from_holder(&self) {
        let mut state = self.lock_state();
        if !state.mounted || !state.load.is_ready() {
            return;
        }
        let mode = self.theme.mode();
        if state.preferences.theme == Some(mode) {
            return;
        }

        debug!("Theme changed outside the panel, syncing form to {}", mode);
        state.preferences.theme = Some(mode);
        self.preferences_changed(&mut state);

        let view = state.view();
        drop(state);
        self.publish(view);
    }

    fn dispatch_save(self: &Arc<Self>, preferences: PreferencesState, trigger: SaveTrigger) {
        let (seq, view) = {
            let mut state = self.lock_state();
            if !state.mounted {
                return;
            }
            state.latest_save += 1;
            state.save_status = SaveStatus::Saving;
            if let Some(reversion) = state.reversion.take() {
                reversion.abort();
            }
            (state.latest_save, state.view())
        };
        self.publish(view);
        debug!("Dispatching {} save #{} for user {}", trigger, seq, self.user_id);

        let weak = Arc::downgrade(self);
        let endpoint = self.endpoint.clone();
        let user_id = self.user_id.clone();
        tokio::spawn(async move {
            let result = endpoint.save(&user_id, &preferences).await;
            if let Some(shared) = weak.upgrade() {
                shared.finish_save(seq, result);
            }
        });
    }

    fn finish_save(self: &Arc<Self>, seq: u64, result: Result<SaveAck, EndpointError>) {
        let mut state = self.lock_state();
        if !state.mounted {
            debug!("Save #{} resolved after unmount, ignoring", seq);
            return;
        }
        if seq != state.latest_save {
            warn!(
                "Discarding stale result of save #{} (latest is #{})",
                seq, state.latest_save
            );
            return;
        }

        match result {
            Ok(_) => {
                info!("Preferences saved for user {}", self.user_id);
                state.save_status = SaveStatus::Success;
                state.reversion = Some(self.spawn_reversion(seq));
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.is_empty() {
                    message = UNKNOWN_SAVE_ERROR.to_string();
                }
                warn!("Saving preferences failed: {}", message);
                state.save_status = SaveStatus::Error(message);
            }
        }

        let view = state.view();
        drop(state);
        self.publish(view);
    }

    fn spawn_reversion(self: &Arc<Self>, seq: u64) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let window = self.timings.success_display;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if let Some(shared) = weak.upgrade() {
                shared.revert_to_idle(seq);
            }
        })
    }

    fn revert_to_idle(&self, seq: u64) {
        let mut state = self.lock_state();
        if !state.mounted || state.latest_save != seq || state.save_status != SaveStatus::Success {
            return;
        }
        state.save_status = SaveStatus::Idle;
        state.reversion = None;

        let view = state.view();
        drop(state);
        self.publish(view);
    }

    fn unmount(&self) {
        let mut state = self.lock_state();
        if !state.mounted {
            return;
        }
        state.mounted = false;
        for handle in [
            state.reversion.take(),
            state.load_task.take(),
            state.theme_sync.take(),
        ]
        .into_iter()
        .flatten()
        {
            handle.abort();
        }
        drop(state);

        if self.debounced_save.cancel() {
            debug!("Dropped pending debounced save on unmount");
        }
        info!("Unmounted preferences panel for user {}", self.user_id);
    }
}
