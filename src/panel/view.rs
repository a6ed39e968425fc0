use crate::models::status::{LoadState, SaveStatus};
use crate::models::theme::ThemeMode;
use serde::{Deserialize, Serialize};

pub const SAVING_TEXT: &str = "Saving...";
pub const SAVED_TEXT: &str = "Preferences saved!";

// The single feedback region to show, by precedence
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Feedback {
    None,
    ValidationError(String),
    Saving,
    Saved,
    SaveError(String),
}

impl Feedback {
    pub fn select(validation_error: Option<&str>, save_status: &SaveStatus) -> Self {
        if let Some(message) = validation_error {
            return Feedback::ValidationError(message.to_string());
        }
        match save_status {
            SaveStatus::Idle => Feedback::None,
            SaveStatus::Saving => Feedback::Saving,
            SaveStatus::Success => Feedback::Saved,
            SaveStatus::Error(message) => Feedback::SaveError(message.clone()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Feedback::None => None,
            Feedback::ValidationError(message) | Feedback::SaveError(message) => Some(message),
            Feedback::Saving => Some(SAVING_TEXT),
            Feedback::Saved => Some(SAVED_TEXT),
        }
    }
}

/// Snapshot of everything the presentation surface renders.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PanelView {
    pub loading: bool,
    pub load_error: Option<String>,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub theme: Option<ThemeMode>,
    pub dark_theme_checked: bool,
    pub theme_label: String,
    pub validation_error: Option<String>,
    pub save_status: SaveStatus,
    pub feedback: Feedback,
    pub feedback_text: Option<String>,
}

impl PanelView {
    pub(crate) fn build(
        load: &LoadState,
        email_notifications: bool,
        push_notifications: bool,
        theme: Option<ThemeMode>,
        validation_error: Option<&str>,
        save_status: &SaveStatus,
    ) -> Self {
        let shown_theme = theme.unwrap_or_default();
        let feedback = Feedback::select(validation_error, save_status);
        Self {
            loading: matches!(load, LoadState::Loading),
            load_error: match load {
                LoadState::Failed(message) => Some(message.clone()),
                _ => None,
            },
            email_notifications,
            push_notifications,
            theme,
            dark_theme_checked: shown_theme.is_dark(),
            theme_label: shown_theme.label().to_string(),
            validation_error: validation_error.map(str::to_string),
            save_status: save_status.clone(),
            feedback_text: feedback.text().map(str::to_string),
            feedback,
        }
    }
}
