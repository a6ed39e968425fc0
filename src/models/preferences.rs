use crate::models::theme::{deserialize_optional_theme, ThemeMode};
use serde::{Deserialize, Serialize};

/// The user-editable settings record.
///
/// Validity (at least one notification channel, a recognised theme) is only
/// checked by the panel's validation step, so transient invalid states can be
/// represented here.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesState {
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub push_notifications: bool,
    #[serde(default, deserialize_with = "deserialize_optional_theme")]
    pub theme: Option<ThemeMode>,
}

impl PreferencesState {
    /// Form state used between mount and the first load response.
    pub fn unloaded() -> Self {
        Self {
            email_notifications: false,
            push_notifications: false,
            theme: Some(ThemeMode::Light),
        }
    }

    /// Values the reference backend hands out for a user with nothing saved.
    pub fn backend_defaults() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            theme: Some(ThemeMode::Light),
        }
    }
}

impl Default for PreferencesState {
    fn default() -> Self {
        Self::unloaded()
    }
}

// Partial update coming from the notification switches
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationUpdate {
    pub email_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ThemeUpdate {
    pub theme: ThemeMode,
}
