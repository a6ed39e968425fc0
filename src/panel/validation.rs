use crate::models::preferences::PreferencesState;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a preferences record is not eligible for saving.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    NoNotificationChannel,
    ThemeRequired,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::NoNotificationChannel => {
                "Enable at least one notification method (email or push)."
            }
            ValidationError::ThemeRequired => "Theme is required.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Checks the save-eligibility rules in order; the first failing rule wins.
pub fn validate(state: &PreferencesState) -> Option<ValidationError> {
    if !state.email_notifications && !state.push_notifications {
        return Some(ValidationError::NoNotificationChannel);
    }
    if state.theme.is_none() {
        return Some(ValidationError::ThemeRequired);
    }
    None
}
