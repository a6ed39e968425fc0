use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Display theme shared by the theme holder and the preferences form
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ThemeMode::Dark)
    }

    pub fn toggled(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Light => "Light Theme",
            ThemeMode::Dark => "Dark Theme",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown theme mode '{0}'")]
pub struct UnknownThemeMode(pub String);

impl FromStr for ThemeMode {
    type Err = UnknownThemeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(UnknownThemeMode(other.to_string())),
        }
    }
}

// Lenient field deserializer: empty or unrecognised theme strings become None
// so the "theme is required" validation rule can report them.
pub fn deserialize_optional_theme<'de, D>(deserializer: D) -> Result<Option<ThemeMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes_case_insensitively() {
        assert_eq!("light".parse::<ThemeMode>(), Ok(ThemeMode::Light));
        assert_eq!(" Dark ".parse::<ThemeMode>(), Ok(ThemeMode::Dark));
        assert!("sepia".parse::<ThemeMode>().is_err());
        assert!("".parse::<ThemeMode>().is_err());
        assert_eq!(
            "sepia".parse::<ThemeMode>().unwrap_err().to_string(),
            "unknown theme mode 'sepia'"
        );
    }

    #[test]
    fn toggles_between_modes() {
        assert_eq!(ThemeMode::Dark.toggled(), ThemeMode::Light);
        assert_eq!(ThemeMode::Light.toggled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.label(), "Dark Theme");
    }

    #[test]
    fn serializes_as_lowercase_string() {
        assert_eq!(serde_json::to_string(&ThemeMode::Dark).unwrap(), "\"dark\"");
    }
}
