//! Environment variable handling

/// Environment variables overriding the command line
#[derive(Debug, Default, Clone)]
pub struct EnvVars {
    pub user_id: Option<String>,
    pub port: Option<u16>,
    pub interface: Option<String>,
    pub storage_dir: Option<String>,
    pub debounce_ms: Option<u64>,
    pub success_display_ms: Option<u64>,
    pub load_latency_ms: Option<u64>,
    pub save_latency_ms: Option<u64>,
    pub failure_rate: Option<f64>,
}

/// Load configuration from environment variables
pub fn load_env_vars() -> EnvVars {
    load_from(|key| std::env::var(key).ok())
}

fn load_from<F>(lookup: F) -> EnvVars
where
    F: Fn(&str) -> Option<String>,
{
    EnvVars {
        user_id: lookup("PREFS_USER_ID"),
        port: parsed(&lookup, "PREFS_PORT"),
        interface: lookup("PREFS_INTERFACE"),
        storage_dir: lookup("PREFS_STORAGE_DIR"),
        debounce_ms: parsed(&lookup, "PREFS_DEBOUNCE_MS"),
        success_display_ms: parsed(&lookup, "PREFS_SUCCESS_DISPLAY_MS"),
        load_latency_ms: parsed(&lookup, "PREFS_LOAD_LATENCY_MS"),
        save_latency_ms: parsed(&lookup, "PREFS_SAVE_LATENCY_MS"),
        failure_rate: parsed(&lookup, "PREFS_FAILURE_RATE"),
    }
}

// Unparseable values are treated as unset
fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_and_parses_known_variables() {
        let vars: HashMap<&str, &str> = [
            ("PREFS_USER_ID", "alice"),
            ("PREFS_PORT", "8080"),
            ("PREFS_DEBOUNCE_MS", " 300 "),
            ("PREFS_FAILURE_RATE", "0.5"),
            ("PREFS_SAVE_LATENCY_MS", "soon"),
        ]
        .into_iter()
        .collect();

        let env = load_from(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(env.user_id.as_deref(), Some("alice"));
        assert_eq!(env.port, Some(8080));
        assert_eq!(env.debounce_ms, Some(300));
        assert_eq!(env.failure_rate, Some(0.5));
        // Unparseable values are ignored
        assert_eq!(env.save_latency_ms, None);
        assert_eq!(env.interface, None);
    }
}
