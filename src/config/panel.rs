//! Panel configuration structure and methods

use super::{CliArgs, EnvVars};
use crate::panel::PanelTimings;
use log::info;
use std::time::Duration;

/// Configuration structure that stores all application settings
#[derive(Clone, Debug)]
pub struct PanelConfig {
    pub user_id: String,
    pub storage_dir: Option<String>,

    // Panel timers
    pub debounce_ms: u64,
    pub success_display_ms: u64,

    // Simulated backend
    pub load_latency_ms: u64,
    pub save_latency_ms: u64,
    pub failure_rate: f64,

    // Web server configuration
    pub port: u16,
    pub interface: String,
}

impl PanelConfig {
    /// Create a new configuration by combining CLI arguments and environment variables
    pub fn new(cli_args: CliArgs, env_vars: EnvVars) -> Self {
        // Environment variables win over CLI arguments
        let user_id = env_vars.user_id.unwrap_or(cli_args.user_id);
        let storage_dir = env_vars.storage_dir.or(cli_args.storage_dir);

        let debounce_ms = env_vars.debounce_ms.unwrap_or(cli_args.debounce_ms);
        let success_display_ms = env_vars
            .success_display_ms
            .unwrap_or(cli_args.success_display_ms);

        let load_latency_ms = env_vars.load_latency_ms.unwrap_or(cli_args.load_latency_ms);
        let save_latency_ms = env_vars.save_latency_ms.unwrap_or(cli_args.save_latency_ms);
        let failure_rate = env_vars.failure_rate.unwrap_or(cli_args.failure_rate);

        let port = env_vars.port.unwrap_or(cli_args.port);

        let interface = env_vars
            .interface
            .unwrap_or(cli_args.interface)
            .to_lowercase();

        let interface = if interface == "localhost" {
            "127.0.0.1".to_string()
        } else {
            interface
        };

        info!(
            "Configured for user {} (debounce {}ms, failure rate {:.0}%)",
            user_id,
            debounce_ms,
            failure_rate * 100.0
        );

        Self {
            user_id,
            storage_dir,
            debounce_ms,
            success_display_ms,
            load_latency_ms,
            save_latency_ms,
            failure_rate,
            port,
            interface,
        }
    }

    pub fn timings(&self) -> PanelTimings {
        PanelTimings {
            debounce: Duration::from_millis(self.debounce_ms),
            success_display: Duration::from_millis(self.success_display_ms),
        }
    }

    pub fn load_latency(&self) -> Duration {
        Duration::from_millis(self.load_latency_ms)
    }

    pub fn save_latency(&self) -> Duration {
        Duration::from_millis(self.save_latency_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.user_id.trim().is_empty() {
            errors.push("User id must not be empty".to_string());
        }

        if self.debounce_ms == 0 {
            errors.push("Debounce window must be greater than 0".to_string());
        }

        if self.success_display_ms == 0 {
            errors.push("Success display window must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.failure_rate) {
            errors.push("Failure rate must be between 0.0 and 1.0".to_string());
        }

        if let Err(e) = self.interface.parse::<std::net::IpAddr>() {
            errors.push(format!(
                "Invalid network interface address '{}': {}. Use a valid IP address or 'localhost'",
                self.interface, e
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> CliArgs {
        CliArgs {
            user_id: "12345".to_string(),
            port: 3000,
            interface: "Localhost".to_string(),
            storage_dir: None,
            debounce_ms: 750,
            success_display_ms: 1200,
            load_latency_ms: 600,
            save_latency_ms: 1000,
            failure_rate: 0.2,
        }
    }

    #[test]
    fn env_overrides_cli_and_localhost_is_normalised() {
        let env = EnvVars {
            user_id: Some("alice".to_string()),
            debounce_ms: Some(250),
            ..EnvVars::default()
        };

        let config = PanelConfig::new(cli(), env);

        assert_eq!(config.user_id, "alice");
        assert_eq!(config.interface, "127.0.0.1");
        assert_eq!(config.timings().debounce, Duration::from_millis(250));
        assert_eq!(config.timings().success_display, Duration::from_millis(1200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut args = cli();
        args.user_id = " ".to_string();
        args.debounce_ms = 0;
        args.failure_rate = 1.5;
        args.interface = "not-an-ip".to_string();

        let errors = PanelConfig::new(args, EnvVars::default())
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn nan_failure_rate_is_rejected() {
        let mut args = cli();
        args.failure_rate = f64::NAN;
        assert!(PanelConfig::new(args, EnvVars::default()).validate().is_err());
    }
}
