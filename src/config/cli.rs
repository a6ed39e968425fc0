//! Command-line argument parsing

/// Command-line arguments for the preferences panel
#[derive(argh::FromArgs, Debug, Clone)]
/// User Preferences Panel
///
/// Serves a notification and theme preferences form with debounced auto-save.
pub struct CliArgs {
    #[argh(option, short = 'u', default = "String::from(\"12345\")")]
    /// user whose preferences are edited. Default: "12345"
    pub user_id: String,

    #[argh(option, short = 'p', default = "3000")]
    /// port for the web interface. Default: 3000
    pub port: u16,

    #[argh(option, short = 'i', default = "String::from(\"127.0.0.1\")")]
    /// network interface to bind to (IP address or "localhost"). Default: 127.0.0.1
    pub interface: String,

    #[argh(option, short = 's')]
    /// directory holding durable local storage. Default: ~/.prefs_panel
    pub storage_dir: Option<String>,

    #[argh(option, default = "750")]
    /// quiet period in milliseconds before edits are auto-saved. Default: 750
    pub debounce_ms: u64,

    #[argh(option, default = "1200")]
    /// how long the "saved" confirmation stays visible, in milliseconds. Default: 1200
    pub success_display_ms: u64,

    #[argh(option, default = "600")]
    /// simulated backend latency for loading, in milliseconds. Default: 600
    pub load_latency_ms: u64,

    #[argh(option, default = "1000")]
    /// simulated backend latency for saving, in milliseconds. Default: 1000
    pub save_latency_ms: u64,

    #[argh(option, default = "0.2")]
    /// fraction of simulated saves that fail (0.0-1.0). Default: 0.2
    pub failure_rate: f64,
}

impl CliArgs {
    /// Parse CLI arguments
    pub fn parse() -> Self {
        argh::from_env()
    }
}
