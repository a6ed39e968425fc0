//! Configuration module that handles all application settings

mod cli;
mod env;
mod panel;

pub use cli::CliArgs;
pub use env::{load_env_vars, EnvVars};
pub use panel::PanelConfig;

/// Initialize configuration from all sources (CLI, environment, etc.)
pub fn init_config() -> PanelConfig {
    // Parse CLI args first
    let cli_args = CliArgs::parse();

    // Load environment variables
    let env_vars = load_env_vars();

    // Create PanelConfig by combining CLI args and environment variables
    PanelConfig::new(cli_args, env_vars)
}
