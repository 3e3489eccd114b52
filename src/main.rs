mod bridge;
mod cache;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod search;
mod view;

use bridge::Bridge;
use clap::Parser;
use config::{RcConfig, RcLoader};
use controller::{AppController, SharedAppState};
use std::path::PathBuf;
use tracing::info;

/// Keyboard-driven clipboard history browser.
#[derive(Parser, Debug)]
#[command(name = "paste-sheet", version, about)]
struct Cli {
    /// Host command speaking the JSON-lines backend protocol
    #[arg(long, value_name = "COMMAND")]
    backend: Option<String>,

    /// Run against a seeded in-memory backend
    #[arg(long, conflicts_with = "backend")]
    demo: bool,

    /// Read settings from this file instead of .pastesheetrc
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Name of the folder new clipboard entries land in
    #[arg(long, value_name = "NAME")]
    default_directory: Option<String>,

    /// Print a sample .pastesheetrc and exit
    #[arg(long)]
    print_rc: bool,
}

impl Cli {
    /// Flags win over the rc file.
    fn apply(&self, config: &mut RcConfig) {
        if let Some(command) = &self.backend {
            config.backend_command = Some(command.clone());
        }
        if let Some(name) = self.default_directory.as_deref().map(str::trim) {
            if !name.is_empty() {
                config.default_directory = name.to_string();
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_rc {
        print!("{}", RcLoader::generate_sample_rc());
        return Ok(());
    }

    let log_guard = logging::init(logging::default_log_dir().as_deref());
    if let Some(path) = &log_guard.path {
        info!(path = %path.display(), "Logging to file");
    }

    // Load RC configuration
    let mut config = RcLoader::load_config(cli.config.as_deref());
    cli.apply(&mut config);
    info!(?config, demo = cli.demo, "Starting");

    let bridge = Bridge::resolve(&config, cli.demo);
    let controller = AppController::new(SharedAppState::new(bridge, config));
    controller.run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_rc() {
        let cli = Cli::parse_from(["paste-sheet", "--backend", "host --stdio", "--default-directory", "Inbox"]);
        let mut config = RcConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.backend_command.as_deref(), Some("host --stdio"));
        assert_eq!(config.default_directory, "Inbox");
    }

    #[test]
    fn test_demo_conflicts_with_backend() {
        assert!(Cli::try_parse_from(["paste-sheet", "--demo", "--backend", "x"]).is_err());
    }
}
