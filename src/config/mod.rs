pub mod toml_config;

pub use toml_config::{IntakeConfig, SourceKind};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "udcpr-intake")]
#[command(about = "Replay a UDCPR project-proposal form session and submit it")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file with the ordered form events to replay
    #[arg(short, long)]
    pub events: Option<PathBuf>,

    /// Override data.location (base URL or directory)
    #[arg(long)]
    pub data_location: Option<String>,

    /// Override submission.endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print the payload instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 讀取配置檔（若有）並套用命令列覆蓋
    pub fn resolve(&self) -> Result<IntakeConfig> {
        let mut config = match &self.config {
            Some(path) => IntakeConfig::from_file(path)?,
            None => IntakeConfig::default(),
        };

        if let Some(location) = &self.data_location {
            config.data.location = location.clone();
            config.data.source = if location.starts_with("http://") || location.starts_with("https://") {
                SourceKind::Http
            } else {
                SourceKind::Local
            };
        }
        if let Some(endpoint) = &self.endpoint {
            config.submission.endpoint = endpoint.clone();
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_on_top_of_defaults() {
        let cli = CliConfig::parse_from([
            "udcpr-intake",
            "--data-location",
            "./static/data",
            "--endpoint",
            "https://example.com/submit",
            "--dry-run",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.data.source, SourceKind::Local);
        assert_eq!(config.data.location, "./static/data");
        assert_eq!(config.submission.endpoint, "https://example.com/submit");
        assert!(cli.dry_run);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = CliConfig::parse_from(["udcpr-intake", "--config", "/nonexistent/intake.toml"]);
        assert!(cli.resolve().is_err());
    }
}
