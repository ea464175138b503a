mod manage;
mod total;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Config;
use crate::services::{JsonFileStore, SubscriptionService};
use crate::types::{Result, StoreWarning, SubtrackError};

pub use manage::{AddArgs, ListArgs, UpdateArgs};
pub use total::TotalArgs;

/// Input date format for every date flag
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Track subscriptions and what they cost
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new subscription
    Add(AddArgs),

    /// Show one subscription
    Get {
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of a subscription
    Update(UpdateArgs),

    /// Remove a subscription
    Delete { id: String },

    /// List a user's subscriptions
    List(ListArgs),

    /// Total cost of a user's subscriptions, in whole months
    Total(TotalArgs),
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load_from_file(path),
            None => Config::load(),
        }
    }

    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let store = JsonFileStore::new(config.data_dir()?)?;
        let service = SubscriptionService::new(store);

        match self.command {
            Commands::Add(args) => args.run(&service)?,
            Commands::Get { id, json } => {
                let sub = service.get(parse_id(&id)?)?;
                manage::print_subscription(&sub, json)?;
            }
            Commands::Update(args) => args.run(&service)?,
            Commands::Delete { id } => {
                let id = parse_id(&id)?;
                service.delete(id)?;
                println!("Deleted {}", id);
            }
            Commands::List(args) => args.run(&service, config.list.default_limit)?,
            Commands::Total(args) => args.run(&service)?,
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` flag value, naming the flag on failure.
pub fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        SubtrackError::Validation(format!(
            "invalid '{}' date {:?} (expected YYYY-MM-DD): {}",
            flag, value, e
        ))
    })
}

pub fn parse_optional_date(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_date(flag, v).map(Some),
        _ => Ok(None),
    }
}

pub fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|e| SubtrackError::Validation(format!("invalid subscription id {:?}: {}", value, e)))
}

fn report_warning(warning: Option<StoreWarning>) {
    if let Some(StoreWarning::InvertedInterval(id)) = warning {
        eprintln!(
            "[subtrack] Warning: {} ends before it starts and will not be billed",
            id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["subtrack"]).is_err());
    }

    #[test]
    fn test_cli_parse_get_json() {
        let cli = Cli::try_parse_from(["subtrack", "get", "abc", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Get { json: true, .. }));
    }

    #[test]
    fn test_cli_parse_global_config() {
        let cli =
            Cli::try_parse_from(["subtrack", "delete", "abc", "--config", "/tmp/c.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(matches!(cli.command, Commands::Delete { .. }));
    }

    #[test]
    fn test_parse_date_valid() {
        assert_eq!(
            parse_date("from", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_parse_date_rejects_malformed() {
        for bad in ["2024-13-01", "2023-02-29", "01-2024", "yesterday", ""] {
            let err = parse_date("to", bad).unwrap_err();
            assert!(matches!(err, SubtrackError::Validation(_)), "{bad}");
            assert!(err.to_string().contains("'to'"));
        }
    }

    #[test]
    fn test_parse_optional_date_empty_is_none() {
        assert_eq!(parse_optional_date("from", None).unwrap(), None);
        assert_eq!(parse_optional_date("from", Some("")).unwrap(), None);
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("6f1c1d56-58e4-4a7b-8a7d-0b6f6d9d3c11").is_ok());
        assert!(matches!(
            parse_id("not-a-uuid"),
            Err(SubtrackError::Validation(_))
        ));
    }
}
