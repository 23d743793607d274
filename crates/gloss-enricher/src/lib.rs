//! Gloss enricher command
//!
//! Resolves configuration, connects to PostgreSQL and the completion service,
//! and runs one enrichment pass. Startup failures exit with status 1; every
//! other outcome, including an empty batch, exits with 0.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use clap::Parser;
use gloss_core::config::DEFAULT_BATCH_LIMIT;
use gloss_core::{EnrichResult, Enricher, EnricherConfig, RunReport, RunSettings, SourceColumn};
use gloss_openai::OpenAiClient;
use gloss_postgres::PgContentStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gloss-enricher",
    version,
    about = "Generate Vietnamese vocabulary dictionaries for content rows"
)]
pub struct Cli {
    /// Source column: short_blurb or short_description (anything else means short_blurb)
    #[arg(long, default_value = "short_blurb")]
    pub field: SourceColumn,

    /// Maximum rows to process in this run
    #[arg(long, default_value_t = DEFAULT_BATCH_LIMIT)]
    pub limit: u32,
}

impl Cli {
    /// Run settings selected on the command line
    #[must_use]
    pub fn run_settings(&self) -> RunSettings {
        RunSettings::new()
            .with_source_column(self.field)
            .with_batch_limit(self.limit)
    }
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Run finished (any number of rows, including none)
    Success,
    /// Configuration or connection failed
    Failure,
}

impl ExitStatus {
    /// Numeric exit code
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

/// Install the console subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Open the store and the service client
pub async fn connect(config: &EnricherConfig) -> EnrichResult<(PgContentStore, OpenAiClient)> {
    let store = PgContentStore::connect(&config.database_url).await?;
    info!("successfully connected to PostgreSQL database");

    let client = OpenAiClient::new(config)?;
    info!(endpoint = client.endpoint(), "successfully initialized OpenAI client");

    Ok((store, client))
}

/// Resolve configuration through `lookup` and connect
pub async fn prepare<F>(
    cli: &Cli,
    lookup: F,
) -> EnrichResult<Enricher<PgContentStore, OpenAiClient>>
where
    F: Fn(&str) -> Option<String>,
{
    let config = EnricherConfig::from_lookup(lookup)?.with_run(cli.run_settings());
    let (store, client) = connect(&config).await?;
    Ok(Enricher::new(store, client, config.run))
}

/// Prepare and run one pass, mapping startup failures to exit status 1
pub async fn execute<F>(cli: &Cli, lookup: F) -> ExitStatus
where
    F: Fn(&str) -> Option<String>,
{
    info!("starting PostgreSQL data enrichment with OpenAI translations");

    let enricher = match prepare(cli, lookup).await {
        Ok(enricher) => enricher,
        Err(err) => {
            error!("{err}");
            return ExitStatus::Failure;
        }
    };

    let report: RunReport = enricher.run().await;
    if report.aborted {
        error!("run ended early; see earlier errors");
    }
    ExitStatus::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};
    use gloss_core::{ConfigError, EnrichError, StoreError};

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
    }

    #[tokio::test]
    async fn prepare_reports_typed_errors() {
        let cli = Cli::parse_from(["gloss-enricher"]);

        let err = prepare(&cli, |key| (key == "DATABASE_URL").then(|| "postgres://db".into()))
            .await
            .err();
        assert!(matches!(
            err,
            Some(EnrichError::Config(ConfigError::MissingVar("OPENAI_API_KEY")))
        ));

        let err = prepare(&cli, |key| match key {
            "DATABASE_URL" => Some("not a url".into()),
            "OPENAI_API_KEY" => Some("sk-test".into()),
            _ => None,
        })
        .await
        .err();
        assert!(matches!(err, Some(EnrichError::Store(StoreError::Connect(_)))));
    }
}
