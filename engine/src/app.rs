//! Core application

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, DEMO_DEFAULT_PERSONS, ENV_LOG};
use crate::core::storage::AppStorage;
use crate::data::AnalyticsService;
use crate::data::filters::{EntityFilter, parse_filters};
use crate::data::types::IngestBatch;
use crate::domain::demo::{self, DemoConfig};
use crate::domain::stickiness::parse_granularity;
use crate::domain::{
    QueryError, QueryService, StickinessQuery, StickinessRange, TeamId,
    parse_volume_request,
};
use crate::utils::time::parse_timestamp;

pub struct CoreApp {
    pub config: AppConfig,
    pub storage: AppStorage,
    pub analytics: AnalyticsService,
    pub queries: QueryService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;
        let result = app.execute(command).await;
        if let Err(ref e) = result
            && let Some(QueryError::Data(data)) = e.downcast_ref::<QueryError>()
        {
            tracing::error!(backend = data.backend(), error = %data, "Query failed");
        }
        app.analytics
            .close()
            .await
            .context("Failed to close analytics database")?;
        result
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;
        let analytics = AnalyticsService::init(&config, &storage)
            .await
            .with_context(|| format!("Failed to initialize {} backend", config.database.analytics))?;
        tracing::debug!(backend = %analytics.backend(), "Analytics backend ready");

        let queries = QueryService::new(analytics.repository());
        Ok(Self {
            config,
            storage,
            analytics,
            queries,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn execute(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Earliest { team } => {
                let team = TeamId::require(team)?;
                let earliest = self.queries.earliest_timestamp(team).await?;
                print_json(&json!({ "team_id": team.get(), "earliest": earliest }))
            }
            Commands::Person { team, distinct_id } => {
                let team = TeamId::require(team)?;
                let person = self
                    .queries
                    .resolve_current_person(team, &distinct_id)
                    .await?;
                print_json(&json!({ "distinct_id": distinct_id, "person_id": person }))
            }
            Commands::Mapping { team } => {
                let team = TeamId::require(team)?;
                print_json(&self.queries.latest_mapping(team).await?)
            }
            Commands::Stickiness {
                team,
                granularity,
                from,
                to,
                event,
                filters,
                intervals,
            } => {
                let team = TeamId::require(team)?;
                let mut range = StickinessRange::new(
                    match to {
                        Some(ref value) => parse_time_arg("to", value)?,
                        None => self.queries.now(),
                    },
                    parse_granularity(&granularity)?,
                );
                if let Some(ref value) = from {
                    range = range.from(parse_time_arg("from", value)?);
                }
                range = range.with_filter(EntityFilter {
                    event,
                    properties: match filters {
                        Some(ref json) => parse_filters(json).map_err(QueryError::from)?,
                        None => Vec::new(),
                    },
                });

                match intervals {
                    Some(k) => {
                        let query = StickinessQuery::new(range, k);
                        print_json(&self.queries.stickiness_people(team, &query).await?)
                    }
                    None => print_json(&self.queries.stickiness_counts(team, &range).await?),
                }
            }
            Commands::Volume { team, query } => {
                let team = TeamId::require(team)?;
                let request = parse_volume_request(&query)?;
                print_json(&self.queries.volume(team, &request).await?)
            }
            Commands::Ingest { file } => {
                let content = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let batch: IngestBatch = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse {}", file.display()))?;
                self.ingest_by_team(batch).await
            }
            Commands::Demo { team, persons } => {
                let team = TeamId::require(team)?;
                let config = DemoConfig::new(team.get(), persons.unwrap_or(DEMO_DEFAULT_PERSONS));
                let batch = demo::generate(&config, self.queries.now());
                let mapping = demo::expected_mapping(&batch);

                let summary = self.queries.ingest(team, &batch).await?;
                let stored = self.queries.latest_mapping(team).await?;
                let diverged = demo::diverged_ids(&mapping, &stored);
                if diverged > 0 {
                    tracing::warn!(
                        team_id = team.get(),
                        diverged,
                        "Stored identity mapping differs from the generated one"
                    );
                }
                tracing::info!(
                    team_id = team.get(),
                    events = summary.events,
                    data_dir = %self.storage.data_dir().display(),
                    "Demo data generated"
                );
                print_json(&json!({ "summary": summary, "mapping": mapping }))
            }
        }
    }

    /// Split a multi-team batch and append each part under its own scope
    async fn ingest_by_team(&self, batch: IngestBatch) -> Result<()> {
        let mut parts: BTreeMap<i64, IngestBatch> = BTreeMap::new();
        for event in batch.events {
            parts.entry(event.team_id).or_default().events.push(event);
        }
        for assoc in batch.associations {
            parts
                .entry(assoc.team_id)
                .or_default()
                .associations
                .push(assoc);
        }

        let mut summaries = BTreeMap::new();
        for (team_id, part) in parts {
            let team = TeamId::new(team_id)?;
            summaries.insert(team_id, self.queries.ingest(team, &part).await?);
        }
        tracing::info!(
            teams = summaries.len(),
            backend = %self.config.database.analytics,
            "Ingest complete"
        );
        print_json(&summaries)
    }
}

fn parse_time_arg(field: &'static str, value: &str) -> Result<chrono::DateTime<chrono::Utc>, QueryError> {
    parse_timestamp(value).ok_or_else(|| {
        QueryError::validation(
            field,
            format!("'{}' is not an RFC 3339 timestamp or YYYY-MM-DD date", value),
        )
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
