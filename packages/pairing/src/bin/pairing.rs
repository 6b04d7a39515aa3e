//! CLI for matching a help request against a volunteer file
//!
//! Volunteers live in a JSON file of profiles, requests in an optional JSON
//! snapshot. Both are written back whenever a pairing changes, so a commit
//! can later be completed or released from another run. Output is JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pairing_core::common::{PairingError, RequestId, VolunteerId};
use pairing_core::config::Config;
use pairing_core::domains::capabilities::parse_capabilities;
use pairing_core::domains::matching::{MatchResult, PairingService};
use pairing_core::domains::requests::{
    submit_help_request, AiRequirementAnalyzer, RequestStatus, RequirementAnalyzer,
    RequirementExtraction, StaticRequirementAnalyzer, SubmitHelpRequest, Urgency,
};
use pairing_core::domains::volunteers::{VolunteerProfile, VolunteerRecord};
use pairing_core::kernel::{MemoryRequestStore, MemoryVolunteerStore, OpenAIClient};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pairing")]
#[command(about = "Match help requests with available volunteers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a request and find the best volunteer for it
    Match {
        /// JSON array of volunteer profiles
        #[arg(long)]
        volunteers: PathBuf,

        /// JSON snapshot of help requests, created if missing
        #[arg(long)]
        requests: Option<PathBuf>,

        /// Situation text, analyzed by the LLM when OPENAI_API_KEY is set
        #[arg(long)]
        text: Option<String>,

        /// Needed capabilities, comma separated (skips the LLM)
        #[arg(long, value_delimiter = ',')]
        needs: Vec<String>,

        /// Urgency 1-3
        #[arg(long)]
        urgency: Option<i64>,

        /// Flag the request as an emergency, whatever the analysis says
        #[arg(long)]
        emergency: bool,

        #[arg(long)]
        location: Option<String>,

        /// Commit the pairing and write both files back
        #[arg(long, requires = "requests")]
        commit: bool,
    },

    /// Mark an accepted request completed and free its volunteer
    Complete {
        #[arg(long)]
        volunteers: PathBuf,

        #[arg(long)]
        requests: PathBuf,

        /// Id of the accepted request
        #[arg(long)]
        request: RequestId,
    },

    /// Clear a volunteer's pairing (cancellation); the request file is not touched
    Release {
        #[arg(long)]
        volunteers: PathBuf,

        #[arg(long)]
        volunteer: VolunteerId,
    },

    /// Check that every profile uses known capabilities
    Validate {
        #[arg(long)]
        volunteers: PathBuf,
    },
}

#[derive(Serialize)]
struct MatchReport {
    request_id: String,
    requirement: RequirementExtraction,
    result: MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<RequestStatus>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pairing_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Validate { volunteers } => {
            let records = load_profiles(&volunteers).await?;
            println!(
                "{}",
                serde_json::json!({ "success": true, "count": records.len() })
            );
        }
        Commands::Match {
            volunteers,
            requests,
            text,
            needs,
            urgency,
            emergency,
            location,
            commit,
        } => {
            let urgency = urgency
                .map(Urgency::try_from)
                .transpose()
                .context("Invalid --urgency")?;

            let analyzer: Box<dyn RequirementAnalyzer> = match (&config.openai_api_key, &text) {
                (Some(api_key), Some(_)) if needs.is_empty() => Box::new(AiRequirementAnalyzer::new(
                    OpenAIClient::new(api_key.clone(), config.openai_model.clone())
                        .with_base_url(config.openai_base_url.clone()),
                )),
                _ => {
                    let capabilities =
                        parse_capabilities(&needs).context("Invalid --needs capability")?;
                    Box::new(StaticRequirementAnalyzer::new(
                        RequirementExtraction::new(capabilities, urgency.unwrap_or(Urgency::Soon))
                            .with_rationale("Entered manually"),
                    ))
                }
            };

            let volunteer_store = Arc::new(MemoryVolunteerStore::from_records(
                load_profiles(&volunteers).await?,
            ));
            let request_store = Arc::new(open_requests(requests.as_deref()).await?);
            let service = PairingService::new(
                volunteer_store.clone(),
                request_store.clone(),
                config.engine(),
            );

            let input = SubmitHelpRequest {
                situation_text: text.unwrap_or_default(),
                requester: None,
                location,
                urgency_hint: urgency,
                emergency,
            };

            let request = submit_help_request(analyzer.as_ref(), request_store.as_ref(), input)
                .await
                .context("Failed to submit help request")?;

            let result = service
                .match_request(request.id)
                .await
                .context("Matching failed")?;

            let status = if commit {
                Some(
                    service
                        .commit(request.id, &result)
                        .await
                        .context("Commit failed")?,
                )
            } else {
                None
            };

            if let Some(path) = &requests {
                save_requests(path, &request_store).await?;
            }
            if status == Some(RequestStatus::Accepted) {
                save_profiles(&volunteers, volunteer_store.snapshot().await).await?;
            }

            let report = MatchReport {
                request_id: request.id.to_string(),
                requirement: request.requirement,
                result,
                status,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Complete {
            volunteers,
            requests,
            request,
        } => {
            let volunteer_store = Arc::new(MemoryVolunteerStore::from_records(
                load_profiles(&volunteers).await?,
            ));
            let request_store = Arc::new(
                MemoryRequestStore::load_json(&requests)
                    .await
                    .with_context(|| format!("Failed to load {}", requests.display()))?,
            );
            let service = PairingService::new(
                volunteer_store.clone(),
                request_store.clone(),
                config.engine(),
            );

            let status = service
                .complete(request)
                .await
                .with_context(|| format!("Failed to complete request {}", request))?;

            save_requests(&requests, &request_store).await?;
            save_profiles(&volunteers, volunteer_store.snapshot().await).await?;
            println!(
                "{}",
                serde_json::json!({ "request_id": request.to_string(), "status": status })
            );
        }
        Commands::Release {
            volunteers,
            volunteer,
        } => {
            let volunteer_store = Arc::new(MemoryVolunteerStore::from_records(
                load_profiles(&volunteers).await?,
            ));
            let service = PairingService::new(
                volunteer_store.clone(),
                Arc::new(MemoryRequestStore::new()),
                config.engine(),
            );

            service
                .release_volunteer(volunteer)
                .await
                .with_context(|| format!("Failed to release volunteer {}", volunteer))?;

            save_profiles(&volunteers, volunteer_store.snapshot().await).await?;
            println!(
                "{}",
                serde_json::json!({ "volunteer_id": volunteer.to_string(), "released": true })
            );
        }
    }

    Ok(())
}

/// Load the request snapshot, or start empty when there is none yet.
async fn open_requests(path: Option<&Path>) -> Result<MemoryRequestStore> {
    match path {
        Some(path) if tokio::fs::try_exists(path).await? => MemoryRequestStore::load_json(path)
            .await
            .with_context(|| format!("Failed to load {}", path.display())),
        _ => Ok(MemoryRequestStore::new()),
    }
}

async fn save_requests(path: &Path, store: &MemoryRequestStore) -> Result<()> {
    store
        .save_json(path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Read profiles and validate them into records, keeping file order.
///
/// Profiles without an id are given one here, and `save_profiles` writes
/// it back so later runs refer to the same volunteers.
async fn load_profiles(path: &Path) -> Result<Vec<VolunteerRecord>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let profiles: Vec<StoredProfile> = serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON array of profiles", path.display()))?;

    profiles
        .into_iter()
        .map(|stored| {
            let pairing = stored.current_pairing;
            let name = stored.profile.name.clone();
            let mut record = VolunteerRecord::try_from(stored.profile)
                .map_err(|e: PairingError| anyhow::anyhow!("{}: {}", name, e))?;
            record.current_pairing = pairing;
            Ok(record)
        })
        .collect()
}

async fn save_profiles(path: &Path, records: Vec<VolunteerRecord>) -> Result<()> {
    let stored: Vec<StoredProfile> = records.into_iter().map(StoredProfile::from).collect();
    tokio::fs::write(path, serde_json::to_vec_pretty(&stored)?)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Profile as kept in the volunteer file, with its pairing state.
#[derive(serde::Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    #[serde(flatten)]
    profile: VolunteerProfile,
    #[serde(default)]
    current_pairing: Option<RequestId>,
}

impl From<VolunteerRecord> for StoredProfile {
    fn from(record: VolunteerRecord) -> Self {
        Self {
            profile: VolunteerProfile {
                id: Some(record.id),
                name: record.name,
                qualifications: record
                    .capabilities
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
                owns_car: record.has_vehicle,
                location: record.location,
            },
            current_pairing: record.current_pairing,
        }
    }
}
