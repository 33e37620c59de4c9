use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use slot_engine::temporal::parse_time;
use slot_engine::{
    allocation_records, expand_with_limit, find_conflicts, maintenance_slots, occupant_slots,
    weekly_totals, weekly_vacancy, AllocationTemplate, BookingRequest, MaintenanceWindow,
    OccupantRecord, ResolutionSession, SchedulerConfig, Slot, SlotEdit, Utilization, WeeklyTotals,
};

mod cli;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let now = cli.now.as_deref().map(parse_instant).transpose()?;
    let input = read_input(cli.command.input().map(|p| p.as_path()))?;

    let output = match &cli.command {
        Command::Expand { .. } => {
            let request: BookingRequest =
                serde_json::from_str(&input).context("invalid booking request")?;
            to_json(&expand_with_limit(&request, config.max_expansion_days))?
        }
        Command::Vacancy { .. } => {
            let request: VacancyRequest =
                serde_json::from_str(&input).context("invalid vacancy request")?;
            let now = now.map(|anchor| config.local_now(anchor)).transpose()?;
            let occupied = occupant_slots(&request.occupants);
            to_json(&weekly_vacancy(
                request.week_start,
                &occupied,
                config.work_window,
                now.as_ref(),
            ))?
        }
        Command::Weekly { .. } => {
            let parsed: OccupantsInput =
                serde_json::from_str(&input).context("invalid occupancy")?;
            let occupants = match parsed {
                OccupantsInput::Room { occupants } | OccupantsInput::List(occupants) => occupants,
            };
            let totals = weekly_totals(&occupants);
            if totals.skipped() > 0 {
                tracing::warn!(
                    skipped = totals.skipped(),
                    "some occupant records were not counted"
                );
            }
            to_json(&WeeklyReport {
                utilization: Utilization::from_totals(&totals, config.work_window),
                totals,
            })?
        }
        Command::Conflicts { .. } => {
            let request: BatchRequest =
                serde_json::from_str(&input).context("invalid conflict request")?;
            let (candidates, existing) = request.into_batch(&config)?;
            to_json(&find_conflicts(&candidates, &existing))?
        }
        Command::Resolve {
            discard_unresolved, ..
        } => {
            let request: BatchRequest =
                serde_json::from_str(&input).context("invalid resolution request")?;
            let edits = request.edits.clone();
            let (batch, existing) = request.into_batch(&config)?;
            let now = config.local_now(now.unwrap_or_else(Utc::now))?;

            let mut session = ResolutionSession::load(&batch, existing, now)
                .context("cannot open resolution session")?;
            for EditCommand { id, edit } in edits {
                session
                    .apply(&id, edit)
                    .with_context(|| format!("cannot edit slot '{}'", id))?;
            }
            tracing::info!(
                conflicting = session.conflicting_count(),
                resolved = session.resolved_count(),
                "resolution replayed"
            );
            to_json(&session.submit(*discard_unresolved))?
        }
        Command::Allocate { .. } => {
            let request: AllocateRequest =
                serde_json::from_str(&input).context("invalid allocation request")?;
            to_json(&allocation_records(&request.slots, &request.template))?
        }
    };

    println!("{}", output);
    Ok(())
}

// ── Request / report shapes ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VacancyRequest {
    week_start: NaiveDate,
    #[serde(default)]
    occupants: Vec<OccupantRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OccupantsInput {
    Room { occupants: Vec<OccupantRecord> },
    List(Vec<OccupantRecord>),
}

#[derive(Debug, Serialize)]
struct WeeklyReport {
    totals: WeeklyTotals,
    utilization: Utilization,
}

/// A batch of candidate slots, given directly or as a booking request, and
/// the room's current bookings.
#[derive(Debug, Deserialize)]
struct BatchRequest {
    #[serde(default)]
    request: Option<BookingRequest>,
    #[serde(default)]
    candidates: Option<Vec<Slot>>,
    #[serde(default)]
    occupants: Vec<OccupantRecord>,
    #[serde(default)]
    maintenance: Vec<MaintenanceWindow>,
    #[serde(default)]
    edits: Vec<EditCommand>,
}

impl BatchRequest {
    /// `(candidates, existing)`, where existing covers occupancy and active
    /// maintenance.
    fn into_batch(self, config: &SchedulerConfig) -> Result<(Vec<Slot>, Vec<Slot>)> {
        let candidates = match (self.request, self.candidates) {
            (Some(booking), None) => expand_with_limit(&booking, config.max_expansion_days),
            (None, Some(candidates)) => candidates,
            _ => bail!("give exactly one of \"request\" or \"candidates\""),
        };
        let mut existing = occupant_slots(&self.occupants);
        existing.extend(maintenance_slots(&self.maintenance));
        Ok((candidates, existing))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct EditCommand {
    id: String,
    edit: SlotEdit,
}

#[derive(Debug, Deserialize)]
struct AllocateRequest {
    slots: Vec<Slot>,
    template: AllocationTemplate,
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> Result<SchedulerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SchedulerConfig::from_json_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => SchedulerConfig::default(),
    };
    if let Some(tz) = &cli.tz {
        config.timezone = tz.clone();
    }
    if let Some(start) = &cli.work_start {
        config.work_window.start = parse_time(start).context("--work-start")?;
    }
    if let Some(end) = &cli.work_end {
        config.work_window.end = parse_time(end).context("--work-end")?;
    }
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("--now must be RFC 3339, got '{}'", raw))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize output")
}
