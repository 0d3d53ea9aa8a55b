#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gardes::{
    io,
    model::{DutySchedule, PgyLevel, ProgramState, RotationSchedule, ScheduleSet, Targets, Vacation},
    remediation::{suggest, RemediationContext},
    rules,
    scheduler::{self, AssignRequest},
    storage::{JsonStorage, Storage},
    timeline, BlockCalendar, ProgramConfig,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des gardes d'un fellowship (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON d'état du programme
    #[arg(long, global = true, default_value = "program.json")]
    state: String,

    /// Fichier JSON de configuration (optionnel)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Créer l'état : calendrier standard et fellows
    Init {
        /// Premier jour du bloc 1 (AAAA-MM-JJ)
        #[arg(long)]
        start: String,
        /// CSV `name,pgy`
        #[arg(long)]
        fellows: String,
        /// Objectifs de gardes, ex. "4:4,5:4,6:2"
        #[arg(long, default_value = "")]
        call_targets: String,
        /// Objectifs de floats, ex. "4:4,5:4,6:2"
        #[arg(long, default_value = "")]
        float_targets: String,
    },

    /// Importer la grille de rotations depuis un CSV
    ImportSchedule {
        #[arg(long)]
        csv: String,
    },

    /// Exporter la grille de rotations en CSV
    ExportSchedule {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter des congés approuvés
    Vacation {
        #[arg(long)]
        fellow: String,
        #[arg(long)]
        start_block: u8,
        #[arg(long)]
        end_block: u8,
    },

    /// Répartir gardes et floats
    Assign {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        attempts: Option<u32>,
        /// Export CSV des problèmes d'assignation (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Vérifier les règles de temps de travail
    Check {
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Afficher la timeline d'un fellow
    Timeline {
        #[arg(long)]
        fellow: String,
        /// Limiter à un bloc
        #[arg(long)]
        block: Option<u8>,
    },

    /// Proposer des corrections pour une violation (index de `check`)
    Suggest {
        #[arg(long)]
        violation: usize,
        /// Appliquer la suggestion d'index donné
        #[arg(long)]
        apply: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let config = match &cli.config {
        Some(path) => ProgramConfig::load(path)?,
        None => ProgramConfig::default(),
    };
    let storage = JsonStorage::open(&cli.state)?;

    if let Commands::Init {
        start,
        fellows,
        call_targets,
        float_targets,
    } = &cli.cmd
    {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .with_context(|| format!("invalid start date: {start}"))?;
        let fellows = io::import_fellows_csv(fellows)?;
        let calendar = BlockCalendar::academic_year(start, config.block_count);
        let mut rotations = RotationSchedule::new();
        for f in &fellows {
            rotations.insert(f.name.clone(), vec![String::new(); config.block_count]);
        }
        let state = ProgramState {
            fellows,
            calendar,
            schedules: ScheduleSet {
                rotations,
                call: DutySchedule::empty(config.block_count),
                float: DutySchedule::empty(config.block_count),
            },
            vacations: Vec::new(),
            call_targets: parse_targets(call_targets)?,
            float_targets: parse_targets(float_targets)?,
        };
        storage.save(&state)?;
        println!(
            "Initialized {} fellow(s) over {} blocks",
            state.fellows.len(),
            state.calendar.len()
        );
        std::process::exit(0);
    }

    let mut state = storage.load()?;

    let code = match cli.cmd {
        Commands::Init { .. } => 0,
        Commands::ImportSchedule { csv } => {
            let blocks = state.calendar.len();
            io::import_rotation_csv(
                &csv,
                &mut state.schedules.rotations,
                &state.fellows,
                blocks,
            )?;
            storage.save(&state)?;
            0
        }
        Commands::ExportSchedule { csv } => {
            io::export_rotation_csv(&csv, &state.schedules.rotations, state.calendar.len())?;
            0
        }
        Commands::Vacation {
            fellow,
            start_block,
            end_block,
        } => {
            if state.find_fellow(&fellow).is_none() {
                bail!("unknown fellow: {fellow}");
            }
            if end_block < start_block || state.calendar.by_number(end_block).is_none() {
                bail!("invalid block range {start_block}..{end_block}");
            }
            state
                .vacations
                .push(Vacation::approved(fellow, start_block, end_block));
            storage.save(&state)?;
            0
        }
        Commands::Assign {
            seed,
            attempts,
            report,
        } => {
            let mut rng = match seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            };
            let mut req = AssignRequest::new(
                &state.fellows,
                &state.schedules.rotations,
                &state.call_targets,
                &state.float_targets,
                &state.calendar,
                &config,
            );
            if let Some(attempts) = attempts {
                req = req.with_attempts(attempts);
            }
            let outcome = scheduler::assign(&req, &mut rng);

            for issue in &outcome.issues {
                println!(
                    "{} | {} | {} | {}",
                    issue.severity, issue.key, issue.rule, issue.detail
                );
            }
            if let Some(path) = report {
                io::export_violations_csv(path, &outcome.issues, &[])?;
            }
            let has_errors = outcome
                .issues
                .iter()
                .any(|i| i.severity == gardes::Severity::Error);
            state.schedules.call = outcome.call;
            state.schedules.float = outcome.float;
            storage.save(&state)?;
            // Code 2 = WARNING/INCOMPLETE
            if has_errors {
                2
            } else {
                0
            }
        }
        Commands::Check { report } => {
            let violations = rules::check(
                &state.fellows,
                &state.schedules,
                &state.calendar,
                &state.vacations,
                &config,
            );
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                for (idx, v) in violations.iter().enumerate() {
                    println!(
                        "#{idx} {} | {} | {} | {}..{} | {}",
                        v.severity, v.rule, v.fellow, v.start, v.end, v.detail
                    );
                }
                eprintln!("Found {} violation(s)", violations.len());
                if let Some(path) = report {
                    io::export_violations_csv(path, &[], &violations)?;
                }
                2
            }
        }
        Commands::Timeline { fellow, block } => {
            if state.find_fellow(&fellow).is_none() {
                bail!("unknown fellow: {fellow}");
            }
            let vacation_blocks = timeline::vacation_blocks(&fellow, &state.vacations);
            let tl = timeline::build(
                &fellow,
                &state.schedules,
                &state.calendar,
                &vacation_blocks,
                &config,
            );
            for day in tl.days.iter().filter(|d| block.map_or(true, |b| d.block == b)) {
                let night = if day.is_night { " (night)" } else { "" };
                println!("{} B{} {:>2}h{}", day.date, day.block, day.total_hours, night);
            }
            0
        }
        Commands::Suggest { violation, apply } => {
            let violations = rules::check(
                &state.fellows,
                &state.schedules,
                &state.calendar,
                &state.vacations,
                &config,
            );
            let Some(target) = violations.get(violation) else {
                bail!("no violation #{violation} ({} found)", violations.len());
            };
            let ctx = RemediationContext {
                fellows: &state.fellows,
                schedules: &state.schedules,
                calendar: &state.calendar,
                vacations: &state.vacations,
                config: &config,
            };
            let suggestions = suggest(target, &ctx);
            if suggestions.is_empty() {
                println!("No single edit removes this violation");
            }
            for (idx, s) in suggestions.iter().enumerate() {
                println!("#{idx} {}", s.description);
            }
            if let Some(pick) = apply {
                let Some(chosen) = suggestions.get(pick) else {
                    bail!("no suggestion #{pick}");
                };
                let edit = chosen.edit.clone();
                scheduler::apply_edit(&mut state.schedules, &edit)?;
                storage.save(&state)?;
                println!("Applied: {edit}");
            }
            0
        }
    };

    std::process::exit(code);
}

/// "4:4,5:4,6:2" -> objectifs par niveau.
fn parse_targets(raw: &str) -> Result<Targets> {
    let mut out = Targets::new();
    for chunk in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let (level, count) = chunk
            .split_once(':')
            .with_context(|| format!("invalid target `{chunk}` (expected PGY:COUNT)"))?;
        let level: u8 = level.trim().parse().context("invalid PGY level")?;
        let level = PgyLevel::try_from(level).map_err(anyhow::Error::msg)?;
        let count: u32 = count.trim().parse().context("invalid target count")?;
        out.insert(level, count);
    }
    Ok(out)
}
