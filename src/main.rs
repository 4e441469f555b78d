//! Pension Analytics CLI
//!
//! Runs one analytics operation over a member CSV extract and prints the
//! result as JSON.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use pension_analytics::allocation::Allocation;
use pension_analytics::profile::{load_profiles, loader::DEFAULT_PROFILES_PATH};
use pension_analytics::segmentation::SegmentationConfig;
use pension_analytics::{
    AnalyticsEngine, ContributionChange, InMemoryProfiles, MonteCarloConfig, PlanningAssumptions, ProfileFilter,
    RiskLevel, SimulationParameters,
};

#[derive(Parser, Debug)]
#[command(
    name = "pension-analytics",
    about = "Retirement analytics for pension plan members (allocation, risk alerts, contribution scenarios, simulation)"
)]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_PROFILES_PATH, help = "Member CSV extract")]
    profiles: PathBuf,
    #[arg(long, global = true, help = "Planning assumptions JSON; missing keys keep their defaults")]
    assumptions: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

/// Population filter shared by the bulk commands
#[derive(clap::Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    age_min: Option<i32>,
    #[arg(long)]
    age_max: Option<i32>,
    #[arg(long)]
    income_min: Option<f64>,
    #[arg(long)]
    income_max: Option<f64>,
}

impl FilterArgs {
    fn to_filter(&self) -> ProfileFilter {
        ProfileFilter {
            age_min: self.age_min,
            age_max: self.age_max,
            income_min: self.income_min,
            income_max: self.income_max,
            ..ProfileFilter::all()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Personalized risk alerts for one member
    Alerts {
        #[arg(long)]
        member: String,
    },
    /// Risk alerts across the population
    BulkAlerts {
        #[arg(long, help = "Keep members at or above LOW, MEDIUM, HIGH or CRITICAL")]
        min_level: Option<String>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Recommended allocation and rebalancing for one member
    Optimize {
        #[arg(long)]
        member: String,
        #[arg(long, requires_all = ["bonds", "cash"], help = "Current stock percentage")]
        stocks: Option<f64>,
        #[arg(long)]
        bonds: Option<f64>,
        #[arg(long)]
        cash: Option<f64>,
    },
    /// Allocation review across the population
    BulkOptimize {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Contribution plan for one member, or for the population without --member
    Plan {
        #[arg(long)]
        member: Option<String>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Status quo against caller-supplied contribution changes
    WhatIfContributions {
        #[arg(long)]
        member: String,
        #[arg(long, help = "JSON array of changes")]
        changes: Option<PathBuf>,
        #[arg(long, help = "New annual contribution")]
        contribution: Option<f64>,
        #[arg(long, allow_hyphen_values = true, help = "Years added to the retirement-age goal")]
        retirement_age_change: Option<i32>,
    },
    /// Parameter grid, stress tests and comparison analysis
    Simulate {
        #[arg(long)]
        member: String,
        #[arg(long, help = "Simulation parameters JSON; missing lists keep their defaults")]
        params: Option<PathBuf>,
    },
    /// Monte Carlo projection of the retirement corpus
    MonteCarlo {
        #[arg(long)]
        member: String,
        #[arg(long, default_value_t = 1000)]
        simulations: usize,
        #[arg(long, help = "Seed for a reproducible run; system entropy otherwise")]
        seed: Option<u64>,
    },
    /// K-means segmentation of the population
    Segment {
        #[arg(long, default_value_t = 4)]
        clusters: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Age at which the member's plan reaches the income-multiple target
    RetirementAge {
        #[arg(long)]
        member: String,
    },
}

/// Output wrapper stamped at the boundary
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    command: &'static str,
    generated_at: DateTime<Utc>,
    result: T,
}

fn emit<T: Serialize>(command: &'static str, result: T) -> anyhow::Result<()> {
    let envelope = Envelope {
        command,
        generated_at: Utc::now(),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let assumptions = match &cli.assumptions {
        Some(path) => PlanningAssumptions::from_json_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => PlanningAssumptions::default_planning(),
    };
    let profiles = load_profiles(&cli.profiles)
        .with_context(|| format!("loading member profiles from {}", cli.profiles.display()))?;
    let engine = AnalyticsEngine::with_assumptions(InMemoryProfiles::new(profiles), assumptions);

    match cli.command {
        Command::Alerts { member } => emit("alerts", engine.risk_alerts(&member)?),
        Command::BulkAlerts { min_level, filter } => {
            let min_level = min_level
                .map(|label| RiskLevel::from_label(&label).ok_or_else(|| anyhow!("unknown risk level {label}")))
                .transpose()?;
            emit("bulk-alerts", engine.bulk_risk_alerts(&filter.to_filter(), min_level)?)
        }
        Command::Optimize {
            member,
            stocks,
            bonds,
            cash,
        } => {
            let current = match (stocks, bonds, cash) {
                (Some(s), Some(b), Some(c)) => Some(Allocation::new(s, b, c)),
                _ => None,
            };
            emit("optimize", engine.optimize(&member, current)?)
        }
        Command::BulkOptimize { filter } => emit("bulk-optimize", engine.bulk_optimize(&filter.to_filter())?),
        Command::Plan { member: Some(member), .. } => emit("plan", engine.contribution_plan(&member)?),
        Command::Plan { member: None, filter } => emit("plan", engine.bulk_contribution_plans(&filter.to_filter())?),
        Command::WhatIfContributions {
            member,
            changes,
            contribution,
            retirement_age_change,
        } => {
            let mut requested: Vec<ContributionChange> = match &changes {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };
            if contribution.is_some() || retirement_age_change.is_some() {
                requested.push(ContributionChange {
                    name: None,
                    new_annual_contribution: contribution,
                    retirement_age_change,
                });
            }
            emit("what-if-contributions", engine.what_if_contributions(&member, &requested)?)
        }
        Command::Simulate { member, params } => {
            let params: SimulationParameters = match &params {
                Some(path) => read_json(path)?,
                None => SimulationParameters::default(),
            };
            emit("simulate", engine.simulate(&member, &params)?)
        }
        Command::MonteCarlo {
            member,
            simulations,
            seed,
        } => {
            let config = MonteCarloConfig::default().with_simulations(simulations);
            let mut rng = rng_from(seed);
            emit("monte-carlo", engine.monte_carlo(&member, &config, &mut rng)?)
        }
        Command::Segment { clusters, seed, filter } => {
            let config = SegmentationConfig {
                cluster_count: clusters,
                ..Default::default()
            };
            let mut rng = rng_from(seed);
            emit("segment", engine.segment(&filter.to_filter(), &config, &mut rng)?)
        }
        Command::RetirementAge { member } => emit("retirement-age", engine.retirement_age(&member)?),
    }
}
