use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use cogbat_experiment::SessionController;
use cogbat_stimuli::{RngSource, ThreadSource};
use cogbat_store::{AggregateClient, FileStore, NoopSubmitter, SessionLog, Submitter, participant_id};
use cogbat_timing::{HighPrecisionTimer, ManualTimer};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::AppConfig;
use crate::history;
use crate::render::summary_table;
use crate::simulate::{check_args, run_session, seeded_participant};
use crate::sink::{CompletionSink, FileCompletionSink};

#[derive(Debug, Parser)]
#[command(
    name = "cogbat",
    about = "Choice reaction time and Stroop test battery",
    version
)]
pub struct Cli {
    /// TOML config file (default: ./cogbat.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the session log and participant id.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Base URL of the aggregation endpoint.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Log filter, e.g. `debug` or `cogbat_experiment=trace`.
    #[arg(long, global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Take the battery in this terminal.
    Run(RunArgs),

    /// Drive a full session with a scripted participant.
    Simulate(SimulateArgs),

    /// Inspect or clear the local session log.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Print the remote aggregate over all submissions.
    Stats,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Keep the result local.
    #[arg(long)]
    pub no_submit: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 1)]
    pub seed: u64,

    /// Probability of answering correctly.
    #[arg(long, default_value_t = 0.9)]
    pub accuracy: f64,

    #[arg(long = "mean-rt-ms", default_value_t = 550.0)]
    pub mean_rt_ms: f64,

    /// Run on the wall clock instead of a simulated one.
    #[arg(long)]
    pub realtime: bool,

    /// Append the simulated session to the local log.
    #[arg(long)]
    pub save: bool,

    /// Also submit it to the endpoint.
    #[arg(long)]
    pub submit: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryAction {
    /// Newest first.
    List,
    Show { id: String },
    Clear,
}

/// Filter precedence: `--log`, then `RUST_LOG`, then the config file, then `info`.
pub fn init_logging(flag: Option<&str>, configured: Option<&str>) {
    let filter = match flag {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or("info"))),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    init_logging(cli.log.as_deref(), config.log.as_deref());
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if let Some(endpoint) = cli.endpoint.clone() {
        config.endpoint = Some(endpoint);
    }
    run(cli.command, &config)
}

fn open_log(config: &AppConfig) -> Result<SessionLog<FileStore>> {
    let dir = config.data_dir();
    let store = FileStore::open(&dir)
        .with_context(|| format!("opening data directory {}", dir.display()))?;
    Ok(SessionLog::new(store))
}

fn aggregate_client(config: &AppConfig) -> Result<Option<AggregateClient>> {
    config
        .endpoint
        .as_deref()
        .map(AggregateClient::new)
        .transpose()
        .context("building HTTP client")
}

fn completion_sink(config: &AppConfig, save: bool, submit: bool) -> Result<FileCompletionSink> {
    let mut log = open_log(config)?;
    let participant = participant_id(Some(log.store_mut()), &mut ThreadSource::thread());
    let submitter: Box<dyn Submitter> = match aggregate_client(config)? {
        Some(client) if submit => Box::new(client),
        _ => Box::new(NoopSubmitter),
    };
    Ok(CompletionSink::new(
        save.then_some(log),
        submitter,
        participant,
        config.battery.nominal_total_trials(),
    ))
}

pub fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Run(args) => {
            let sink = completion_sink(config, true, !args.no_submit)?;
            App::new(config.battery.clone(), sink)?.run()
        }
        Commands::Simulate(args) => simulate(args, config),
        Commands::History { action } => {
            let mut log = open_log(config)?;
            match action {
                HistoryAction::List => print!("{}", history::list(&log)),
                HistoryAction::Show { id } => match history::show(&log, &id) {
                    Some(text) => print!("{text}"),
                    None => bail!("no session with id {id}"),
                },
                HistoryAction::Clear => {
                    log.clear()?;
                    println!("History cleared.");
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let Some(client) = aggregate_client(config)? else {
                bail!("no endpoint configured; pass --endpoint or set `endpoint` in the config");
            };
            let stats = client.fetch_stats()?;
            print!("{}", history::stats(&stats));
            Ok(())
        }
    }
}

fn simulate(args: SimulateArgs, config: &AppConfig) -> Result<()> {
    check_args(args.accuracy, args.mean_rt_ms, &config.battery)?;
    let sink = completion_sink(config, args.save, args.submit)?;
    let mut participant = seeded_participant(args.seed, args.accuracy, args.mean_rt_ms);
    let rng = RngSource::seeded(args.seed);
    tracing::info!(seed = args.seed, realtime = args.realtime, "simulating session");

    let session = if args.realtime {
        let mut c =
            SessionController::new(config.battery.clone(), HighPrecisionTimer::new(), rng, sink)?;
        let session = run_session(&mut c, &mut participant)?;
        c.sink().drain_submissions();
        session
    } else {
        let mut c =
            SessionController::new(config.battery.clone(), ManualTimer::default(), rng, sink)?;
        let session = run_session(&mut c, &mut participant)?;
        c.sink().drain_submissions();
        session
    };
    println!("session {}\n", session.id);
    print!("{}", summary_table(&session));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            data_dir: Some(dir.to_path_buf()),
            battery: cogbat_experiment::BatteryConfig {
                crt_trials: 4,
                stroop_window_ms: 3_000,
                break_secs: 1,
                ..Default::default()
            },
            ..AppConfig::default()
        }
    }

    #[test]
    fn parses_simulate_flags() {
        let cli = Cli::parse_from([
            "cogbat",
            "simulate",
            "--seed",
            "7",
            "--accuracy",
            "0.5",
            "--mean-rt-ms",
            "300",
            "--save",
        ]);
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.seed, 7);
        assert_eq!(args.accuracy, 0.5);
        assert_eq!(args.mean_rt_ms, 300.0);
        assert!(args.save && !args.realtime && !args.submit);
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::parse_from(["cogbat", "history", "show", "abc", "--data-dir", "/tmp/x"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(
            cli.command,
            Commands::History {
                action: HistoryAction::Show { .. }
            }
        ));
    }

    #[test]
    fn simulate_with_save_lands_in_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let args = SimulateArgs {
            seed: 3,
            accuracy: 0.8,
            mean_rt_ms: 400.0,
            realtime: false,
            save: true,
            submit: false,
        };
        simulate(args, &config).unwrap();

        let log = open_log(&config).unwrap();
        let sessions = log.load();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].crt_sections.len(), 8);
        assert!(dir.path().join(cogbat_store::PARTICIPANT_KEY).exists());
    }

    #[test]
    fn show_unknown_id_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let result = run(
            Commands::History {
                action: HistoryAction::Show { id: "nope".into() },
            },
            &config,
        );
        assert!(result.is_err());
    }

    #[test]
    fn stats_without_endpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(Commands::Stats, &config_in(dir.path())).is_err());
    }
}
