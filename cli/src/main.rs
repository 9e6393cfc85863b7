//! `wiggle` CLI: scenario runs, replay import/export, sensitivity sweeps.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use sim::replay::{load_replay, replay_log, save_replay};
use sim::scenarios::{Scenario, ScenarioKind};
use sim::session::run_scenario;
use sim::settings::load_settings;
use std::path::{Path, PathBuf};
use wiggle_core::config::{Sensitivity, WiggleSettings};
use wiggle_core::metrics::DetectionMetrics;

#[derive(Parser)]
#[command(name = "wiggle", about = "Wiggle-to-disconnect detector CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named scenario and report what got disconnected.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Sensitivity preset (overrides the settings file thresholds)
        #[arg(long, value_enum)]
        sensitivity: Option<Sensitivity>,
        /// JSON settings file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Output outcome to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the full replay log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Load a previously recorded session and run it through the detector again.
    Replay {
        /// Path to replay JSON file
        input: PathBuf,
        /// Sensitivity preset (defaults to the recorded settings)
        #[arg(long, value_enum)]
        sensitivity: Option<Sensitivity>,
        /// JSON settings file (defaults to the recorded settings)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Output disconnect events to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run every scenario under every sensitivity preset and report accuracy.
    Sweep {
        /// Seeds per scenario
        #[arg(long, default_value_t = 20)]
        seeds: u64,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::RunScenario {
            scenario,
            seed,
            sensitivity,
            settings,
            output,
            save_replay: save_path,
        } => {
            let settings = resolve_settings(settings.as_deref(), sensitivity, None)?;
            run(scenario, seed, settings, output.as_deref(), save_path.as_deref())?;
        }
        Commands::Replay {
            input,
            sensitivity,
            settings,
            output,
        } => {
            run_replay(&input, settings.as_deref(), sensitivity, output.as_deref())?;
        }
        Commands::Sweep { seeds, output } => {
            sweep(seeds, output.as_deref())?;
        }
    }

    Ok(())
}

/// Settings file if given, else `fallback`, else enabled MEDIUM; then the
/// preset on top.
fn resolve_settings(
    path: Option<&Path>,
    sensitivity: Option<Sensitivity>,
    fallback: Option<WiggleSettings>,
) -> Result<WiggleSettings> {
    let mut settings = match (path, fallback) {
        (Some(p), _) => load_settings(p)?,
        (None, Some(f)) => f,
        (None, None) => WiggleSettings::enabled_with(Sensitivity::default()),
    };
    if let Some(s) = sensitivity {
        settings.set_sensitivity(s);
    }
    if !settings.enabled {
        tracing::warn!("Detection is disabled in the settings; nothing will be disconnected");
    }
    Ok(settings)
}

fn run(
    kind: ScenarioKind,
    seed: u64,
    settings: WiggleSettings,
    output_path: Option<&Path>,
    replay_path: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.1}s, sensitivity={})...",
        scenario.name,
        seed,
        scenario.duration,
        settings.sensitivity.label()
    );

    let start = std::time::Instant::now();
    let (outcome, log) = run_scenario(scenario, settings);
    let elapsed = start.elapsed();

    println!(
        "Done: {} ticks, {} disconnects, {} links left, elapsed={:.3}s",
        outcome.ticks,
        outcome.disconnects.len(),
        outcome.remaining_links,
        elapsed.as_secs_f64(),
    );
    for e in &outcome.disconnects {
        println!(
            "  t={:.2}s {} removed {} links (reversals={}, ratio={:.1})",
            e.time, e.node, e.links_removed, e.direction_changes, e.wiggle_ratio
        );
    }
    print_metrics(&outcome.metrics);

    if let Some(rpath) = replay_path {
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    if let Some(opath) = output_path {
        std::fs::write(opath, serde_json::to_string_pretty(&outcome)?)?;
        println!("Outcome saved to {}", opath.display());
    }

    Ok(())
}

fn run_replay(
    input: &Path,
    settings_path: Option<&Path>,
    sensitivity: Option<Sensitivity>,
    output_path: Option<&Path>,
) -> Result<()> {
    let log = load_replay(input)?;
    println!(
        "Replaying '{}' ({} frames, {} recorded disconnects)...",
        log.scenario_name,
        log.frames.len(),
        log.disconnects.len()
    );

    let settings = resolve_settings(settings_path, sensitivity, Some(log.settings.clone()))?;
    let events = replay_log(&log, settings);

    println!("Replay done: {} disconnects", events.len());
    if events == log.disconnects {
        println!("Matches the recorded session");
    }

    if let Some(opath) = output_path {
        std::fs::write(opath, serde_json::to_string_pretty(&events)?)?;
    }

    Ok(())
}

fn sweep(seeds: u64, output_path: Option<&Path>) -> Result<()> {
    let jobs: Vec<(Sensitivity, ScenarioKind, u64)> = Sensitivity::ALL
        .into_iter()
        .flat_map(|s| {
            ScenarioKind::ALL
                .into_iter()
                .flat_map(move |k| (0..seeds).map(move |seed| (s, k.clone(), seed)))
        })
        .collect();

    let start = std::time::Instant::now();
    // Sessions are independent: each owns its own driver and editor
    let results: Vec<(Sensitivity, DetectionMetrics)> = jobs
        .into_par_iter()
        .map(|(s, kind, seed)| {
            let settings = WiggleSettings::enabled_with(s);
            let (outcome, _) = run_scenario(Scenario::build(kind, seed), settings);
            (s, outcome.metrics)
        })
        .collect();

    let mut per_preset: Vec<(Sensitivity, DetectionMetrics)> = Sensitivity::ALL
        .iter()
        .map(|&s| (s, DetectionMetrics::default()))
        .collect();
    for (s, m) in &results {
        if let Some((_, acc)) = per_preset.iter_mut().find(|(p, _)| p == s) {
            acc.merge(m);
        }
    }

    println!(
        "Sweep: {} sessions in {:.2}s",
        results.len(),
        start.elapsed().as_secs_f64()
    );
    for (s, m) in &per_preset {
        println!("[{}]", s.label());
        print_metrics(m);
    }

    if let Some(opath) = output_path {
        let json = serde_json::json!(per_preset
            .iter()
            .map(|(s, m)| serde_json::json!({
                "sensitivity": s,
                "metrics": m,
                "precision": m.precision(),
                "recall": m.recall(),
                "accuracy": m.accuracy(),
            }))
            .collect::<Vec<_>>());
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
        println!("Metrics saved to {}", opath.display());
    }

    Ok(())
}

fn print_metrics(m: &DetectionMetrics) {
    println!(
        "  gestures={} tp={} fp={} fn={} tn={} precision={:.2} recall={:.2}",
        m.n_evaluated,
        m.true_positives,
        m.false_positives,
        m.false_negatives,
        m.true_negatives,
        m.precision(),
        m.recall()
    );
}
