use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env};
use gapfillcore::{RadiusPolicy, LEGACY_SEARCH_RADIUS};
use generator::profile::{build_scene, SceneConfig};
use log::info;
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::report::RunReport;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver for the multi-sensor gap-fill core")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 4)]
    bands: usize,
    #[arg(long, default_value_t = LEGACY_SEARCH_RADIUS)]
    radius: i32,
    /// Output sampling step in days
    #[arg(long, default_value_t = 10)]
    step: i32,
    #[arg(long, default_value_t = 64)]
    width: usize,
    #[arg(long, default_value_t = 64)]
    height: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 0.3)]
    cloud_fraction: f64,
    /// Worker threads; defaults to the global rayon pool
    #[arg(long)]
    threads: Option<usize>,
    /// Search with --radius instead of the legacy override
    #[arg(long, default_value_t = false)]
    honor_radius: bool,
    #[arg(long, default_value = "tools/data/gapfill_report.jsonl")]
    report: PathBuf,
}

fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut workflow_config = if let Some(path) = args.workflow.as_ref() {
        WorkflowConfig::load(path)?
    } else {
        let scene = SceneConfig {
            width: args.width,
            height: args.height,
            seed: args.seed,
            cloud_fraction: args.cloud_fraction,
            ..Default::default()
        };
        WorkflowConfig::from_args(args.bands, args.radius, args.step, scene)
    };
    if args.threads.is_some() {
        workflow_config.threads = args.threads;
    }
    if args.honor_radius {
        workflow_config.radius_policy = RadiusPolicy::Configured;
    }

    let run_config = workflow_config.to_run_config()?;
    info!(
        "{} sensors, {} input dates, {} output dates, {} bands",
        run_config.sensors.len(),
        run_config.input_date_count(),
        run_config.output_date_count(),
        run_config.bands
    );

    let scene = build_scene(&workflow_config.scene, &run_config).context("building scene")?;
    let runner = Runner::new(workflow_config);
    let result = runner.execute(run_config, &scene)?;

    println!(
        "Gap-fill run -> {}x{} pixels, {} output bands, no-data {}, interpolated {}",
        result.width,
        result.height,
        result.output_bands,
        result.counts.no_data,
        result.counts.interpolated
    );

    RunReport::from_result(&result)
        .append_to(&args.report)
        .context("writing run report")?;
    info!("report appended to {}", args.report.display());

    Ok(())
}
