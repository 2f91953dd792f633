//! Runner binary: one full selection-and-export pass.
//!
//! Loads configuration, derives the region, gathers and scores candidates
//! for the three query windows (live or from a replay capture), runs the
//! selection policies, submits the export jobs, and prints a summary. Any
//! platform failure outside per-scene reduction aborts the run with the
//! platform's error text.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use s2select::config::PipelineConfig;
use s2select::export;
use s2select::ingest::{self, catalog, reduce};
use s2select::logging;
use s2select::model::{CandidateScene, Selection};
use s2select::pipeline::{query_windows, select_all};
use s2select::region::Region;
use s2select::replay;
use s2select::select::SelectionWindow;
use s2select::verify;

#[derive(Debug, Parser)]
#[command(name = "s2select", about = "Sentinel-2 best-scene selection and export")]
struct Args {
    /// Path to a TOML config file; compiled-in defaults apply otherwise.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probe the configured platform collections and exit.
    #[arg(long)]
    verify: bool,

    /// Load candidates from a JSON capture instead of the live catalog.
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Default the log filter to debug instead of info.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.verbose);

    let cfg = match PipelineConfig::load_or_default(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.verify {
        return match verify::run_full_verification(&cfg) {
            Ok(report) => {
                verify::print_summary(&report);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("verification failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&cfg, args.replay.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("run aborted: {e}");
            eprintln!("run aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &PipelineConfig, replay_path: Option<&std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
    let region = Region::build(&cfg.region)?;
    info!(
        side_m = region.side_m(),
        buffer_m = region.buffer_m(),
        epsg = region.epsg,
        "region built"
    );

    let (before_window, nearest_window, after_window) = query_windows(&cfg.selection);

    let replayed = match replay_path {
        Some(path) => {
            let candidates = replay::load_candidates(path)?;
            info!(count = candidates.len(), "loaded replay capture");
            Some(candidates)
        }
        None => None,
    };

    let client = ingest::build_client(&cfg.platform)?;

    let gather = |window: &SelectionWindow| -> Result<Vec<CandidateScene>, Box<dyn std::error::Error>> {
        if let Some(candidates) = &replayed {
            return Ok(replay::candidates_in_window(candidates, window));
        }
        let paired = catalog::fetch_window(
            &client,
            &cfg.platform,
            region.bbox_geographic(),
            &window.datetime_interval(),
        )?;
        Ok(reduce::score_candidates(
            &client,
            &cfg.platform,
            paired,
            &region.export_geographic,
            cfg.quality.cloud_prob_threshold,
        ))
    };

    let before_pool = gather(&before_window)?;
    let on_pool = gather(&nearest_window)?;
    let after_pool = gather(&after_window)?;

    let selections = select_all(cfg, before_pool, on_pool, after_pool);

    let live_exports = replay_path.is_none();
    let mut job_ids: Vec<Option<String>> = Vec::with_capacity(selections.len());
    for selection in &selections {
        match &selection.candidate {
            Some(chosen) => {
                let thumb = export::thumbnail_url(
                    &cfg.platform,
                    &chosen.scene_id,
                    region.bbox_geographic(),
                    512,
                    512,
                );
                info!(role = %selection.role, scene = %chosen.scene_id, thumbnail = %thumb, "scene chosen");

                if live_exports {
                    let request = export::build_export_request(
                        &cfg.export,
                        &cfg.visualization,
                        &region,
                        selection.role,
                        chosen,
                    );
                    let job_id = export::submit_export(&client, &cfg.platform, &request)?;
                    info!(role = %selection.role, job = %job_id, file = %request.file_name, "export submitted");
                    job_ids.push(Some(job_id));
                } else {
                    info!(role = %selection.role, "replay run; export submission skipped");
                    job_ids.push(None);
                }
            }
            None => {
                info!(role = %selection.role, "window empty; nothing to export");
                job_ids.push(None);
            }
        }
    }

    print_run_summary(&selections, &job_ids);
    Ok(())
}

fn print_run_summary(selections: &[Selection], job_ids: &[Option<String>]) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 SELECTION SUMMARY");
    println!("═══════════════════════════════════════════════════════════");
    for (selection, job_id) in selections.iter().zip(job_ids) {
        println!();
        println!("[{}] {} candidate(s) in window", selection.role, selection.window_size);
        match &selection.candidate {
            Some(chosen) => {
                println!("  Scene:      {}", chosen.scene_id);
                println!("  Acquired:   {}", chosen.acquired.to_rfc3339());
                println!("  roiCloud:   {:.1}", chosen.metrics.mean_cloud_prob);
                println!("  cloudFrac:  {:.3}", chosen.metrics.cloud_fraction);
                println!("  validFrac:  {:.3}", chosen.metrics.valid_fraction);
                if let Some(exact) = selection.exact_day {
                    println!(
                        "  Match:      {}",
                        if exact { "exact day" } else { "nearest-day fallback" }
                    );
                }
                match job_id {
                    Some(id) => println!("  Export job: {}", id),
                    None => println!("  Export job: (not submitted)"),
                }
            }
            None => {
                println!("  Scene:      (none — masked empty placeholder)");
                println!("  roiCloud:   absent");
                println!("  cloudFrac:  absent");
                println!("  validFrac:  absent");
            }
        }
    }
    println!("\n═══════════════════════════════════════════════════════════");
}
