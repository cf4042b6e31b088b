use clap::{Parser, Subcommand};
use ct_app::{
    AppError, AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, query, run_service,
    study_service,
};
use ct_sim::SaturationVerdict;
use ct_study::{Preset, PresetLibrary};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ctsat")]
#[command(about = "ctsat - Current transformer transient saturation analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate study file syntax and parameters
    Validate {
        /// Path to the study YAML or JSON file
        study_path: PathBuf,
    },
    /// List cases in a study
    Cases {
        /// Path to the study file
        study_path: PathBuf,
    },
    /// Simulate one case
    Run {
        /// Path to the study file
        study_path: PathBuf,
        /// Case ID to simulate
        case_id: String,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// End the run at the first saturation detection
        #[arg(long)]
        stop_on_saturation: bool,
    },
    /// Simulate every case (or the listed ones) in parallel
    RunAll {
        /// Path to the study file
        study_path: PathBuf,
        /// Case IDs to run; all cases when omitted
        case_ids: Vec<String>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a case
    Runs {
        /// Path to the study file
        study_path: PathBuf,
        /// Case ID to list runs for
        case_id: String,
        /// Delete all but the N newest runs before listing
        #[arg(long, value_name = "N")]
        keep: Option<usize>,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the study file
        study_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export every state column of a run as CSV
    Export {
        /// Path to the study file
        study_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export one variable of a run as a time,value CSV
    ExportSeries {
        /// Path to the study file
        study_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Variable name (e.g., flux, i_real_a, rms, v_req)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Inspect or extend a preset library
    #[command(subcommand)]
    Presets(PresetCommands),
}

#[derive(Subcommand)]
enum PresetCommands {
    /// List preset names
    List {
        /// Path to the preset library JSON file
        library: PathBuf,
    },
    /// Print one preset as YAML
    Show {
        /// Path to the preset library JSON file
        library: PathBuf,
        /// Preset name (unknown names show the default CT)
        name: String,
    },
    /// Store a study case as a named preset
    Save {
        /// Path to the preset library JSON file
        library: PathBuf,
        /// Preset name
        name: String,
        /// Path to the study file
        study_path: PathBuf,
        /// Case ID to copy
        case_id: String,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { study_path } => cmd_validate(&study_path),
        Commands::Cases { study_path } => cmd_cases(&study_path),
        Commands::Run {
            study_path,
            case_id,
            no_cache,
            stop_on_saturation,
        } => cmd_run(&study_path, &case_id, !no_cache, stop_on_saturation),
        Commands::RunAll {
            study_path,
            case_ids,
            no_cache,
        } => cmd_run_all(&study_path, &case_ids, !no_cache),
        Commands::Runs {
            study_path,
            case_id,
            keep,
        } => cmd_runs(&study_path, &case_id, keep),
        Commands::ShowRun { study_path, run_id } => cmd_show_run(&study_path, &run_id),
        Commands::Export {
            study_path,
            run_id,
            output,
        } => cmd_export(&study_path, &run_id, output.as_deref()),
        Commands::ExportSeries {
            study_path,
            run_id,
            variable,
            output,
        } => cmd_export_series(&study_path, &run_id, &variable, output.as_deref()),
        Commands::Presets(preset_cmd) => match preset_cmd {
            PresetCommands::List { library } => cmd_presets_list(&library),
            PresetCommands::Show { library, name } => cmd_presets_show(&library, &name),
            PresetCommands::Save {
                library,
                name,
                study_path,
                case_id,
            } => cmd_presets_save(&library, &name, &study_path, &case_id),
        },
    }
}

fn cmd_validate(study_path: &Path) -> AppResult<()> {
    println!("Validating study: {}", study_path.display());
    let study = study_service::load_study(study_path)?;
    study_service::validate_study(&study)?;
    println!("✓ Study is valid ({} cases)", study.cases.len());
    Ok(())
}

fn cmd_cases(study_path: &Path) -> AppResult<()> {
    let study = study_service::load_study(study_path)?;
    let cases = study_service::list_cases(&study);

    if cases.is_empty() {
        println!("No cases found in study");
    } else {
        println!("Cases in study '{}':", study.name);
        for case in cases {
            let origin = if case.v_sat_derived {
                "derived"
            } else {
                "supplied"
            };
            println!(
                "  {} - {} ({}, {} Hz, {:.0} A, V_sat {:.1} V {})",
                case.id,
                case.name,
                case.core,
                case.frequency_hz,
                case.i_fault_primary_a,
                case.v_sat_v,
                origin
            );
        }
    }
    Ok(())
}

fn cmd_run(
    study_path: &Path,
    case_id: &str,
    use_cache: bool,
    stop_on_saturation: bool,
) -> AppResult<()> {
    println!("Simulating case: {}", case_id);

    let request = RunRequest {
        study_path,
        case_id,
        options: RunOptions {
            use_cache,
            stop_on_saturation: stop_on_saturation.then_some(true),
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage: Option<RunStage> = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);

    let (manifest, records) = run_service::load_run(study_path, &response.run_id)?;
    print_run_summary(&manifest, &records)
}

fn cmd_run_all(study_path: &Path, case_ids: &[String], use_cache: bool) -> AppResult<()> {
    let options = RunOptions {
        use_cache,
        ..RunOptions::default()
    };
    let started = Instant::now();
    let outcomes = ct_app::run_batch(study_path, case_ids, &options)?;

    println!("{:<20} {:<10} {:>8} {}", "case", "source", "steps", "verdict");
    let mut failures = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(response) => {
                let source = if response.loaded_from_cache {
                    "cache"
                } else {
                    "simulated"
                };
                println!(
                    "{:<20} {:<10} {:>8} {}",
                    outcome.case_id, source, response.manifest.run_info.steps, response.manifest.verdict
                );
            }
            Err(err) => {
                failures += 1;
                println!("{:<20} {:<10} {:>8} error: {}", outcome.case_id, "-", "-", err);
            }
        }
    }
    println!(
        "\n{} cases in {:.3}s ({} failed)",
        outcomes.len(),
        started.elapsed().as_secs_f64(),
        failures
    );
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &ct_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let sim_pct = 100.0 * timing.simulate_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!("  Simulate: {:.3}s ({:.1}%)", timing.simulate_time_s, sim_pct);
    println!("  Save:     {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    }
    println!("  Total:    {:.3}s", timing.total_time_s);
    println!("  Steps:    {}", timing.steps);
}

fn print_run_summary(
    manifest: &ct_results::RunManifest,
    records: &[ct_results::TimeseriesRecord],
) -> AppResult<()> {
    let summary = query::get_run_summary(manifest, records)?;

    println!("\nRun Summary:");
    println!("  Case: {}", manifest.case_id);
    println!("  Time points: {}", summary.record_count);
    println!(
        "  Time range: {:.4} - {:.4} s (dt = {:.3e} s, {} samples/cycle)",
        summary.time_range.0,
        summary.time_range.1,
        manifest.run_info.dt_s,
        manifest.run_info.samples_per_cycle
    );
    println!("  V_sat: {:.2} V", summary.v_sat_v);
    println!("  Peak flux: {:.4} Wb-turns", summary.peak_flux_wb_turns);
    println!("  Peak secondary current: {:.3} A", summary.peak_i_real_a);
    if let Some(req) = summary.required {
        println!(
            "  Required voltage: {:.2} V steady-state, {:.2} V transient",
            req.v_req_perm_v, req.v_req_trans_v
        );
    }
    match summary.verdict {
        SaturationVerdict::NotSaturated => println!("  Verdict: not saturated"),
        verdict => println!("  Verdict: {}", verdict),
    }
    if manifest.stopped_early {
        println!("  (run stopped at first saturation)");
    }
    for warning in &manifest.warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}

fn cmd_runs(study_path: &Path, case_id: &str, keep: Option<usize>) -> AppResult<()> {
    if let Some(keep) = keep {
        let removed = run_service::prune_runs(study_path, case_id, keep)?;
        for run_id in &removed {
            println!("Removed run: {}", run_id);
        }
    }

    let runs = run_service::list_runs(study_path, case_id)?;

    if runs.is_empty() {
        println!("No cached runs found for case: {}", case_id);
    } else {
        println!("Cached runs for case '{}':", case_id);
        for manifest in runs {
            println!(
                "  {} ({}) {}",
                manifest.run_id, manifest.timestamp, manifest.verdict
            );
        }
    }
    Ok(())
}

fn cmd_show_run(study_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(study_path, run_id)?;
    print_run_summary(&manifest, &records)?;

    println!("\nVariables:");
    for name in query::SERIES_VARIABLES {
        println!("  {}", name);
    }
    Ok(())
}

fn cmd_export(study_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    let (manifest, records) = run_service::load_run(study_path, run_id)?;

    if let Some(path) = output {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        ct_results::write_csv(&mut file, &manifest, &records)?;
        file.flush()?;
        println!("✓ Exported {} rows to {}", records.len(), path.display());
    } else {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ct_results::write_csv(&mut lock, &manifest, &records)?;
    }
    Ok(())
}

fn cmd_export_series(
    study_path: &Path,
    run_id: &str,
    variable: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, records) = run_service::load_run(study_path, run_id)?;
    let series = query::extract_series(&records, variable)?;

    // Build CSV
    let mut csv = String::from("time_s,value\n");
    for (t, val) in &series {
        csv.push_str(&format!("{},{}\n", t, val));
    }

    // Write to file or stdout
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}

fn cmd_presets_list(library: &Path) -> AppResult<()> {
    let library = PresetLibrary::load(library).map_err(AppError::from)?;
    for name in library.names() {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_presets_show(library: &Path, name: &str) -> AppResult<()> {
    let library = PresetLibrary::load(library).map_err(AppError::from)?;
    let preset = library.get_or_default(name);
    let yaml = serde_yaml::to_string(&preset)
        .map_err(|e| AppError::InvalidInput(format!("Failed to serialize preset: {}", e)))?;
    print!("{}", yaml);
    Ok(())
}

fn cmd_presets_save(
    library: &Path,
    name: &str,
    study_path: &Path,
    case_id: &str,
) -> AppResult<()> {
    let study = study_service::load_study(study_path)?;
    let case = study_service::get_case(&study, case_id)?;
    let preset = Preset {
        params: case.params.clone(),
        options: case.options.clone(),
    };
    ct_study::save_preset(library, name, preset)?;
    println!("✓ Saved preset '{}' to {}", name, library.display());
    Ok(())
}
