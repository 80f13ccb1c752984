//! Gaze Screen - oculomotor risk screening CLI
//!
//! Analyzes gaze recordings and reports per-condition screening risk scores.

use gaze_screening::app::cli::{Cli, Commands, ConfigAction};
use gaze_screening::app::config::{find_toml_value, set_toml_value, Config, ReportFormat};
use gaze_screening::report::analyzer::{AnalysisResult, Analyzer};
use gaze_screening::report::text_report::render_report;
use gaze_screening::scoring::risk::Condition;
use gaze_screening::signal::denoise::DenoiseMethod;
use gaze_screening::signal::series::SessionInfo;
use gaze_screening::workflow::recording::Recording;
use gaze_screening::workflow::synthetic::{SyntheticConfig, SyntheticGenerator, SyntheticProfile};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    // Execute command
    match cli.command {
        Commands::Analyze {
            input,
            conditions,
            format,
            output,
            denoise,
            model,
        } => {
            let options = AnalyzeOptions {
                conditions,
                format,
                output,
                denoise,
                model,
            };
            run_analyze(&input, options, &config)?;
        }
        Commands::Features { input, denoise } => {
            run_features(&input, denoise, &config)?;
        }
        Commands::Batch { dir, jobs, output } => {
            run_batch(&dir, jobs, output.as_deref(), &config)?;
        }
        Commands::Simulate {
            output,
            profile,
            duration,
            seed,
            no_pupil,
            subject,
        } => {
            run_simulate(&output, profile, duration, seed, !no_pupil, subject)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

struct AnalyzeOptions {
    conditions: Vec<Condition>,
    format: Option<ReportFormat>,
    output: Option<PathBuf>,
    denoise: Option<DenoiseMethod>,
    model: Option<PathBuf>,
}

/// Config with command-line overrides applied
fn effective_config(
    config: &Config,
    denoise: Option<DenoiseMethod>,
    model: Option<PathBuf>,
) -> Config {
    let mut config = config.clone();
    if let Some(method) = denoise {
        config.preprocessing.denoise = method;
    }
    if let Some(path) = model {
        config.scoring.model_path = Some(path);
        config.scoring.use_model = true;
    }
    config
}

fn load_recording(input: &Path) -> anyhow::Result<Recording> {
    if !input.exists() {
        anyhow::bail!("Recording file not found: {:?}", input);
    }
    let recording = Recording::load(input)?;
    info!("Loaded recording {:?} with {} samples", input, recording.len());
    Ok(recording)
}

fn render(result: &AnalysisResult, format: ReportFormat, config: &Config) -> anyhow::Result<String> {
    Ok(match format {
        ReportFormat::Text => render_report(result),
        ReportFormat::Json if config.report.pretty_json => serde_json::to_string_pretty(result)?,
        ReportFormat::Json => serde_json::to_string(result)?,
    })
}

fn run_analyze(input: &Path, options: AnalyzeOptions, config: &Config) -> anyhow::Result<()> {
    let config = effective_config(config, options.denoise, options.model);
    let analyzer = config.build_analyzer()?;

    let series = load_recording(input)?.to_series()?;

    let conditions = if options.conditions.is_empty() {
        config.scoring.conditions.clone()
    } else {
        options.conditions
    };
    let result = analyzer.analyze(&series, Some(&conditions));

    let format = options.format.unwrap_or(config.report.format);
    let rendered = render(&result, format, &config)?;

    match options.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, rendered)?;
            info!("Wrote report to {:?}", path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn run_features(input: &Path, denoise: Option<DenoiseMethod>, config: &Config) -> anyhow::Result<()> {
    let config = effective_config(config, denoise, None);
    let analyzer = Analyzer::new(config.preprocessing.denoise, config.preprocessing.segmentation());

    let series = load_recording(input)?.to_series()?;
    let (features, saccades, fixations) = analyzer.extract_features(&series);

    let output = serde_json::json!({
        "feature_schema_version": features.schema_version(),
        "saccade_count": saccades,
        "fixation_count": fixations,
        "features": features,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

/// Outcome of analyzing one file in a batch
struct BatchEntry {
    path: PathBuf,
    result: anyhow::Result<AnalysisResult>,
}

fn analyze_file(path: &Path, analyzer: &Analyzer, conditions: &[Condition]) -> anyhow::Result<AnalysisResult> {
    let series = Recording::load_series(path)?;
    Ok(analyzer.analyze(&series, Some(conditions)))
}

fn run_batch(dir: &Path, jobs: usize, output: Option<&Path>, config: &Config) -> anyhow::Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("Not a directory: {:?}", dir);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();

    if files.is_empty() {
        println!("No recordings found in {}", dir.display());
        return Ok(());
    }

    let analyzer = config.build_analyzer()?;
    let conditions = config.scoring.conditions.clone();
    let workers = jobs.clamp(1, files.len());
    let next = AtomicUsize::new(0);

    info!("Analyzing {} recordings with {} workers", files.len(), workers);

    let mut entries: Vec<BatchEntry> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        let Some(path) = files.get(i) else {
                            break;
                        };
                        done.push(BatchEntry {
                            path: path.clone(),
                            result: analyze_file(path, &analyzer, &conditions),
                        });
                    }
                    done
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(done) => done,
                Err(_) => {
                    error!("Batch worker panicked");
                    Vec::new()
                }
            })
            .collect()
    });
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    if let Some(out_dir) = output {
        std::fs::create_dir_all(out_dir)?;
    }

    let mut failures = 0;
    for entry in &entries {
        let file_name = entry.path.file_name().unwrap_or_default().to_string_lossy();
        match &entry.result {
            Ok(result) => {
                let summary = &result.summary;
                let highest = summary
                    .highest_risk_condition
                    .map(|c| c.display_name())
                    .unwrap_or("-");
                println!(
                    "  {}  {} ({}: {:.2}, {} saccades, {} fixations)",
                    file_name,
                    summary.overall_risk_level,
                    highest,
                    summary.highest_risk_score,
                    result.saccade_count,
                    result.fixation_count
                );

                if let Some(out_dir) = output {
                    let target = out_dir.join(entry.path.file_name().unwrap_or_default());
                    std::fs::write(&target, serde_json::to_string_pretty(result)?)?;
                }
            }
            Err(e) => {
                failures += 1;
                warn!("Failed to analyze {:?}: {}", entry.path, e);
                println!("  {}  (failed: {})", file_name, e);
            }
        }
    }

    println!(
        "\nAnalyzed {} recordings ({} failed)",
        entries.len() - failures,
        failures
    );
    if failures > 0 && failures == entries.len() {
        anyhow::bail!("Every recording in {:?} failed to analyze", dir);
    }

    Ok(())
}

fn run_simulate(
    output: &Path,
    profile: SyntheticProfile,
    duration_ms: f64,
    seed: u64,
    with_pupil: bool,
    subject: Option<String>,
) -> anyhow::Result<()> {
    if !(duration_ms.is_finite() && duration_ms >= 0.0) {
        anyhow::bail!("Duration must be a non-negative number of milliseconds");
    }

    let config = SyntheticConfig {
        duration_ms,
        seed,
        with_pupil,
        ..SyntheticConfig::for_profile(profile)
    };
    let session = SessionInfo {
        subject_id: Some(subject.unwrap_or_else(|| format!("SYNTHETIC_{}", profile.as_str().to_uppercase()))),
        task_type: Some("visual_search".to_string()),
        ..Default::default()
    };

    let series = SyntheticGenerator::new(config).generate(session)?;
    let recording = Recording::from_series(&series, Some(format!("synthetic:{}", profile)));

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    recording.save(output)?;

    info!("Saved synthetic recording to {:?}", output);
    println!(
        "Wrote {} samples ({} profile, seed {}) to {}",
        recording.len(),
        profile,
        seed,
        output.display()
    );

    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let config_path = Config::default_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {:?}. Use --force to overwrite.",
            config_path
        );
    }

    config.save_default()?;
    println!("Created config at {:?}", config_path);
    println!("\nConfig content:\n{}", config.to_toml()?);

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = config.to_toml()?;
            println!("Configuration ({:?}):\n", Config::default_path());
            println!("{}", toml_str);
        }
        ConfigAction::Get { key } => {
            let toml_str = config.to_toml()?;
            match find_toml_value(&toml_str, &key) {
                Some(v) => println!("{} = {}", key, v),
                None => {
                    anyhow::bail!("Configuration key '{}' not found", key);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let config_path = Config::default_path();
            if !config_path.exists() {
                anyhow::bail!("No config file found. Run 'gaze-screen init' first.");
            }

            // Load, modify, validate, and save
            let mut toml_content = std::fs::read_to_string(&config_path)?;
            if !set_toml_value(&mut toml_content, &key, &value) {
                anyhow::bail!("Failed to set '{}'. Section may not exist in config.", key);
            }
            Config::from_toml(&toml_content)?;
            std::fs::write(&config_path, &toml_content)?;
            println!("Set {} = {}", key, value);
        }
        ConfigAction::Reset { force } => {
            let config_path = Config::default_path();

            if config_path.exists() && !force {
                println!("Config exists at {:?}", config_path);
                println!("Use --force to reset to defaults");
                return Ok(());
            }

            Config::default().save_default()?;
            println!("Configuration reset to defaults at {:?}", config_path);
        }
    }

    Ok(())
}
