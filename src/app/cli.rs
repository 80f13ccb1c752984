//! Command-Line Interface

use super::config::ReportFormat;
use crate::scoring::risk::Condition;
use crate::signal::denoise::DenoiseMethod;
use crate::workflow::synthetic::SyntheticProfile;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gaze Screen - oculomotor risk screening from gaze recordings
#[derive(Parser, Debug)]
#[command(name = "gaze-screen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one recording and print a report
    Analyze {
        /// Recording file (JSON)
        input: PathBuf,

        /// Conditions to score (comma separated; defaults to the configured set)
        #[arg(short = 'd', long, value_delimiter = ',')]
        conditions: Vec<Condition>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the configured denoise method
        #[arg(long)]
        denoise: Option<DenoiseMethod>,

        /// Override the configured model file
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Print the feature vector of a recording as JSON
    Features {
        /// Recording file (JSON)
        input: PathBuf,

        /// Override the configured denoise method
        #[arg(long)]
        denoise: Option<DenoiseMethod>,
    },

    /// Analyze every recording in a directory
    Batch {
        /// Directory containing recording files
        dir: PathBuf,

        /// Maximum number of recordings analyzed at once
        #[arg(short, long, default_value = "4")]
        jobs: usize,

        /// Write one JSON result per recording into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a synthetic recording
    Simulate {
        /// Output file
        output: PathBuf,

        /// Movement profile
        #[arg(short, long, default_value = "baseline")]
        profile: SyntheticProfile,

        /// Recording duration in milliseconds
        #[arg(short, long, default_value = "5000")]
        duration: f64,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Omit the pupil channel
        #[arg(long)]
        no_pupil: bool,

        /// Subject ID stored in the recording
        #[arg(long)]
        subject: Option<String>,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "preprocessing.denoise", "report.format")
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_analyze_defaults() {
        let cli = Cli::try_parse_from(["gaze-screen", "analyze", "rec.json"]).unwrap();

        match cli.command {
            Commands::Analyze {
                input,
                conditions,
                format,
                output,
                denoise,
                model,
            } => {
                assert_eq!(input, PathBuf::from("rec.json"));
                assert!(conditions.is_empty());
                assert!(format.is_none());
                assert!(output.is_none());
                assert!(denoise.is_none());
                assert!(model.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_parse_analyze_with_all_options() {
        let args = vec![
            "gaze-screen",
            "analyze",
            "/data/rec.json",
            "--conditions", "adhd,parkinsons",
            "--format", "json",
            "--output", "/tmp/out.json",
            "--denoise", "median",
            "--model", "/models/linear.json",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Analyze {
                conditions,
                format,
                output,
                denoise,
                model,
                ..
            } => {
                assert_eq!(conditions, vec![Condition::Adhd, Condition::Parkinsons]);
                assert_eq!(format, Some(ReportFormat::Json));
                assert_eq!(output, Some(PathBuf::from("/tmp/out.json")));
                assert_eq!(denoise, Some(DenoiseMethod::Median));
                assert_eq!(model, Some(PathBuf::from("/models/linear.json")));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_condition() {
        let result = Cli::try_parse_from(["gaze-screen", "analyze", "rec.json", "-d", "flu"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_features_command() {
        let cli = Cli::try_parse_from(["gaze-screen", "features", "rec.json", "--denoise", "none"])
            .unwrap();

        match cli.command {
            Commands::Features { input, denoise } => {
                assert_eq!(input, PathBuf::from("rec.json"));
                assert_eq!(denoise, Some(DenoiseMethod::None));
            }
            _ => panic!("Expected Features command"),
        }
    }

    #[test]
    fn test_cli_parse_batch_command() {
        let cli = Cli::try_parse_from(["gaze-screen", "batch", "/data", "-j", "8"]).unwrap();

        match cli.command {
            Commands::Batch { dir, jobs, output } => {
                assert_eq!(dir, PathBuf::from("/data"));
                assert_eq!(jobs, 8);
                assert!(output.is_none());
            }
            _ => panic!("Expected Batch command"),
        }
    }

    #[test]
    fn test_cli_parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["gaze-screen", "simulate", "out.json"]).unwrap();

        match cli.command {
            Commands::Simulate {
                output,
                profile,
                duration,
                seed,
                no_pupil,
                subject,
            } => {
                assert_eq!(output, PathBuf::from("out.json"));
                assert_eq!(profile, SyntheticProfile::Baseline);
                assert_eq!(duration, 5000.0);
                assert_eq!(seed, 42);
                assert!(!no_pupil);
                assert!(subject.is_none());
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_parse_simulate_profile() {
        let cli = Cli::try_parse_from([
            "gaze-screen",
            "simulate",
            "out.json",
            "--profile",
            "hyperactive",
            "--no-pupil",
        ])
        .unwrap();

        match cli.command {
            Commands::Simulate { profile, no_pupil, .. } => {
                assert_eq!(profile, SyntheticProfile::Hyperactive);
                assert!(no_pupil);
            }
            _ => panic!("Expected Simulate command"),
        }
    }

    #[test]
    fn test_cli_parse_init_command() {
        let cli = Cli::try_parse_from(["gaze-screen", "init", "--force"]).unwrap();

        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from([
            "gaze-screen",
            "-v",
            "--config",
            "/path/to/config.toml",
            "init",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.toml")));
    }

    #[test]
    fn test_cli_parse_config_set() {
        let cli = Cli::try_parse_from([
            "gaze-screen",
            "config",
            "set",
            "preprocessing.denoise",
            "median",
        ])
        .unwrap();

        match cli.command {
            Commands::Config {
                action: ConfigAction::Set { key, value },
            } => {
                assert_eq!(key, "preprocessing.denoise");
                assert_eq!(value, "median");
            }
            _ => panic!("Expected Config Set"),
        }
    }

    #[test]
    fn test_cli_parse_config_reset_defaults() {
        let cli = Cli::try_parse_from(["gaze-screen", "config", "reset"]).unwrap();

        match cli.command {
            Commands::Config {
                action: ConfigAction::Reset { force },
            } => assert!(!force),
            _ => panic!("Expected Config Reset"),
        }
    }

    #[test]
    fn test_cli_missing_required_argument_fails() {
        assert!(Cli::try_parse_from(["gaze-screen", "analyze"]).is_err());
        assert!(Cli::try_parse_from(["gaze-screen", "invalid-command"]).is_err());
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        cmd.clone().debug_assert();

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for name in ["analyze", "features", "batch", "simulate", "init", "config"] {
            assert!(subcommands.contains(&name), "missing {}", name);
        }
    }
}
