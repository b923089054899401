//! acmotion CLI - Command-line interface for the gesture estimator
//!
//! Commands:
//! - replay: Run a recorded sample stream through the pipeline
//! - validate: Validate a recorded sample stream
//! - doctor: Diagnose pipeline health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use aircanvas_motion::pipeline::GesturePipeline;
use aircanvas_motion::source::{ReplaySource, SampleSource};
use aircanvas_motion::types::{CursorUpdate, Sample, SampleRate};
use aircanvas_motion::{MotionError, PipelineConfig, ENGINE_VERSION, PRODUCER_NAME};

/// acmotion - On-device inertial gesture estimator for air-drawing
#[derive(Parser)]
#[command(name = "acmotion")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Estimate drawing-cursor trajectories from acceleration streams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded sample stream through the pipeline
    Replay {
        /// Input file path with NDJSON samples (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Pipeline configuration JSON file (defaults used when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write diagnostic counters as JSON to this file after the run
        #[arg(long)]
        save_diagnostics: Option<PathBuf>,
    },

    /// Validate a recorded sample stream
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose pipeline health and configuration
    Doctor {
        /// Check a pipeline configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one cursor update per line)
    Ndjson,
    /// JSON array of cursor updates
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AcmCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            output_format,
            config,
            save_diagnostics,
        } => cmd_replay(
            &input,
            &output,
            output_format,
            config.as_deref(),
            save_diagnostics.as_deref(),
        ),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_replay(
    input: &PathBuf,
    output: &PathBuf,
    output_format: OutputFormat,
    config: Option<&std::path::Path>,
    save_diagnostics: Option<&std::path::Path>,
) -> Result<(), AcmCliError> {
    let input_data = read_input(input)?;
    let mut source = ReplaySource::from_ndjson(&input_data)?;

    if source.is_empty() {
        return Err(AcmCliError::NoSamples);
    }

    let config = load_config(config)?;
    let mut pipeline = GesturePipeline::new(config)?;

    let mut updates: Vec<CursorUpdate> = Vec::with_capacity(source.len());
    let subscription = source.subscribe(SampleRate::Fastest)?;
    while let Some(sample) = subscription.recv() {
        updates.push(pipeline.process(&sample));
    }

    if let Some(diagnostics_path) = save_diagnostics {
        let json = serde_json::to_string_pretty(&pipeline.diagnostics())?;
        fs::write(diagnostics_path, json)?;
    }

    let output_data = format_output(&updates, &output_format)?;
    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
        io::stdout().flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), AcmCliError> {
    let input_data = read_input(input)?;

    let mut report = ValidationReport {
        total_records: 0,
        valid_records: 0,
        invalid_records: 0,
        errors: Vec::new(),
    };

    let mut previous_timestamp: Option<f64> = None;
    for (index, line) in input_data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        report.total_records += 1;

        match serde_json::from_str::<Sample>(trimmed) {
            Ok(sample) => {
                report.valid_records += 1;
                if !sample.accel.is_finite() {
                    report.errors.push(ValidationErrorDetail {
                        line: index + 1,
                        error: "non-finite acceleration component (will be sanitized)".to_string(),
                    });
                }
                if let Some(previous) = previous_timestamp {
                    if sample.timestamp_s <= previous {
                        report.errors.push(ValidationErrorDetail {
                            line: index + 1,
                            error: "timestamp not strictly increasing (step will be dropped)"
                                .to_string(),
                        });
                    }
                }
                previous_timestamp = Some(sample.timestamp_s);
            }
            Err(e) => {
                report.invalid_records += 1;
                report.errors.push(ValidationErrorDetail {
                    line: index + 1,
                    error: e.to_string(),
                });
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validated {} records", report.total_records);
        println!("  valid:   {}", report.valid_records);
        println!("  invalid: {}", report.invalid_records);
        for detail in &report.errors {
            println!("  line {}: {}", detail.line, detail.error);
        }
    }

    if report.invalid_records > 0 {
        Err(AcmCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&std::path::Path>, json: bool) -> Result<(), AcmCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} {}", PRODUCER_NAME, ENGINE_VERSION),
    });

    let config_check = match config {
        Some(path) => match fs::read_to_string(path) {
            Ok(data) => match PipelineConfig::from_json(&data) {
                Ok(config) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "valid (alpha={}, hard={}, soft={}, motion={}, majority={})",
                        config.alpha,
                        config.hard_threshold,
                        config.soft_threshold,
                        config.motion_threshold,
                        config.history_majority
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: e.to_string(),
                },
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("unreadable: {}", e),
            },
        },
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "using built-in defaults".to_string(),
        },
    };
    checks.push(config_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Warning,
            message: "stdin is a TTY; pipe recorded samples for replay mode".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("acmotion Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(AcmCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, AcmCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(config: Option<&std::path::Path>) -> Result<PipelineConfig, AcmCliError> {
    match config {
        Some(path) => {
            let data = fs::read_to_string(path)?;
            Ok(PipelineConfig::from_json(&data)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn format_output(updates: &[CursorUpdate], format: &OutputFormat) -> Result<String, AcmCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for update in updates {
                lines.push(serde_json::to_string(update)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(updates)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(updates)?),
    }
}

// Error types

#[derive(Debug)]
enum AcmCliError {
    Io(io::Error),
    Motion(MotionError),
    Json(serde_json::Error),
    NoSamples,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for AcmCliError {
    fn from(e: io::Error) -> Self {
        AcmCliError::Io(e)
    }
}

impl From<MotionError> for AcmCliError {
    fn from(e: MotionError) -> Self {
        AcmCliError::Motion(e)
    }
}

impl From<serde_json::Error> for AcmCliError {
    fn from(e: serde_json::Error) -> Self {
        AcmCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<AcmCliError> for CliError {
    fn from(e: AcmCliError) -> Self {
        match e {
            AcmCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            AcmCliError::Motion(e) => CliError {
                code: "MOTION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the configuration and that each input line is one JSON sample: {\"timestamp_s\":0.0,\"accel\":[x,y,z]}".to_string()),
            },
            AcmCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            AcmCliError::NoSamples => CliError {
                code: "NO_SAMPLES".to_string(),
                message: "No samples found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            AcmCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            AcmCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    line: usize,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
