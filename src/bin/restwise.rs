//! Restwise CLI - Command-line interface for the bedtime estimation engine
//!
//! Commands:
//! - estimate: Compute a bedtime for the given inputs
//! - validate: Validate a model artifact file
//! - doctor: Diagnose engine health and model artifacts
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use restwise_core::encoder::{display_for, format_short_time, ReportEncoder, FAILURE_MESSAGE};
use restwise_core::model::{ModelArtifact, EXPECTED_FEATURES, MODEL_SCHEMA_VERSION};
use restwise_core::{
    BedtimeEstimator, CoffeeAmount, EstimationResult, SleepAmount, WakeTime, ENGINE_VERSION,
    PRODUCER_NAME,
};

/// Restwise - On-device bedtime estimation engine
#[derive(Parser)]
#[command(name = "restwise")]
#[command(author = "Restwise")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Estimate an optimal bedtime from wake time, sleep target, and caffeine intake", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a bedtime for the given inputs
    Estimate {
        /// Wake-up time (24-hour HH:MM)
        #[arg(long, default_value = "07:00")]
        wake: WakeTime,

        /// Desired amount of sleep in hours (clamped to 4-12)
        #[arg(long, default_value = "8.0")]
        sleep: f64,

        /// Daily coffee intake in cups (clamped to 1-20)
        #[arg(long, default_value = "2")]
        coffee: u32,

        /// Model artifact file (defaults to the bundled artifact)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output the full report as JSON instead of the display pair
        #[arg(long)]
        json: bool,
    },

    /// Validate a model artifact file
    Validate {
        /// Artifact file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and model artifacts
    Doctor {
        /// Check an external model artifact file
        #[arg(long)]
        model: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (model or report)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Model artifact schema (rest.model.v1)
    Model,
    /// Estimate report schema (rest.estimate.v1)
    Report,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
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

fn run(cli: Cli) -> Result<(), RestCliError> {
    match cli.command {
        Commands::Estimate {
            wake,
            sleep,
            coffee,
            model,
            json,
        } => cmd_estimate(wake, sleep, coffee, model.as_deref(), json),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { model, json } => cmd_doctor(model.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_estimate(
    wake: WakeTime,
    sleep: f64,
    coffee: u32,
    model: Option<&Path>,
    json: bool,
) -> Result<(), RestCliError> {
    let sleep_amount = SleepAmount::new(sleep);
    let coffee_amount = CoffeeAmount::new(coffee);

    // A model that fails to load is displayed, not thrown: the user sees
    // the same error pair a mobile surface would show
    let estimator = match model {
        Some(path) => ModelArtifact::from_file(path).map(BedtimeEstimator::new),
        None => BedtimeEstimator::bundled(),
    };

    let (artifact, result) = match &estimator {
        Ok(est) => (
            Some(est.artifact()),
            est.estimate(wake, sleep_amount, coffee_amount),
        ),
        Err(_) => (
            None,
            EstimationResult::Failure {
                reason: FAILURE_MESSAGE.to_string(),
            },
        ),
    };

    let succeeded = result.is_success();

    if json {
        let encoder = ReportEncoder::new();
        let report = encoder.encode_to_json(wake, sleep_amount, coffee_amount, artifact, result)?;
        println!("{report}");
    } else {
        let display = display_for(&result);
        println!("{}", display.title);
        println!("{}", display.message);
    }

    if succeeded {
        Ok(())
    } else {
        Err(RestCliError::EstimateFailed)
    }
}

fn cmd_validate(input: &PathBuf, json: bool) -> Result<(), RestCliError> {
    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let report = match ModelArtifact::from_json(&input_data) {
        Ok(artifact) => ValidationReport {
            artifact: input.to_string_lossy().to_string(),
            valid: true,
            model_id: Some(artifact.model_id.clone()),
            model_version: Some(artifact.model_version.clone()),
            output_unit: Some(artifact.output_unit.as_str().to_string()),
            features: Some(artifact.features.iter().map(|f| f.name.clone()).collect()),
            error: None,
        },
        Err(e) => ValidationReport {
            artifact: input.to_string_lossy().to_string(),
            valid: false,
            model_id: None,
            model_version: None,
            output_unit: None,
            features: None,
            error: Some(e.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Artifact: {}", report.artifact);
        println!("Schema:   {}", MODEL_SCHEMA_VERSION);
        println!("Status:   {}", if report.valid { "valid" } else { "invalid" });

        if let (Some(id), Some(version)) = (&report.model_id, &report.model_version) {
            println!("Model:    {} {}", id, version);
        }
        if let Some(features) = &report.features {
            println!("Features: {}", features.join(", "));
        }
        if let Some(error) = &report.error {
            println!("\nError: {}", error);
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(RestCliError::ValidationFailed)
    }
}

fn cmd_doctor(model: Option<&Path>, json: bool) -> Result<(), RestCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check engine version
    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Restwise version {}", ENGINE_VERSION),
    });

    // Check model schema version
    checks.push(DoctorCheck {
        name: "model_schema".to_string(),
        status: CheckStatus::Ok,
        message: format!("Model schema: {}", MODEL_SCHEMA_VERSION),
    });

    // Check the bundled artifact loads and validates
    let bundled = ModelArtifact::bundled();
    match &bundled {
        Ok(artifact) => {
            checks.push(DoctorCheck {
                name: "bundled_artifact".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Bundled artifact {} {} valid",
                    artifact.model_id, artifact.model_version
                ),
            });
        }
        Err(e) => {
            checks.push(DoctorCheck {
                name: "bundled_artifact".to_string(),
                status: CheckStatus::Error,
                message: format!("Bundled artifact failed to load: {}", e),
            });
        }
    }

    // Check the bundled model estimates at the default inputs
    if let Ok(artifact) = bundled {
        let estimator = BedtimeEstimator::new(artifact);
        let result = estimator.estimate(
            WakeTime::default(),
            SleepAmount::default(),
            CoffeeAmount::default(),
        );
        match result.estimate() {
            Some(estimate) => {
                checks.push(DoctorCheck {
                    name: "bundled_estimate".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Default inputs estimate to {}",
                        format_short_time(estimate.bedtime)
                    ),
                });
            }
            None => {
                checks.push(DoctorCheck {
                    name: "bundled_estimate".to_string(),
                    status: CheckStatus::Error,
                    message: "Bundled model failed to produce an estimate".to_string(),
                });
            }
        }
    }

    // Check external model artifact if provided
    if let Some(model_path) = model {
        if model_path.exists() {
            match ModelArtifact::from_file(model_path) {
                Ok(artifact) => {
                    checks.push(DoctorCheck {
                        name: "external_model".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Artifact {} {} valid",
                            artifact.model_id, artifact.model_version
                        ),
                    });
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "external_model".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid model artifact: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "external_model".to_string(),
                status: CheckStatus::Warning,
                message: "Model artifact file does not exist".to_string(),
            });
        }
    }

    // Check stdin mode (for piping artifacts into validate)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for 'validate --input -')".to_string(),
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
        println!("Restwise Doctor Report");
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
        Err(RestCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), RestCliError> {
    match schema_type {
        SchemaType::Model => {
            if json_schema {
                println!("{}", get_model_json_schema());
            } else {
                println!("Model Schema: {}", MODEL_SCHEMA_VERSION);
                println!();
                println!("A pre-trained linear regression over three features, applied in order:");
                println!();
                for name in EXPECTED_FEATURES {
                    println!("  - {}", name);
                }
                println!();
                println!("Fields:");
                println!("  - schema_version: Schema identifier ({})", MODEL_SCHEMA_VERSION);
                println!("  - model_id / model_version: Identity of the fit");
                println!("  - trained_at / description: Optional training metadata");
                println!("  - features: Ordered {{ name, coefficient }} pairs");
                println!("  - intercept: Regression intercept");
                println!("  - output_unit: Unit of the predicted duration (seconds or hours)");
            }
        }
        SchemaType::Report => {
            if json_schema {
                println!("{}", get_report_json_schema());
            } else {
                println!("Report Schema: rest.estimate.v1");
                println!();
                println!("An encoded estimate contains:");
                println!();
                println!("- report_version: Schema version (rest.estimate.v1)");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ model_id, model_version, computed_at_utc }}");
                println!("- inputs: {{ wake_time, sleep_hours, coffee_cups }} after clamping");
                println!("- result: {{ status: success | failure, estimate or reason }}");
                println!("- display: {{ title, message }} rendered verbatim by surfaces");
            }
        }
    }

    Ok(())
}

// Helper functions

fn get_model_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://restwise.app/schemas/rest.model.v1.json",
        "title": "rest.model.v1",
        "description": "Restwise pre-trained sleep regression artifact",
        "type": "object",
        "required": ["schema_version", "model_id", "model_version", "features", "intercept", "output_unit"],
        "properties": {
            "schema_version": {
                "type": "string",
                "const": "rest.model.v1"
            },
            "model_id": { "type": "string" },
            "model_version": { "type": "string" },
            "trained_at": { "type": "string", "format": "date-time" },
            "description": { "type": "string" },
            "features": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "coefficient"],
                    "properties": {
                        "name": { "type": "string" },
                        "coefficient": { "type": "number" }
                    }
                }
            },
            "intercept": { "type": "number" },
            "output_unit": { "type": "string", "enum": ["seconds", "hours"] }
        }
    })
    .to_string()
}

fn get_report_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://restwise.app/schemas/rest.estimate.v1.json",
        "title": "rest.estimate.v1",
        "description": "Restwise encoded estimate report",
        "type": "object",
        "required": ["report_version", "producer", "provenance", "inputs", "result", "display"],
        "properties": {
            "report_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "model_id": { "type": "string" },
                    "model_version": { "type": "string" },
                    "computed_at_utc": { "type": "string" }
                }
            },
            "inputs": {
                "type": "object",
                "properties": {
                    "wake_time": { "type": "object" },
                    "sleep_hours": { "type": "number" },
                    "coffee_cups": { "type": "integer" }
                }
            },
            "result": {
                "type": "object",
                "required": ["status"],
                "properties": {
                    "status": { "type": "string", "enum": ["success", "failure"] },
                    "estimate": { "type": "object" },
                    "reason": { "type": "string" }
                }
            },
            "display": {
                "type": "object",
                "properties": {
                    "title": { "type": "string" },
                    "message": { "type": "string" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum RestCliError {
    Io(io::Error),
    Model(restwise_core::EstimateError),
    Json(serde_json::Error),
    EstimateFailed,
    ValidationFailed,
    DoctorFailed,
}

impl From<io::Error> for RestCliError {
    fn from(e: io::Error) -> Self {
        RestCliError::Io(e)
    }
}

impl From<restwise_core::EstimateError> for RestCliError {
    fn from(e: restwise_core::EstimateError) -> Self {
        RestCliError::Model(e)
    }
}

impl From<serde_json::Error> for RestCliError {
    fn from(e: serde_json::Error) -> Self {
        RestCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<RestCliError> for CliError {
    fn from(e: RestCliError) -> Self {
        match e {
            RestCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            RestCliError::Model(e) => CliError {
                code: "MODEL_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the artifact matches the rest.model.v1 schema".to_string()),
            },
            RestCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            RestCliError::EstimateFailed => CliError {
                code: "ESTIMATE_FAILED".to_string(),
                message: "The model could not produce a bedtime".to_string(),
                hint: Some("Run 'restwise doctor' to check the model artifact".to_string()),
            },
            RestCliError::ValidationFailed => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: "Artifact failed validation".to_string(),
                hint: Some("Fix the artifact and retry".to_string()),
            },
            RestCliError::DoctorFailed => CliError {
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
    artifact: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
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
