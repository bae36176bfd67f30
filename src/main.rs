use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ivf_advisor::config::{ColorChoice, Config, OutputFormat};
use ivf_advisor::model::{self, ModelFeatures, PredictionOutcome};
use ivf_advisor::output::{self, Report};
use ivf_advisor::patient::{self, PatientRecord};
use ivf_advisor::scoring;

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_MODEL: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_OUTPUT: i32 = 5;

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Commands {
    /// Run all three calculators (default if no subcommand)
    Report,
    /// Estimate IVF success rate
    Success,
    /// Estimate embryo quality grade
    Embryo,
    /// Recommend a stimulation protocol
    Protocol,
    /// Print the classifier feature vector for this patient
    Features {
        /// Path to the classifier metadata JSON (overrides config)
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Classifier success probability (0-1) to interpret
        #[arg(long)]
        probability: Option<f64>,
    },
}

/// Patient inputs; flags override values read from `--patient`.
#[derive(Args, Debug, Default, Clone)]
struct PatientArgs {
    /// Patient record file (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    patient: Option<PathBuf>,

    /// Age in years
    #[arg(long, global = true)]
    age: Option<u32>,

    /// Body mass index (kg/m²)
    #[arg(long, global = true)]
    bmi: Option<f64>,

    /// Height in centimetres (derives BMI with --weight)
    #[arg(long, global = true)]
    height: Option<f64>,

    /// Weight in kilograms (derives BMI with --height)
    #[arg(long, global = true)]
    weight: Option<f64>,

    /// Anti-Müllerian Hormone (ng/mL)
    #[arg(long, global = true)]
    amh: Option<f64>,

    /// Follicle-Stimulating Hormone (mIU/mL)
    #[arg(long, global = true)]
    fsh: Option<f64>,

    /// Number of previous IVF cycles
    #[arg(long, global = true)]
    previous_cycles: Option<u32>,

    /// Partner age in years
    #[arg(long, global = true)]
    partner_age: Option<u32>,

    /// Primary diagnosis
    #[arg(long, global = true)]
    diagnosis: Option<String>,

    /// Lifestyle notes, e.g. "non-smoker, regular exercise"
    #[arg(long, global = true)]
    lifestyle: Option<String>,

    /// Stress level from the latest wellness log (1-5)
    #[arg(long, global = true)]
    stress: Option<u32>,

    /// Sleep hours from the latest wellness log
    #[arg(long, global = true)]
    sleep_hours: Option<f64>,

    /// Exercise minutes per day from the latest wellness log
    #[arg(long, global = true)]
    exercise_min: Option<u32>,
}

impl PatientArgs {
    /// Overlay flag values onto a loaded (or empty) record.
    fn apply(self, mut record: PatientRecord) -> PatientRecord {
        let p = &mut record.patient;
        p.age = self.age.or(p.age);
        p.bmi = self.bmi.or(p.bmi);
        p.height_cm = self.height.or(p.height_cm);
        p.weight_kg = self.weight.or(p.weight_kg);
        p.amh_level = self.amh.or(p.amh_level);
        p.fsh_level = self.fsh.or(p.fsh_level);
        p.previous_ivf_cycles = self.previous_cycles.or(p.previous_ivf_cycles);
        p.partner_age = self.partner_age.or(p.partner_age);
        p.diagnosis = self.diagnosis.or(p.diagnosis.take());
        p.lifestyle_factors = self.lifestyle.or(p.lifestyle_factors.take());

        if self.stress.is_some() || self.sleep_hours.is_some() || self.exercise_min.is_some() {
            let w = record.wellness.get_or_insert_with(Default::default);
            w.stress_level = self.stress.or(w.stress_level);
            w.sleep_hours = self.sleep_hours.or(w.sleep_hours);
            w.exercise_minutes = self.exercise_min.or(w.exercise_minutes);
        }
        record
    }
}

#[derive(Parser, Debug)]
#[command(name = "ivf-advisor")]
#[command(about = "Rule-based IVF success, embryo quality and protocol advisor", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/ivf-advisor/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output format (overrides config)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(flatten)]
    patient: PatientArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "ivf_advisor=debug"
    } else {
        "ivf_advisor=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_record(args: PatientArgs) -> anyhow::Result<PatientRecord> {
    let base = match &args.patient {
        Some(path) => patient::load_patient(path)?,
        None => PatientRecord::default(),
    };
    Ok(args.apply(base))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Report);

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config: Config = match ivf_advisor::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let format = cli.format.unwrap_or(config.output.format);
    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        config.output.color
    };
    let use_colors = output::should_use_colors(color_choice);

    let record = match load_record(cli.patient) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Patient input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    };

    // Validate input before any scoring
    if let Err(errors) = scoring::validate_factors(&record.patient, record.wellness.as_ref()) {
        tracing::warn!(count = errors.len(), "patient input rejected");
        eprintln!("Patient input errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_INPUT);
    }

    let patient = &record.patient;

    if let Commands::Features {
        metadata,
        probability,
    } = &command
    {
        let Some(meta_path) = metadata.clone().or(config.model.metadata_path.clone()) else {
            eprintln!("No model metadata path. Pass --metadata or set model.metadata_path in config.");
            std::process::exit(EXIT_MODEL);
        };
        let meta = match model::load_metadata(&meta_path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Model error: {:#}", e);
                std::process::exit(EXIT_MODEL);
            }
        };
        let features = ModelFeatures::from_record(patient, record.wellness.as_ref());
        let outcome = probability.map(PredictionOutcome::from_probability);

        match format {
            OutputFormat::Text => {
                println!("{}", output::format_features(&meta, &features, outcome.as_ref()))
            }
            OutputFormat::Json => {
                let body = serde_json::json!({
                    "model": &meta.model,
                    "accuracy": meta.accuracy,
                    "feature_order": &meta.feature_order,
                    "features": features.vector(&meta),
                    "prediction": outcome.map(|o| serde_json::json!({
                        "success_probability": o.percentage(),
                        "prediction_text": o.text(),
                    })),
                });
                print_json(&body);
            }
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let (run_success, run_embryo, run_protocol) = match command {
        Commands::Success => (true, false, false),
        Commands::Embryo => (false, true, false),
        Commands::Protocol => (false, false, true),
        _ => (true, true, true),
    };

    let success = run_success.then(|| scoring::compute_success(Some(patient)));
    let embryo = run_embryo.then(|| scoring::compute_embryo_quality(Some(patient)));
    let plan = run_protocol.then(|| scoring::recommend_protocol(Some(patient)));

    if let Some(plan) = &plan {
        tracing::debug!(
            protocol = plan.protocol.name(),
            personalization = plan.personalization_score,
            "protocol selected"
        );
    }

    match format {
        OutputFormat::Text => {
            let mut blocks = Vec::new();
            if let Some(s) = &success {
                blocks.push(output::format_success(s, use_colors));
            }
            if let Some(e) = &embryo {
                blocks.push(output::format_embryo(e, use_colors));
            }
            if let Some(p) = &plan {
                blocks.push(output::format_protocol(p, use_colors));
            }
            println!("{}", blocks.join("\n\n"));
        }
        OutputFormat::Json => {
            let report = Report {
                success_prediction: success.as_ref(),
                embryo_quality: embryo.as_ref(),
                protocol: plan.as_ref(),
            };
            print_json(&report);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match output::format_json(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Output error: {:#}", e);
            std::process::exit(EXIT_OUTPUT);
        }
    }
}
