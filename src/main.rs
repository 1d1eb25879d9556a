// Identity document verification command line
// Scores a document photo against a live user photo and prints JSON

use clap::{Parser, Subcommand};
use idmatch::utils::ErrorClass;
use idmatch::{IdentityVerifier, VerificationError, VerifierConfig};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "idmatch", version, about = "Driver license and selfie trust scoring")]
struct Cli {
    /// Log per-stage scoring detail
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with model paths and OCR settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    landmark_model: Option<PathBuf>,

    #[arg(long, global = true)]
    encoder_model: Option<PathBuf>,

    /// Enables the final, slowest face detection attempt
    #[arg(long, global = true)]
    cnn_model: Option<PathBuf>,

    #[arg(long, global = true)]
    tessdata: Option<PathBuf>,

    /// OCR language [default: eng]
    #[arg(long, global = true)]
    language: Option<String>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a license image against a user photo
    Verify {
        #[arg(long)]
        document: PathBuf,
        #[arg(long)]
        photo: PathBuf,
    },
    /// Report which recognition backends are available
    Health,
}

impl Cli {
    fn verifier_config(&self) -> Result<VerifierConfig, VerificationError> {
        let base = match &self.config {
            Some(path) => VerifierConfig::from_file(path)?,
            None => VerifierConfig::default(),
        };
        let flags = VerifierConfig {
            landmark_model: self.landmark_model.clone(),
            encoder_model: self.encoder_model.clone(),
            cnn_model: self.cnn_model.clone(),
            tessdata: self.tessdata.clone(),
            language: self.language.clone(),
        };
        Ok(base.merge(flags).with_env_fallbacks())
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), VerificationError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}

fn run(cli: &Cli) -> Result<(), VerificationError> {
    let config = cli.verifier_config()?;
    let verifier = IdentityVerifier::from_config(&config);

    match &cli.command {
        Commands::Verify { document, photo } => {
            log::debug!("Verifying {} against {}", document.display(), photo.display());
            let result = verifier.verify_files(document, photo)?;
            print_json(&result, cli.pretty)
        }
        Commands::Health => print_json(&verifier.health(), cli.pretty),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            println!("{}", json!({ "error": err.to_string() }));
            match err.class() {
                ErrorClass::Client => ExitCode::from(2),
                ErrorClass::Server => ExitCode::from(1),
            }
        }
    }
}
