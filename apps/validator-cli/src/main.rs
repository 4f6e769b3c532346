//! PDF Validator command line
//!
//! Validates a single VPN request form or every PDF in a folder and prints
//! the decision. Logs go to stderr so stdout only carries results.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator_core::{render_summary, save_runs, Settings, ValidatorAgent};

mod display;

use display::{render_configuration, render_run};

#[derive(Parser, Debug)]
#[command(name = "pdf-validator")]
#[command(
    version,
    about = "Validate VPN request form PDFs",
    after_help = "Examples:\n  pdf-validator document.pdf\n  pdf-validator --batch folder_with_pdfs/\n  pdf-validator --output report.json document.pdf\n  pdf-validator --verbose --detailed document.pdf"
)]
struct Args {
    /// PDF file or folder of PDF files
    input: Option<PathBuf>,

    /// Validate every PDF in the input folder
    #[arg(long)]
    batch: bool,

    /// Write the validation run(s) to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the full report for each document
    #[arg(long)]
    detailed: bool,

    /// Print the current configuration and exit
    #[arg(long)]
    config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let directive = if args.verbose {
        "debug".to_string()
    } else {
        settings.log_level.to_lowercase()
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut stdout = std::io::stdout();
    match execute(&args, settings, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &Args, settings: Settings, out: &mut impl Write) -> anyhow::Result<()> {
    if args.config {
        write!(out, "{}", render_configuration(&settings))?;
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        bail!("Input path is required (use --help for usage)");
    };
    if !input.exists() {
        bail!("Path '{}' not found", input.display());
    }

    let agent = ValidatorAgent::from_settings(settings)
        .context("Could not initialize the validator")?;
    if args.verbose {
        writeln!(out, "✓ Validator initialized (judge: {})", agent.judge_name())?;
    }

    if args.batch || input.is_dir() {
        validate_batch(&agent, input, args, out).await
    } else {
        validate_single(&agent, input, args, out).await
    }
}

async fn validate_single(
    agent: &ValidatorAgent,
    path: &Path,
    args: &Args,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!("File '{}' is not a PDF", path.display());
    }

    if args.verbose {
        writeln!(out, "Processing file: {}", path.display())?;
        writeln!(out, "{}", "=".repeat(50))?;
    }

    let run = agent.validate_file(path).await;
    let min_signatures = agent.settings().min_signatures;
    write!(out, "{}", render_run(&run, min_signatures, args.detailed))?;

    if let Some(output) = &args.output {
        save_runs(output, &run)?;
        writeln!(out, "✓ Result saved to: {}", output.display())?;
    }
    Ok(())
}

async fn validate_batch(
    agent: &ValidatorAgent,
    folder: &Path,
    args: &Args,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let outcome = agent.validate_folder(folder).await?;
    if outcome.runs.is_empty() {
        bail!("No PDF files found in '{}'", folder.display());
    }

    write!(out, "\n{}", render_summary(&outcome.summary))?;

    if args.verbose || args.detailed {
        let min_signatures = agent.settings().min_signatures;
        let total = outcome.runs.len();
        for (idx, run) in outcome.runs.iter().enumerate() {
            writeln!(out, "\n--- File {}/{}: {} ---", idx + 1, total, run.filename)?;
            write!(out, "{}", render_run(run, min_signatures, args.detailed))?;
        }
    }

    if let Some(output) = &args.output {
        save_runs(output, &outcome)?;
        writeln!(out, "✓ Batch results saved to: {}", output.display())?;
    }
    Ok(())
}
