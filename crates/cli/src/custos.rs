//! custos - validate PDF documents for preservation.
//!
//! Prints one verdict per input file, human-readable by default or as
//! a JSON array with `--json`. The exit code summarizes the batch:
//! 0 when every file is well-formed and valid, 1 when any file fails
//! validation, 2 when an input cannot be read or output cannot be
//! written.

use clap::{ArgAction, Parser};
use custos_core::{ValidationReport, Validator};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "custos")]
#[command(about = "Validate PDF documents for preservation")]
#[command(version)]
struct Args {
    /// One or more paths to PDF files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Emit the reports as a JSON array
    #[arg(short = 'j', long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Only report files that fail validation
    #[arg(short = 'q', long = "quiet", action = ArgAction::SetTrue)]
    quiet: bool,

    /// Restrict the profile listing to profiles whose name contains
    /// this string (the verdict flags are always reported)
    #[arg(short = 'p', long = "profile")]
    profile: Option<String>,

    /// Use debug logging level (or set RUST_LOG)
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,
}

#[derive(Serialize)]
struct FileReport {
    file: String,
    #[serde(flatten)]
    report: ValidationReport,
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_text(out: &mut dyn Write, reports: &[FileReport], quiet: bool) -> io::Result<()> {
    for entry in reports {
        let status = &entry.report.status;
        if quiet && status.is_valid() {
            continue;
        }
        let verdict = match (status.is_well_formed(), status.is_valid()) {
            (true, true) => "well-formed and valid",
            (true, false) => "well-formed but not valid",
            _ => "not well-formed",
        };
        writeln!(out, "{}: {verdict}", entry.file)?;
        if let Some(error) = &entry.report.error {
            writeln!(out, "  cause: {error}")?;
        }
        for profile in &entry.report.profiles {
            let mark = if profile.satisfied { "yes" } else { "no" };
            writeln!(out, "  {}: {mark}", profile.name)?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> io::Result<ExitCode> {
    let validator = Validator::new();
    let mut all_valid = true;
    let mut reports = Vec::with_capacity(args.files.len());

    for file in &args.files {
        let mut report = validator.validate_path(file)?;
        tracing::info!(
            file = %file.display(),
            well_formed = report.status.is_well_formed(),
            valid = report.status.is_valid(),
            "validated"
        );
        if let Some(needle) = &args.profile {
            report.profiles.retain(|p| p.name.contains(needle.as_str()));
            // Explicitly requested profiles count toward the verdict.
            all_valid = all_valid && report.profiles.iter().all(|p| p.satisfied);
        }
        all_valid = all_valid && report.status.is_valid();
        reports.push(FileReport {
            file: file.display().to_string(),
            report,
        });
    }

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        Box::new(BufWriter::new(File::create(&args.outfile)?))
    };

    if args.json {
        serde_json::to_writer_pretty(&mut output, &reports)?;
        writeln!(output)?;
    } else {
        write_text(&mut output, &reports, args.quiet)?;
    }
    output.flush()?;

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("custos: {e}");
            ExitCode::from(2)
        }
    }
}
