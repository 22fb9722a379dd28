//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the pretrained model artifact
//! - runs the valuation pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ShowArgs, ValueArgs};
use crate::domain::{IndustryCode, ValuationInputs};
use crate::error::AppError;
use crate::model::{GbtModel, Scorer, resolve_model_path};

pub mod pipeline;

/// Entry point for the `mval` binary.
pub fn run() -> Result<(), AppError> {
    // We want `mval` and `mval --ebitda 80` to behave like `mval tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Value(args) => handle_value(args, OutputMode::Full),
        Command::Features(args) => handle_value(args, OutputMode::FeaturesOnly),
        Command::Show(args) => handle_show(args),
        Command::Industries => handle_industries(),
        Command::Tui(args) => crate::tui::run(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    FeaturesOnly,
}

fn handle_value(args: ValueArgs, mode: OutputMode) -> Result<(), AppError> {
    let industry = match args.industry {
        Some(code) => IndustryCode::new(code)?,
        None => crate::cli::picker::prompt_for_industry()?,
    };
    let inputs = inputs_from_args(&args, industry);

    // The artifact is loaded once per process and shared read-only.
    let model_path = resolve_model_path(args.model.as_deref())?;
    let model = GbtModel::from_path(&model_path)?;

    let run = pipeline::run_valuation(&inputs, &model)?;

    if mode == OutputMode::Full {
        println!("{}", crate::report::format_summary(
            &run.inputs,
            run.log_multiple,
            &run.result,
            &model.describe(),
        ));
    }
    println!("{}", crate::report::format_feature_table(&run.features));

    // Optional exports.
    if let Some(path) = &args.export {
        crate::io::export::write_audit_csv(path, &run)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::record::write_valuation_json(path, &run)?;
    }

    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let file = crate::io::record::read_valuation_json(&args.file)?;
    let features = file.feature_vector()?;

    let source = format!("{} record, generated {}", file.tool, file.generated);
    println!("{}", crate::report::format_summary(
        &file.inputs,
        file.log_multiple,
        &file.result,
        &source,
    ));
    println!("{}", crate::report::format_feature_table(&features));
    Ok(())
}

fn handle_industries() -> Result<(), AppError> {
    for code in IndustryCode::all() {
        println!("{}", code.label());
    }
    Ok(())
}

/// Build validated-later inputs from CLI flags.
pub fn inputs_from_args(args: &ValueArgs, industry: IndustryCode) -> ValuationInputs {
    ValuationInputs {
        industry,
        real_rate: args.real_rate,
        sales: args.sales,
        ebitda: args.ebitda,
        net_income_after_tax: args.income,
        total_debt: args.debt,
        book_equity: args.book,
    }
}

/// Rewrite argv so `mval` defaults to `mval tui`.
///
/// Rules:
/// - `mval`                      -> `mval tui`
/// - `mval --ebitda 80 ...`      -> `mval tui --ebitda 80 ...`
/// - `mval --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "value" | "features" | "show" | "industries" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
