//! Command-line parsing for the valuation calculator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the valuation/scoring code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mval", version, about = "Machine-learned enterprise valuation calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Value a firm from flags, print the summary and feature audit table.
    Value(ValueArgs),
    /// Print the derived feature table only (useful for scripting).
    Features(ValueArgs),
    /// Re-render a previously saved valuation JSON.
    Show(ShowArgs),
    /// List the Fama-French 49 industry catalog.
    Industries,
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying valuation pipeline as `mval value`, but
    /// renders results in a terminal UI using Ratatui.
    Tui(ValueArgs),
}

/// Common options for valuing and feature inspection.
///
/// Defaults are the calculator's reference firm: $600mn sales, $100mn EBITDA,
/// $40mn income, $200mn debt, $300mn book equity at a 2% real rate.
#[derive(Debug, Parser, Clone)]
pub struct ValueArgs {
    /// Fama-French 49 industry code (1-49). Prompts interactively when omitted.
    #[arg(short = 'i', long)]
    pub industry: Option<u8>,

    /// 1-year real Treasury yield as a fraction (0.02 = 2%).
    #[arg(long, default_value_t = 0.02, allow_negative_numbers = true)]
    pub real_rate: f64,

    /// Sales - $ mn.
    #[arg(long, default_value_t = 600.0)]
    pub sales: f64,

    /// EBITDA - $ mn (must be positive and not exceed sales).
    #[arg(long, default_value_t = 100.0)]
    pub ebitda: f64,

    /// Net income after tax - $ mn (may be negative, never above EBITDA).
    #[arg(long, default_value_t = 40.0, allow_negative_numbers = true)]
    pub income: f64,

    /// Total debt - $ mn.
    #[arg(long, default_value_t = 200.0)]
    pub debt: f64,

    /// Book value of equity - $ mn.
    #[arg(long, default_value_t = 300.0)]
    pub book: f64,

    /// Model artifact JSON (defaults to $MVAL_MODEL_FILE, .env supported).
    #[arg(short = 'm', long)]
    pub model: Option<PathBuf>,

    /// Export the feature/result audit table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full valuation record to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

/// Options for re-rendering a saved valuation.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Valuation JSON produced by `mval value --export-json` or a TUI save.
    #[arg(value_name = "JSON")]
    pub file: PathBuf,
}
