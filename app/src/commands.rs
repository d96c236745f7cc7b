//! FILENAME: app/src/commands.rs
//! Command-line surface: argument parsing and command dispatch.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use persistence::{AttributeFilter, AttributeQuery, QueryOp};
use records::RecordField;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::pipeline;
use crate::{log_enter_info, log_exit_info};

/// survey-pivot: cross-tabulate survey records into chart-ready JSON
#[derive(Parser, Debug)]
#[command(name = "survey-pivot", version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every dashboard chart from a sheet or JSON export
    Charts {
        /// Rows as .json or .xlsx
        #[arg(short, long)]
        input: PathBuf,

        /// Workbook sheet (overrides the config)
        #[arg(long)]
        sheet: Option<String>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Persist rows into a record store
    Import {
        #[arg(short, long)]
        input: PathBuf,

        /// Store file
        #[arg(short, long)]
        store: PathBuf,

        #[arg(long)]
        sheet: Option<String>,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Repopulate a store that already exists
        #[arg(long)]
        replace: bool,
    },
    /// Print stored records matching a filter
    Query {
        #[arg(short, long)]
        store: PathBuf,

        #[arg(long = "domain")]
        domain: Vec<String>,

        #[arg(long = "data-type")]
        data_types: Vec<String>,

        #[arg(long = "paradigm")]
        paradigms: Vec<String>,

        #[arg(long = "encoding")]
        encodings: Vec<String>,

        #[arg(long = "evaluator")]
        evaluators: Vec<String>,

        /// Single-field comparison instead of the attribute filter
        #[arg(long, requires = "op")]
        field: Option<String>,

        #[arg(long, value_enum, requires = "field")]
        op: Option<OpArg>,

        /// Operand(s) of --op
        #[arg(long = "value")]
        values: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpArg {
    Equals,
    StartsWith,
    NotEqual,
    NoneOf,
}

impl From<OpArg> for QueryOp {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Equals => QueryOp::EqualsIgnoreCase,
            OpArg::StartsWith => QueryOp::StartsWithIgnoreCase,
            OpArg::NotEqual => QueryOp::NotEqual,
            OpArg::NoneOf => QueryOp::NoneOf,
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

pub fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Charts {
            input,
            sheet,
            config,
            output,
        } => {
            log_enter_info!("CMD", "charts", "input={}", input.display());
            let config = load_config(config.as_deref(), sheet)?;
            let records = pipeline::load_records(&input, &config)?;
            let dashboard = pipeline::build_dashboard(&records, &config)?;
            write_json(&dashboard, output.as_deref())?;
            log_exit_info!("CMD", "charts", "records={}", records.len());
        }
        Command::Import {
            input,
            store,
            sheet,
            config,
            replace,
        } => {
            log_enter_info!("CMD", "import", "input={}", input.display());
            let config = load_config(config.as_deref(), sheet)?;
            let records = pipeline::load_records(&input, &config)?;
            let summary = pipeline::import(&records, &store, replace)?;
            write_json(&summary, None)?;
            log_exit_info!("CMD", "import");
        }
        Command::Query {
            store,
            domain,
            data_types,
            paradigms,
            encodings,
            evaluators,
            field,
            op,
            values,
            output,
        } => {
            log_enter_info!("CMD", "query", "store={}", store.display());
            let results = match (field, op) {
                (Some(field), Some(op)) => {
                    let field = RecordField::from_name(&field)
                        .ok_or_else(|| AppError::Config(format!("unknown record field '{}'", field)))?;
                    pipeline::query_attribute(&store, &AttributeQuery::new(field, op.into(), values))?
                }
                _ => {
                    let filter = AttributeFilter {
                        domain,
                        data_types,
                        paradigms,
                        encodings,
                        evaluators,
                    };
                    pipeline::query(&store, &filter)?
                }
            };
            write_json(&results, output.as_deref())?;
            log_exit_info!("CMD", "query", "matched={}", results.len());
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, sheet: Option<String>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load_or_default(path)?;
    if sheet.is_some() {
        config.sheet = sheet;
    }
    Ok(config)
}

/// Pretty JSON to `output`, or stdout.
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, json)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}
