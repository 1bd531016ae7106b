//! sheetcalc - evaluate spreadsheet formulas from the command line

mod config;
mod logging;

use anyhow::{Context, bail};
use clap::Parser;
use sheetcalc_core::{CellRef, Document};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "sheetcalc", version, about = "Evaluate spreadsheet formulas")]
struct Cli {
    /// Spreadsheet file to load (.grd)
    file: Option<PathBuf>,

    /// Print the value of a cell (can be repeated)
    #[arg(long = "cell", value_name = "ADDR")]
    cells: Vec<String>,

    /// Evaluate a formula against the loaded sheet
    #[arg(short = 'c', long = "calc", value_name = "FORMULA", allow_hyphen_values = true)]
    formula: Option<String>,

    /// Export display values to a markdown file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Report reference cycles; exits with status 2 if any exist
    #[arg(long)]
    check: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn has_action(&self) -> bool {
        !self.cells.is_empty() || self.formula.is_some() || self.output.is_some() || self.check
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = config::Config::load(cli.config.as_deref())?;
    logging::init(config.log_level.as_deref());
    debug!(?config, "loaded config");

    let doc = match &cli.file {
        Some(path) => {
            let mut doc = Document::with_defaults(config.format_defaults());
            doc.load_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            doc
        }
        None if cli.has_action() => Document::with_defaults(config.format_defaults()),
        None => bail!("Nothing to do: pass a FILE or an action (see --help)"),
    };

    if !cli.has_action() {
        for cell_ref in doc.cell_refs() {
            println!("{}: {}", cell_ref, doc.cell_display(&cell_ref));
        }
        return Ok(ExitCode::SUCCESS);
    }

    for address in &cli.cells {
        let cell_ref = CellRef::parse_address(address)?;
        println!("{}", doc.cell_display(&cell_ref));
    }

    if let Some(formula) = &cli.formula {
        println!("{}", doc.preview_formula(formula));
    }

    if let Some(output) = &cli.output {
        doc.export_markdown(output)
            .with_context(|| format!("Failed to export {}", output.display()))?;
        println!("Exported to {}", output.display());
    }

    if cli.check {
        let cycles = doc.find_cycles();
        for cycle in &cycles {
            let path: Vec<String> = cycle.iter().map(CellRef::to_string).collect();
            println!("{}", path.join(" -> "));
        }
        if !cycles.is_empty() {
            return Ok(ExitCode::from(2));
        }
    }

    Ok(ExitCode::SUCCESS)
}
