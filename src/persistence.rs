//! File I/O for scenario reports.
//!
//! A report is stored as pretty-printed JSON. Next to it, a text file lists
//! the board at every step of the solution chain for quick inspection.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::PersistenceError;
use crate::grid::format_board;
use crate::scenarios::ScenarioReport;

/// Saves the report as JSON at `path` and the chain boards alongside it.
///
/// Returns the path of the text file.
pub fn save_report(path: &Path, report: &ScenarioReport) -> Result<PathBuf, PersistenceError> {
    save_json(path, report)?;
    let text_path = path.with_extension("txt");
    save_text(&text_path, report)?;
    Ok(text_path)
}

fn save_json(path: &Path, report: &ScenarioReport) -> Result<(), PersistenceError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;
    Ok(())
}

/// Writes the solution chain as human-readable boards.
fn save_text(path: &Path, report: &ScenarioReport) -> Result<(), PersistenceError> {
    let mut file = BufWriter::new(File::create(path)?);
    write!(file, "{}", format_chain(report))?;
    file.flush()?;
    Ok(())
}

/// Formats every board along the solution chain.
pub fn format_chain(report: &ScenarioReport) -> String {
    let chain = report.trace.chain();
    let mut output = format!("Solution chain: {} steps\n\n", chain.len());
    for (step, &id) in chain.iter().enumerate() {
        output.push_str(&format!("Step {} (node {id}):\n", step + 1));
        output.push_str(&format_board(&report.trace.node(id).board, &report.problem));
        output.push('\n');
    }
    output
}

/// Loads a report saved by [`save_report`].
pub fn load_report(path: &Path) -> Result<ScenarioReport, PersistenceError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
