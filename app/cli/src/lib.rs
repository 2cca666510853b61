//! FILENAME: app/cli/src/lib.rs
// PURPOSE: Library half of the caremarket binary, so integration tests can
// drive the commands without spawning a process.

pub mod logging;

pub mod cli;
pub mod commands;
pub mod error;
pub mod report;

pub use cli::{AnalyzeArgs, Cli, Command, ExportArgs, OutputFormat};
pub use commands::{analyze_table, build_request, export, load_selection, run, ExportSummary};
pub use error::AppError;
pub use report::{render_text, NO_DATA_MESSAGE};
