//! Report output.
//!
//! One run produces one [`AnalysisReport`](crate::types::AnalysisReport);
//! this module writes it as pretty-printed JSON (`--emit-report`, `--json`)
//! and renders the sectioned text summary the CLI prints by default.

mod generator;
mod text;

pub use generator::ReportWriter;
pub use text::render_summary;
