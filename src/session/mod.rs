//! Document session: selection, loaded document, page counters, results

mod file;
mod state;

pub use file::{LoadedFile, PDF_CONTENT_TYPE, SelectedFile, content_type_for};
pub use state::{Command, Controls, Direction, Effect, ExtractionState, Generation, Session};
