//! PDF parsing and rendering infrastructure

mod engine;
mod request;
mod service;
mod types;
mod viewport;
mod worker;

pub use engine::{EngineError, MupdfEngine, PageSource, PdfEngine};
pub use request::{PdfRequest, PdfResponse, RequestId};
pub use service::PdfService;
pub use types::*;
pub use viewport::{Viewport, fit_scale, render_page};
