//! PDF worker request and response types

use std::sync::Arc;

use super::types::{DocumentInfo, PixelSize, RenderedPage};
use crate::session::{Command, Generation, LoadedFile, SelectedFile};

/// Unique identifier for render requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Request sent to the PDF worker
#[derive(Debug)]
pub enum PdfRequest {
    /// Read the file and parse it. A successful parse is staged, not used.
    Open { request: u64, file: SelectedFile },

    /// Replace the current document with the parse staged by load `request`
    Activate { request: u64 },

    /// Render a 1-based page of the current document
    Render {
        id: RequestId,
        generation: Generation,
        page: usize,
        container: PixelSize,
        overlay: bool,
    },

    /// Drop the current document
    Close,

    /// Shutdown the worker
    Shutdown,
}

/// Response from the PDF worker
#[derive(Debug)]
pub enum PdfResponse {
    Opened {
        request: u64,
        info: DocumentInfo,
        file: LoadedFile,
    },

    OpenFailed {
        request: u64,
        detail: String,
    },

    Rendered {
        id: RequestId,
        generation: Generation,
        frame: Arc<RenderedPage>,
    },

    RenderFailed {
        id: RequestId,
        generation: Generation,
        detail: String,
    },
}

impl PdfResponse {
    /// Session command carried by this response, if any.
    /// Render results go to the viewport instead.
    pub fn into_command(self) -> Result<Command, Self> {
        match self {
            Self::Opened {
                request,
                info,
                file,
            } => Ok(Command::DocumentOpened {
                request,
                info,
                file,
            }),
            Self::OpenFailed { request, detail } => Ok(Command::DocumentFailed { request, detail }),
            other => Err(other),
        }
    }
}
