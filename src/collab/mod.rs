//! Collaborative note conversion
//!
//! Collaborative notes arrive as a JSON envelope around a block document.
//! The document is rendered block by block (see [`render`]) and the result is
//! passed through the shared [`fixer`](crate::fixer) pipeline.

use tracing::{debug, trace};

use crate::{Error, ErrorDetail, config::ConvertOptions, fixer, note::NoteParser};

pub mod inline;
pub mod model;
pub mod render;

use model::{Document, Envelope};
use render::{RenderContext, convert_document};

#[derive(Debug, Clone, Default)]
pub struct CollaborationNoteParser {
    options: ConvertOptions,
}

impl CollaborationNoteParser {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Parse the service envelope into the wrapped document.
    pub fn parse_envelope(origin_content: &str) -> Result<Document, Error> {
        let envelope: Envelope =
            serde_json::from_str(origin_content).map_err(ErrorDetail::ParseJson)?;
        Ok(envelope.into_document())
    }

    /// Render the document without the fixer pass.
    pub fn convert(&self, document: &Document) -> Result<String, Error> {
        convert_document(&RenderContext::new(document, &self.options))
    }
}

impl NoteParser for CollaborationNoteParser {
    fn parse_content(&self, origin_content: &str) -> Result<String, Error> {
        trace!(origin_content, "collaboration note");
        let document = Self::parse_envelope(origin_content)?;
        debug!(
            blocks = document.blocks.len(),
            comments = document.comments.len(),
            "parsed collaboration document"
        );
        let markdown = self.convert(&document)?;
        Ok(fixer::fix(&markdown))
    }
}
