pub mod collab;
pub mod config;
pub mod fixer;
pub mod note;
pub mod warning;

#[cfg(test)]
mod tests;

pub use collab::CollaborationNoteParser;
pub use note::{NoteParser, NoteProperty, NoteType, ParsedNote, SyncRecord, parser_for};

#[derive(Debug, thiserror::Error)]
#[error("{context}: {detail}")]
pub struct Error {
    pub context: Box<ErrorContext>,
    pub detail: Box<ErrorDetail>,
}

impl Error {
    pub fn degrades_to_placeholder(&self) -> bool {
        self.detail.degrades_to_placeholder()
    }
}

/// Location of the block being rendered, one index per snapshot nesting level.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    blocks: Vec<usize>,
}

impl ErrorContext {
    pub(crate) fn with_block(&self, index: usize) -> Self {
        let mut blocks = self.blocks.clone();
        blocks.push(index);
        Self { blocks }
    }

    pub(crate) fn error(&self, detail: ErrorDetail) -> Error {
        Error {
            context: Box::new(self.clone()),
            detail: Box::new(detail),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.blocks.is_empty() {
            return f.write_str("document");
        }
        for (depth, index) in self.blocks.iter().enumerate() {
            if depth > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "blocks[{index}]")?;
        }
        Ok(())
    }
}

impl From<ErrorDetail> for Error {
    fn from(detail: ErrorDetail) -> Self {
        ErrorContext::default().error(detail)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorDetail {
    #[error("Failed to parse document JSON: {0}")]
    ParseJson(serde_json::Error),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Unsupported checkbox value: {0}")]
    InvalidCheckbox(String),
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Node {0} is not a list of run groups: {1}")]
    InvalidNode(String, serde_json::Error),
    #[error("{0} block has no children")]
    EmptyChildren(&'static str),
    #[error("Invalid table column count: {0}")]
    InvalidTable(usize),
    #[error("Snapshot nesting exceeds {0} levels")]
    EmbedDepthExceeded(usize),
    #[error("No <pre> element found under <body>")]
    MissingPre,
    #[error("Failed to convert HTML: {0}")]
    Html(std::io::Error),
    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),
    #[error("Failed to serialize note properties: {0}")]
    FrontMatter(serde_yaml::Error),
}

impl ErrorDetail {
    /// Lookup and decoding failures inside a snapshot render as a placeholder;
    /// anything else fails the whole note.
    pub fn degrades_to_placeholder(&self) -> bool {
        matches!(
            self,
            Self::ParseJson(_)
                | Self::MissingField(_)
                | Self::NodeNotFound(_)
                | Self::InvalidNode(..)
                | Self::EmptyChildren(_)
        )
    }
}
