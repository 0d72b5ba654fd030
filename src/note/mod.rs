//! Note parsers
//!
//! Every source format implements [`NoteParser`]: `parse_content` turns the
//! raw note into fixed Markdown and the provided `process_content` adds the
//! format-agnostic image scan and the warnings raised along the way.

use std::collections::HashMap;

use tracing::info;

use crate::{Error, collab::CollaborationNoteParser, config::ConvertOptions, warning};

mod html;
pub mod images;
mod lite;
pub mod property;
pub mod references;

pub use html::HtmlNoteParser;
pub use lite::LiteNoteParser;
pub use property::{NoteProperty, SyncRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteType {
    Collaboration,
    Lite,
    Html,
}

impl NoteType {
    /// Map the service's note type tag; anything unrecognised is an HTML note.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "collaboration" => Self::Collaboration,
            "lite/markdown" => Self::Lite,
            _ => Self::Html,
        }
    }
}

pub trait NoteParser: Send + Sync {
    fn parse_content(&self, origin_content: &str) -> Result<String, Error>;

    fn process_content(&self, origin_content: &str) -> Result<ParsedNote, Error> {
        let (content, warnings) =
            warning::collect_warnings(|| self.parse_content(origin_content));
        let content = content?;
        let need_upload_images = references::extract_images(&content);
        Ok(ParsedNote {
            content,
            need_upload_images,
            warnings,
        })
    }
}

pub fn parser_for(note_type: NoteType, options: &ConvertOptions) -> Box<dyn NoteParser> {
    match note_type {
        NoteType::Collaboration => Box::new(CollaborationNoteParser::new(options.clone())),
        NoteType::Lite => Box::new(LiteNoteParser),
        NoteType::Html => Box::new(HtmlNoteParser),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNote {
    pub content: String,
    /// Local image names referenced by the note, first occurrence order.
    pub need_upload_images: Vec<String>,
    pub warnings: Vec<String>,
}

impl ParsedNote {
    /// Point image references at their uploaded location.
    ///
    /// Both `(name)` and `(index_files/name)` targets are rewritten; images
    /// without an uploaded URL keep their local reference.
    pub fn replace_image_url(&mut self, uploaded: &HashMap<String, String>) {
        info!(images = ?self.need_upload_images, "replace image urls");
        for name in &self.need_upload_images {
            let Some(url) = uploaded.get(name) else {
                info!(name, "image was not uploaded");
                continue;
            };
            self.content = self
                .content
                .replace(&format!("(index_files/{name})"), &format!("({url})"))
                .replace(&format!("({name})"), &format!("({url})"));
        }
    }

    pub fn prepend_front_matter(&mut self, property: &NoteProperty) -> Result<(), Error> {
        self.content.insert_str(0, &property.to_front_matter()?);
        Ok(())
    }
}
