use crate::{Error, ErrorDetail, fixer};

use super::NoteParser;

/// Rich HTML notes; conversion is delegated to `htmd`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlNoteParser;

impl NoteParser for HtmlNoteParser {
    fn parse_content(&self, origin_content: &str) -> Result<String, Error> {
        let markdown = htmd::convert(origin_content).map_err(ErrorDetail::Html)?;
        Ok(fixer::fix(&markdown))
    }
}
