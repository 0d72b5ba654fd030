use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::{Error, ErrorDetail, fixer};

use super::NoteParser;

static BODY_PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body pre").unwrap());

/// Lite notes are Markdown stored verbatim in the first `<pre>` of an HTML page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteNoteParser;

impl LiteNoteParser {
    pub fn extract_markdown(origin_content: &str) -> Result<String, ErrorDetail> {
        let document = Html::parse_document(origin_content);
        let pre = document
            .select(&BODY_PRE)
            .next()
            .ok_or(ErrorDetail::MissingPre)?;
        Ok(pre.text().collect())
    }
}

impl NoteParser for LiteNoteParser {
    fn parse_content(&self, origin_content: &str) -> Result<String, Error> {
        let markdown = Self::extract_markdown(origin_content)?;
        Ok(fixer::fix(&markdown))
    }
}
