//! Block rendering
//!
//! Every block kind has its own renderer; [`render_block`] picks one by
//! matching on the block and [`convert_document`] concatenates the results.
//! Snapshot embeds re-enter [`convert_document`] with a nested context.

use tracing::warn;

use crate::{Error, ErrorContext, ErrorDetail, config::ConvertOptions, warn_note};

use super::model::{Block, Document};

mod code;
mod comment;
mod embed;
mod list;
mod table;
mod text;

pub use comment::format_timestamp_in;

/// Shared state handed to every block renderer.
#[derive(Clone)]
pub struct RenderContext<'a> {
    pub document: &'a Document,
    pub options: &'a ConvertOptions,
    depth: usize,
    error: ErrorContext,
}

impl<'a> RenderContext<'a> {
    pub fn new(document: &'a Document, options: &'a ConvertOptions) -> Self {
        Self {
            document,
            options,
            depth: 0,
            error: ErrorContext::default(),
        }
    }

    /// Context for a document embedded in the current one.
    fn nested<'b>(&self, document: &'b Document) -> Result<RenderContext<'b>, Error>
    where
        'a: 'b,
    {
        let depth = self.depth + 1;
        if depth > self.options.max_embed_depth {
            return Err(self.error(ErrorDetail::EmbedDepthExceeded(
                self.options.max_embed_depth,
            )));
        }
        Ok(RenderContext {
            document,
            options: self.options,
            depth,
            error: self.error.clone(),
        })
    }

    fn at_block(&self, index: usize) -> Self {
        Self {
            error: self.error.with_block(index),
            ..self.clone()
        }
    }

    pub(crate) fn error(&self, detail: ErrorDetail) -> Error {
        self.error.error(detail)
    }
}

/// Render every top-level block of the context's document, in order.
pub fn convert_document(ctx: &RenderContext<'_>) -> Result<String, Error> {
    let mut out = String::new();
    for (index, block) in ctx.document.blocks.iter().enumerate() {
        out.push_str(&render_block(block, &ctx.at_block(index))?);
    }
    Ok(out)
}

pub fn render_block(block: &Block, ctx: &RenderContext<'_>) -> Result<String, Error> {
    match block {
        Block::Text(block) => Ok(text::render(block, ctx)),
        Block::List(block) => list::render(block, ctx),
        Block::Code(block) => code::render(block, ctx),
        Block::Table(block) => table::render(block, ctx),
        Block::Embed(block) => embed::render(block, ctx),
        Block::Unknown(kind) => {
            warn!(kind, location = %ctx.error, "unsupported block type");
            warn_note!("unsupported block type: {kind}");
            Ok(String::new())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::{RenderContext, convert_document};
    use crate::{Error, collab::model::Document, config::ConvertOptions, warning::collect_warnings};

    pub(crate) fn convert(value: serde_json::Value) -> Result<String, Error> {
        let document: Document = serde_json::from_value(value).unwrap();
        let options = ConvertOptions::default();
        convert_document(&RenderContext::new(&document, &options))
    }

    #[test]
    fn test_heading_document() {
        let markdown = convert(json!({
            "blocks": [{"type": "text", "heading": 2, "text": [{"insert": "Title"}]}]
        }))
        .unwrap();
        assert!(markdown.contains("## Title\n"));
    }

    #[test]
    fn test_blocks_concatenate_in_order() {
        let markdown = convert(json!({
            "blocks": [
                {"type": "text", "text": [{"insert": "first"}]},
                {"type": "list", "level": 1, "text": [{"insert": "second"}]},
                {"type": "embed", "embedType": "hr", "embedData": {}}
            ]
        }))
        .unwrap();
        assert_eq!(markdown, "\nfirst\n- second\n\n\n---\n\n");
    }

    #[test]
    fn test_unknown_block_type_is_skipped() {
        let (markdown, warnings) = collect_warnings(|| {
            convert(json!({
                "blocks": [
                    {"type": "whiteboard", "shapes": []},
                    {"type": "text", "text": [{"insert": "after"}]}
                ]
            }))
        });
        assert_eq!(markdown.unwrap(), "\nafter\n");
        assert_eq!(warnings, vec!["unsupported block type: whiteboard".to_string()]);
    }

    #[test]
    fn test_error_carries_block_location() {
        let error = convert(json!({
            "blocks": [
                {"type": "text", "text": []},
                {"type": "code", "language": "", "children": ["missing"]}
            ]
        }))
        .unwrap_err();
        assert_eq!(error.to_string(), "blocks[1]: Node not found: missing");
    }
}
