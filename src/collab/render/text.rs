use crate::collab::{inline::format_runs, model::TextBlock};

use super::{RenderContext, comment};

pub(super) fn render(block: &TextBlock, ctx: &RenderContext<'_>) -> String {
    let runs = format_runs(&block.text);
    let body = if block.quoted.unwrap_or(false) {
        format!("> {runs}\n")
    } else if let Some(level @ 1..=6) = block.heading {
        format!("{} {runs}\n", "#".repeat(level as usize))
    } else {
        runs
    };
    let mut out = format!("\n{body}\n");
    out.push_str(&comment::render_threads(&block.text, ctx.document));
    out
}
