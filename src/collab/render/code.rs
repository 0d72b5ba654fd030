use itertools::Itertools;

use crate::{Error, ErrorDetail, collab::model::CodeBlock};

use super::RenderContext;

pub(super) fn render(block: &CodeBlock, ctx: &RenderContext<'_>) -> Result<String, Error> {
    let id = block
        .children
        .first()
        .ok_or_else(|| ctx.error(ErrorDetail::EmptyChildren("code")))?;
    let lines = ctx
        .document
        .run_groups(id)
        .map_err(|detail| ctx.error(detail))?;
    let language = block.language.as_deref().unwrap_or_default();
    // Only the first run of a line carries code text.
    let body = lines
        .iter()
        .map(|line| line.text.first().map(|run| run.insert.as_str()).unwrap_or_default())
        .join("\n");
    Ok(format!("```{language}\n{body}\n```\n\n"))
}
