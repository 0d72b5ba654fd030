use itertools::Itertools;

use crate::{Error, ErrorDetail, collab::model::TableBlock};

use super::RenderContext;

const SEPARATOR_CELL: &str = "-----";

pub(super) fn render(block: &TableBlock, ctx: &RenderContext<'_>) -> Result<String, Error> {
    let cols = block.cols;
    if cols == 0 {
        return Err(ctx.error(ErrorDetail::InvalidTable(cols)));
    }
    let cells = block
        .children
        .iter()
        .map(|id| cell_text(id, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let (header, body) = cells.split_at(cols.min(cells.len()));

    let mut table = format!("|{}|\n", header.join("|"));
    table.push_str(&format!(
        "| {} |\n",
        std::iter::repeat_n(SEPARATOR_CELL, cols).join(" | ")
    ));
    for row in body.chunks(cols) {
        table.push_str(&format!("|{}|\n", row.join("|")));
    }
    Ok(format!("\n{table}\n"))
}

/// Raw text of the first run of the first paragraph in a cell.
fn cell_text(id: &str, ctx: &RenderContext<'_>) -> Result<String, Error> {
    let groups = ctx
        .document
        .run_groups(id)
        .map_err(|detail| ctx.error(detail))?;
    Ok(groups
        .first()
        .and_then(|group| group.text.first())
        .map(|run| run.insert.clone())
        .unwrap_or_default())
}
