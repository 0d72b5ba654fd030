use crate::{
    Error, ErrorDetail,
    collab::{
        inline::{format_run, format_runs},
        model::{Checkbox, ListBlock},
    },
};

use super::RenderContext;

pub(super) fn render(block: &ListBlock, ctx: &RenderContext<'_>) -> Result<String, Error> {
    let indent = " ".repeat(block.level.saturating_sub(1) as usize * 2);
    if block.ordered.unwrap_or(false) {
        let start = block
            .start
            .ok_or_else(|| ctx.error(ErrorDetail::MissingField("start")))?;
        // Ordered items end every run with a newline, not just the item.
        let mut out = format!("{indent}{start}. ");
        for run in &block.text {
            out.push_str(&format_run(run));
            out.push('\n');
        }
        Ok(out)
    } else {
        let mut out = format!("{indent}- ");
        match block.checkbox().map_err(|detail| ctx.error(detail))? {
            Some(Checkbox::Checked) => out.push_str("[x] "),
            Some(Checkbox::Unchecked) => out.push_str("[ ] "),
            None => {}
        }
        out.push_str(&format_runs(&block.text));
        out.push('\n');
        Ok(out)
    }
}
