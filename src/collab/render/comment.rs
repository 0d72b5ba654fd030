//! Comment threads attached to text runs
//!
//! A run carrying a `comment-<id>` attribute points into the document's
//! comment table. The referenced comment is rendered as a quoted header line
//! followed by its body, then every reply sharing its `groupId`.

use std::borrow::Cow;

use chrono::{Datelike, Local, TimeZone, Timelike};
use itertools::Itertools;
use serde_json::Value;
use tracing::warn;

use crate::{
    collab::model::{Comment, Document, Run},
    warn_note,
};

const COMMENT_ATTR_PREFIX: &str = "comment-";
pub(crate) const UNKNOWN_TIME: &str = "时间未知";

pub(super) fn render_threads(runs: &[Run], document: &Document) -> String {
    let mut rendered = Vec::<&str>::new();
    let mut out = String::new();
    for id in runs.iter().flat_map(comment_ids) {
        if rendered.contains(&id) {
            continue;
        }
        let Some(comment) = document.comments.get(id) else {
            warn!(id, "comment not found");
            warn_note!("comment not found: {id}");
            continue;
        };
        rendered.push(id);
        out.push_str(&format_comment(comment, &Local));
        let Some(group) = comment.group_id.as_deref() else {
            continue;
        };
        for (reply_id, reply) in &document.comments {
            if reply_id != id && reply.group_id.as_deref() == Some(group) {
                rendered.push(reply_id);
                out.push_str(&format_comment(reply, &Local));
            }
        }
    }
    out
}

fn comment_ids(run: &Run) -> impl Iterator<Item = &str> {
    run.attributes.iter().flatten().filter_map(|(key, value)| {
        let suffix = key.strip_prefix(COMMENT_ATTR_PREFIX)?;
        match value {
            Value::String(id) if !id.is_empty() => Some(id.as_str()),
            Value::Null | Value::Bool(false) => None,
            _ => Some(suffix),
        }
    })
}

fn format_comment<Tz: TimeZone>(comment: &Comment, tz: &Tz) -> String {
    format!(
        "\n\n> {} {}\n\n{}\n",
        comment.display_name,
        format_timestamp_in(comment.created.as_ref(), tz),
        comment_body(comment)
    )
}

fn comment_body(comment: &Comment) -> String {
    comment
        .blocks
        .iter()
        .map(|block| block.text.iter().map(comment_run).collect::<String>())
        .join("\n")
}

fn comment_run(run: &Run) -> Cow<'_, str> {
    if run.attr_str("type") != Some("mention") {
        return Cow::Borrowed(&run.insert);
    }
    let name = run
        .attr_str("text")
        .or_else(|| run.attr_str("name"))
        .unwrap_or_else(|| run.insert.trim_start_matches('@'));
    Cow::Owned(format!("@{name}"))
}

/// Format epoch milliseconds as `YYYY/M/D 上午h:MM:SS` in the given zone.
pub fn format_timestamp_in<Tz: TimeZone>(created: Option<&Value>, tz: &Tz) -> String {
    created
        .and_then(epoch_millis)
        .and_then(|millis| tz.timestamp_millis_opt(millis).single())
        .map(|time| {
            let (pm, hour) = time.hour12();
            format!(
                "{}/{}/{} {}{}:{:02}:{:02}",
                time.year(),
                time.month(),
                time.day(),
                if pm { "下午" } else { "上午" },
                hour,
                time.minute(),
                time.second()
            )
        })
        .unwrap_or_else(|| UNKNOWN_TIME.to_owned())
}

fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
