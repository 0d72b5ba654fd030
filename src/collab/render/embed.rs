use itertools::Itertools;
use serde::Deserialize;
use tracing::{error, warn};

use crate::{
    Error, ErrorDetail,
    collab::model::{Document, EmbedBlock, EmbedData, EmbedKind},
    note::references::ATTACHMENT_SCHEME,
    warn_note,
};

use super::{RenderContext, convert_document};

pub(crate) const SNAPSHOT_PLACEHOLDER: &str = "\n\n> Failed to parse snapshot\n\n";
const DRAWIO_LABEL: &str = "drawio";
const MERMAID_LABEL: &str = "mermaid";
/// Mermaid comment line standing in for a missing diagram.
const EMPTY_MERMAID: &str = "\n\n```mermaid\n%% empty diagram\n```\n\n";

pub(super) fn render(block: &EmbedBlock, ctx: &RenderContext<'_>) -> Result<String, Error> {
    let data = &block.embed_data;
    let markdown = match &block.embed_type {
        EmbedKind::Image => {
            let src = data
                .src
                .as_deref()
                .ok_or_else(|| ctx.error(ErrorDetail::MissingField("embedData.src")))?;
            let file_name = data.file_name.as_deref().unwrap_or_default();
            format!("\n\n![{file_name}]({src})\n\n")
        }
        EmbedKind::Toc => "\n\n[TOC]\n\n".to_owned(),
        EmbedKind::Hr => "\n\n---\n\n".to_owned(),
        EmbedKind::Office => {
            attachment_link(data.file_name.as_deref().unwrap_or_default(), data)
        }
        EmbedKind::Drawio => attachment_link(DRAWIO_LABEL, data),
        EmbedKind::Snapshot => render_snapshot(data, ctx)?,
        EmbedKind::EncryptText => String::new(),
        EmbedKind::Webpage => {
            format!("\n\n[webpage]({})\n\n", data.src.as_deref().unwrap_or_default())
        }
        EmbedKind::Mermaid => render_mermaid(data),
        EmbedKind::Other(kind) => {
            error!(kind, "unsupported embed type");
            warn_note!("unsupported embed type: {kind}");
            String::new()
        }
    };
    Ok(markdown)
}

/// Link in the private attachment scheme, picked up later by the attachment uploader.
fn attachment_link(label: &str, data: &EmbedData) -> String {
    format!(
        "\n\n[{label}]({ATTACHMENT_SCHEME}{})\n\n",
        data.src.as_deref().unwrap_or_default()
    )
}

fn render_mermaid(data: &EmbedData) -> String {
    match (data.mermaid_text.as_deref(), data.src.as_deref()) {
        (Some(text), _) if !text.is_empty() => format!("\n\n```mermaid\n{text}\n```\n\n"),
        (_, Some(src)) if !src.is_empty() => {
            format!("\n\n[{MERMAID_LABEL}]({ATTACHMENT_SCHEME}{src})\n\n")
        }
        _ => EMPTY_MERMAID.to_owned(),
    }
}

fn parse_snapshot(data: &EmbedData) -> Result<Document, ErrorDetail> {
    match &data.doc {
        Some(serde_json::Value::String(src)) => Document::from_json(src),
        Some(doc) => Document::deserialize(doc).map_err(ErrorDetail::ParseJson),
        None => Err(ErrorDetail::MissingField("embedData.doc")),
    }
}

fn render_snapshot(data: &EmbedData, ctx: &RenderContext<'_>) -> Result<String, Error> {
    let document = match parse_snapshot(data) {
        Ok(document) => document,
        Err(e) => {
            warn!(%e, "failed to parse snapshot");
            warn_note!("failed to parse snapshot: {e}");
            return Ok(SNAPSHOT_PLACEHOLDER.to_owned());
        }
    };
    let nested = ctx.nested(&document)?;
    let markdown = match convert_document(&nested) {
        Ok(markdown) => markdown,
        Err(e) if !e.degrades_to_placeholder() => return Err(e),
        Err(e) => {
            warn!(%e, "failed to render snapshot");
            warn_note!("failed to render snapshot: {e}");
            return Ok(SNAPSHOT_PLACEHOLDER.to_owned());
        }
    };
    let quoted = markdown
        .trim()
        .split('\n')
        .map(|line| format!("> {line}"))
        .join("\n");
    Ok(format!("\n\n{quoted}\n\n"))
}
