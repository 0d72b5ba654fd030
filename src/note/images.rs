//! Vault image naming
//!
//! Exported images keep the service's opaque names under `index_files/`.
//! In the vault they live in `images/` as `YYYYMMDDHHMMSSmmm.ext` and notes
//! reference them as `./images/<name>`.

use std::path::Path;

use chrono::{NaiveDateTime, SubsecRound, TimeDelta};

/// Directory holding a note's images in the raw export.
pub const EXPORT_IMAGE_DIR: &str = "index_files";
/// Directory holding renamed images next to the converted notes.
pub const VAULT_IMAGE_DIR: &str = "images";

const NAME_FORMAT: &str = "%Y%m%d%H%M%S%3f";

pub fn image_url(file_name: &str) -> String {
    format!("./{VAULT_IMAGE_DIR}/{file_name}")
}

pub fn timestamped_name(original: &str, at: NaiveDateTime) -> String {
    let stem = at.format(NAME_FORMAT);
    match Path::new(original).extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_string(),
    }
}

/// Hands out timestamped names that never repeat, even within one millisecond.
#[derive(Debug, Default)]
pub struct ImageRenamer {
    last: Option<NaiveDateTime>,
}

impl ImageRenamer {
    pub fn next_name(&mut self, original: &str, now: NaiveDateTime) -> String {
        let now = now.trunc_subsecs(3);
        let at = match self.last {
            Some(last) if now <= last => last + TimeDelta::milliseconds(1),
            _ => now,
        };
        self.last = Some(at);
        timestamped_name(original, at)
    }
}
