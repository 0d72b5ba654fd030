//! Obsidian note properties
//!
//! Every exported note may come with a sync record sidecar. It becomes the
//! YAML front matter of the vault file: category path segments as `tags`,
//! creation and access times, and the source url.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{Error, ErrorDetail};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SIDECAR_SUFFIX: &str = ".meta.yaml";

/// Sync record of one note, as stored next to its raw export.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncRecord {
    /// Folder path such as `/Work/Weekly/`.
    pub category: String,
    /// Epoch milliseconds.
    pub created: i64,
    pub accessed: i64,
    #[serde(default)]
    pub url: Option<String>,
}

/// `notes/a.json` is described by `notes/a.meta.yaml`.
pub fn sidecar_path(note_path: &Path) -> PathBuf {
    let stem = note_path.file_stem().unwrap_or_default().to_string_lossy();
    note_path.with_file_name(format!("{stem}{SIDECAR_SUFFIX}"))
}

pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(SIDECAR_SUFFIX))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteProperty {
    #[serde(rename = "CREATE_TIME")]
    pub create_time: String,
    #[serde(rename = "UPDATE_TIME")]
    pub update_time: String,
    pub tags: Vec<String>,
    pub url: String,
}

impl NoteProperty {
    pub fn from_sync_record(record: &SyncRecord) -> Result<Self, Error> {
        Self::from_sync_record_in(record, &Local)
    }

    pub fn from_sync_record_in<Tz: TimeZone>(record: &SyncRecord, tz: &Tz) -> Result<Self, Error>
    where
        Tz::Offset: Display,
    {
        Ok(Self {
            create_time: format_date(record.created, tz)?,
            update_time: format_date(record.accessed, tz)?,
            tags: record
                .category
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(ToOwned::to_owned)
                .collect(),
            url: record.url.clone().unwrap_or_default(),
        })
    }

    /// `---` delimited YAML. Quotes are stripped so Obsidian reads the dates as dates.
    pub fn to_front_matter(&self) -> Result<String, Error> {
        let yaml = serde_yaml::to_string(self).map_err(ErrorDetail::FrontMatter)?;
        Ok(format!("---\n{}---\n", yaml.replace('\'', "")))
    }
}

fn format_date<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<String, ErrorDetail>
where
    Tz::Offset: Display,
{
    let time = tz
        .timestamp_millis_opt(millis)
        .single()
        .ok_or(ErrorDetail::InvalidTimestamp(millis))?;
    Ok(time.format(DATE_FORMAT).to_string())
}
