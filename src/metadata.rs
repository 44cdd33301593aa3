//! Tag record loading and entry resolution.
//!
//! Stage 2 of the pipeline. Each [`Entry`] from the scan is turned into a
//! [`ResolvedEntry`] whose fields are all defaulted. Resolution never fails:
//! every problem degrades to a documented default so one broken record can
//! not block rendering the rest of the gallery.
//!
//! ## Tag records
//!
//! `prompts/<id>.tags.json` is a JSON object:
//!
//! ```json
//! {
//!   "id": "0007",
//!   "seed": "images/0007-ref.png",
//!   "title": "Harbor at night",
//!   "tags": ["harbor", "night", "illustration"]
//! }
//! ```
//!
//! Every field is optional. `id` is never read back; the file name is the
//! source of truth.
//!
//! ## Resolution priority
//!
//! Each field is resolved independently:
//!
//! - **Seed**: record `seed` if the file exists → shared fallback
//!   `images/02seed.{png,jpg,jpeg,webp}` → none
//! - **Title**: record `title` → derived from prompt text → none
//! - **Tags**: record `tags` if it is an array → empty
//!
//! | Problem | Result |
//! |---------|--------|
//! | no tags file | empty record, `Absent` |
//! | unreadable tags file | empty record, `Unreadable` |
//! | invalid JSON or not an object | empty record, `Malformed` |
//! | `seed` names a missing file | fallback seed, `MissingFile` |
//! | `tags` is not an array | `[]`, `Malformed` |

use crate::config::Gallery;
use crate::extract;
use crate::naming;
use crate::types::{DefaultReason, Entry, Outcome, ResolvedEntry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tag record as written by this tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Loosely-typed view of a tag record as found on disk.
///
/// Fields are read individually so a wrong shape in one field does not
/// discard the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    pub fn parse(content: &str) -> Result<Self, DefaultReason> {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            _ => Err(DefaultReason::Malformed),
        }
    }

    /// A string field, `None` when absent, empty, or not a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// The `tags` array, keeping only string items.
    pub fn tags(&self) -> Outcome<Vec<String>> {
        match self.0.get("tags") {
            Some(Value::Array(items)) => Outcome::found(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            Some(_) => Outcome::defaulted(Vec::new(), DefaultReason::Malformed),
            None => Outcome::defaulted(Vec::new(), DefaultReason::Absent),
        }
    }
}

/// Resolve a metadata field from multiple sources.
///
/// Takes a list of optional values in priority order and returns the first
/// non-None, non-empty value, trimmed.
pub fn resolve_first(sources: &[Option<&str>]) -> Option<String> {
    sources
        .iter()
        .filter_map(|opt| {
            opt.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .next()
}

/// Read and parse a tag record. Never fails.
pub fn read_record(path: Option<&Path>) -> Outcome<RawRecord> {
    let Some(path) = path else {
        return Outcome::defaulted(RawRecord::default(), DefaultReason::Absent);
    };
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            let reason = if e.kind() == io::ErrorKind::NotFound {
                DefaultReason::Absent
            } else {
                DefaultReason::Unreadable
            };
            tracing::debug!(path = %path.display(), error = %e, "tag record not readable");
            return Outcome::defaulted(RawRecord::default(), reason);
        }
    };
    match RawRecord::parse(&content) {
        Ok(record) => Outcome::found(record),
        Err(reason) => {
            tracing::debug!(path = %path.display(), "malformed tag record, using defaults");
            Outcome::defaulted(RawRecord::default(), reason)
        }
    }
}

/// Probe the image directory for the shared fallback seed.
///
/// Returns the first `<fallback>.<ext>` that exists, as a root-relative link.
pub fn find_seed_fallback(gallery: &Gallery) -> Option<String> {
    let base = gallery.config.seed.fallback.trim();
    if base.is_empty() {
        return None;
    }
    let images = gallery.images_path();
    gallery
        .config
        .seed
        .extensions
        .iter()
        .map(|ext| format!("{base}.{ext}"))
        .find(|name| images.join(name).exists())
        .map(|name| gallery.image_link(&name))
}

/// Resolve a seed: the declared path if it exists under the root, otherwise
/// the shared fallback.
pub fn resolve_seed(gallery: &Gallery, declared: Option<&str>) -> Option<Outcome<String>> {
    if let Some(seed) = declared {
        if gallery.root.join(seed).exists() {
            return Some(Outcome::found(seed.to_string()));
        }
        tracing::debug!(seed, "declared seed does not exist");
    }
    let reason = if declared.is_some() {
        DefaultReason::MissingFile
    } else {
        DefaultReason::Absent
    };
    find_seed_fallback(gallery).map(|link| Outcome::defaulted(link, reason))
}

/// Read a prompt file folded onto one line. Missing or unreadable → empty.
pub fn read_prompt_text(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text.replace(['\r', '\n'], " "),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "prompt not readable");
            String::new()
        }
    }
}

/// Resolve one scanned entry into a fully defaulted entry.
pub fn resolve(gallery: &Gallery, entry: &Entry) -> ResolvedEntry {
    let prompts = gallery.prompts_path();
    let tags_path = entry.tags.as_ref().map(|name| prompts.join(name));

    let (record, raw) = match read_record(tags_path.as_deref()) {
        Outcome::Found { value } => (Outcome::found(()), value),
        Outcome::Defaulted { value, reason } => (Outcome::defaulted((), reason), value),
    };

    let prompt_text = entry
        .prompt
        .as_ref()
        .map(|name| read_prompt_text(&prompts.join(name)))
        .unwrap_or_default();

    let title = match resolve_first(&[raw.str_field("title")]) {
        Some(explicit) => Some(Outcome::found(explicit)),
        None => Some(extract::derive_title(&prompt_text))
            .filter(|t| !t.is_empty())
            .map(|t| Outcome::defaulted(t, DefaultReason::Derived)),
    };

    ResolvedEntry {
        id: entry.id.clone(),
        image: entry.image.as_ref().map(|name| gallery.image_link(name)),
        prompt: entry.prompt.as_ref().map(|name| gallery.prompt_link(name)),
        seed: resolve_seed(gallery, raw.str_field("seed")),
        title,
        tags: raw.tags(),
        record,
        prompt_text,
    }
}

/// Resolve every entry, preserving order.
pub fn resolve_all(gallery: &Gallery, entries: &[Entry]) -> Vec<ResolvedEntry> {
    entries.iter().map(|e| resolve(gallery, e)).collect()
}

// =============================================================================
// Record writing and normalization
// =============================================================================

/// Write a tag record as pretty JSON with a trailing newline.
pub fn write_record(path: &Path, record: &TagRecord) -> Result<(), MetadataError> {
    let mut json = serde_json::to_string_pretty(record)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

/// Normalized form of the record stored for `id`.
///
/// `id` comes from the file name, `seed` is re-resolved (fallback included),
/// `tags` is forced to a string array, and a non-empty `title` is kept.
pub fn normalize_record(gallery: &Gallery, id: &str, path: &Path) -> TagRecord {
    let raw = read_record(Some(path)).into_value();
    TagRecord {
        id: Some(id.to_string()),
        seed: resolve_seed(gallery, raw.str_field("seed")).map(Outcome::into_value),
        title: raw.str_field("title").map(String::from),
        tags: raw.tags().into_value(),
    }
}

/// Rewrite every tag record in the prompt directory in normalized form.
///
/// Returns the ids of the rewritten records, in id order.
pub fn normalize_records(gallery: &Gallery) -> Result<Vec<String>, MetadataError> {
    let prompts = gallery.prompts_path();
    let mut names: Vec<String> = fs::read_dir(&prompts)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| naming::is_tags_name(name))
        .collect();
    names.sort();

    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let id = &name[..naming::ID_WIDTH];
        let path = prompts.join(&name);
        let record = normalize_record(gallery, id, &path);
        write_record(&path, &record)?;
        ids.push(id.to_string());
    }
    Ok(ids)
}
