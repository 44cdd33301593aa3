//! Shared types used across pipeline stages.
//!
//! A scan produces [`Entry`] values, resolution turns each into a
//! [`ResolvedEntry`], and both renderers read only resolved entries.

use serde::Serialize;

/// Files found for one id. Built fresh on every scan.
///
/// Fields hold bare file names (`0001.jpg`), never paths. Absent fields are
/// left `None`; defaults are applied later by resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl Entry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Why a value was defaulted instead of read from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// No source file or field.
    Absent,
    /// The file exists but could not be read.
    Unreadable,
    /// The content could not be parsed or had the wrong shape.
    Malformed,
    /// The field named a file that does not exist.
    MissingFile,
    /// Computed from another field (e.g. a title from prompt text).
    Derived,
}

/// A value that was either found in the data or filled in by a fallback.
///
/// Resolution never fails; this keeps "used a fallback" distinguishable from
/// "found data" for callers that care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Outcome<T> {
    Found { value: T },
    Defaulted { value: T, reason: DefaultReason },
}

impl<T> Outcome<T> {
    pub fn found(value: T) -> Self {
        Outcome::Found { value }
    }

    pub fn defaulted(value: T, reason: DefaultReason) -> Self {
        Outcome::Defaulted { value, reason }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Found { value } | Outcome::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Found { value } | Outcome::Defaulted { value, .. } => value,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found { .. })
    }

    pub fn reason(&self) -> Option<DefaultReason> {
        match self {
            Outcome::Found { .. } => None,
            Outcome::Defaulted { reason, .. } => Some(*reason),
        }
    }
}

/// An entry with every field defaulted and ready for rendering.
///
/// Links are root-relative and `/`-separated (`images/0001.jpg`), so the
/// rendered documents work from the gallery root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEntry {
    pub id: String,
    /// Link to the generated image.
    pub image: Option<String>,
    /// Link to the prompt text file.
    pub prompt: Option<String>,
    /// Prompt text with newlines folded into spaces. Empty when missing.
    pub prompt_text: String,
    /// Whether the tag record was parsed.
    pub record: Outcome<()>,
    /// `Found` when the record names an existing file, `Defaulted` for the
    /// shared fallback seed.
    pub seed: Option<Outcome<String>>,
    /// `Found` for an explicit record title, `Defaulted` when derived from
    /// the prompt text.
    pub title: Option<Outcome<String>>,
    pub tags: Outcome<Vec<String>>,
}

impl ResolvedEntry {
    pub fn seed_link(&self) -> Option<&str> {
        self.seed.as_ref().map(|s| s.value().as_str())
    }

    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.value().as_str())
    }
}
