//! New gallery entries from a subject line.
//!
//! ```text
//! "A red fox in snow"
//!     │  sanitize_subject / build_prompt / build_tags
//!     ▼
//! prompts/0008.txt          prompt text, no trailing newline
//! prompts/0008.tags.json    {"seed": ..., "tags": [...]}
//!     │  ImageProvider (optional)
//!     ▼
//! images/0008.jpg
//! ```
//!
//! The prompt and tag record are written before the provider is contacted, so
//! a missing API key or a failed request still leaves a usable entry on disk.

use crate::config::{Gallery, ProviderConfig};
use crate::metadata::{self, MetadataError, TagRecord};
use crate::naming;
use crate::scan::{self, ScanError};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Used when neither the arguments nor stdin yield a usable subject.
pub const DEFAULT_SUBJECT: &str = "original AI-generated scene";

/// Subjects containing any of these (case-insensitive, substring) are dropped.
const BANNED_TERMS: &[&str] = &[
    "nudity",
    "nude",
    "nsfw",
    "violence",
    "gore",
    "blood",
    "weapon",
    "gun",
    "knife",
    "hate",
    "racist",
    "sex",
    "explicit",
    "real person",
    "celebrity",
    "trademark",
    "copyright",
    "logo",
    "brand",
];

const STYLE_DESCRIPTORS: &[&str] = &[
    "high-quality cinematic illustration",
    "soft natural lighting",
    "vivid yet balanced color palette",
    "clean composition",
    "tasteful, family-friendly aesthetic",
    "original concept",
];

const TAG_EXTRAS: &[&str] = &[
    "illustration",
    "family-friendly",
    "original",
    "ai-art",
    "clean",
];
const TAG_PADDING: &[&str] = &["art", "scene", "design"];
const SUBJECT_TAG_WORDS: usize = 5;
const MIN_TAGS: usize = 3;
const MAX_TAGS: usize = 8;
const MAX_ID: u32 = 9999;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("all ids up to 9999 are taken")]
    IdsExhausted,
    #[error("image provider not configured: set {env} to enable generation")]
    ProviderNotConfigured { env: String },
    #[error("image provider failed: {0}")]
    Provider(String),
}

impl GenerateError {
    /// Provider problems leave the local files in place and exit with status 2.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            GenerateError::ProviderNotConfigured { .. } | GenerateError::Provider(_)
        )
    }
}

// =============================================================================
// Prompt and tag construction
// =============================================================================

/// Trimmed subject, or empty when it mentions a banned term.
pub fn sanitize_subject(input: &str) -> String {
    let subject = input.trim();
    let lower = subject.to_lowercase();
    if BANNED_TERMS.iter().any(|term| lower.contains(term)) {
        return String::new();
    }
    subject.to_string()
}

/// Pick the subject: arguments first, then `ask`, then [`DEFAULT_SUBJECT`].
///
/// `ask` only runs when the arguments sanitize to nothing.
pub fn choose_subject(from_args: &str, ask: impl FnOnce() -> String) -> String {
    let subject = sanitize_subject(from_args);
    if !subject.is_empty() {
        return subject;
    }
    let subject = sanitize_subject(&ask());
    if subject.is_empty() {
        DEFAULT_SUBJECT.to_string()
    } else {
        subject
    }
}

pub fn build_prompt(subject: &str) -> String {
    let mut parts = Vec::with_capacity(STYLE_DESCRIPTORS.len() + 1);
    parts.push(subject);
    parts.extend_from_slice(STYLE_DESCRIPTORS);
    parts.join(", ")
}

/// Up to eight lowercase tags: leading subject words, then fixed extras.
///
/// Words of two characters or fewer are dropped and duplicates removed.
pub fn build_tags(subject: &str) -> Vec<String> {
    let cleaned: String = subject
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut tags: Vec<String> = Vec::new();
    let words = cleaned
        .split_whitespace()
        .take(SUBJECT_TAG_WORDS)
        .chain(TAG_EXTRAS.iter().copied());
    for word in words {
        if word.chars().count() > 2 && !tags.iter().any(|t| t == word) {
            tags.push(word.to_string());
        }
    }

    if tags.len() < MIN_TAGS {
        for pad in TAG_PADDING {
            if !tags.iter().any(|t| t == pad) {
                tags.push(pad.to_string());
            }
        }
    }
    tags.truncate(MAX_TAGS);
    tags
}

/// One past the highest id used by an image or prompt text, `0001` when the
/// gallery is empty.
pub fn next_id(gallery: &Gallery) -> Result<String, GenerateError> {
    let next = scan::max_id(gallery)?.map_or(1, |n| n + 1);
    if next > MAX_ID {
        return Err(GenerateError::IdsExhausted);
    }
    Ok(naming::format_id(next))
}

/// Root-relative, `/`-separated form of `seed`, or `None` if it does not exist.
///
/// Relative paths are taken from the gallery root. An existing absolute path
/// outside the root is kept as given.
pub fn relative_seed(root: &Path, seed: &Path) -> Option<String> {
    let candidate = if seed.is_absolute() {
        seed.to_path_buf()
    } else {
        root.join(seed)
    };
    if !candidate.exists() {
        return None;
    }
    let Ok(rel) = candidate.strip_prefix(root) else {
        return Some(candidate.to_string_lossy().replace('\\', "/"));
    };
    let parts: Vec<String> = rel
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

// =============================================================================
// Local files
// =============================================================================

/// A prompt and tag record written to disk, waiting for an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub id: String,
    pub prompt: String,
    pub tags: Vec<String>,
    pub seed: Option<String>,
    pub prompt_path: PathBuf,
    pub record_path: PathBuf,
}

/// Allocate the next id and write its prompt and tag record.
pub fn write_draft(
    gallery: &Gallery,
    subject: &str,
    seed: Option<&Path>,
) -> Result<Draft, GenerateError> {
    scan::ensure_dirs(gallery)?;
    let id = next_id(gallery)?;
    let prompt = build_prompt(subject);
    let tags = build_tags(subject);
    let seed = seed.and_then(|s| {
        let resolved = relative_seed(&gallery.root, s);
        if resolved.is_none() {
            tracing::warn!(seed = %s.display(), "seed not found, not recorded");
        }
        resolved
    });

    let prompts = gallery.prompts_path();
    let prompt_path = prompts.join(naming::prompt_filename(&id));
    fs::write(&prompt_path, &prompt)?;

    let record_path = prompts.join(naming::tags_filename(&id));
    let record = TagRecord {
        id: None,
        seed: seed.clone(),
        title: None,
        tags: tags.clone(),
    };
    metadata::write_record(&record_path, &record)?;

    Ok(Draft {
        id,
        prompt,
        tags,
        seed,
        prompt_path,
        record_path,
    })
}

// =============================================================================
// Image providers
// =============================================================================

/// Something that turns a prompt into encoded image bytes.
pub trait ImageProvider {
    fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerateError>;
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

/// OpenAI-compatible image generation endpoint.
#[derive(Clone)]
pub struct OpenAiProvider {
    pub endpoint: String,
    pub model: String,
    pub size: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl OpenAiProvider {
    /// Build from config, reading the API key from the configured variable.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, GenerateError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerateError::ProviderNotConfigured {
                env: config.api_key_env.clone(),
            })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| GenerateError::Provider(e.to_string()))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            size: config.size.clone(),
            api_key: api_key.trim().to_string(),
            client,
        })
    }
}

impl ImageProvider for OpenAiProvider {
    fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, GenerateError> {
        let request = ImageRequest {
            model: &self.model,
            prompt,
            size: &self.size,
        };
        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| GenerateError::Provider(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().unwrap_or_default();
            return Err(GenerateError::Provider(format!(
                "image API error {status}: {body}"
            )));
        }
        let body: ImageResponse = res
            .json()
            .map_err(|e| GenerateError::Provider(e.to_string()))?;
        let encoded = body
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| GenerateError::Provider("response carried no image data".into()))?;
        decode_image(&encoded)
    }
}

pub fn decode_image(encoded: &str) -> Result<Vec<u8>, GenerateError> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| GenerateError::Provider(format!("invalid base64 image: {e}")))
}

/// Ask the provider for an image and store it as `images/<id>.jpg`.
pub fn attach_image(
    gallery: &Gallery,
    draft: &Draft,
    provider: &dyn ImageProvider,
) -> Result<PathBuf, GenerateError> {
    let bytes = provider.generate_image(&draft.prompt)?;
    let path = gallery.images_path().join(format!("{}.jpg", draft.id));
    fs::write(&path, bytes)?;
    tracing::info!(id = %draft.id, path = %path.display(), "saved generated image");
    Ok(path)
}

#[derive(Debug)]
pub struct GenerationReport {
    pub draft: Draft,
    /// Saved image, or why there is none. The draft is on disk either way.
    pub image: Result<PathBuf, GenerateError>,
}

/// Write a draft, then try to attach an image from `provider`.
///
/// Only local failures (allocating an id, writing the draft) are returned as
/// `Err`; provider problems land in [`GenerationReport::image`].
pub fn generate<P: ImageProvider>(
    gallery: &Gallery,
    subject: &str,
    seed: Option<&Path>,
    provider: Result<P, GenerateError>,
) -> Result<GenerationReport, GenerateError> {
    let draft = write_draft(gallery, subject, seed)?;
    let image = provider.and_then(|p| attach_image(gallery, &draft, &p));
    Ok(GenerationReport { draft, image })
}
