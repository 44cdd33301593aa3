//! Shared test utilities for the prompt-gallery test suite.
//!
//! Provides a temp-dir gallery builder and small extractors over pipeline
//! data (`Entry`, `ResolvedEntry`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fx = GalleryFixture::new();
//! fx.image("0001.jpg");
//! fx.prompt("0001", "A lone lighthouse, glowing faintly");
//!
//! let entries = scan(&fx.gallery).unwrap();
//! assert_eq!(entry_ids(&entries), vec!["0001"]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::{Gallery, GalleryConfig};
use crate::naming;
use crate::types::{Entry, ResolvedEntry};

// =========================================================================
// Fixture setup
// =========================================================================

/// A gallery rooted in its own temp directory.
///
/// The directory is removed when the fixture is dropped.
pub struct GalleryFixture {
    _tmp: TempDir,
    pub gallery: Gallery,
}

impl GalleryFixture {
    /// Root with `images/` and `prompts/` already created.
    pub fn new() -> Self {
        let fx = Self::empty();
        fs::create_dir_all(fx.gallery.images_path()).unwrap();
        fs::create_dir_all(fx.gallery.prompts_path()).unwrap();
        fx
    }

    /// Bare root, no directories.
    pub fn empty() -> Self {
        Self::with_config(GalleryConfig::default())
    }

    pub fn with_config(config: GalleryConfig) -> Self {
        let tmp = TempDir::new().unwrap();
        let gallery = Gallery::new(tmp.path(), config);
        Self { _tmp: tmp, gallery }
    }

    pub fn root(&self) -> &Path {
        &self.gallery.root
    }

    /// Write a placeholder image file into the image directory.
    pub fn image(&self, name: &str) -> PathBuf {
        let path = self.gallery.images_path().join(name);
        fs::write(&path, b"fake image").unwrap();
        path
    }

    /// Write `<id>.txt` into the prompt directory.
    pub fn prompt(&self, id: &str, text: &str) -> PathBuf {
        self.prompt_raw(&naming::prompt_filename(id), text)
    }

    /// Write `<id>.tags.json` with raw (possibly malformed) content.
    pub fn tags(&self, id: &str, json: &str) -> PathBuf {
        self.prompt_raw(&naming::tags_filename(id), json)
    }

    /// Write an arbitrary file into the prompt directory.
    pub fn prompt_raw(&self, name: &str, content: &str) -> PathBuf {
        let path = self.gallery.prompts_path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All entry ids in scan order.
pub fn entry_ids(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|e| e.id.as_str()).collect()
}

/// Find a resolved entry by id. Panics if not found.
pub fn find_resolved<'a>(entries: &'a [ResolvedEntry], id: &str) -> &'a ResolvedEntry {
    entries.iter().find(|e| e.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        panic!("entry '{id}' not found. Available: {ids:?}")
    })
}
