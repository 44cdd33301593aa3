//! Entry store scanning.
//!
//! Stage 1 of the pipeline. Lists the image and prompt directories and merges
//! whatever it finds into one [`Entry`] per id:
//!
//! ```text
//! images/                 prompts/
//! ├── 02seed.png          ├── 0001.txt
//! ├── 0001.jpg            ├── 0001.tags.json
//! └── 0003.png            └── 0002.txt
//!
//! → 0001 { image: 0001.jpg, prompt: 0001.txt, tags: 0001.tags.json }
//!   0002 { prompt: 0002.txt }
//!   0003 { image: 0003.png }
//! ```
//!
//! An id found in only one file set still yields a partial entry. Nothing is
//! defaulted here; that is the resolver's job. Output is sorted by id, and
//! since ids are fixed-width, lexicographic order is numeric order.

use crate::config::Gallery;
use crate::naming::{self, FileKind};
use crate::types::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the image and prompt directories if they are missing.
///
/// Idempotent. Called before every scan so a fresh gallery root works.
pub fn ensure_dirs(gallery: &Gallery) -> Result<(), ScanError> {
    fs::create_dir_all(gallery.images_path())?;
    fs::create_dir_all(gallery.prompts_path())?;
    Ok(())
}

/// Scan both directories into entries sorted by id.
pub fn scan(gallery: &Gallery) -> Result<Vec<Entry>, ScanError> {
    let mut by_id: BTreeMap<String, Entry> = BTreeMap::new();

    // Sorted listings make "first image wins" deterministic when two
    // images share an id.
    for name in list_files(&gallery.prompts_path())? {
        let Some(kind) = naming::classify_prompt_dir(&name) else {
            continue;
        };
        let id = &name[..naming::ID_WIDTH];
        let entry = by_id
            .entry(id.to_string())
            .or_insert_with(|| Entry::new(id));
        match kind {
            FileKind::Prompt => entry.prompt = Some(name),
            FileKind::Tags => {
                entry.tags.get_or_insert(name);
            }
            FileKind::Image => {}
        }
    }

    for name in list_files(&gallery.images_path())? {
        if !naming::is_image_name(&name) {
            continue;
        }
        let id = &name[..naming::ID_WIDTH];
        let entry = by_id
            .entry(id.to_string())
            .or_insert_with(|| Entry::new(id));
        entry.image.get_or_insert(name);
    }

    let entries: Vec<Entry> = by_id.into_values().collect();
    tracing::debug!(count = entries.len(), "scanned entries");
    Ok(entries)
}

/// Sorted UTF-8 names of the non-directory entries in `dir`.
fn list_files(dir: &Path) -> Result<Vec<String>, ScanError> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Every name in a directory, files and subdirectories alike.
///
/// This is the membership snapshot the refresh loop compares between polls.
pub fn list_names(dir: &Path) -> Result<BTreeSet<String>, ScanError> {
    Ok(fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect())
}

/// Highest numeric id among qualifying images and prompt texts.
///
/// Tag records alone do not reserve an id.
pub fn max_id(gallery: &Gallery) -> Result<Option<u32>, ScanError> {
    let images = numbered_ids(&gallery.images_path(), naming::is_image_name)?;
    let prompts = numbered_ids(&gallery.prompts_path(), naming::is_prompt_name)?;
    Ok(images.into_iter().chain(prompts).max())
}

fn numbered_ids(dir: &Path, accept: fn(&str) -> bool) -> Result<Vec<u32>, ScanError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    Ok(list_files(dir)?
        .iter()
        .filter(|name| accept(name))
        .filter_map(|name| naming::id_prefix(name)?.parse().ok())
        .collect())
}
