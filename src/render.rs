//! Gallery document rendering.
//!
//! Stage 3 of the pipeline. Turns resolved entries into two documents:
//!
//! - **README** (`README.md`): a heading, an optional description and one
//!   wide HTML table with a row per entry:
//!
//!   | # | Seed | Image | Prompt |
//!   |---|------|-------|--------|
//!   | 0001 | seed thumbnail | image thumbnail | `A lone lighthouse … See` |
//!
//! - **Mobile** (`GALLERY.md`): one collapsible `<details>` block per entry,
//!   which reads better on narrow screens than the table.
//!
//! Both renderers are pure functions of the entry list: the same entries
//! always give byte-identical output. Entries are never skipped; an entry
//! with nothing resolved still gets a row (or block) with its id.
//!
//! ## HTML Generation
//!
//! The table is built with [maud](https://maud.lambda.xyz/), so prompt
//! previews and titles are escaped automatically.

use crate::config::{Gallery, GalleryConfig};
use crate::extract;
use crate::metadata;
use crate::scan::{self, ScanError};
use crate::types::ResolvedEntry;
use maud::{Markup, html};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const THUMB_STYLE: &str = "max-width:100%;height:auto;display:block;";

/// Both rendered documents. `mobile` is `None` when disabled in config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documents {
    pub readme: String,
    pub mobile: Option<String>,
}

/// Outcome of one full pipeline run.
#[derive(Debug)]
pub struct BuildReport {
    pub entries: Vec<ResolvedEntry>,
    /// Paths of the documents written.
    pub written: Vec<PathBuf>,
}

// ============================================================================
// Table view
// ============================================================================

/// Renders the `#, Seed, Image, Prompt` table, one row per entry.
pub fn render_table(entries: &[ResolvedEntry]) -> String {
    let markup = html! {
        table style="width:100%;table-layout:fixed;" {
            thead {
                tr {
                    th style="width:6%;" { "#" }
                    th style="width:32%;" { "Seed" }
                    th style="width:32%;" { "Image" }
                    th style="width:30%;" { "Prompt" }
                }
            }
            tbody {
                @for entry in entries {
                    (table_row(entry))
                }
            }
        }
    };
    markup.into_string()
}

fn table_row(entry: &ResolvedEntry) -> Markup {
    html! {
        tr {
            td style="width:6%;" { (entry.id) }
            td style="width:32%;" {
                @if let Some(seed) = entry.seed_link() {
                    (thumbnail(seed, &format!("seed {}", entry.id)))
                }
            }
            td style="width:32%;" {
                @if let Some(image) = &entry.image {
                    (thumbnail(image, &entry.id))
                }
            }
            td style="width:30%;" { (prompt_cell(entry)) }
        }
    }
}

/// A thumbnail linking to the full-size image.
fn thumbnail(link: &str, alt: &str) -> Markup {
    html! {
        a href=(link) {
            img src=(link) alt=(alt) style=(THUMB_STYLE);
        }
    }
}

/// Preview text, an ellipsis and a `See` link; either part is omitted when
/// its source is missing.
fn prompt_cell(entry: &ResolvedEntry) -> Markup {
    let preview = extract::preview(&entry.prompt_text);
    html! {
        @if !preview.is_empty() {
            (preview) " … "
        }
        @if let Some(prompt) = &entry.prompt {
            a href=(prompt) { "See" }
        }
    }
}

/// The full README: heading, description, table.
pub fn render_readme(config: &GalleryConfig, entries: &[ResolvedEntry]) -> String {
    let mut doc = [
        format!("# {}", config.title),
        String::new(),
        config.description.clone(),
        String::new(),
        render_table(entries),
    ]
    .join("\n");
    doc.push('\n');
    doc
}

// ============================================================================
// Mobile view
// ============================================================================

/// Renders one collapsible block per entry, separated by blank lines.
pub fn render_mobile(entries: &[ResolvedEntry]) -> String {
    let mut doc = entries
        .iter()
        .map(mobile_block)
        .collect::<Vec<_>>()
        .join("\n\n");
    if !doc.is_empty() {
        doc.push('\n');
    }
    doc
}

fn mobile_block(entry: &ResolvedEntry) -> String {
    let id = &entry.id;
    let summary = match entry.title_text() {
        Some(title) => format!("# {id} \u{2014} {title}"),
        None => format!("# {id}"),
    };

    let mut lines = vec![format!(
        "<details>{}",
        html! { summary { (summary) } }.into_string()
    )];
    if let Some(seed) = entry.seed_link() {
        let url = md_url(seed);
        lines.push(format!("[![seed {id}]({url})]({url})"));
    }
    if let Some(image) = &entry.image {
        let url = md_url(image);
        lines.push(format!("[![{id}]({url})]({url})"));
    }
    if let Some(prompt) = &entry.prompt {
        lines.push(format!("Prompt: [See]({})", md_url(prompt)));
    }
    lines.push("</details>".to_string());
    lines.join("\n")
}

/// Markdown link targets end at the first space; encode them.
fn md_url(link: &str) -> String {
    link.replace(' ', "%20")
}

// ============================================================================
// Pipeline
// ============================================================================

pub fn render_documents(config: &GalleryConfig, entries: &[ResolvedEntry]) -> Documents {
    Documents {
        readme: render_readme(config, entries),
        mobile: (!config.mobile.trim().is_empty()).then(|| render_mobile(entries)),
    }
}

/// Overwrite the output documents. Returns the paths written.
pub fn write_documents(gallery: &Gallery, docs: &Documents) -> Result<Vec<PathBuf>, RenderError> {
    let mut written = Vec::new();

    let readme_path = gallery.readme_path();
    fs::write(&readme_path, &docs.readme)?;
    written.push(readme_path);

    if let (Some(path), Some(mobile)) = (gallery.mobile_path(), &docs.mobile) {
        fs::write(&path, mobile)?;
        written.push(path);
    }
    Ok(written)
}

/// Run the whole pipeline: ensure dirs, scan, resolve, render, write.
pub fn build(gallery: &Gallery) -> Result<BuildReport, RenderError> {
    let entries = resolve_gallery(gallery)?;
    let docs = render_documents(&gallery.config, &entries);
    let written = write_documents(gallery, &docs)?;
    tracing::info!(entries = entries.len(), "rendered gallery");
    Ok(BuildReport { entries, written })
}

/// Scan and resolve without writing anything.
pub fn resolve_gallery(gallery: &Gallery) -> Result<Vec<ResolvedEntry>, RenderError> {
    scan::ensure_dirs(gallery)?;
    let entries = scan::scan(gallery)?;
    Ok(metadata::resolve_all(gallery, &entries))
}
