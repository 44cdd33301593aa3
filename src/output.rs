//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each entry leads with
//! its id and title; the files behind it are secondary context on indented
//! lines. Fallbacks the resolver took are spelled out so a gallery can be
//! audited from the terminal.
//!
//! # Output Format
//!
//! ## Build / Check
//!
//! ```text
//! Entries
//! 0001 A lone lighthouse
//!     Image: images/0001.jpg
//!     Prompt: prompts/0001.txt
//!     Seed: images/02seed.png (fallback)
//!     Tags: lighthouse, dusk
//! 0002 (0002.png)
//!     Image: images/0002.png
//!     Record: malformed, defaults used
//!
//! Wrote README.md
//! Wrote GALLERY.md
//! ```
//!
//! ## Generate
//!
//! ```text
//! Image: images/0008.jpg
//! Prompt: prompts/0008.txt
//! Tags: red, fox, snow, illustration
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::Gallery;
use crate::fill::{FillEvent, FillReport, TextSource};
use crate::generate::GenerationReport;
use crate::render::BuildReport;
use crate::types::{DefaultReason, ResolvedEntry};
use crate::watch::Tick;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Entry header: titled entries show the title, untitled ones the file name
/// in parens.
///
/// ```text
/// 0001 A lone lighthouse    // titled
/// 0002 (0002.png)           // untitled, the file IS the identity
/// ```
fn entry_header(entry: &ResolvedEntry) -> String {
    match entry.title_text() {
        Some(t) if !t.is_empty() => format!("{} {}", entry.id, t),
        _ => {
            let file = entry
                .image
                .as_deref()
                .or(entry.prompt.as_deref())
                .and_then(|link| link.rsplit('/').next())
                .unwrap_or("no files");
            format!("{} ({})", entry.id, file)
        }
    }
}

fn reason_label(reason: DefaultReason) -> &'static str {
    match reason {
        DefaultReason::Absent => "absent",
        DefaultReason::Unreadable => "unreadable",
        DefaultReason::Malformed => "malformed",
        DefaultReason::MissingFile => "missing file",
        DefaultReason::Derived => "derived",
    }
}

/// Path relative to the gallery root for display.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Format resolved entries as an inventory.
pub fn format_entries(entries: &[ResolvedEntry]) -> Vec<String> {
    let mut lines = vec!["Entries".to_string()];
    if entries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
        return lines;
    }

    for entry in entries {
        lines.push(entry_header(entry));
        let ctx = indent(1);
        if let Some(image) = &entry.image {
            lines.push(format!("{ctx}Image: {image}"));
        }
        if let Some(prompt) = &entry.prompt {
            lines.push(format!("{ctx}Prompt: {prompt}"));
        }
        if let Some(seed) = &entry.seed {
            match seed.reason() {
                None => lines.push(format!("{ctx}Seed: {}", seed.value())),
                Some(DefaultReason::MissingFile) => lines.push(format!(
                    "{ctx}Seed: {} (fallback, declared seed missing)",
                    seed.value()
                )),
                Some(_) => lines.push(format!("{ctx}Seed: {} (fallback)", seed.value())),
            }
        }
        let tags = entry.tags.value();
        if !tags.is_empty() {
            lines.push(format!("{ctx}Tags: {}", tags.join(", ")));
        }
        match entry.record.reason() {
            Some(reason @ (DefaultReason::Malformed | DefaultReason::Unreadable)) => {
                lines.push(format!(
                    "{ctx}Record: {}, defaults used",
                    reason_label(reason)
                ));
            }
            _ => {
                if entry.tags.reason() == Some(DefaultReason::Malformed) {
                    lines.push(format!("{ctx}Tags: malformed, defaults used"));
                }
            }
        }
    }
    lines
}

// ============================================================================
// build / check
// ============================================================================

/// Format the result of one pipeline run.
pub fn format_build_output(report: &BuildReport, gallery: &Gallery) -> Vec<String> {
    let mut lines = format_entries(&report.entries);
    lines.push(String::new());
    for path in &report.written {
        lines.push(format!("Wrote {}", display_path(path, &gallery.root)));
    }
    lines
}

pub fn print_build_output(report: &BuildReport, gallery: &Gallery) {
    for line in format_build_output(report, gallery) {
        println!("{}", line);
    }
}

/// Check output: the inventory plus a one-line count of defaulted records.
pub fn format_check_output(entries: &[ResolvedEntry]) -> Vec<String> {
    let mut lines = format_entries(entries);
    let broken = entries
        .iter()
        .filter(|e| {
            matches!(
                e.record.reason(),
                Some(DefaultReason::Malformed | DefaultReason::Unreadable)
            )
        })
        .count();
    lines.push(String::new());
    lines.push(format!(
        "{} entries, {} with unusable tag records",
        entries.len(),
        broken
    ));
    lines
}

pub fn print_check_output(entries: &[ResolvedEntry]) {
    for line in format_check_output(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// watch
// ============================================================================

/// One line per poll that did something; unchanged polls print nothing.
pub fn format_tick(tick: &Tick, gallery: &Gallery) -> Vec<String> {
    match tick {
        Tick::Unchanged => Vec::new(),
        Tick::Rendered(report) => {
            let written: Vec<String> = report
                .written
                .iter()
                .map(|p| display_path(p, &gallery.root))
                .collect();
            vec![format!(
                "Rendered {} entries \u{2192} {}",
                report.entries.len(),
                written.join(", ")
            )]
        }
        Tick::Failed(e) => vec![format!("Refresh failed: {e}")],
    }
}

// ============================================================================
// normalize
// ============================================================================

pub fn format_normalize_output(ids: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = ids.iter().map(|id| format!("Normalized {id}")).collect();
    lines.push(format!("{} tag records rewritten", ids.len()));
    lines
}

pub fn print_normalize_output(ids: &[String]) {
    for line in format_normalize_output(ids) {
        println!("{}", line);
    }
}

// ============================================================================
// fill
// ============================================================================

/// Lines shown as each target starts and finishes.
///
/// ```text
/// ---- 0007 ----
/// Paste prompt for 0007. Finish with END or Ctrl+D.
/// Wrote prompts/0007.txt
/// ```
pub fn format_fill_event(event: FillEvent<'_>, source: &TextSource, gallery: &Gallery) -> Vec<String> {
    match event {
        FillEvent::Started(target) => {
            let mut lines = vec![format!("---- {} ----", target.id)];
            match source {
                TextSource::Interactive => lines.push(format!(
                    "Paste prompt for {}. Finish with END or Ctrl+D.",
                    target.id
                )),
                TextSource::ClipboardWatch { .. } => {
                    lines.push("Waiting for clipboard, copy your prompt now".to_string())
                }
                TextSource::ClipboardStep => lines.push(
                    "Press Enter to capture clipboard, 's' to skip, 'q' to quit".to_string(),
                ),
                TextSource::Editor => lines.push(
                    "Paste and save in the editor, then press Enter to continue".to_string(),
                ),
                TextSource::Stdin | TextSource::File(_) | TextSource::Clipboard => {}
            }
            lines
        }
        FillEvent::Written(target) => {
            vec![format!("Wrote {}", display_path(&target.path, &gallery.root))]
        }
        FillEvent::Saved(target) => {
            vec![format!("Saved {}", display_path(&target.path, &gallery.root))]
        }
        FillEvent::Skipped(_, reason) => vec![format!("Skipped ({reason})")],
        FillEvent::Stopped(target) => vec![format!("Stopped at {}", target.id)],
    }
}

pub fn format_fill_output(report: &FillReport, gallery: &Gallery) -> Vec<String> {
    let Some(build) = &report.build else {
        return vec!["No empty prompt files found.".to_string()];
    };
    let mut lines = vec![format!(
        "{} filled, {} skipped",
        report.filled.len(),
        report.skipped.len()
    )];
    for path in &build.written {
        lines.push(format!("Wrote {}", display_path(path, &gallery.root)));
    }
    lines
}

pub fn print_fill_output(report: &FillReport, gallery: &Gallery) {
    for line in format_fill_output(report, gallery) {
        println!("{}", line);
    }
}

// ============================================================================
// generate
// ============================================================================

pub fn format_generate_output(report: &GenerationReport, gallery: &Gallery) -> Vec<String> {
    let mut lines = Vec::new();
    if let Ok(image) = &report.image {
        lines.push(format!("Image: {}", display_path(image, &gallery.root)));
    }
    lines.push(format!(
        "Prompt: {}",
        display_path(&report.draft.prompt_path, &gallery.root)
    ));
    if let Some(seed) = &report.draft.seed {
        lines.push(format!("Seed: {seed}"));
    }
    lines.push(format!("Tags: {}", report.draft.tags.join(", ")));
    lines
}

pub fn print_generate_output(report: &GenerationReport, gallery: &Gallery) {
    for line in format_generate_output(report, gallery) {
        println!("{}", line);
    }
}
