//! # Prompt Gallery
//!
//! Keeps a directory of AI-generated images and the prompts behind them
//! browsable. Your filesystem is the data source: numbered images, numbered
//! prompt texts and optional JSON tag records are merged into one entry per
//! id and rendered into Markdown documents.
//!
//! # Architecture: Scan, Resolve, Render
//!
//! ```text
//! 1. Scan      images/ + prompts/  →  Vec<Entry>          (partial, per id)
//! 2. Resolve   Vec<Entry>          →  Vec<ResolvedEntry>  (defaults filled in)
//! 3. Render    Vec<ResolvedEntry>  →  README.md, GALLERY.md
//! ```
//!
//! Each stage is a plain function over the previous stage's output, so the
//! rendering logic can be tested on hand-built entries without touching the
//! filesystem. Rendering is deterministic: unchanged inputs produce
//! byte-identical documents.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: lists both directories and merges files into entries by id |
//! | [`metadata`] | Stage 2: tag record parsing, seed/title/tag resolution, record normalization |
//! | [`render`] | Stage 3: table view (README) and mobile view (GALLERY) using Maud |
//! | [`extract`] | Preview and title heuristics over prompt text |
//! | [`watch`] | Polling refresh loop that re-renders when directory membership changes |
//! | [`fill`] | Writing text into empty prompt files |
//! | [`generate`] | New entries from a subject line, with an optional image provider |
//! | [`config`] | `gallery.toml` loading and validation |
//! | [`types`] | `Entry`, `ResolvedEntry`, and the `Outcome` fallback marker |
//! | [`naming`] | `NNNN` id convention shared by every file kind |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Resolution Never Fails
//!
//! A gallery is edited by hand. One truncated JSON file must not stop the
//! other hundred entries from rendering, so every per-entry problem degrades
//! to a default. Defaults are not silent, though: each resolved field carries
//! an [`types::Outcome`] saying whether it was found or filled in, and why.
//! `prompt-gallery check` prints them.
//!
//! ## Explicit Gallery Root
//!
//! Every component takes a [`config::Gallery`] (root path plus config)
//! instead of reading the working directory. The CLI defaults `--root` to `.`.
//!
//! ## Maud for the HTML Fragments
//!
//! The table view is an HTML table inside Markdown. It is built with
//! [Maud](https://maud.lambda.xyz/) so prompt text and file names are escaped
//! automatically and malformed markup is a compile error.

pub mod config;
pub mod extract;
pub mod fill;
pub mod generate;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod render;
pub mod scan;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
