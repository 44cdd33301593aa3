//! Filling empty prompt files.
//!
//! A prompt file counts as empty when it holds only whitespace or cannot be
//! read. Targets are picked from the command-line argument:
//!
//! | Argument | Targets |
//! |----------|---------|
//! | `0007` | `prompts/0007.txt`, if it exists and is empty |
//! | `0003-0009` | every existing empty prompt in the inclusive range |
//! | anything else, or none | every empty prompt in the prompt directory |
//!
//! Each target is filled from one [`TextSource`]. Input is trimmed; empty
//! input skips the target, anything else is written back with a single
//! trailing newline. The gallery is re-rendered once at the end when at least
//! one target was selected, including after a quit in clipboard-step mode.
//!
//! ## Clipboard modes
//!
//! | Mode | Per target |
//! |------|------------|
//! | [`TextSource::Clipboard`] | one read of the clipboard command |
//! | [`TextSource::ClipboardWatch`] | poll until the clipboard holds new, non-empty text |
//! | [`TextSource::ClipboardStep`] | one control line from the input: Enter reads, `s` skips, `q` quits |
//!
//! Watch mode remembers the last text it accepted, so copying once does not
//! fill two entries with the same prompt.

use crate::config::Gallery;
use crate::naming;
use crate::render::{self, BuildReport, RenderError};
use crate::scan::{self, ScanError};
use std::fmt;
use std::fs;
use std::io::{self, BufRead, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Line that ends interactive input.
pub const END_MARKER: &str = "END";

#[derive(Error, Debug)]
pub enum FillError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("--stdin needs exactly one target, found {0}")]
    StdinNeedsSingleTarget(usize),
    #[error("clipboard command failed: {0}")]
    Clipboard(String),
    #[error("editor command failed: {0}")]
    Editor(String),
}

/// Which prompt files to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    One(u32),
    Range(u32, u32),
    AllEmpty,
}

impl Target {
    /// `NNNN`, `NNNN-MMMM`, or anything else meaning every empty prompt.
    pub fn parse(arg: Option<&str>) -> Self {
        let Some(arg) = arg else {
            return Target::AllEmpty;
        };
        if let Some(id) = naming::parse_id(arg) {
            return Target::One(id);
        }
        match arg.split_once('-') {
            Some((a, b)) => match (naming::parse_id(a), naming::parse_id(b)) {
                (Some(a), Some(b)) => Target::Range(a, b),
                _ => Target::AllEmpty,
            },
            None => Target::AllEmpty,
        }
    }
}

/// Where the replacement text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Lines from the input reader until `END` or end of input.
    Interactive,
    /// The whole input reader. Only valid for a single target.
    Stdin,
    File(PathBuf),
    /// Output of the configured clipboard command.
    Clipboard,
    /// Poll the clipboard every `interval`, at most `attempts` times per
    /// target, until it holds text that was not used for the previous one.
    ClipboardWatch { interval: Duration, attempts: u32 },
    /// Read one control line from the input reader before each clipboard read.
    ClipboardStep,
    /// Open the prompt file with the configured editor command, wait for a
    /// line on the input reader, then check the file again.
    Editor,
}

impl TextSource {
    /// Watch mode with the poll settings from `[fill]`.
    pub fn clipboard_watch(gallery: &Gallery) -> Self {
        TextSource::ClipboardWatch {
            interval: gallery.config.fill.watch_interval(),
            attempts: gallery.config.fill.watch_attempts,
        }
    }
}

/// One prompt file selected for filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillTarget {
    pub id: String,
    pub path: PathBuf,
}

/// Why a target was left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyInput,
    ClipboardEmpty,
    /// Watch mode ran out of attempts.
    ClipboardUnchanged,
    UserSkipped,
    /// The editor was closed without saving any text.
    StillEmpty,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::EmptyInput => "empty input",
            SkipReason::ClipboardEmpty => "clipboard empty",
            SkipReason::ClipboardUnchanged => "clipboard did not change",
            SkipReason::UserSkipped => "skipped by user",
            SkipReason::StillEmpty => "file still empty",
        })
    }
}

/// Progress reported while filling, in target order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillEvent<'a> {
    /// About to read text for this target.
    Started(&'a FillTarget),
    Written(&'a FillTarget),
    /// The editor left text in the file.
    Saved(&'a FillTarget),
    Skipped(&'a FillTarget, SkipReason),
    /// `q` in clipboard-step mode. No further targets are visited.
    Stopped(&'a FillTarget),
}

#[derive(Debug, Default)]
pub struct FillReport {
    /// Ids whose prompt file now holds text.
    pub filled: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
    /// Id at which clipboard-step mode was quit.
    pub stopped_at: Option<String>,
    /// Render that followed, `None` when nothing was selected.
    pub build: Option<BuildReport>,
}

/// Whitespace-only or unreadable.
pub fn is_empty_prompt(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|text| text.trim().is_empty())
        .unwrap_or(true)
}

/// Resolve a [`Target`] to existing, empty prompt files in id order.
pub fn select_targets(gallery: &Gallery, target: Target) -> Result<Vec<FillTarget>, FillError> {
    let prompts = gallery.prompts_path();
    let candidate = |id: u32| {
        let id = naming::format_id(id);
        let path = prompts.join(naming::prompt_filename(&id));
        (path.is_file() && is_empty_prompt(&path)).then_some(FillTarget { id, path })
    };

    let targets = match target {
        Target::One(id) => candidate(id).into_iter().collect(),
        Target::Range(a, b) => (a..=b).filter_map(candidate).collect(),
        Target::AllEmpty => {
            let mut names: Vec<String> = fs::read_dir(&prompts)?
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| naming::is_prompt_name(name))
                .collect();
            names.sort();
            names
                .into_iter()
                .map(|name| FillTarget {
                    id: name[..naming::ID_WIDTH].to_string(),
                    path: prompts.join(name),
                })
                .filter(|t| is_empty_prompt(&t.path))
                .collect()
        }
    };
    Ok(targets)
}

/// Read lines until one is exactly `END` (surrounding whitespace ignored) or
/// the input ends.
pub fn read_until_end(input: &mut dyn BufRead) -> io::Result<String> {
    let mut lines = Vec::new();
    for line in input.lines() {
        let line = line?;
        if line.trim() == END_MARKER {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

/// Run the clipboard command and return what it printed.
pub fn read_clipboard(command: &[String]) -> Result<String, FillError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| FillError::Clipboard("no command configured".into()))?;
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| FillError::Clipboard(format!("{program}: {e}")))?;
    if !output.status.success() {
        return Err(FillError::Clipboard(format!(
            "{program} exited with {}",
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Poll the clipboard until it holds trimmed, non-empty text different from
/// `last`. On success `last` is updated. `None` after `attempts` reads.
pub fn watch_clipboard(
    command: &[String],
    interval: Duration,
    attempts: u32,
    last: &mut Option<String>,
) -> Result<Option<String>, FillError> {
    for attempt in 0..attempts {
        if attempt > 0 {
            thread::sleep(interval);
        }
        let text = read_clipboard(command)?;
        let text = text.trim();
        if !text.is_empty() && last.as_deref() != Some(text) {
            *last = Some(text.to_string());
            return Ok(Some(text.to_string()));
        }
    }
    Ok(None)
}

/// Answer to the clipboard-step question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
    Capture,
    Skip,
    Quit,
}

/// Read one control line. `q` quits, `s` skips, and anything else (end of
/// input included) captures the clipboard. Case is ignored.
pub fn read_step_control(input: &mut dyn BufRead) -> io::Result<StepControl> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(match line.trim().to_ascii_lowercase().as_str() {
        "q" => StepControl::Quit,
        "s" => StepControl::Skip,
        _ => StepControl::Capture,
    })
}

/// Run the editor command with `path` appended as its last argument.
pub fn open_in_editor(command: &[String], path: &Path) -> Result<(), FillError> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| FillError::Editor("no command configured".into()))?;
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .map_err(|e| FillError::Editor(format!("{program}: {e}")))?;
    if !status.success() {
        return Err(FillError::Editor(format!("{program} exited with {status}")));
    }
    Ok(())
}

/// Raw text for one target, for the sources that read text once per target.
///
/// The watch, step and editor modes carry per-target control flow and are
/// driven by [`fill`]; here they fall back to a single clipboard read, or an
/// empty string for the editor.
pub fn read_source(
    gallery: &Gallery,
    source: &TextSource,
    input: &mut dyn BufRead,
) -> Result<String, FillError> {
    match source {
        TextSource::Interactive => Ok(read_until_end(input)?),
        TextSource::Stdin => {
            let mut text = String::new();
            input.read_to_string(&mut text)?;
            Ok(text)
        }
        TextSource::File(path) => Ok(fs::read_to_string(path)?),
        TextSource::Clipboard | TextSource::ClipboardWatch { .. } | TextSource::ClipboardStep => {
            read_clipboard(&gallery.config.fill.clipboard_command)
        }
        TextSource::Editor => Ok(String::new()),
    }
}

/// Write trimmed text plus a newline. Returns `false` when the text is empty
/// and nothing was written.
pub fn write_prompt(path: &Path, text: &str) -> Result<bool, FillError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(false);
    }
    fs::write(path, format!("{text}\n"))?;
    Ok(true)
}

/// Outcome for one target before it is recorded.
enum Step {
    Text(String, SkipReason),
    Edited,
    Skip(SkipReason),
    Quit,
}

fn fill_one(
    gallery: &Gallery,
    source: &TextSource,
    target: &FillTarget,
    input: &mut dyn BufRead,
    last_clip: &mut Option<String>,
) -> Result<Step, FillError> {
    let fill_config = &gallery.config.fill;
    let step = match source {
        TextSource::ClipboardWatch { interval, attempts } => {
            match watch_clipboard(&fill_config.clipboard_command, *interval, *attempts, last_clip)? {
                Some(text) => Step::Text(text, SkipReason::ClipboardUnchanged),
                None => Step::Skip(SkipReason::ClipboardUnchanged),
            }
        }
        TextSource::ClipboardStep => match read_step_control(input)? {
            StepControl::Quit => Step::Quit,
            StepControl::Skip => Step::Skip(SkipReason::UserSkipped),
            StepControl::Capture => Step::Text(
                read_clipboard(&fill_config.clipboard_command)?,
                SkipReason::ClipboardEmpty,
            ),
        },
        TextSource::Editor => {
            open_in_editor(&fill_config.editor_command, &target.path)?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            if is_empty_prompt(&target.path) {
                Step::Skip(SkipReason::StillEmpty)
            } else {
                Step::Edited
            }
        }
        TextSource::Clipboard => Step::Text(
            read_source(gallery, source, input)?,
            SkipReason::ClipboardEmpty,
        ),
        TextSource::Interactive | TextSource::Stdin | TextSource::File(_) => Step::Text(
            read_source(gallery, source, input)?,
            SkipReason::EmptyInput,
        ),
    };
    Ok(step)
}

/// Fill every selected target, then re-render the gallery.
///
/// `on_event` sees each target start and finish, so callers can show a
/// prompt before input is read and a result line after.
pub fn fill(
    gallery: &Gallery,
    target: Target,
    source: &TextSource,
    input: &mut dyn BufRead,
    mut on_event: impl FnMut(FillEvent<'_>),
) -> Result<FillReport, FillError> {
    scan::ensure_dirs(gallery)?;
    let targets = select_targets(gallery, target)?;
    if targets.is_empty() {
        return Ok(FillReport::default());
    }
    if *source == TextSource::Stdin && targets.len() != 1 {
        return Err(FillError::StdinNeedsSingleTarget(targets.len()));
    }

    let mut report = FillReport::default();
    let mut last_clip = None;
    for t in &targets {
        on_event(FillEvent::Started(t));
        let reason = match fill_one(gallery, source, t, input, &mut last_clip)? {
            Step::Text(text, if_empty) => {
                if write_prompt(&t.path, &text)? {
                    tracing::debug!(id = %t.id, "filled prompt");
                    report.filled.push(t.id.clone());
                    on_event(FillEvent::Written(t));
                    continue;
                }
                if_empty
            }
            Step::Edited => {
                tracing::debug!(id = %t.id, "prompt saved in editor");
                report.filled.push(t.id.clone());
                on_event(FillEvent::Saved(t));
                continue;
            }
            Step::Skip(reason) => reason,
            Step::Quit => {
                report.stopped_at = Some(t.id.clone());
                on_event(FillEvent::Stopped(t));
                break;
            }
        };
        report.skipped.push((t.id.clone(), reason));
        on_event(FillEvent::Skipped(t, reason));
    }

    report.build = Some(render::build(gallery)?);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::io::Cursor;

    fn ids(targets: &[FillTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.id.as_str()).collect()
    }

    fn event_line(event: FillEvent<'_>) -> String {
        match event {
            FillEvent::Started(t) => format!("start {}", t.id),
            FillEvent::Written(t) => format!("wrote {}", t.id),
            FillEvent::Saved(t) => format!("saved {}", t.id),
            FillEvent::Skipped(t, reason) => format!("skip {} ({reason})", t.id),
            FillEvent::Stopped(t) => format!("stop {}", t.id),
        }
    }

    fn command(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    /// A clipboard backed by a file, read with `cat`.
    fn file_clipboard(fx: &mut GalleryFixture, text: &str) -> PathBuf {
        let path = fx.root().join("clipboard.txt");
        fs::write(&path, text).unwrap();
        fx.gallery.config.fill.clipboard_command =
            vec!["cat".to_string(), path.to_string_lossy().into_owned()];
        path
    }

    fn quick_watch(attempts: u32) -> TextSource {
        TextSource::ClipboardWatch {
            interval: Duration::from_millis(1),
            attempts,
        }
    }

    // =========================================================================
    // Target parsing and selection
    // =========================================================================

    #[test]
    fn parse_target_forms() {
        assert_eq!(Target::parse(Some("0007")), Target::One(7));
        assert_eq!(Target::parse(Some("0003-0009")), Target::Range(3, 9));
        assert_eq!(Target::parse(Some("7")), Target::AllEmpty);
        assert_eq!(Target::parse(Some("0003-9")), Target::AllEmpty);
        assert_eq!(Target::parse(Some("all")), Target::AllEmpty);
        assert_eq!(Target::parse(None), Target::AllEmpty);
    }

    #[test]
    fn empty_prompt_detection() {
        let fx = GalleryFixture::new();
        assert!(is_empty_prompt(&fx.prompt("0001", "")));
        assert!(is_empty_prompt(&fx.prompt("0002", "  \n\t ")));
        assert!(!is_empty_prompt(&fx.prompt("0003", "text")));
        assert!(is_empty_prompt(&fx.root().join("missing.txt")));
    }

    #[test]
    fn select_all_empty_in_id_order() {
        let fx = GalleryFixture::new();
        fx.prompt("0003", "");
        fx.prompt("0001", " ");
        fx.prompt("0002", "filled");
        fx.prompt_raw("notes.txt", "");

        let targets = select_targets(&fx.gallery, Target::AllEmpty).unwrap();
        assert_eq!(ids(&targets), vec!["0001", "0003"]);
    }

    #[test]
    fn select_single_requires_existing_empty_file() {
        let fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.prompt("0002", "filled");

        assert_eq!(
            ids(&select_targets(&fx.gallery, Target::One(1)).unwrap()),
            vec!["0001"]
        );
        assert!(select_targets(&fx.gallery, Target::One(2)).unwrap().is_empty());
        assert!(select_targets(&fx.gallery, Target::One(9)).unwrap().is_empty());
    }

    #[test]
    fn select_range_is_inclusive() {
        let fx = GalleryFixture::new();
        for id in ["0001", "0002", "0004", "0005"] {
            fx.prompt(id, "");
        }
        fx.prompt("0003", "filled");

        let targets = select_targets(&fx.gallery, Target::Range(2, 4)).unwrap();
        assert_eq!(ids(&targets), vec!["0002", "0004"]);
        assert!(select_targets(&fx.gallery, Target::Range(4, 2)).unwrap().is_empty());
    }

    // =========================================================================
    // Sources
    // =========================================================================

    #[test]
    fn interactive_stops_at_end_marker() {
        let mut input = Cursor::new("first line\nsecond line\n  END \nleftover\n");
        assert_eq!(read_until_end(&mut input).unwrap(), "first line\nsecond line");

        let mut rest = String::new();
        input.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "leftover\n");
    }

    #[test]
    fn interactive_stops_at_eof() {
        let mut input = Cursor::new("only line");
        assert_eq!(read_until_end(&mut input).unwrap(), "only line");
        assert_eq!(read_until_end(&mut input).unwrap(), "");
    }

    #[test]
    fn clipboard_runs_configured_command() {
        let cmd = vec!["echo".to_string(), "from clipboard".to_string()];
        assert_eq!(read_clipboard(&cmd).unwrap().trim(), "from clipboard");
    }

    #[test]
    fn clipboard_missing_program_is_error() {
        let cmd = vec!["definitely-not-a-clipboard-tool".to_string()];
        assert!(matches!(read_clipboard(&cmd), Err(FillError::Clipboard(_))));
        assert!(matches!(read_clipboard(&[]), Err(FillError::Clipboard(_))));
    }

    #[test]
    fn write_prompt_trims_and_adds_newline() {
        let fx = GalleryFixture::new();
        let path = fx.prompt("0001", "");
        assert!(write_prompt(&path, "\n  A quiet harbor at night  \n\n").unwrap());
        assert_eq!(fx.read("prompts/0001.txt"), "A quiet harbor at night\n");

        assert!(!write_prompt(&path, " \n ").unwrap());
        assert_eq!(fx.read("prompts/0001.txt"), "A quiet harbor at night\n");
    }

    // =========================================================================
    // fill()
    // =========================================================================

    #[test]
    fn fill_interactive_several_targets_and_rerender() {
        let fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.prompt("0002", "");
        fx.prompt("0003", "");
        let mut input = Cursor::new("Misty valley, at dawn\nEND\n\nEND\nLast one\n");
        let mut seen = Vec::new();

        let report = fill(
            &fx.gallery,
            Target::AllEmpty,
            &TextSource::Interactive,
            &mut input,
            |event| seen.push(event_line(event)),
        )
        .unwrap();

        assert_eq!(
            seen,
            vec![
                "start 0001",
                "wrote 0001",
                "start 0002",
                "skip 0002 (empty input)",
                "start 0003",
                "wrote 0003",
            ]
        );
        assert_eq!(report.filled, vec!["0001", "0003"]);
        assert_eq!(
            report.skipped,
            vec![("0002".to_string(), SkipReason::EmptyInput)]
        );
        assert_eq!(fx.read("prompts/0001.txt"), "Misty valley, at dawn\n");
        assert_eq!(fx.read("prompts/0003.txt"), "Last one\n");
        assert!(fx.read("README.md").contains("Misty valley"));
        assert!(report.build.is_some());
    }

    #[test]
    fn fill_stdin_single_target() {
        let fx = GalleryFixture::new();
        fx.prompt("0002", "");
        let mut input = Cursor::new("  whole\ninput\n");

        let report = fill(
            &fx.gallery,
            Target::One(2),
            &TextSource::Stdin,
            &mut input,
            |_| {},
        )
        .unwrap();

        assert_eq!(report.filled, vec!["0002"]);
        assert_eq!(fx.read("prompts/0002.txt"), "whole\ninput\n");
    }

    #[test]
    fn fill_stdin_rejects_multiple_targets() {
        let fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.prompt("0002", "");
        let mut input = Cursor::new("text");

        let err = fill(
            &fx.gallery,
            Target::AllEmpty,
            &TextSource::Stdin,
            &mut input,
            |_| {},
        )
        .unwrap_err();
        assert!(matches!(err, FillError::StdinNeedsSingleTarget(2)));
        assert_eq!(fx.read("prompts/0001.txt"), "");
    }

    #[test]
    fn fill_from_file() {
        let fx = GalleryFixture::new();
        fx.prompt("0001", "");
        let src = fx.root().join("draft.txt");
        fs::write(&src, "From a draft\n").unwrap();

        let report = fill(
            &fx.gallery,
            Target::One(1),
            &TextSource::File(src),
            &mut Cursor::new(""),
            |_| {},
        )
        .unwrap();
        assert_eq!(report.filled, vec!["0001"]);
        assert_eq!(fx.read("prompts/0001.txt"), "From a draft\n");
    }

    #[test]
    fn fill_without_targets_does_not_render() {
        let fx = GalleryFixture::new();
        fx.prompt("0001", "already written");

        let report = fill(
            &fx.gallery,
            Target::AllEmpty,
            &TextSource::Interactive,
            &mut Cursor::new(""),
            |_| {},
        )
        .unwrap();
        assert!(report.filled.is_empty());
        assert!(report.build.is_none());
        assert!(!fx.gallery.readme_path().exists());
    }

    // =========================================================================
    // Clipboard watch, clipboard step, and editor modes
    // =========================================================================

    #[test]
    fn watch_clipboard_skips_text_already_used() {
        let cmd = command(&["echo", "same prompt"]);
        let mut last = None;

        let first = watch_clipboard(&cmd, Duration::from_millis(1), 3, &mut last).unwrap();
        assert_eq!(first.as_deref(), Some("same prompt"));
        assert_eq!(last.as_deref(), Some("same prompt"));

        let second = watch_clipboard(&cmd, Duration::from_millis(1), 3, &mut last).unwrap();
        assert_eq!(second, None);
    }

    #[test]
    fn watch_clipboard_ignores_empty_clipboard() {
        let mut last = None;
        let text = watch_clipboard(&command(&["true"]), Duration::from_millis(1), 2, &mut last)
            .unwrap();
        assert_eq!(text, None);
        assert_eq!(last, None);
    }

    #[test]
    fn watch_clipboard_propagates_command_failure() {
        let mut last = None;
        let result = watch_clipboard(
            &command(&["definitely-not-a-clipboard-tool"]),
            Duration::from_millis(1),
            5,
            &mut last,
        );
        assert!(matches!(result, Err(FillError::Clipboard(_))));
    }

    #[test]
    fn fill_clipboard_watch_does_not_reuse_text() {
        let mut fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.prompt("0002", "");
        file_clipboard(&mut fx, "  Copied once, at noon \n");
        let mut seen = Vec::new();

        let report = fill(
            &fx.gallery,
            Target::AllEmpty,
            &quick_watch(3),
            &mut Cursor::new(""),
            |event| seen.push(event_line(event)),
        )
        .unwrap();

        assert_eq!(fx.read("prompts/0001.txt"), "Copied once, at noon\n");
        assert_eq!(fx.read("prompts/0002.txt"), "");
        assert_eq!(report.filled, vec!["0001"]);
        assert_eq!(
            report.skipped,
            vec![("0002".to_string(), SkipReason::ClipboardUnchanged)]
        );
        assert_eq!(seen[3], "skip 0002 (clipboard did not change)");
        assert!(report.build.is_some());
    }

    #[test]
    fn fill_clipboard_watch_picks_up_new_copy() {
        let mut fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.prompt("0002", "");
        let clip = file_clipboard(&mut fx, "First prompt");
        let source = TextSource::ClipboardWatch {
            interval: Duration::from_millis(5),
            attempts: 2000,
        };

        let report = fill(
            &fx.gallery,
            Target::AllEmpty,
            &source,
            &mut Cursor::new(""),
            |event| {
                if let FillEvent::Written(t) = event
                    && t.id == "0001"
                {
                    let clip = clip.clone();
                    thread::spawn(move || {
                        thread::sleep(Duration::from_millis(50));
                        let staged = clip.with_extension("new");
                        fs::write(&staged, "Second prompt").unwrap();
                        fs::rename(staged, clip).unwrap();
                    });
                }
            },
        )
        .unwrap();

        assert_eq!(report.filled, vec!["0001", "0002"]);
        assert_eq!(fx.read("prompts/0001.txt"), "First prompt\n");
        assert_eq!(fx.read("prompts/0002.txt"), "Second prompt\n");
    }

    #[test]
    fn step_control_answers() {
        let mut input = Cursor::new("\ns\n Q \nanything\n");
        assert_eq!(read_step_control(&mut input).unwrap(), StepControl::Capture);
        assert_eq!(read_step_control(&mut input).unwrap(), StepControl::Skip);
        assert_eq!(read_step_control(&mut input).unwrap(), StepControl::Quit);
        assert_eq!(read_step_control(&mut input).unwrap(), StepControl::Capture);
        // End of input captures as well.
        assert_eq!(read_step_control(&mut input).unwrap(), StepControl::Capture);
    }

    #[test]
    fn fill_clipboard_step_capture_skip_and_quit() {
        let mut fx = GalleryFixture::new();
        for id in ["0001", "0002", "0003", "0004"] {
            fx.prompt(id, "");
        }
        file_clipboard(&mut fx, "Harbor lights, fog\n");
        let mut seen = Vec::new();

        let report = fill(
            &fx.gallery,
            Target::AllEmpty,
            &TextSource::ClipboardStep,
            &mut Cursor::new("\ns\nq\n\n"),
            |event| seen.push(event_line(event)),
        )
        .unwrap();

        assert_eq!(fx.read("prompts/0001.txt"), "Harbor lights, fog\n");
        assert_eq!(fx.read("prompts/0002.txt"), "");
        assert_eq!(fx.read("prompts/0004.txt"), "");
        assert_eq!(report.filled, vec!["0001"]);
        assert_eq!(
            report.skipped,
            vec![("0002".to_string(), SkipReason::UserSkipped)]
        );
        assert_eq!(report.stopped_at.as_deref(), Some("0003"));
        assert_eq!(seen.last().map(String::as_str), Some("stop 0003"));
        assert!(!seen.iter().any(|line| line.contains("0004")));
        // Quitting still re-renders what was filled so far.
        assert!(fx.read("README.md").contains("Harbor lights"));
    }

    #[test]
    fn fill_clipboard_step_empty_clipboard_is_skipped() {
        let mut fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.gallery.config.fill.clipboard_command = command(&["true"]);

        let report = fill(
            &fx.gallery,
            Target::One(1),
            &TextSource::ClipboardStep,
            &mut Cursor::new("\n"),
            |_| {},
        )
        .unwrap();

        assert!(report.filled.is_empty());
        assert_eq!(
            report.skipped,
            vec![("0001".to_string(), SkipReason::ClipboardEmpty)]
        );
    }

    #[test]
    fn fill_editor_saves_text_written_by_command() {
        let mut fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.gallery.config.fill.editor_command =
            command(&["sh", "-c", "printf 'Edited by hand' > \"$0\""]);
        let mut seen = Vec::new();

        let report = fill(
            &fx.gallery,
            Target::One(1),
            &TextSource::Editor,
            &mut Cursor::new("\n"),
            |event| seen.push(event_line(event)),
        )
        .unwrap();

        assert_eq!(report.filled, vec!["0001"]);
        assert_eq!(seen, vec!["start 0001", "saved 0001"]);
        assert_eq!(fx.read("prompts/0001.txt"), "Edited by hand");
    }

    #[test]
    fn fill_editor_closed_without_text_is_skipped() {
        let mut fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.gallery.config.fill.editor_command = command(&["true"]);

        let report = fill(
            &fx.gallery,
            Target::One(1),
            &TextSource::Editor,
            &mut Cursor::new(""),
            |_| {},
        )
        .unwrap();

        assert_eq!(
            report.skipped,
            vec![("0001".to_string(), SkipReason::StillEmpty)]
        );
    }

    #[test]
    fn fill_editor_missing_program_is_error() {
        let mut fx = GalleryFixture::new();
        fx.prompt("0001", "");
        fx.gallery.config.fill.editor_command = command(&["definitely-not-an-editor"]);

        let result = fill(
            &fx.gallery,
            Target::One(1),
            &TextSource::Editor,
            &mut Cursor::new("\n"),
            |_| {},
        );
        assert!(matches!(result, Err(FillError::Editor(_))));
    }

    #[test]
    fn clipboard_watch_source_uses_config() {
        let mut fx = GalleryFixture::new();
        fx.gallery.config.fill.watch_interval_ms = 50;
        fx.gallery.config.fill.watch_attempts = 7;
        assert_eq!(
            TextSource::clipboard_watch(&fx.gallery),
            TextSource::ClipboardWatch {
                interval: Duration::from_millis(50),
                attempts: 7,
            }
        );
    }
}
