//! Centralized filename parsing for the `NNNN` id convention.
//!
//! Every gallery file starts with a four digit, zero-padded id. The id is the
//! only join key between the image directory and the prompt directory:
//!
//! - `0007.jpg`, `0007.webp` → image for entry `0007`
//! - `0007.txt` → prompt text for entry `0007`
//! - `0007.tags.json` → tag record for entry `0007`
//!
//! Anything else (`02seed.png`, `notes.txt`, `0007-draft.txt`) is ignored by
//! the scanner.

/// Width of an entry id.
pub const ID_WIDTH: usize = 4;

const PROMPT_SUFFIX: &str = ".txt";
const TAGS_SUFFIX: &str = ".tags.json";

/// Which file set a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Image,
    Prompt,
    Tags,
}

/// Leading id of a name, if the first four characters are ASCII digits.
pub fn id_prefix(name: &str) -> Option<&str> {
    let bytes = name.as_bytes();
    if bytes.len() >= ID_WIDTH && bytes[..ID_WIDTH].iter().all(u8::is_ascii_digit) {
        Some(&name[..ID_WIDTH])
    } else {
        None
    }
}

/// `NNNN.<ext>` with a non-empty extension.
pub fn is_image_name(name: &str) -> bool {
    id_prefix(name).is_some()
        && name.as_bytes().get(ID_WIDTH) == Some(&b'.')
        && name.len() > ID_WIDTH + 1
}

/// Exactly `NNNN.txt`.
pub fn is_prompt_name(name: &str) -> bool {
    name.len() == ID_WIDTH + PROMPT_SUFFIX.len()
        && name.ends_with(PROMPT_SUFFIX)
        && id_prefix(name).is_some()
}

/// `NNNN*.tags.json`.
pub fn is_tags_name(name: &str) -> bool {
    name.ends_with(TAGS_SUFFIX) && id_prefix(name).is_some()
}

/// Classify a name from the prompt directory.
pub fn classify_prompt_dir(name: &str) -> Option<FileKind> {
    if is_prompt_name(name) {
        Some(FileKind::Prompt)
    } else if is_tags_name(name) {
        Some(FileKind::Tags)
    } else {
        None
    }
}

/// Format a number as a zero-padded id (`7` → `0007`).
pub fn format_id(number: u32) -> String {
    format!("{:0width$}", number, width = ID_WIDTH)
}

/// Parse a CLI-style id argument: exactly four ASCII digits.
pub fn parse_id(arg: &str) -> Option<u32> {
    if arg.len() == ID_WIDTH && arg.bytes().all(|b| b.is_ascii_digit()) {
        arg.parse().ok()
    } else {
        None
    }
}

pub fn prompt_filename(id: &str) -> String {
    format!("{id}{PROMPT_SUFFIX}")
}

pub fn tags_filename(id: &str) -> String {
    format!("{id}{TAGS_SUFFIX}")
}
