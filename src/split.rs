//! Reflow of long single-line captions into two lines.
//!
//! Runs over finished output, separately from translation. Widths are
//! counted in characters. Only captions that are exactly one line are
//! touched, so a second pass never splits anything further.

use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::subtitle::{read_document, write_document, SubtitleDocument};

/// Split `line` in two near its middle when it is wider than `max_width`.
///
/// The break goes on the nearest space left of the midpoint; without one,
/// the line is cut exactly at the midpoint.
pub fn split_line(line: &str, max_width: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= max_width {
        return line.to_string();
    }

    let mid = chars.len() / 2;
    let mut at = mid;
    while at > 0 && chars[at] != ' ' {
        at -= 1;
    }
    if at == 0 {
        at = mid;
    }

    let first: String = chars[..at].iter().collect();
    let second: String = chars[at..].iter().collect();
    format!("{}\n{}", first.trim(), second.trim())
}

/// Split every single-line entry in place; returns how many changed.
pub fn split_document(document: &mut SubtitleDocument, max_width: usize) -> usize {
    let mut changed = 0;
    for entry in document.entries.iter_mut().filter(|e| e.line_count() == 1) {
        let split = split_line(&entry.text, max_width);
        if split != entry.text {
            entry.text = split;
            changed += 1;
        }
    }
    changed
}

/// Rewrite a subtitle file with long lines split. The file is left alone
/// when nothing needs splitting.
pub async fn split_file<P: AsRef<Path>>(path: P, max_width: usize) -> Result<usize> {
    let path = path.as_ref();
    info!("Splitting file: {}", path.display());

    let mut document = read_document(path).await?;
    let changed = split_document(&mut document, max_width);
    if changed > 0 {
        write_document(path, &document).await?;
    } else {
        debug!("No lines to split in {}", path.display());
    }
    Ok(changed)
}
