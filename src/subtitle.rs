use std::fmt;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, SubtransError};

/// One time-coded caption block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    /// Sequence identifier, kept verbatim
    pub index: String,
    /// Time range line, kept verbatim and never parsed
    pub timing: String,
    /// Caption lines joined with `\n`
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(index: impl Into<String>, timing: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            timing: timing.into(),
            text: text.into(),
        }
    }

    /// Append this entry in block form, including the trailing blank line.
    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.index);
        out.push('\n');
        out.push_str(&self.timing);
        out.push('\n');
        out.push_str(&self.text);
        out.push_str("\n\n");
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}

/// Ordered subtitle entries; position is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleDocument {
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleDocument {
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        Self { entries }
    }

    /// Parse blank-line separated blocks of `index`, `timing` and one or more text lines.
    ///
    /// A block with fewer than three lines fails the whole document.
    pub fn parse(content: &str) -> Result<Self> {
        let normalized = content.replace("\r\n", "\n");
        let mut entries = Vec::new();
        let mut block: Vec<&str> = Vec::new();

        // Only truly empty lines separate blocks; whitespace-only lines are caption text.
        for line in normalized.trim().lines() {
            if line.is_empty() {
                if !block.is_empty() {
                    entries.push(Self::parse_block(&block, entries.len() + 1)?);
                    block.clear();
                }
            } else {
                block.push(line);
            }
        }
        if !block.is_empty() {
            entries.push(Self::parse_block(&block, entries.len() + 1)?);
        }

        debug!("Parsed {} subtitle entries", entries.len());
        Ok(Self { entries })
    }

    fn parse_block(lines: &[&str], block: usize) -> Result<SubtitleEntry> {
        if lines.len() < 3 {
            return Err(SubtransError::MalformedBlock {
                block,
                lines: lines.len(),
            });
        }

        Ok(SubtitleEntry {
            index: lines[0].to_string(),
            timing: lines[1].to_string(),
            text: lines[2..].join("\n"),
        })
    }

    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            entry.write_to(&mut out);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SubtitleDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Read and parse a subtitle file
pub async fn read_document<P: AsRef<Path>>(path: P) -> Result<SubtitleDocument> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SubtransError::FileNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path).await?;
    SubtitleDocument::parse(&content)
}

/// Serialize a document to disk, creating parent directories as needed
pub async fn write_document<P: AsRef<Path>>(path: P, document: &SubtitleDocument) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(path, document.serialize()).await?;
    info!("Wrote {} entries to {}", document.len(), path.display());
    Ok(())
}
