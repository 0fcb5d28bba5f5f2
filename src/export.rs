use std::io::Write;
use std::path::{Path, PathBuf};

use arboard::Clipboard;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::domain::ViewerError;
use crate::table::Record;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// Written in place of a value the source row did not have.
pub const ABSENT_VALUE: &str = "undefined";

/// An export ready to be handed to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn as_text(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// Where a download ends up. Returns a short description of the destination.
pub trait DownloadTarget {
    fn deliver(&mut self, download: &Download) -> Result<String, ViewerError>;
}

/// Writes downloads as files into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
}

impl DirectoryTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadTarget for DirectoryTarget {
    #[instrument(skip_all, fields(filename = %download.filename))]
    fn deliver(&mut self, download: &Download) -> Result<String, ViewerError> {
        // The file only shows up under its final name once fully written.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&download.bytes)?;
        tmp.flush()?;
        let path = self.dir.join(&download.filename);
        tmp.persist(&path).map_err(|e| ViewerError::IoError(e.error))?;
        info!("Exported {} bytes to {}", download.bytes.len(), path.display());
        Ok(path.display().to_string())
    }
}

/// Puts the csv text on the system clipboard.
#[derive(Default)]
pub struct ClipboardTarget {
    clipboard: Option<Clipboard>,
}

impl DownloadTarget for ClipboardTarget {
    #[instrument(skip_all, fields(filename = %download.filename))]
    fn deliver(&mut self, download: &Download) -> Result<String, ViewerError> {
        // Opening a clipboard fails on headless hosts, so only try on first use.
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            clipboard.set_text(download.as_text().to_string())?;
        }
        debug!("Copied {} bytes to clipboard", download.bytes.len());
        Ok("clipboard".to_string())
    }
}

// Same set as the `\s` class of ECMAScript regular expressions.
fn is_title_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0b}' | '\u{0c}' | '\r' | ' ' | '\u{a0}' | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}' | '\u{2029}' | '\u{202f}' | '\u{205f}' | '\u{3000}' | '\u{feff}'
    )
}

/// File name for an export of a view titled `title`.
pub fn export_filename(title: &str) -> String {
    let mut name = String::with_capacity(title.len() + 4);
    let mut in_whitespace = false;
    for c in title.to_lowercase().chars() {
        if is_title_whitespace(c) {
            if !in_whitespace {
                name.push('-');
            }
            in_whitespace = true;
        } else {
            name.push(c);
            in_whitespace = false;
        }
    }
    name.push_str(".csv");
    name
}

fn encode_value(value: Option<&str>) -> String {
    match value {
        // Serializing a str can not fail.
        Some(v) => serde_json::to_string(v).unwrap_or_default(),
        None => ABSENT_VALUE.to_string(),
    }
}

/// Header line followed by one line per row, every value json string encoded.
pub fn encode_csv<H: AsRef<str>>(headers: &[H], rows: &[&Record]) -> String {
    let mut out = headers
        .iter()
        .map(|h| h.as_ref())
        .collect::<Vec<&str>>()
        .join(",");
    out.push('\n');
    for row in rows {
        let line = headers
            .iter()
            .map(|h| encode_value(row.get(h.as_ref())))
            .collect::<Vec<String>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn build_download<H: AsRef<str>>(title: &str, headers: &[H], rows: &[&Record]) -> Download {
    Download {
        filename: export_filename(title),
        mime_type: CSV_MIME_TYPE,
        bytes: encode_csv(headers, rows).into_bytes(),
    }
}
