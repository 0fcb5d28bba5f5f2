use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const HELP_TEXT: &str = "\
csvv - keyboard shortcuts

  q            quit
  arrows/hjkl  move the selection
  PgUp/PgDown  move one page
  g / G        jump to the first / last row
  /            search all columns
  f            filter the selected column
  c            clear search and column filters
  s / Enter    sort by the selected column (toggles direction)
  e            export the current view as csv
  y            copy the current view as csv to the clipboard
  ?            show this help
  Esc          close popup / cancel input";

#[derive(Debug)]
pub enum ViewerError {
    IoError(Error),
    ClipboardError(arboard::Error),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    InvalidArgument(String),
    LoggingSetup(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::IoError(e) => write!(f, "io error: {e}"),
            ViewerError::ClipboardError(e) => write!(f, "clipboard unavailable: {e}"),
            ViewerError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            ViewerError::FileNotFound => write!(f, "file not found"),
            ViewerError::PermissionDenied => write!(f, "permission denied"),
            ViewerError::UnknownFileType => write!(f, "unknown file type, expected a .csv file"),
            ViewerError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ViewerError::LoggingSetup(msg) => write!(f, "could not set up logging: {msg}"),
        }
    }
}

impl std::error::Error for ViewerError {}

impl From<Error> for ViewerError {
    fn from(err: Error) -> Self {
        ViewerError::IoError(err)
    }
}

impl From<arboard::Error> for ViewerError {
    fn from(err: arboard::Error) -> Self {
        ViewerError::ClipboardError(err)
    }
}

#[derive(Debug, Clone, Setters)]
pub struct ViewerConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub output_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 30,
            output_dir: PathBuf::from("."),
        }
    }
}

/// What the command line input is currently editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
    FilterColumn(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    Search,
    Filter,
    ClearFilters,
    Sort,
    Export,
    ExportClipboard,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}
