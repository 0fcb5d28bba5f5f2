use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{info, warn};

use crate::domain::{ViewerConfig, ViewerError};
use crate::export::{DirectoryTarget, DownloadTarget};
use crate::model::Model;
use crate::table::Table;
use crate::view::{ViewState, export_view};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "A tui based CSV dataset viewer.")]
pub struct Args {
    /// CSV file to open
    pub path: String,

    /// Title of the view, used to name exports. Defaults to the file name without extension
    #[arg(long)]
    pub title: Option<String>,

    /// Directory exports are written to
    #[arg(long, default_value = ".")]
    pub output_dir: String,

    /// Log file, the terminal belongs to the viewer
    #[arg(long, default_value = "csvv.log")]
    pub log_file: String,

    /// Log level filter, RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    pub poll_ms: u64,

    /// Maximum rendered width of a column
    #[arg(long, default_value_t = 30)]
    pub max_column_width: usize,

    /// Export the view without starting the viewer
    #[arg(long)]
    pub export: bool,

    /// Search term applied before exporting
    #[arg(long, requires = "export")]
    pub search: Option<String>,

    /// Column filter applied before exporting, can be repeated
    #[arg(
        long = "filter",
        value_name = "COLUMN=VALUE",
        value_parser = parse_filter,
        requires = "export"
    )]
    pub filters: Vec<(String, String)>,

    /// Activate sorting on a column before exporting. Repeat a column to flip the direction
    #[arg(long = "sort", value_name = "COLUMN", requires = "export")]
    pub sort: Vec<String>,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got \"{s}\"")),
    }
}

fn expand_path(path: &str) -> Result<PathBuf, ViewerError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| ViewerError::InvalidArgument(format!("{path}: {e}")))
}

impl Args {
    pub fn input_path(&self) -> Result<PathBuf, ViewerError> {
        expand_path(&self.path)
    }

    pub fn log_file_path(&self) -> Result<PathBuf, ViewerError> {
        expand_path(&self.log_file)
    }

    pub fn config(&self) -> Result<ViewerConfig, ViewerError> {
        if self.max_column_width < 4 {
            return Err(ViewerError::InvalidArgument(
                "max-column-width has to be at least 4".into(),
            ));
        }
        Ok(ViewerConfig::default()
            .event_poll_time(self.poll_ms)
            .max_column_width(self.max_column_width)
            .output_dir(expand_path(&self.output_dir)?))
    }

    pub fn title_for(&self, path: &Path) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("export")
                .to_string(),
        }
    }

    /// View state described by `--search`, `--filter` and `--sort`.
    pub fn view_state(&self, table: &Table) -> ViewState {
        let mut state = ViewState::new();
        for (column, value) in &self.filters {
            if !table.headers().contains(column) {
                warn!("Filter on unknown column \"{column}\" compares against \"undefined\"");
            }
            state.set_filter(column.clone(), value.clone());
        }
        for column in &self.sort {
            if !table.headers().contains(column) {
                warn!("Sorting by unknown column \"{column}\" keeps the row order");
            }
            state.activate_sort(column);
        }
        if let Some(search) = &self.search {
            state.set_search(search.clone());
        }
        state
    }
}

/// Load, filter, sort and export without a terminal. Returns where the export went.
pub fn run_batch(args: &Args) -> Result<String, ViewerError> {
    let path = args.input_path()?;
    let config = args.config()?;
    let table = Model::load_data_file(&path)?;
    let state = args.view_state(&table);
    let download = export_view(&args.title_for(&path), &table, &state);
    info!(
        "Batch export of {} with {:?}",
        path.display(),
        state
    );
    DirectoryTarget::new(config.output_dir).deliver(&download)
}
