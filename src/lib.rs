pub mod cli;
pub mod controller;
pub mod domain;
pub mod export;
pub mod filter;
pub mod inputter;
pub mod logging;
pub mod model;
pub mod sort;
pub mod table;
pub mod ui;
pub mod view;

pub use domain::{ViewerConfig, ViewerError};
pub use export::{Download, DownloadTarget, build_download, encode_csv, export_filename};
pub use filter::{FilterState, filter_rows};
pub use sort::{SortConfig, SortDirection, sort_rows};
pub use table::{Record, Table};
pub use view::{RenderedView, ViewState, export_view, visible_rows};
