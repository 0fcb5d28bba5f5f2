use ratatui::crossterm::event::KeyEvent;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};
use tracing_error::SpanTrace;

use crate::domain::{CMDMode, HELP_TEXT, Message, ViewerConfig, ViewerError};
use crate::export::{ClipboardTarget, DirectoryTarget, DownloadTarget};
use crate::inputter::{InputResult, Inputter};
use crate::table::Table;
use crate::ui::{CMDLINE_HEIGH, COLUMN_WIDTH_MARGIN, TABLE_HEADER_HEIGHT, TITLE_HEIGHT};
use crate::view::{RenderedView, ViewState, export_view};

pub const EMPTY_VIEW_MESSAGE: &str = "No matching data found";

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug)]
pub struct FileInfo {
    path: PathBuf,
    file_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    CMDINPUT,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub nrows: usize, // Rows left after search and filters
    pub total_rows: usize,
    pub row_count_label: String,
    pub empty_message: Option<String>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub layout: UILayout,
    pub last_update: Instant,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub cmd_label: String,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            nrows: 0,
            total_rows: 0,
            row_count_label: String::new(),
            empty_message: None,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            show_popup: false,
            popup_message: String::new(),
            layout: UILayout::default(),
            last_update: Instant::now(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            cmd_label: String::new(),
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_width: usize,
    pub table_height: usize,
    pub statusline_width: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let table_height =
            ui_height.saturating_sub(TITLE_HEIGHT + TABLE_HEADER_HEIGHT + CMDLINE_HEIGH);
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_width: ui_width,
            table_height,
            statusline_width: ui_width,
            statusline_height: CMDLINE_HEIGH,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    title: String,
    table: Table,
    state: ViewState,
    view: RenderedView,
    column_widths: Vec<usize>, // Render width of each table column
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    offset_column: usize,
    visible_columns: Vec<usize>,
    uilayout: UILayout,
    uidata: UIData,
    file_target: Box<dyn DownloadTarget>,
    clipboard_target: Box<dyn DownloadTarget>,
    input: Inputter,
    input_backup: String,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(
        config: &ViewerConfig,
        title: impl Into<String>,
        table: Table,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        let state = ViewState::new();
        let view = RenderedView::build(&table, &state);
        let column_widths = Self::calculate_column_widths(&table, config.max_column_width);
        let mut model = Self {
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            title: title.into(),
            table,
            state,
            view,
            column_widths,
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            offset_column: 0,
            visible_columns: Vec::new(),
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            file_target: Box::new(DirectoryTarget::new(config.output_dir.clone())),
            clipboard_target: Box::new(ClipboardTarget::default()),
            input: Inputter::default(),
            input_backup: String::new(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        let message = format!(
            "Loaded {} rows, {} columns. Press ? for help.",
            model.table.nrows(),
            model.table.ncolumns()
        );
        model.set_status_message(message);
        model.update_table_data();
        model
    }

    /// Replace where exports and clipboard exports are delivered.
    pub fn with_targets(
        mut self,
        file_target: Box<dyn DownloadTarget>,
        clipboard_target: Box<dyn DownloadTarget>,
    ) -> Self {
        self.file_target = file_target;
        self.clipboard_target = clipboard_target;
        self
    }

    /// Read and parse a csv file.
    #[instrument]
    pub fn load_data_file(path: &Path) -> Result<Table, ViewerError> {
        let file_info = Model::get_file_info(path)?;
        let start_time = Instant::now();
        let content = fs::read_to_string(&file_info.path)?;
        let table = Table::parse(&content);
        info!(
            "Loading {} bytes took {}ms",
            file_info.file_size,
            start_time.elapsed().as_millis()
        );
        debug!("Headers: {:?}", table.headers());
        Ok(table)
    }

    fn get_file_info(path: &Path) -> Result<FileInfo, ViewerError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ViewerError::FileNotFound,
            ErrorKind::PermissionDenied => ViewerError::PermissionDenied,
            _ => ViewerError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(ViewerError::LoadingFailed("Not a file!".into()));
        }
        Model::detect_file_type(path)?;

        Ok(FileInfo {
            path: path.to_path_buf(),
            file_size: metadata.len(),
        })
    }

    fn detect_file_type(path: &Path) -> Result<(), ViewerError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") | Some("TXT") => Ok(()),
            _ => Err(ViewerError::UnknownFileType),
        }
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn view(&self) -> &RenderedView {
        &self.view
    }

    pub fn view_state(&self) -> &ViewState {
        &self.state
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
        self.uidata.last_update = Instant::now();
    }

    fn calculate_column_widths(table: &Table, max_column_width: usize) -> Vec<usize> {
        table
            .headers()
            .iter()
            .map(|header| {
                let max_value = table
                    .rows()
                    .iter()
                    .map(|r| r.get(header).map(|v| v.chars().count()).unwrap_or(0))
                    .max()
                    .unwrap_or(0);
                // Room for the sort indicator next to the header
                let width =
                    std::cmp::max(header.chars().count() + 2, max_value) + COLUMN_WIDTH_MARGIN;
                std::cmp::min(width, max_column_width)
            })
            .collect()
    }

    fn get_visible_name(name: &str, width: usize) -> String {
        if width < 3 {
            return String::new();
        }
        if name.chars().count() > width {
            let mut reduced: String = name.chars().take(width - 3).collect();
            reduced.push_str("...");
            reduced
        } else {
            name.to_string()
        }
    }

    fn current_column(&self) -> Option<usize> {
        self.visible_columns.get(self.curser_column).copied()
    }

    fn column_label(&self, cidx: usize) -> String {
        let name = &self.table.headers()[cidx];
        match &self.state.sort {
            Some(sort) if &sort.key == name => format!("{} {}", name, sort.direction.indicator()),
            _ => name.clone(),
        }
    }

    // Rebuild the rendered view after search, filters or sort changed.
    fn recompute(&mut self) {
        let start_time = Instant::now();
        self.view = RenderedView::build(&self.table, &self.state);
        trace!(
            "Recomputed view with {} rows in {}us",
            self.view.filtered,
            start_time.elapsed().as_micros()
        );
        // Keep the selection inside the, possibly shorter, new view
        let last_row = self.view.filtered.saturating_sub(1);
        let row = std::cmp::min(self.offset_row + self.curser_row, last_row);
        self.select_row(row);
    }

    fn update_table_data(&mut self) {
        let table_width = self.uilayout.table_width;
        let rbegin = std::cmp::min(self.offset_row, self.view.rows.len());
        let rend = std::cmp::min(rbegin + self.uilayout.table_height, self.view.rows.len());

        self.visible_columns.clear();
        let mut visible_width = 0;
        let mut widths = Vec::new();
        for cidx in self.offset_column..self.table.ncolumns() {
            let width = self.column_widths[cidx];
            if visible_width + width + 1 <= table_width {
                self.visible_columns.push(cidx);
                widths.push(width);
                visible_width += width + 1;
            } else {
                // Add the last partially visible column
                if visible_width < table_width {
                    self.visible_columns.push(cidx);
                    widths.push(table_width - visible_width);
                }
                break;
            }
        }
        self.curser_column = std::cmp::min(
            self.curser_column,
            self.visible_columns.len().saturating_sub(1),
        );

        let table: Vec<ColumnView> = self
            .visible_columns
            .iter()
            .zip(widths)
            .map(|(&cidx, width)| ColumnView {
                name: Self::get_visible_name(&self.column_label(cidx), width),
                width,
                data: self.view.rows[rbegin..rend]
                    .iter()
                    .map(|row| row[cidx].clone())
                    .collect(),
            })
            .collect();

        trace!(
            "Table: Cr {}, Cc {}, Or {}, Oc {}, Rb {}, Re {}, columns {:?}",
            self.curser_row,
            self.curser_column,
            self.offset_row,
            self.offset_column,
            rbegin,
            rend,
            self.visible_columns
        );

        let show_popup = self.modus == Modus::POPUP;
        self.uidata = UIData {
            name: self.title.clone(),
            table,
            nrows: self.view.filtered,
            total_rows: self.view.total,
            row_count_label: self.view.row_count_label(),
            empty_message: self.view.is_empty().then(|| EMPTY_VIEW_MESSAGE.to_string()),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            abs_selected_row: self.offset_row + self.curser_row,
            show_popup,
            popup_message: if show_popup { HELP_TEXT.to_string() } else { String::new() },
            layout: self.uilayout.clone(),
            last_update: Instant::now(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            cmd_label: self.cmd_label(),
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        };
    }

    fn cmd_label(&self) -> String {
        match self.cmd_mode {
            Some(CMDMode::Search) => "Search: ".to_string(),
            Some(CMDMode::FilterColumn(cidx)) => {
                format!("Filter {}: ", self.table.headers()[cidx])
            }
            None => String::new(),
        }
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        let last_visible = self.uilayout.table_height.saturating_sub(1);
        if self.curser_row > last_visible {
            self.offset_row += self.curser_row - last_visible;
            self.curser_row = last_visible;
        }
        self.update_table_data();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), ViewerError> {
        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MoveLeft => self.move_selection_left(),
                    Message::MoveRight => self.move_selection_right(),
                    Message::MovePageUp => self.move_selection_up(self.uilayout.table_height),
                    Message::MovePageDown => self.move_selection_down(self.uilayout.table_height),
                    Message::MoveBeginning => self.move_selection_beginning(),
                    Message::MoveEnd => self.move_selection_end(),
                    Message::Search => self.enter_cmd_mode(CMDMode::Search),
                    Message::Filter => {
                        if let Some(cidx) = self.current_column() {
                            self.enter_cmd_mode(CMDMode::FilterColumn(cidx));
                        }
                    }
                    Message::ClearFilters => self.clear_filters(),
                    Message::Sort => self.sort_current_column(),
                    Message::Export => self.export(false),
                    Message::ExportClipboard => self.export(true),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::RawKey(_) => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help => self.exit(),
                    _ => (),
                },
                Modus::CMDINPUT => match msg {
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
            self.update_table_data();
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.update_table_data();
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {:?} ...", mode);
        let current = match mode {
            CMDMode::Search => self.state.search.clone(),
            CMDMode::FilterColumn(cidx) => self
                .state
                .filters
                .get(&self.table.headers()[cidx])
                .unwrap_or_default()
                .to_string(),
        };
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);
        self.active_cmdinput = true;
        self.input.set(&current);
        self.input_backup = current;
        self.last_input = self.input.get();
        self.update_table_data();
    }

    // Every edit is applied right away so the table follows the typing.
    fn raw_input(&mut self, key: KeyEvent) {
        if !self.active_cmdinput {
            return;
        }
        self.last_input = self.input.read(key);
        if self.last_input.canceled {
            let backup = self.input_backup.clone();
            self.apply_cmd_input(&backup);
        } else {
            let input = self.last_input.input.clone();
            self.apply_cmd_input(&input);
        }
        if self.last_input.finished {
            self.leave_cmd_mode();
        }
        self.recompute();
    }

    fn apply_cmd_input(&mut self, value: &str) {
        match self.cmd_mode {
            Some(CMDMode::Search) => self.state.set_search(value),
            Some(CMDMode::FilterColumn(cidx)) => {
                let column = self.table.headers()[cidx].clone();
                self.state.set_filter(column, value);
            }
            None => info!("Cmd mode is none!"),
        }
    }

    fn leave_cmd_mode(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        let message = match self.cmd_mode {
            Some(CMDMode::Search) if !self.state.search.is_empty() => {
                format!("Search \"{}\": {}", self.state.search, self.view_label())
            }
            Some(CMDMode::FilterColumn(_)) if !self.state.search.is_empty() => {
                "Column filters are ignored while a search term is set".to_string()
            }
            _ => self.view_label(),
        };
        self.cmd_mode = None;
        self.input.clear();
        self.last_input = self.input.get();
        self.set_status_message(message);
    }

    fn view_label(&self) -> String {
        let filtered = crate::view::visible_rows(&self.table, &self.state).len();
        format!("{} of {} rows", filtered, self.table.nrows())
    }

    fn clear_filters(&mut self) {
        self.state.clear_filters();
        self.recompute();
        self.set_status_message("Cleared search and filters");
        self.update_table_data();
    }

    fn sort_current_column(&mut self) {
        let Some(cidx) = self.current_column() else {
            return;
        };
        let key = self.table.headers()[cidx].clone();
        let sort = self.state.activate_sort(&key).clone();
        debug!("Sorting by {} {}", sort.key, sort.direction);
        self.recompute();
        self.set_status_message(format!("Sorted by {} {}", sort.key, sort.direction));
        self.update_table_data();
    }

    #[instrument(skip(self), fields(title = %self.title))]
    fn export(&mut self, to_clipboard: bool) {
        let download = export_view(&self.title, &self.table, &self.state);
        let target = if to_clipboard {
            &mut self.clipboard_target
        } else {
            &mut self.file_target
        };
        let message = match target.deliver(&download) {
            Ok(location) => format!("Exported {} rows to {}", self.view.filtered, location),
            Err(e) => {
                error!("Export of {} failed: {}\n{}", download.filename, e, SpanTrace::capture());
                warn!("Download target unavailable, nothing was exported");
                format!("Export failed: {e}")
            }
        };
        self.set_status_message(message);
        self.update_table_data();
    }

    fn select_row(&mut self, row: usize) {
        let height = self.uilayout.table_height.max(1);
        if row >= self.offset_row && row < self.offset_row + height {
            self.curser_row = row - self.offset_row;
        } else if row < self.offset_row {
            self.offset_row = row;
            self.curser_row = 0;
        } else {
            self.curser_row = height - 1;
            self.offset_row = row + 1 - height;
        }
        self.update_table_data();
    }

    fn move_selection_beginning(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
        self.update_table_data();
    }

    fn move_selection_end(&mut self) {
        let last_row = self.view.filtered.saturating_sub(1);
        self.select_row(last_row);
    }

    fn move_selection_up(&mut self, size: usize) {
        let row = (self.offset_row + self.curser_row).saturating_sub(size.max(1));
        self.select_row(row);
    }

    fn move_selection_down(&mut self, size: usize) {
        let last_row = self.view.filtered.saturating_sub(1);
        let row = std::cmp::min(self.offset_row + self.curser_row + size.max(1), last_row);
        self.select_row(row);
    }

    fn move_selection_left(&mut self) {
        if self.curser_column > 0 {
            self.curser_column -= 1;
        } else if self.offset_column > 0 {
            self.offset_column -= 1;
        }
        self.update_table_data();
    }

    fn move_selection_right(&mut self) {
        let ncolumns = self.table.ncolumns();
        if self.curser_column + self.offset_column + 1 < ncolumns {
            if self.curser_column + 1 < self.visible_columns.len() {
                self.curser_column += 1;
            } else {
                self.offset_column += 1;
            }
            self.update_table_data();
        }
    }
}
