use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::model::{Model, UIData};

pub const TITLE_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const CMDLINE_HEIGH: usize = 2;
pub const COLUMN_WIDTH_MARGIN: usize = 2;

#[derive(Debug, Default)]
pub struct TableUI;

impl TableUI {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [title_area, table_area, status_area, cmd_area] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT as u16),
            Constraint::Min(TABLE_HEADER_HEIGHT as u16),
            Constraint::Length(1),
            Constraint::Length((CMDLINE_HEIGH - 1) as u16),
        ])
        .areas(frame.area());

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::from(format!(" {} ", uidata.name)).bold(),
                Span::from(format!(" {}", uidata.row_count_label)).fg(Color::DarkGray),
            ])),
            title_area,
        );

        Self::draw_table(uidata, frame, table_area);
        Self::draw_statusline(uidata, frame, status_area);
        Self::draw_cmdline(uidata, frame, cmd_area);

        if uidata.show_popup {
            Self::draw_popup(&uidata.popup_message, frame);
        }
    }

    fn draw_table(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(uidata.table.iter().enumerate().map(|(cidx, c)| {
            let style = if cidx == uidata.selected_column {
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Cell::from(c.name.clone()).style(style)
        }))
        .style(Style::default().bg(Color::DarkGray));

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows = (0..nrows).map(|ridx| {
            Row::new(uidata.table.iter().enumerate().map(|(cidx, c)| {
                let cell = Cell::from(c.data[ridx].clone());
                if ridx == uidata.selected_row && cidx == uidata.selected_column {
                    cell.style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    cell
                }
            }))
            .style(if ridx == uidata.selected_row {
                Style::default().bg(Color::Indexed(236))
            } else {
                Style::default()
            })
        });

        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16));
        frame.render_widget(Table::new(rows, widths).header(header).column_spacing(1), area);

        if let Some(message) = &uidata.empty_message {
            let [_, message_area] = Layout::vertical([
                Constraint::Length(TABLE_HEADER_HEIGHT as u16 + 1),
                Constraint::Min(1),
            ])
            .areas(area);
            frame.render_widget(
                Paragraph::new(message.as_str()).centered().fg(Color::Gray),
                message_area,
            );
        }
    }

    fn draw_statusline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let position = if uidata.nrows == 0 {
            String::from("-")
        } else {
            format!("{}/{}", uidata.abs_selected_row + 1, uidata.nrows)
        };
        let [message_area, position_area] = Layout::horizontal([
            Constraint::Min(1),
            Constraint::Length(position.len() as u16 + 1),
        ])
        .areas(area);
        frame.render_widget(
            Paragraph::new(uidata.status_message.as_str()).fg(Color::Yellow),
            message_area,
        );
        frame.render_widget(Paragraph::new(position).right_aligned(), position_area);
    }

    fn draw_cmdline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        if !uidata.active_cmdinput {
            return;
        }
        let prompt = uidata.cmd_label.as_str();
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::from(prompt).bold(),
                Span::from(uidata.cmdinput.input.as_str()),
            ])),
            area,
        );
        let x = area.x + (prompt.chars().count() + uidata.cmdinput.curser_pos) as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }

    fn draw_popup(message: &str, frame: &mut Frame) {
        let area = frame.area();
        let width = std::cmp::min(area.width, 60);
        let height = std::cmp::min(area.height, message.lines().count() as u16 + 2);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message)
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(" Help ")),
            popup,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, ViewerConfig};
    use crate::table::Table;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal.draw(|f| TableUI::new().draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn model() -> Model {
        let table = Table::parse("Name,Age\nBob,30\nAnn,25");
        Model::init(&ViewerConfig::default(), "People", table, 60, 12)
    }

    #[test]
    fn renders_title_counts_and_rows() {
        let mut model = model();
        model.update(Some(Message::Sort)).unwrap();
        let screen = render(&model);
        assert!(screen.contains("People"));
        assert!(screen.contains("2 of 2 rows"));
        assert!(screen.contains("Name ▲"));
        assert!(screen.find("Ann").unwrap() < screen.find("Bob").unwrap());
    }

    #[test]
    fn renders_empty_state() {
        let mut model = model();
        model.update(Some(Message::Search)).unwrap();
        for c in "zzz".chars() {
            let key = ratatui::crossterm::event::KeyEvent::new(
                ratatui::crossterm::event::KeyCode::Char(c),
                ratatui::crossterm::event::KeyModifiers::NONE,
            );
            model.update(Some(Message::RawKey(key))).unwrap();
        }
        let screen = render(&model);
        assert!(screen.contains("No matching data found"));
        assert!(screen.contains("0 of 2 rows"));
        assert!(screen.contains("Search: zzz"));
    }

    #[test]
    fn renders_help_popup() {
        let mut model = model();
        model.update(Some(Message::Help)).unwrap();
        assert!(render(&model).contains("keyboard shortcuts"));
    }
}
