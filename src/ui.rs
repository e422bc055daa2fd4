use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::domain::{FilterKind, Focus, Message};
use crate::model::{Model, Status};
use crate::pagination::{PageControl, Pagination, control_areas};
use crate::table::{Column, CompanyTable};

pub const CONTROLS_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const PAGINATION_HEIGHT: u16 = 1;
pub const TABLE_MIN_HEIGHT: u16 = 5;

/// Clickable regions of the last drawn frame.
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    search: Option<Rect>,
    filters: Vec<(Rect, FilterKind)>,
    headers: Vec<(Rect, Option<Message>)>,
    rows: Vec<(Rect, usize)>,
    page_controls: Vec<(Rect, Option<Message>)>,
}

impl HitMap {
    pub fn message_at(&self, column: u16, row: u16) -> Option<Message> {
        let pos = Position::new(column, row);
        if self.search.is_some_and(|r| r.contains(pos)) {
            return Some(Message::Focus(Focus::Search));
        }
        if let Some((_, kind)) = self.filters.iter().find(|(r, _)| r.contains(pos)) {
            return Some(Message::CycleFilter(*kind, 1));
        }
        if let Some((_, message)) = self.headers.iter().find(|(r, _)| r.contains(pos)) {
            return message.clone();
        }
        if let Some((_, idx)) = self.rows.iter().find(|(r, _)| r.contains(pos)) {
            return Some(Message::SelectRow(*idx));
        }
        self.page_controls
            .iter()
            .find(|(r, _)| r.contains(pos))
            .and_then(|(_, message)| message.clone())
    }
}

#[derive(Debug, Default)]
pub struct TableUI {
    hits: HitMap,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> &HitMap {
        &self.hits
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        self.hits = HitMap::default();
        let [title_area, controls_area, table_area, pagination_area, status_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(CONTROLS_HEIGHT),
                Constraint::Min(TABLE_MIN_HEIGHT),
                Constraint::Length(PAGINATION_HEIGHT),
                Constraint::Length(STATUSLINE_HEIGHT),
            ])
            .areas(frame.area());

        frame.render_widget(
            Line::from(" Companies Directory ".bold().fg(Color::LightBlue)),
            title_area,
        );
        if model.status == Status::Ready {
            frame.render_widget(
                Line::from(format!("{} / {} companies ", model.matched(), model.record_count()))
                    .fg(Color::DarkGray)
                    .right_aligned(),
                title_area,
            );
        }

        match model.status {
            Status::Loading => self.draw_loading(frame, table_area),
            Status::Failed => self.draw_error(model, frame, table_area),
            Status::Ready | Status::Quitting => {
                self.draw_controls(model, frame, controls_area);
                self.draw_table(model, frame, table_area);
                self.draw_pagination(&model.page_controls(), frame, pagination_area);
            }
        }

        let status = match model.page_prompt() {
            Some(typed) => Span::from(format!("Go to page: {typed}")).fg(Color::Yellow),
            None => Span::from(model.status_message()).fg(Color::Gray),
        };
        frame.render_widget(
            Line::from(vec![
                status,
                Span::from("  ?").blue().bold(),
                Span::from(" help").fg(Color::DarkGray),
            ]),
            status_area,
        );

        if model.show_popup() {
            self.draw_popup(model.popup_message(), frame);
        }
    }

    fn draw_loading(&mut self, frame: &mut Frame, area: Rect) {
        let placeholder = "█".repeat(area.width.saturating_sub(4) as usize);
        let half = "█".repeat((area.width / 2) as usize);
        let text = Text::from(vec![
            Line::from(half.fg(Color::LightBlue)),
            Line::from(""),
            Line::from(placeholder.clone().fg(Color::DarkGray)),
            Line::from(placeholder.clone().fg(Color::DarkGray)),
            Line::from(placeholder.fg(Color::DarkGray)),
        ]);
        frame.render_widget(
            Paragraph::new(text).block(Block::bordered().title(" Loading companies ... ")),
            area,
        );
    }

    fn draw_error(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let message = model.error().unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Line::from(message.to_string().fg(Color::Red).bold()))
                .block(
                    Block::bordered()
                        .border_style(Style::new().fg(Color::Red))
                        .border_set(border::THICK),
                )
                .wrap(Wrap { trim: true }),
            area,
        );
    }

    fn draw_controls(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let [search_area, location_area, industry_area] =
            Layout::horizontal([Constraint::Fill(1); 3]).areas(area);

        let input = model.search_input();
        let title = if model.search_pending() { " Search … " } else { " Search " };
        let search_block = Self::focus_block(title, model.focus() == Focus::Search);
        let inner = search_block.inner(search_area);
        let search_text = if input.input.is_empty() {
            Line::from("Search Companies...".fg(Color::DarkGray))
        } else {
            Line::from(input.input.clone())
        };
        frame.render_widget(Paragraph::new(search_text).block(search_block), search_area);
        if model.focus() == Focus::Search && !model.show_popup() {
            let offset = input.input.chars().take(input.cursor_pos).count() as u16;
            frame.set_cursor_position(Position::new(
                std::cmp::min(inner.x + offset, inner.right().saturating_sub(1)),
                inner.y,
            ));
        }
        self.hits.search = Some(search_area);

        for (kind, area, focus, title) in [
            (FilterKind::Location, location_area, Focus::Location, " Location "),
            (FilterKind::Industry, industry_area, Focus::Industry, " Industry "),
        ] {
            let options = model.filter_options(kind).len();
            let block = Self::focus_block(title, model.focus() == focus)
                .title_bottom(Line::from(format!(" {} options ", options + 1)).right_aligned());
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::from("◂ ").fg(Color::DarkGray),
                    Span::from(model.filter_label(kind)),
                    Span::from(" ▸").fg(Color::DarkGray),
                ]))
                .block(block),
                area,
            );
            self.hits.filters.push((area, kind));
        }
    }

    fn draw_table(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let query = model.query();
        let table = CompanyTable {
            rows: model.page_rows(),
            columns: model.columns(),
            sort_key: query.sort_key,
            sort_direction: query.sort_direction,
            selected_row: model.row_cursor(),
            header_cursor: model.header_cursor(),
        };
        let columns: &[Column] = model.columns();
        self.hits.headers = table
            .header_areas(area)
            .into_iter()
            .map(|(rect, idx)| (rect, columns[idx].activate()))
            .collect();
        self.hits.rows = table.row_areas(area);
        frame.render_widget(table, area);
    }

    fn draw_pagination(&mut self, controls: &[PageControl], frame: &mut Frame, area: Rect) {
        self.hits.page_controls = control_areas(controls, area)
            .into_iter()
            .map(|(rect, idx)| (rect, controls[idx].activate()))
            .collect();
        frame.render_widget(Pagination { controls }, area);
    }

    fn draw_popup(&mut self, message: &str, frame: &mut Frame) {
        let area = frame.area();
        let width = std::cmp::min(area.width, 72);
        let height = std::cmp::min(area.height, message.lines().count() as u16 + 2);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(message).block(
                Block::bordered()
                    .title(Line::from(" Help ").bold().centered())
                    .border_set(border::THICK),
            ),
            popup,
        );
    }

    fn focus_block(title: &str, focused: bool) -> Block<'_> {
        let block = Block::bordered().title(title);
        if focused {
            block.border_style(Style::new().fg(Color::LightBlue))
        } else {
            block.border_style(Style::new().fg(Color::DarkGray))
        }
    }
}
