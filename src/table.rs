use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Cell, HighlightSpacing, Row, Table, Widget},
};

use crate::company::{Company, Field};
use crate::domain::Message;
use crate::pipeline::SortDirection;

pub const COLUMN_SPACING: u16 = 1;
pub const SORT_ASCENDING: &str = "▲";
pub const SORT_DESCENDING: &str = "▼";
pub const SORTABLE_MARK: &str = "⇅";

/// How a column turns a company into cell content.
#[derive(Clone, Copy)]
pub enum ColumnRender {
    Field,
    Custom(fn(&Company) -> Line<'static>),
}

#[derive(Clone)]
pub struct Column {
    pub key: Field,
    pub label: &'static str,
    pub sortable: bool,
    pub width: Constraint,
    render: ColumnRender,
}

impl Column {
    pub fn field(key: Field, label: &'static str, sortable: bool, width: Constraint) -> Self {
        Self {
            key,
            label,
            sortable,
            width,
            render: ColumnRender::Field,
        }
    }

    pub fn custom(
        key: Field,
        label: &'static str,
        sortable: bool,
        width: Constraint,
        render: fn(&Company) -> Line<'static>,
    ) -> Self {
        Self {
            key,
            label,
            sortable,
            width,
            render: ColumnRender::Custom(render),
        }
    }

    pub fn content(&self, row: &Company) -> Line<'static> {
        match self.render {
            ColumnRender::Field => Line::from(row.get(self.key).to_string()),
            ColumnRender::Custom(render) => render(row),
        }
    }

    pub fn header(&self, sort_key: Field, sort_direction: SortDirection) -> Line<'static> {
        let mut spans = vec![Span::from(self.label)];
        if self.key == sort_key {
            let glyph = match sort_direction {
                SortDirection::Ascending => SORT_ASCENDING,
                SortDirection::Descending => SORT_DESCENDING,
            };
            spans.push(Span::from(format!(" {glyph}")).fg(Color::Yellow));
        } else if self.sortable {
            spans.push(Span::from(format!(" {SORTABLE_MARK}")).fg(Color::DarkGray));
        }
        Line::from(spans)
    }

    /// Sortable headers emit a sort request, the others do nothing.
    pub fn activate(&self) -> Option<Message> {
        self.sortable.then_some(Message::SortBy(self.key))
    }
}

// The url itself is copied with `y`, a terminal cannot open it in a new tab
fn website_link(_row: &Company) -> Line<'static> {
    Line::from(Span::from("Visit ↗").fg(Color::Cyan).underlined())
}

pub fn company_columns() -> Vec<Column> {
    vec![
        Column::field(Field::Name, "Name", true, Constraint::Fill(3)),
        Column::field(Field::Industry, "Industry", true, Constraint::Fill(2)),
        Column::field(Field::Location, "Location", true, Constraint::Fill(2)),
        Column::field(Field::Employees, "Employees", true, Constraint::Length(12)),
        Column::custom(Field::Website, "Website", false, Constraint::Length(9), website_link),
    ]
}

/// Projection of one page of companies onto a table. Keeps no state.
pub struct CompanyTable<'a> {
    pub rows: &'a [Company],
    pub columns: &'a [Column],
    pub sort_key: Field,
    pub sort_direction: SortDirection,
    pub selected_row: Option<usize>,
    pub header_cursor: Option<usize>,
}

impl CompanyTable<'_> {
    /// Areas of the header cells, for mapping mouse clicks back to columns.
    pub fn header_areas(&self, area: Rect) -> Vec<(Rect, usize)> {
        let inner = Block::bordered().inner(area);
        if inner.height == 0 {
            return Vec::new();
        }
        let header_line = Rect { height: 1, ..inner };
        self.column_layout(header_line)
            .iter()
            .enumerate()
            .map(|(idx, rect)| (*rect, idx))
            .collect()
    }

    /// Areas of the body rows, one per displayed company.
    pub fn row_areas(&self, area: Rect) -> Vec<(Rect, usize)> {
        let inner = Block::bordered().inner(area);
        (0..self.rows.len())
            .map(|idx| Rect {
                y: inner.y + 1 + idx as u16,
                height: 1,
                ..inner
            })
            .filter(|rect| rect.bottom() <= inner.bottom())
            .enumerate()
            .map(|(idx, rect)| (rect, idx))
            .collect()
    }

    fn column_layout(&self, line: Rect) -> Vec<Rect> {
        Layout::horizontal(self.columns.iter().map(|c| c.width))
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(line)
            .to_vec()
    }
}

impl Widget for CompanyTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let header = Row::new(self.columns.iter().enumerate().map(|(idx, column)| {
            let mut style = Style::new().bold();
            if self.header_cursor == Some(idx) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Cell::from(column.header(self.sort_key, self.sort_direction)).style(style)
        }))
        .style(Style::new().fg(Color::LightBlue));

        let rows = self.rows.iter().enumerate().map(|(idx, company)| {
            let row = Row::new(
                self.columns
                    .iter()
                    .map(|column| Cell::from(column.content(company))),
            );
            if self.selected_row == Some(idx) {
                row.style(Style::new().bg(Color::DarkGray))
            } else if idx % 2 == 1 {
                row.style(Style::new().fg(Color::Gray))
            } else {
                row
            }
        });

        Table::new(rows, self.columns.iter().map(|c| c.width))
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .highlight_spacing(HighlightSpacing::Never)
            .block(Block::bordered().title(Line::from(" Companies ").bold()))
            .render(area, buf);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::company::tests::company;

    pub(crate) fn buffer_text(buf: &Buffer) -> String {
        let mut lines = Vec::new();
        for y in 0..buf.area.height {
            let mut line = String::new();
            for x in 0..buf.area.width {
                line.push_str(buf[(x, y)].symbol());
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    fn render(table: CompanyTable<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        table.render(area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn default_columns_match_the_directory_layout() {
        let columns = company_columns();
        let labels: Vec<_> = columns.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Name", "Industry", "Location", "Employees", "Website"]);
        assert!(columns[..4].iter().all(|c| c.sortable));
        assert!(!columns[4].sortable);
    }

    #[test]
    fn only_sortable_headers_emit_sort_requests() {
        let columns = company_columns();
        assert_eq!(columns[3].activate(), Some(Message::SortBy(Field::Employees)));
        assert_eq!(columns[4].activate(), None);
    }

    #[test]
    fn custom_render_overrides_field_value() {
        let columns = company_columns();
        let acme = company(1, "Acme", "Tech", "NY", 50);
        assert_eq!(columns[0].content(&acme).to_string(), "Acme");
        assert_eq!(columns[3].content(&acme).to_string(), "50");
        assert_eq!(columns[4].content(&acme).to_string(), "Visit ↗");
    }

    #[test]
    fn active_sort_column_shows_direction() {
        let columns = company_columns();
        let asc = columns[0].header(Field::Name, SortDirection::Ascending).to_string();
        let desc = columns[0].header(Field::Name, SortDirection::Descending).to_string();
        assert!(asc.ends_with(SORT_ASCENDING));
        assert!(desc.ends_with(SORT_DESCENDING));
        let other = columns[1].header(Field::Name, SortDirection::Ascending).to_string();
        assert!(other.ends_with(SORTABLE_MARK));
        let website = columns[4].header(Field::Name, SortDirection::Ascending).to_string();
        assert_eq!(website, "Website");
    }

    #[test]
    fn rows_render_in_input_order() {
        let columns = company_columns();
        let rows = vec![
            company(2, "Zulu", "Finance", "NY", 10),
            company(1, "Alpha", "Tech", "NY", 50),
        ];
        let text = render(
            CompanyTable {
                rows: &rows,
                columns: &columns,
                sort_key: Field::Name,
                sort_direction: SortDirection::Ascending,
                selected_row: Some(0),
                header_cursor: None,
            },
            90,
            6,
        );
        let zulu = text.find("Zulu").unwrap();
        let alpha = text.find("Alpha").unwrap();
        assert!(zulu < alpha);
        assert!(text.contains("Name ▲"));
        assert!(text.contains("Visit ↗"));
    }

    #[test]
    fn hit_areas_cover_header_and_rows() {
        let columns = company_columns();
        let rows = vec![company(1, "Acme", "Tech", "NY", 50)];
        let table = CompanyTable {
            rows: &rows,
            columns: &columns,
            sort_key: Field::Name,
            sort_direction: SortDirection::Ascending,
            selected_row: None,
            header_cursor: None,
        };
        let area = Rect::new(0, 0, 90, 6);
        let headers = table.header_areas(area);
        assert_eq!(headers.len(), 5);
        assert!(headers.iter().all(|(rect, _)| rect.y == 1));
        assert!(headers.windows(2).all(|w| w[0].0.x < w[1].0.x));
        let body = table.row_areas(area);
        assert_eq!(body, vec![(Rect::new(1, 2, 88, 1), 0)]);
    }
}
