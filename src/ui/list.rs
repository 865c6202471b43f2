use crate::app::{App, InputMode, ListState};
use crate::catalog::{Catalog, DropdownField, SortDirection, SortKey};
use crate::dish::minutes_or_na;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use unicode_width::UnicodeWidthChar;

pub const SEARCH_LABEL: &str = " Search by name, ingredients, or course: ";

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(3) + search(3) + filters(3) + table(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let count = app
        .catalog()
        .map(|c| format!("   [{} of {} dishes]", c.visible_len(), c.dishes().len()))
        .unwrap_or_default();
    let header = Paragraph::new(format!(" All Dishes{count}"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    render_search(app, frame, chunks[1]);

    match &app.list {
        ListState::Loading => {
            render_message(frame, chunks[3], "Loading...", Color::Yellow);
        }
        ListState::Failed(message) => {
            render_message(frame, chunks[3], message, Color::Red);
        }
        ListState::Ready(catalog) => {
            render_filters(catalog, frame, chunks[2]);
            render_table(app, catalog, frame, chunks[3]);
        }
    }

    // ── Status bar ──
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    let status_line = Line::from(vec![
        key(" ↑↓"),
        Span::raw(" Navigate  "),
        key("←→"),
        Span::raw(" Page  "),
        key("/"),
        Span::raw(" Search  "),
        key("d/f/t"),
        Span::raw(" Diet/Flavor/State  "),
        key("i"),
        Span::raw(" Ingredients  "),
        key("1-3"),
        Span::raw(" Sort  "),
        key("Enter"),
        Span::raw(" Detail  "),
        key("?"),
        Span::raw(" Help  "),
        Span::styled(&app.status_msg, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[4]);
}

fn render_search(app: &App, frame: &mut Frame, area: Rect) {
    let style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let title = if app.input_mode == InputMode::Editing {
        " Search (Enter/Esc to finish) "
    } else {
        " Search (/) "
    };
    let bar = Paragraph::new(format!("{SEARCH_LABEL}{}", app.search_input))
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(title),
        );
    frame.render_widget(bar, area);

    if app.input_mode == InputMode::Editing {
        frame.set_cursor_position((search_cursor_x(area, &app.search_input), area.y + 1));
    }
}

fn render_filters(catalog: &Catalog, frame: &mut Frame, area: Rect) {
    let filter = catalog.filter();
    let mut spans = Vec::new();
    for field in DropdownField::ALL {
        let value = filter.dropdown_value(field);
        spans.push(Span::styled(
            format!(" {}: ", field.label()),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(match value {
            Some(v) => Span::styled(
                v,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::styled("any", Style::default().fg(Color::DarkGray)),
        });
        spans.push(Span::raw("  "));
    }

    let selected = filter.selected_ingredients();
    spans.push(Span::styled(
        " Ingredients: ",
        Style::default().fg(Color::DarkGray),
    ));
    if selected.is_empty() {
        spans.push(Span::styled("none", Style::default().fg(Color::DarkGray)));
    } else {
        spans.push(Span::styled(
            selected.join(", "),
            Style::default().fg(Color::Magenta),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Filters "),
    );
    frame.render_widget(bar, area);
}

fn render_table(app: &App, catalog: &Catalog, frame: &mut Frame, area: Rect) {
    let header_cell = |key: Option<SortKey>, label: &'static str| {
        let mut text = label.to_string();
        let mut style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        if let Some(key) = key {
            if let Some(spec) = catalog.sort().filter(|s| s.key == key) {
                text.push_str(match spec.direction {
                    SortDirection::Ascending => " ▲",
                    SortDirection::Descending => " ▼",
                });
                style = style.fg(Color::Yellow);
            }
        }
        Cell::from(text).style(style)
    };
    let sortable = |key: SortKey| header_cell(Some(key), key.label());
    let header = Row::new(vec![
        sortable(SortKey::Name),
        header_cell(None, "Diet"),
        header_cell(None, "Flavor"),
        header_cell(None, "Course"),
        sortable(SortKey::PrepTime),
        sortable(SortKey::CookTime),
    ])
    .bottom_margin(1);

    let name_width = (area.width as usize).saturating_sub(4 + 16 + 12 + 14 + 15 + 15);
    let rows: Vec<Row> = catalog
        .page_items()
        .into_iter()
        .map(|d| {
            Row::new(vec![
                Cell::from(truncate_str(&d.name, name_width.max(8))).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Cell::from(d.diet_label().to_string()),
                Cell::from(d.flavor_label().to_string()),
                Cell::from(d.course_label().to_string()),
                Cell::from(minutes_or_na(d.prep_time, "mins")),
                Cell::from(minutes_or_na(d.cook_time, "mins")),
            ])
        })
        .collect();

    let page_info = format!(" {} / {} ", catalog.page(), catalog.total_pages());
    let table = Table::new(
        rows,
        [
            Constraint::Min(8),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(15),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Dishes ")
            .title_bottom(Line::from(page_info).alignment(Alignment::Right)),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");

    let mut state = TableState::default();
    if catalog.visible_len() > 0 {
        state.select(Some(app.list_selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

/// Centered one-line notice used for loading and error states.
pub fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(paragraph, area);
}

/// Cursor column after the typed search text, kept inside the box.
fn search_cursor_x(area: Rect, input: &str) -> u16 {
    area.x
        .saturating_add(1)
        .saturating_add(display_width(SEARCH_LABEL))
        .saturating_add(display_width(input))
        .min(area.right().saturating_sub(2))
}

fn display_width(s: &str) -> u16 {
    s.chars()
        .map(|c| c.width().unwrap_or(0))
        .sum::<usize>()
        .try_into()
        .unwrap_or(u16::MAX)
}

/// Truncate a string to `max_width` terminal columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push('…');
    result
}
