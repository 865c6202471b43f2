use crate::app::{Picker, PickerKind};
use crate::ui::centered_rect;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

pub fn render(picker: &Picker, frame: &mut Frame) {
    let area = centered_rect(50, 70, frame.area());
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let query = Paragraph::new(format!(" {}", picker.query))
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} ", picker.kind.title())),
        );
    frame.render_widget(query, chunks[0]);

    let multi = picker.kind == PickerKind::Ingredients;
    let matches = picker.matches();
    let items: Vec<ListItem> = if matches.is_empty() {
        vec![ListItem::new(Span::styled(
            "No options",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        matches
            .iter()
            .map(|option| {
                if multi {
                    let checked = picker.is_checked(option);
                    Line::from(vec![
                        Span::styled(
                            if checked { "[x] " } else { "[ ] " },
                            Style::default().fg(if checked { Color::Green } else { Color::DarkGray }),
                        ),
                        Span::raw(option.to_string()),
                    ])
                } else {
                    Line::from(option.to_string())
                }
            })
            .map(ListItem::new)
            .collect()
    };

    let hint = if multi {
        " Space toggle · Enter apply · Esc cancel "
    } else {
        " Enter select · Esc cancel "
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(format!(" {} options ", matches.len()))
                .title_bottom(Line::from(hint).style(Style::default().fg(Color::DarkGray))),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    if !matches.is_empty() {
        state.select(Some(picker.selected));
    }
    frame.render_stateful_widget(list, chunks[1], &mut state);
}
