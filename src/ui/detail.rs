use crate::app::{App, DetailState};
use crate::dish::{Dish, minutes_or_na};
use crate::router::Route;
use crate::ui::list::render_message;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(3) + body(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let title = match &app.detail {
        DetailState::Loaded(dish) => dish.name.clone(),
        _ => match app.route {
            Route::Dish(id) => format!("Dish #{id}"),
            _ => "Dish".to_string(),
        },
    };
    let header = Paragraph::new(format!(" {title}"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    match &app.detail {
        DetailState::Loading => render_message(frame, chunks[1], "Loading...", Color::Yellow),
        DetailState::Failed(message) => render_message(frame, chunks[1], message, Color::Red),
        DetailState::NotFound => render_message(frame, chunks[1], "Dish not found", Color::Red),
        DetailState::Loaded(dish) => {
            let body = Paragraph::new(detail_lines(dish))
                .wrap(Wrap { trim: false })
                .scroll((app.detail_scroll, 0))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray))
                        .title(" Dish Detail ")
                        .title_bottom(
                            Line::from(format!(" scroll: {} ", app.detail_scroll))
                                .alignment(Alignment::Right),
                        ),
                );
            frame.render_widget(body, chunks[1]);
        }
    }

    let status_line = Line::from(vec![
        Span::styled(
            " ↑↓/PgUp/PgDn",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Scroll  "),
        Span::styled(
            "r",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Reload  "),
        Span::styled(
            "Esc",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" Back"),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[2]);
}

/// Body text of the detail view, shared with the headless `show` command.
pub fn detail_lines(dish: &Dish) -> Vec<Line<'static>> {
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::DarkGray));
    let value = |s: String| {
        Span::styled(
            s,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    };

    let mut lines = vec![
        Line::from(vec![
            label(" Course: "),
            value(dish.course_label().to_string()),
            Span::raw("   "),
            label("Flavor: "),
            Span::styled(
                dish.flavor_label().to_string(),
                Style::default().fg(flavor_color(&dish.flavor_profile)),
            ),
            Span::raw("   "),
            label("Diet: "),
            value(dish.diet_label().to_string()),
        ]),
        Line::from(vec![
            label(" Prep: "),
            value(minutes_or_na(dish.prep_time, "min")),
            Span::raw(" | "),
            label("Cook: "),
            value(minutes_or_na(dish.cook_time, "min")),
        ]),
        Line::from(vec![
            label(" State: "),
            value(dish.state_label()),
            Span::raw(" | "),
            label("Region: "),
            value(dish.region_label()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " Ingredients",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    if dish.ingredients.is_empty() {
        lines.push(Line::from(label("   (none listed)")));
    }
    for ingredient in &dish.ingredients {
        lines.push(Line::from(format!("   • {}", ingredient.trim())));
    }
    lines
}

fn flavor_color(flavor: &str) -> Color {
    match flavor.to_lowercase().as_str() {
        "spicy" => Color::Red,
        "sweet" => Color::Magenta,
        "sour" => Color::Yellow,
        "bitter" => Color::Green,
        _ => Color::Gray,
    }
}

/// Plain-text rendering of `lines`.
pub fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|s| s.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
