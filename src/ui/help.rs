use crate::ui::centered_rect;
use ratatui::{
    Frame,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
}

fn binding(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {keys:<10}"), Style::default().fg(Color::Yellow)),
        Span::raw(action),
    ])
}

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(""),
        section("  Global"),
        binding("?", "Toggle this help"),
        binding("q", "Quit application"),
        binding("Esc", "Back / cancel"),
        Line::from(""),
        section("  Dish List"),
        binding("↑/k ↓/j", "Move selection (rolls over pages)"),
        binding("←/→ n/p", "Previous / next page"),
        binding("g/G", "First / last page"),
        binding("Enter", "Open dish detail"),
        binding("/", "Search name, course and ingredients"),
        binding("d f t", "Filter by diet, flavor or state"),
        binding("i", "Select ingredients (all must match)"),
        binding("1 2 3", "Sort by name, prep time, cook time"),
        binding("s", "Clear sort"),
        binding("Esc", "Clear the active filter"),
        binding("r", "Reload dishes"),
        Line::from(""),
        section("  Dish Detail"),
        binding("↑/↓", "Scroll"),
        binding("PgUp/PgDn", "Scroll a page"),
        binding("r", "Reload dish"),
        Line::from(""),
        section("  Pickers"),
        binding("type", "Narrow the options"),
        binding("Space", "Tick ingredient"),
        binding("Enter", "Apply"),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press any key to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}
