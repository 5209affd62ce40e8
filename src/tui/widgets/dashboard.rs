use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::{solved_bar, truncate};
use crate::curriculum::ComponentKind;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Stats + Next up row
            Constraint::Min(0),    // Skills in progress
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_stats(f, app, top_chunks[0]);
    draw_next_up(f, app, top_chunks[1]);
    draw_skills(f, app, chunks[1]);
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;
    let total_skills = app.tree.skills().count();
    let total_concepts = app.tree.concepts().count();

    let text = vec![
        Line::from(vec![
            Span::styled("Skills mastered: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}/{}", stats.skills_mastered, total_skills),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        stat_line("Skills started", stats.skills_started.to_string(), Color::White),
        stat_line(
            "Concepts understood",
            format!("{}/{}", stats.concepts_understood, total_concepts),
            Color::White,
        ),
        stat_line("Attempts", stats.total_attempts.to_string(), Color::White),
        stat_line(
            "Success rate",
            format!("{:.0}%", stats.success_rate()),
            Color::Cyan,
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Stats ")
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(text).block(block);
    f.render_widget(paragraph, area);
}

fn draw_next_up(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.next_up.and_then(|id| app.tree.get(id)) {
        Some(def) => {
            let hint = match def.kind {
                ComponentKind::Concept => "Read it, then mark it understood.",
                ComponentKind::Skill => "Solve exercises until it is mastered.",
            };
            vec![
                Line::from(vec![
                    Span::styled(
                        format!("{} ", def.kind.label()),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        def.name,
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(""),
                Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
                Line::from(""),
                Line::from(vec![
                    Span::styled("<CR>", Style::default().fg(Color::Cyan)),
                    Span::raw(" to open"),
                ]),
            ]
        }
        None => vec![Line::from(Span::styled(
            "Course complete.",
            Style::default().fg(Color::Green),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next Up ")
        .title_style(Style::default().fg(Color::Yellow));

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_skills(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .rows
        .items
        .iter()
        .filter(|row| row.kind == ComponentKind::Skill && row.num_solved > 0)
        .map(|row| {
            let color = if row.complete {
                Color::Green
            } else {
                Color::Yellow
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<32}", truncate(row.name, 30)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(solved_bar(row.num_solved), Style::default().fg(color)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Skills In Progress ")
        .title_style(Style::default().fg(Color::Magenta));

    if items.is_empty() {
        let paragraph = Paragraph::new("No exercises solved yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
