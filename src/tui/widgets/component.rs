use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use super::{exercise, solved_bar};
use crate::curriculum::{ComponentDef, ComponentKind};
use crate::tree::Tab;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(def) = app.component.and_then(|id| app.tree.get(id)) else {
        let block = Block::default().borders(Borders::ALL).title(" Component ");
        let paragraph = Paragraph::new("Nothing selected").block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Length(1), // Content tabs
            Constraint::Min(0),    // Tab body
            Constraint::Length(1), // Status line
        ])
        .split(area);

    draw_header(f, app, def, chunks[0]);
    draw_tab_bar(f, app, chunks[1]);

    match app.current_tab() {
        Some(Tab::Exercises) => exercise::draw(f, app, chunks[2]),
        Some(tab) => draw_text(f, app, def, tab, chunks[2]),
        None => {
            let paragraph = Paragraph::new("No content yet.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(paragraph, chunks[2]);
        }
    }

    if let Some(status) = &app.status {
        let line = Paragraph::new(status.as_str()).style(Style::default().fg(Color::Yellow));
        f.render_widget(line, chunks[3]);
    }
}

fn draw_header(f: &mut Frame, app: &App, def: &ComponentDef, area: Rect) {
    let progress = match def.kind {
        ComponentKind::Skill => {
            let row = app.rows.items.iter().find(|r| r.id == def.id);
            let solved = row.map(|r| r.num_solved).unwrap_or(0);
            Span::styled(solved_bar(solved), Style::default().fg(Color::Green))
        }
        ComponentKind::Concept if app.is_understood(def.id) => {
            Span::styled("Understood", Style::default().fg(Color::Green))
        }
        ComponentKind::Concept => Span::styled("Not yet understood", Style::default().fg(Color::Yellow)),
    };

    let prerequisites = if def.prerequisites.is_empty() {
        "None".to_string()
    } else {
        def.prerequisites
            .iter()
            .map(|id| app.tree.get(id).map(|p| p.name).unwrap_or(*id))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let text = vec![
        Line::from(vec![
            Span::styled(format!("{}  ", def.kind.label()), Style::default().fg(Color::Gray)),
            progress,
        ]),
        Line::from(vec![
            Span::styled("Requires: ", Style::default().fg(Color::Gray)),
            Span::styled(prerequisites, Style::default().fg(Color::Cyan)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", def.name))
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_tab_bar(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = app.tabs.iter().map(|t| t.label()).collect();
    let tabs = Tabs::new(titles)
        .select(app.tab)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn draw_text(f: &mut Frame, app: &App, def: &ComponentDef, tab: Tab, area: Rect) {
    let body = app.tree.tab_text(def.id, tab).unwrap_or_default();

    // Reference material is SQL, shown as code
    let style = if tab == Tab::Reference {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", tab.label()))
        .title_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(body)
        .style(style)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
