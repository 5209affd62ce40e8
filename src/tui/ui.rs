use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{component, dashboard, tree};
use super::{App, View};
use crate::curriculum::ComponentKind;
use crate::tree::Tab;

pub fn draw(f: &mut Frame, app: &App) {
    let banner_height = if app.engine_error.is_some() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Tab bar
            Constraint::Length(banner_height), // Engine failure
            Constraint::Min(0),                // Content
            Constraint::Length(1),             // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_banner(f, app, chunks[1]);
    draw_content(f, app, chunks[2]);
    draw_help_bar(f, app, chunks[3]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles = vec!["Dashboard", "Course"];
    let selected = match app.view {
        View::Dashboard => 0,
        View::Tree | View::Component => 1,
    };

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" SQL Coach "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_banner(f: &mut Frame, app: &App, area: Rect) {
    let Some(error) = &app.engine_error else {
        return;
    };
    let banner = Paragraph::new(format!(
        "Database engine unavailable, exercises cannot be run: {}",
        error
    ))
    .style(Style::default().fg(Color::White).bg(Color::Red));
    f.render_widget(banner, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Dashboard => dashboard::draw(f, app, area),
        View::Tree => tree::draw(f, app, area),
        View::Component => component::draw(f, app, area),
    }
}

fn key(k: &str) -> Span<'_> {
    Span::styled(k, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.input_mode {
        vec![
            Span::styled("SQL> ", Style::default().fg(Color::Yellow)),
            Span::raw("typing  "),
            key("<CR>"),
            Span::raw(" Submit  "),
            key("<Esc>"),
            Span::raw(" Stop typing"),
        ]
    } else {
        let mut spans = vec![key("h/l"), Span::raw(" Views  ")];

        match app.view {
            View::Dashboard => {
                spans.extend(vec![
                    key("<CR>"),
                    Span::raw(" Next up  "),
                    key("^r"),
                    Span::raw(" Refresh  "),
                ]);
            }
            View::Tree => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("g/G"),
                    Span::raw(" Top/Bot  "),
                    key("l/<CR>"),
                    Span::raw(" Open  "),
                ]);
            }
            View::Component => {
                spans.extend(vec![
                    key("h/<Esc>"),
                    Span::raw(" Back  "),
                    key("[/]"),
                    Span::raw(" Tabs  "),
                ]);

                let is_concept = app
                    .component
                    .and_then(|id| app.tree.get(id))
                    .is_some_and(|c| c.kind == ComponentKind::Concept);
                if is_concept {
                    spans.extend(vec![key("u"), Span::raw(" Understood  ")]);
                }
                if app.current_tab() == Some(Tab::Exercises) {
                    spans.extend(vec![
                        key("i"),
                        Span::raw(" Answer  "),
                        key("?"),
                        Span::raw(" Hint  "),
                        key("s"),
                        Span::raw(" Solution  "),
                        key("n"),
                        Span::raw(" New  "),
                        key("R"),
                        Span::raw(" Reset db  "),
                    ]);
                }
            }
        }

        spans.extend(vec![key("q"), Span::raw(" Quit")]);
        spans
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
