use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::InstanceStatus;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(instance) = &app.exercise else {
        let block = Block::default().borders(Borders::ALL).title(" Exercise ");
        let paragraph = Paragraph::new("No exercise loaded. Press n for a new one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    };

    let hint_height = if app.hints_shown > 0 {
        app.hints_shown as u16 + 2
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),           // Task
            Constraint::Length(hint_height), // Hints
            Constraint::Length(3),           // Input
            Constraint::Min(0),              // Feedback / solution
        ])
        .split(area);

    let status_color = match instance.status {
        InstanceStatus::Correct => Color::Green,
        InstanceStatus::Incorrect => Color::Red,
        InstanceStatus::GivenUp => Color::DarkGray,
        InstanceStatus::Pending => Color::Yellow,
    };
    let task = Paragraph::new(app.task.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Exercise #{} ", instance.id))
                .title_style(Style::default().fg(Color::Cyan))
                .title_bottom(Line::from(Span::styled(
                    format!(" {} ", instance.status.label()),
                    Style::default().fg(status_color),
                ))),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(task, chunks[0]);

    if app.hints_shown > 0 {
        draw_hints(f, app, chunks[1]);
    }
    draw_input(f, app, chunks[2]);
    draw_result(f, app, chunks[3]);
}

fn draw_hints(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .hints()
        .iter()
        .take(app.hints_shown)
        .enumerate()
        .map(|(i, hint)| {
            Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(*hint, Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Hints ")
        .title_style(Style::default().fg(Color::Magenta));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let border = if app.input_mode {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let mut spans = vec![
        Span::styled("SQL> ", Style::default().fg(Color::Yellow)),
        Span::raw(app.input.as_str()),
    ];
    if app.input_mode {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Your query ");
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    if let Some(feedback) = &app.feedback {
        let color = if feedback.correct {
            Color::Green
        } else {
            Color::Red
        };
        lines.push(Line::from(Span::styled(
            feedback.text.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));

        if let Some(comparison) = &feedback.comparison {
            for mismatch in &comparison.mismatches {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("row {}: ", mismatch.index + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled("expected ", Style::default().fg(Color::Gray)),
                    Span::styled(mismatch.expected.as_str(), Style::default().fg(Color::Green)),
                    Span::styled(" got ", Style::default().fg(Color::Gray)),
                    Span::styled(mismatch.actual.as_str(), Style::default().fg(Color::Red)),
                ]));
            }
        }
    }

    if let Some(solution) = &app.solution {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Solution:",
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            solution.as_str(),
            Style::default().fg(Color::Cyan),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Result ")
        .title_style(Style::default().fg(Color::Cyan));
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
