use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{solved_bar, truncate};
use crate::curriculum::ComponentKind;
use crate::tui::{App, TreeRow};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app.rows.items.iter().map(row_item).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Course ")
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    let header = Line::from(vec![
        Span::styled(format!("{:<4}", ""), header_style),
        Span::styled(format!("{:<34}", "Name"), header_style),
        Span::styled(format!("{:<9}", "Kind"), header_style),
        Span::styled("Progress", header_style),
    ]);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.rows.selected);

    let header_area = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    };

    f.render_stateful_widget(list, list_area, &mut state);
}

fn row_item(row: &TreeRow) -> ListItem<'static> {
    let (marker, marker_color) = if row.complete {
        ("✓", Color::Green)
    } else if row.unlocked {
        ("•", Color::Yellow)
    } else {
        ("🔒", Color::DarkGray)
    };

    let name_color = if row.unlocked {
        Color::White
    } else {
        Color::DarkGray
    };

    let progress = match row.kind {
        ComponentKind::Skill => Span::styled(
            solved_bar(row.num_solved),
            Style::default().fg(Color::Green),
        ),
        ComponentKind::Concept if row.complete => {
            Span::styled("understood", Style::default().fg(Color::Green))
        }
        ComponentKind::Concept => Span::raw(""),
    };

    ListItem::new(Line::from(vec![
        Span::styled(format!("{:<3} ", marker), Style::default().fg(marker_color)),
        Span::styled(
            format!("{:<34}", truncate(row.name, 32)),
            Style::default().fg(name_color),
        ),
        Span::styled(
            format!("{:<9}", row.kind.label()),
            Style::default().fg(Color::Cyan),
        ),
        progress,
    ]))
}
