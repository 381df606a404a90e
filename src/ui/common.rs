//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, help overlay,
//! and the placeholders shown while a source is loading or offline.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::{ErrorInfo, FetchView};

/// Connection badge derived from the health source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Online,
    Offline,
    Connecting,
}

impl Connection {
    pub fn of<T>(view: &FetchView<'_, T>) -> Self {
        match view {
            FetchView::Ready(_) => Connection::Online,
            FetchView::Offline(_) => Connection::Offline,
            FetchView::Loading => Connection::Connecting,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Connection::Online => "ONLINE",
            Connection::Offline => "OFFLINE",
            Connection::Connecting => "CONNECTING",
        }
    }

    fn style(&self, app: &App) -> Style {
        let color = match self {
            Connection::Online => app.theme.healthy,
            Connection::Offline => app.theme.critical,
            Connection::Connecting => app.theme.warning,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

/// Render the header bar: selected router and its connection state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Span::styled(" ROUTERWATCH ", Style::default().add_modifier(Modifier::BOLD));

    let Some((position, router)) = app.current_router() else {
        let status = match app.routers.view() {
            FetchView::Offline(err) => format!("| Routers unavailable: {}", err),
            FetchView::Ready(_) => "| No routers configured".to_string(),
            FetchView::Loading => "| Loading routers...".to_string(),
        };
        frame.render_widget(Paragraph::new(Line::from(vec![title, Span::raw(status)])), area);
        return;
    };

    let connection = Connection::of(&app.health.view());
    let mut spans = vec![
        Span::styled("● ", connection.style(app)),
        title,
        Span::raw("│ "),
        Span::styled(router.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" ({}/{}) ", position, app.router_count())),
    ];
    if let Some(host) = &router.host {
        spans.push(Span::styled(
            format!("{} ", host),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    spans.push(Span::raw("│ "));
    spans.push(Span::styled(connection.label(), connection.style(app)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![Line::from(" 1:Dashboard "), Line::from(" 2:Sessions ")];

    let selected = match app.current_view {
        View::Dashboard => 0,
        View::Sessions => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Temporary status messages take precedence over the key hints.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Dashboard => "[ ]:router y:sync b:backup r:refresh Tab:switch ?:help q:quit",
        View::Sessions => "↑↓:select ←→:page s:sort S:reverse +/-:size Enter:monitor ?:help q:quit",
    };
    let status = format!(" {} | {}", app.source_description(), controls);

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Placeholder for a panel whose source has not produced data yet.
pub fn render_loading(frame: &mut Frame, app: &App, area: Rect, title: &str) {
    let block = panel(app, title);
    let paragraph = Paragraph::new("Loading...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.warning))
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Placeholder for a panel whose source failed fatally.
pub fn render_offline(frame: &mut Frame, app: &App, area: Rect, title: &str, err: &ErrorInfo) {
    let block = panel(app, title);
    let text = vec![
        Line::from(Span::styled(
            "OFFLINE",
            Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
        )),
        Line::from(err.to_string()),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, area);
}

/// A bordered panel in the current theme.
pub fn panel<'a>(app: &App, title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |name: &'static str| {
        Line::from(vec![Span::styled(
            name,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab 1/2     Switch views"),
        Line::from("  [ / ]       Previous/next router"),
        Line::from(""),
        section(" Sessions"),
        Line::from("  ↑/↓ j/k     Select row"),
        Line::from("  ←/→ h/l     Previous/next page"),
        Line::from("  s           Cycle sort column"),
        Line::from("  S           Toggle sort direction"),
        Line::from("  + / -       Grow/shrink page"),
        Line::from("  Enter       Monitor user traffic"),
        Line::from("  a           Monitor discovered user"),
        Line::from(""),
        section(" Router"),
        Line::from("  y           Sync users"),
        Line::from("  b           Create backup"),
        Line::from(""),
        section(" General"),
        Line::from("  r           Refresh now"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 27u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
