//! Sessions view rendering.
//!
//! One page of the customer session table, sorted by the active column. The
//! session currently monitored on the dashboard is marked.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Row, Table, TableState},
    Frame,
};
use routerwatch_types::SessionUser;

use super::common::{panel, render_loading, render_offline};
use crate::app::App;
use crate::data::table::TableColumn;
use crate::data::{FetchView, SessionColumn};

/// Render the Sessions view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    const TITLE: &str = " Sessions ";

    match app.sessions.view() {
        FetchView::Loading => return render_loading(frame, app, area, TITLE),
        FetchView::Offline(err) => return render_offline(frame, app, area, TITLE, err),
        FetchView::Ready(_) => {}
    }
    let Some(view) = app.session_view() else {
        return;
    };

    let header = Row::new(
        SessionColumn::ALL
            .iter()
            .map(|&column| Cell::from(format_header(column, app))),
    )
    .height(1)
    .style(app.theme.header);

    let monitored = app.monitor.target().map(|key| key.user.as_str());
    let rows: Vec<Row> = view
        .page_rows
        .iter()
        .map(|user| session_row(app, user, monitored == Some(user.username.as_str())))
        .collect();

    let widths = [
        Constraint::Fill(3), // User
        Constraint::Fill(2), // IP Address
        Constraint::Min(10), // Status
        Constraint::Fill(2), // Uptime
        Constraint::Fill(2), // Profile
    ];

    let title = format!(
        " Sessions ({}) [Page {} of {}] [s:sort {}{}] ",
        view.total_count,
        view.page_index,
        view.total_pages,
        app.session_sort.column.title(),
        app.session_sort.direction.arrow(),
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !view.page_rows.is_empty() {
        state.select(Some(app.selected_row));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn session_row<'a>(app: &App, user: &'a SessionUser, monitored: bool) -> Row<'a> {
    let dash = || "-".to_string();
    let name = if monitored {
        Cell::from(format!("{} ◉", user.username))
            .style(Style::default().fg(app.theme.highlight).add_modifier(Modifier::BOLD))
    } else {
        Cell::from(user.username.as_str())
    };
    let status = user.session_status();

    Row::new(vec![
        name,
        Cell::from(user.ip.clone().unwrap_or_else(dash)),
        Cell::from(status.label()).style(app.theme.status_style(status)),
        Cell::from(user.uptime.clone().unwrap_or_else(dash)),
        Cell::from(user.profile.clone().unwrap_or_else(dash)),
    ])
}

fn format_header(column: SessionColumn, app: &App) -> Span<'static> {
    if app.session_sort.column == column {
        Span::raw(format!("{}{}", column.title(), app.session_sort.direction.arrow()))
    } else {
        Span::raw(column.title())
    }
}
