use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};

use crate::app::{App, View};

/// File written by the `e` key.
const EXPORT_FILE: &str = "routerwatch_export.json";

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Views
        KeyCode::Tab | KeyCode::BackTab => app.next_view(),
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Sessions),

        // Router selection
        KeyCode::Char(']') => app.next_router(),
        KeyCode::Char('[') => app.prev_router(),

        // Session table
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => app.next_page(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.grow_page(),
        KeyCode::Char('-') => app.shrink_page(),
        KeyCode::Enter => {
            if app.current_view == View::Sessions {
                app.monitor_selected();
            }
        }
        KeyCode::Char('a') => app.monitor_discovered(),

        // Actions
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('y') => app.trigger_sync(),
        KeyCode::Char('b') => app.trigger_backup(),
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.current_view != View::Sessions {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::config::Settings;
    use crate::data::SessionColumn;
    use crate::data::SortDirection;
    use crate::source::backend::fake::FakeBackend;
    use crate::ui::Theme;

    fn app() -> App {
        App::new(Arc::new(FakeBackend::default()), &Settings::default(), Theme::dark())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn view_switching() {
        let mut app = app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.current_view, View::Sessions);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[tokio::test]
    async fn any_key_closes_help() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn sort_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('S'));
        assert_eq!(app.session_sort.column, SessionColumn::Status);
        assert_eq!(app.session_sort.direction, SortDirection::Descending);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.session_sort.column, SessionColumn::Uptime);
        assert_eq!(app.session_sort.direction, SortDirection::Ascending);
    }

    #[tokio::test]
    async fn page_size_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.session_page.page_size(), 15);
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.session_page.page_size(), 5);
    }

    #[tokio::test]
    async fn a_key_returns_to_discovered_target() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(
            app.get_status_message(),
            Some("Monitoring first discovered target")
        );
    }

    #[tokio::test]
    async fn actions_without_router_report_status() {
        let mut app = app();
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.get_status_message(), Some("No router selected"));
    }
}
