//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;
use routerwatch_types::SessionStatus;

use crate::data::history::Channel;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Loading placeholders and isolated sessions.
    pub warning: Color,
    /// Offline sources and sessions.
    pub critical: Color,
    /// Online sources and connected sessions.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Download series in the traffic chart.
    pub rx: Color,
    /// Upload series in the traffic chart.
    pub tx: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            rx: Color::Cyan,
            tx: Color::Magenta,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            rx: Color::Blue,
            tx: Color::Magenta,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for a session status
    pub fn status_style(&self, status: SessionStatus) -> Style {
        match status {
            SessionStatus::Connected => Style::default().fg(self.healthy),
            SessionStatus::Isolated => Style::default().fg(self.warning),
            SessionStatus::Offline => Style::default().fg(self.critical),
            SessionStatus::Other => Style::default().add_modifier(Modifier::DIM),
        }
    }

    /// Style for a traffic channel.
    pub fn channel_style(&self, channel: Channel) -> Style {
        match channel {
            Channel::Rx => Style::default().fg(self.rx),
            Channel::Tx => Style::default().fg(self.tx),
        }
    }
}
