//! Dashboard view rendering.
//!
//! Router health on top, live traffic of the monitored session below.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph},
    Frame,
};
use routerwatch_types::SystemHealth;

use super::common::{panel, render_loading, render_offline};
use crate::app::App;
use crate::data::history::Channel;
use crate::data::FetchView;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARKLINE_WIDTH: usize = 16;

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(6), Constraint::Min(6)]).split(area);
    render_health(frame, app, chunks[0]);
    render_traffic(frame, app, chunks[1]);
}

fn render_health(frame: &mut Frame, app: &App, area: Rect) {
    const TITLE: &str = " System Health ";

    if app.router_id().is_none() {
        let paragraph = Paragraph::new("No router selected").block(panel(app, TITLE));
        frame.render_widget(paragraph, area);
        return;
    }

    match app.health.view() {
        FetchView::Loading => render_loading(frame, app, area, TITLE),
        FetchView::Offline(err) => render_offline(frame, app, area, TITLE, err),
        FetchView::Ready(health) => {
            let paragraph = Paragraph::new(health_lines(app, health)).block(panel(app, TITLE));
            frame.render_widget(paragraph, area);
        }
    }
}

fn health_lines(app: &App, health: &SystemHealth) -> Vec<Line<'static>> {
    let label = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::DIM));

    let cpu = match health.cpu_percent() {
        Some(cpu) => Span::styled(format!("{cpu:.0}%"), load_style(app, cpu)),
        None => Span::raw("-"),
    };
    let memory = match health.memory_percent() {
        Some(percent) => Span::styled(
            format!(
                "{} / {} MB ({}%)",
                health.used_memory_mb(),
                health.total_memory_mb(),
                percent
            ),
            load_style(app, f64::from(percent)),
        ),
        None => Span::raw("-"),
    };
    let or_dash = |s: &str| {
        if s.trim().is_empty() {
            "-".to_string()
        } else {
            s.to_string()
        }
    };

    vec![
        Line::from(vec![label(" CPU     "), cpu]),
        Line::from(vec![label(" Memory  "), memory]),
        Line::from(vec![label(" Uptime  "), Span::raw(or_dash(&health.uptime))]),
        Line::from(vec![
            label(" Board   "),
            Span::raw(or_dash(&health.board_name)),
            label("  v"),
            Span::raw(or_dash(&health.version)),
        ]),
    ]
}

fn load_style(app: &App, percent: f64) -> Style {
    if percent >= 90.0 {
        Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
    } else if percent >= 70.0 {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().fg(app.theme.healthy)
    }
}

fn render_traffic(frame: &mut Frame, app: &App, area: Rect) {
    let Some(target) = app.monitor.target() else {
        let paragraph = Paragraph::new(" No active session to monitor. Select one on the Sessions tab.")
            .block(panel(app, " Traffic "));
        frame.render_widget(paragraph, area);
        return;
    };
    let title = format!(" Monitoring: {} ", target);
    let history = app.monitor.history();

    match app.monitor.traffic_state().view() {
        FetchView::Offline(err) => return render_offline(frame, app, area, &title, err),
        _ if history.series().is_empty() => return render_loading(frame, app, area, &title),
        _ => {}
    }

    let block = panel(app, title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([Constraint::Length(2), Constraint::Min(3)]).split(inner);

    let stats: Vec<Line> = Channel::ALL
        .iter()
        .map(|&channel| {
            let current = history
                .series()
                .latest()
                .map_or(0.0, |sample| sample.value(channel));
            Line::from(vec![
                Span::styled(format!(" {:<3}", channel.label()), app.theme.channel_style(channel)),
                Span::raw(format!("{:>9.2} Mbps", current)),
                Span::styled("  peak ", Style::default().add_modifier(Modifier::DIM)),
                Span::raw(format!("{:>9.2} Mbps  ", history.peak(channel))),
                Span::styled(
                    render_sparkline(&history.sparkline(channel)),
                    app.theme.channel_style(channel),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(stats), chunks[0]);

    let points: Vec<(Channel, Vec<(f64, f64)>)> = Channel::ALL
        .iter()
        .map(|&channel| (channel, history.chart_points(channel)))
        .collect();
    let datasets = points
        .iter()
        .map(|(channel, data)| {
            Dataset::default()
                .name(channel.label())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(app.theme.channel_style(*channel))
                .data(data)
        })
        .collect();

    let x_max = history.series().capacity().saturating_sub(1).max(1) as f64;
    let y_max = Channel::ALL
        .iter()
        .map(|&channel| history.peak(channel))
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let axis_style = Style::default().fg(app.theme.border);
    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, x_max])
                .labels([format!("-{}s", x_max as u64), "now".to_string()]),
        )
        .y_axis(
            Axis::default()
                .title("Mbps")
                .style(axis_style)
                .bounds([0.0, y_max])
                .labels(["0".to_string(), format!("{:.1}", y_max / 2.0), format!("{:.1}", y_max)]),
        );
    frame.render_widget(chart, chunks[1]);
}

fn render_sparkline(data: &[u8]) -> String {
    data.iter()
        .rev()
        .take(SPARKLINE_WIDTH)
        .rev()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_keeps_most_recent_values() {
        let data: Vec<u8> = (0..20).map(|i| (i % 8) as u8).collect();
        let line = render_sparkline(&data);
        assert_eq!(line.chars().count(), SPARKLINE_WIDTH);
        assert!(line.ends_with('▄'));
        assert_eq!(render_sparkline(&[]), "");
    }
}
