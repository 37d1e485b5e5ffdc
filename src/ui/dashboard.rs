use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Span, Spans},
    widgets::{Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, LineGauge, Paragraph},
    Frame,
};

use crate::report::Dashboard;
use crate::ui::{render_notice, render_tabs, Notice, Tab};

// Represents the state of the read-only dashboard tab
pub struct DashboardState {
    report: Dashboard,
    notice: Option<Notice>,
}

pub enum DashboardAction {
    SwitchTab,
    Refresh,
    Quit,
}

impl DashboardState {
    pub fn new(report: Dashboard) -> Self {
        Self {
            report,
            notice: None,
        }
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn report(&self) -> &Dashboard {
        &self.report
    }
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &DashboardState) {
    let report = state.report();
    let size = frame.size();
    let share_height = (report.by_return_type.len() as u16).clamp(1, 8) + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(share_height),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .split(size);

    render_tabs(frame, chunks[0], Tab::Dashboard);
    render_notice(frame, chunks[4], state.notice.as_ref());

    let help = Paragraph::new("<Tab> 5W2H | <R> Refresh | <Q> Quit")
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[5]);

    if report.is_empty() {
        let empty = Paragraph::new("No data available. Add records in the 5W2H tab.")
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL).title("Dashboard"));
        frame.render_widget(empty, chunks[2]);
        return;
    }

    render_metrics(frame, chunks[1], report);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_status_bars(frame, charts[0], report);
    render_monthly_line(frame, charts[1], report);

    render_return_shares(frame, chunks[3], report);
}

fn render_metrics<B: Backend>(frame: &mut Frame<B>, area: Rect, report: &Dashboard) {
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let metrics = [
        ("Total Actions", report.total, Color::White),
        ("Overdue Actions", report.overdue, Color::Red),
        ("Upcoming Actions", report.upcoming, Color::Yellow),
    ];

    for ((title, value, color), tile) in metrics.into_iter().zip(tiles) {
        let paragraph = Paragraph::new(Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, tile);
    }
}

fn render_status_bars<B: Backend>(frame: &mut Frame<B>, area: Rect, report: &Dashboard) {
    let data: Vec<(&str, u64)> = report
        .by_status
        .iter()
        .map(|(status, count)| (status.as_str(), *count as u64))
        .collect();

    let bars = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Actions per Task Status"),
        )
        .data(&data)
        .bar_width(11)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(bars, area);
}

fn render_monthly_line<B: Backend>(frame: &mut Frame<B>, area: Rect, report: &Dashboard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Projects over Time (Planned End)");

    if report.by_month.is_empty() {
        let warning = Paragraph::new(format!(
            "No valid dates in Planned End to plot ({} records without a readable date).",
            report.undated
        ))
        .style(Style::default().fg(Color::Yellow))
        .block(block);
        frame.render_widget(warning, area);
        return;
    }

    let points: Vec<(f64, f64)> = report
        .by_month
        .iter()
        .enumerate()
        .map(|(i, (_, count))| (i as f64, *count as f64))
        .collect();
    let max_count = report
        .by_month
        .iter()
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(1);
    let last = (points.len() - 1).max(1) as f64;

    let first_label = report.by_month.first().map(|(m, _)| m.clone()).unwrap_or_default();
    let last_label = report.by_month.last().map(|(m, _)| m.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .name("actions")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Month")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, last])
                .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .title("Actions")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, max_count as f64])
                .labels(vec![Span::raw("0"), Span::raw(max_count.to_string())]),
        );

    frame.render_widget(chart, area);
}

fn render_return_shares<B: Backend>(frame: &mut Frame<B>, area: Rect, report: &Dashboard) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Financial Return Types");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let counted: usize = report.by_return_type.iter().map(|(_, count)| count).sum();
    if counted == 0 {
        frame.render_widget(Paragraph::new("No return types recorded."), inner);
        return;
    }

    let shown = report.by_return_type.len().min(inner.height as usize);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); shown])
        .split(inner);

    for ((kind, count), row) in report.by_return_type.iter().zip(rows) {
        let ratio = *count as f64 / counted as f64;
        let gauge = LineGauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .line_set(symbols::line::THICK)
            .ratio(ratio)
            .label(Spans::from(format!(
                "{kind:<16} {count:>4} ({:>5.1}%) ",
                ratio * 100.0
            )));
        frame.render_widget(gauge, row);
    }
}

pub fn handle_input(_state: &mut DashboardState) -> Result<Option<DashboardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(key.code));
    }
    Ok(None)
}

pub fn handle_key(key: KeyCode) -> Option<DashboardAction> {
    match key {
        KeyCode::Tab => Some(DashboardAction::SwitchTab),
        KeyCode::Char('r') => Some(DashboardAction::Refresh),
        KeyCode::Char('q') | KeyCode::Esc => Some(DashboardAction::Quit),
        _ => None,
    }
}
