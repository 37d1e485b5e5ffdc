pub mod components;
pub mod dashboard;
pub mod filters;
pub mod grid;

use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::error::TrackerError;

/// The two top-level tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Grid,
    Dashboard,
}

impl Tab {
    const TITLES: [&'static str; 2] = ["5W2H", "Dashboard"];

    fn index(self) -> usize {
        match self {
            Tab::Grid => 0,
            Tab::Dashboard => 1,
        }
    }
}

pub fn render_tabs<B: Backend>(frame: &mut Frame<B>, area: Rect, selected: Tab) {
    let titles = Tab::TITLES
        .iter()
        .map(|title| Spans::from(Span::raw(*title)))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Supply Project Management"),
        )
        .select(selected.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

/// Outcome line shown under the grid after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Info(String),
    Error(String),
}

impl Notice {
    pub fn from_error(err: &TrackerError) -> Self {
        Notice::Error(err.user_message())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Info(text) | Notice::Error(text) => text,
        }
    }

    fn color(&self) -> Color {
        match self {
            Notice::Success(_) => Color::Green,
            Notice::Info(_) => Color::Cyan,
            Notice::Error(_) => Color::Red,
        }
    }
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, area: Rect, notice: Option<&Notice>) {
    let paragraph = match notice {
        Some(notice) => Paragraph::new(notice.text().to_string())
            .style(Style::default().fg(notice.color())),
        None => Paragraph::new(""),
    };

    frame.render_widget(paragraph.block(Block::default().borders(Borders::TOP)), area);
}
