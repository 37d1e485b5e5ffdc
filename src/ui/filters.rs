use std::collections::BTreeSet;

use chrono::NaiveDate;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::filter::{self, FilterCriteria};
use crate::models::{ProjectRecord, TASK_STATUSES};
use crate::ui::components::date_input::DateInputState;

/// A selectable line of the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Who(usize),
    Status(usize),
    Start,
    End,
}

/// Sidebar with the responsible-party and status multi-selects and the
/// planned-end date range.
pub struct FilterPanelState {
    who_options: Vec<String>,
    who_selected: Vec<bool>,
    status_selected: [bool; TASK_STATUSES.len()],
    start: DateInputState,
    end: DateInputState,
    cursor: usize,
}

pub enum FilterAction {
    Changed,
    Leave,
}

impl FilterPanelState {
    /// Everyone and every status selected; the range spans the snapshot's
    /// planned end dates (today when none parse).
    pub fn new(records: &[ProjectRecord], today: NaiveDate) -> Self {
        let (start, end) = filter::planned_end_span(records).unwrap_or((today, today));
        let defaults = FilterCriteria::with_defaults(records, start, end);
        let who_options = filter::distinct_who(records);

        Self {
            who_selected: who_options
                .iter()
                .map(|who| defaults.who.contains(who))
                .collect(),
            who_options,
            status_selected: TASK_STATUSES.map(|status| defaults.statuses.contains(status)),
            start: DateInputState::new(defaults.start),
            end: DateInputState::new(defaults.end),
            cursor: 0,
        }
    }

    /// Pick up responsible parties from a new snapshot. Existing choices are
    /// kept and newcomers start selected.
    pub fn refresh_options(&mut self, records: &[ProjectRecord]) {
        let previous: BTreeSet<&str> = self
            .who_options
            .iter()
            .zip(&self.who_selected)
            .filter(|(_, selected)| !**selected)
            .map(|(who, _)| who.as_str())
            .collect();

        let options = filter::distinct_who(records);
        let selected = options
            .iter()
            .map(|who| !previous.contains(who.as_str()))
            .collect();

        self.who_options = options;
        self.who_selected = selected;
        self.cursor = self.cursor.min(self.entries().len().saturating_sub(1));
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            who: self
                .who_options
                .iter()
                .zip(&self.who_selected)
                .filter(|(_, selected)| **selected)
                .map(|(who, _)| who.clone())
                .collect(),
            statuses: TASK_STATUSES
                .iter()
                .zip(&self.status_selected)
                .filter(|(_, selected)| **selected)
                .map(|(status, _)| status.to_string())
                .collect(),
            start: self.start.date,
            end: self.end.date,
        }
    }

    fn entries(&self) -> Vec<Entry> {
        (0..self.who_options.len())
            .map(Entry::Who)
            .chain((0..TASK_STATUSES.len()).map(Entry::Status))
            .chain([Entry::Start, Entry::End])
            .collect()
    }

    fn current(&self) -> Entry {
        self.entries()
            .get(self.cursor)
            .copied()
            .unwrap_or(Entry::Start)
    }

    fn editing_date(&self) -> bool {
        self.start.editing || self.end.editing
    }

    pub fn next(&mut self) {
        let len = self.entries().len();
        self.cursor = (self.cursor + 1) % len;
    }

    pub fn previous(&mut self) {
        let len = self.entries().len();
        self.cursor = (self.cursor + len - 1) % len;
    }

    /// Flip the selection under the cursor, or start/finish a date edit.
    /// Returns true when the criteria changed.
    pub fn activate(&mut self) -> bool {
        match self.current() {
            Entry::Who(i) => {
                self.who_selected[i] = !self.who_selected[i];
                true
            }
            Entry::Status(i) => {
                self.status_selected[i] = !self.status_selected[i];
                true
            }
            Entry::Start => {
                self.start.toggle_editing();
                !self.start.editing
            }
            Entry::End => {
                self.end.toggle_editing();
                !self.end.editing
            }
        }
    }

    fn render_items(&self) -> (Vec<ListItem<'static>>, usize) {
        let heading = |text: &'static str| {
            ListItem::new(Spans::from(Span::styled(
                text,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )))
        };
        let check = |on: bool, label: &str| {
            ListItem::new(format!(" [{}] {}", if on { "x" } else { " " }, label))
        };

        let mut items = vec![heading("Responsible (Who)")];
        let mut rows = Vec::new();
        for (who, on) in self.who_options.iter().zip(&self.who_selected) {
            rows.push(items.len());
            let label = if who.is_empty() { "(blank)" } else { who.as_str() };
            items.push(check(*on, label));
        }

        items.push(heading("Task Status"));
        for (status, on) in TASK_STATUSES.iter().zip(&self.status_selected) {
            rows.push(items.len());
            items.push(check(*on, status));
        }

        items.push(heading("Planned End"));
        rows.push(items.len());
        items.push(ListItem::new(format!(" From: {}", self.start.get_display_string())));
        rows.push(items.len());
        items.push(ListItem::new(format!(" To:   {}", self.end.get_display_string())));

        let highlighted = rows.get(self.cursor).copied().unwrap_or(0);
        (items, highlighted)
    }
}

pub fn render_filters<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &FilterPanelState,
    focused: bool,
) {
    let (items, highlighted) = state.render_items();

    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title("Filters")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    if focused {
        list_state.select(Some(highlighted));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Keys while the filter panel has focus.
pub fn handle_key(state: &mut FilterPanelState, key: KeyCode) -> Option<FilterAction> {
    if state.editing_date() {
        return match key {
            KeyCode::Enter => {
                state.activate();
                Some(FilterAction::Changed)
            }
            KeyCode::Esc => {
                state.start.cancel_editing();
                state.end.cancel_editing();
                None
            }
            other => {
                state.start.handle_input(other);
                state.end.handle_input(other);
                None
            }
        };
    }

    match key {
        KeyCode::Esc | KeyCode::Char('f') => Some(FilterAction::Leave),
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if state.activate() {
                Some(FilterAction::Changed)
            } else {
                None
            }
        }
        _ => None,
    }
}
