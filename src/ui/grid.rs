use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::db::cache::Snapshot;
use crate::filter;
use crate::models::{parse_amount, Field, RecordDraft};
use crate::ui::components::popup::render_popup;
use crate::ui::filters::{self, FilterAction, FilterPanelState};
use crate::ui::{render_notice, render_tabs, Notice, Tab};

const VISIBLE_COLUMNS: usize = 5;
const DEFAULT_EXPORT_PATH: &str = "projects_5w2h.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Import,
    Export,
}

#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Browse,
    Filters,
    EditCell(String),
    ConfirmSave,
    ConfirmQuit,
    Prompt(PromptKind, String),
}

#[derive(Debug, PartialEq)]
pub enum GridAction {
    /// Persist these rows as the complete record set.
    Save(Vec<RecordDraft>),
    Import(PathBuf),
    Export(PathBuf),
    SwitchTab,
    Quit,
}

// Represents the state of the 5W2H editing screen
pub struct GridState {
    snapshot: Snapshot,
    filters: FilterPanelState,
    rows: Vec<RecordDraft>,
    // Stored records the current filters keep out of the grid.
    hidden: usize,
    table_state: TableState,
    column: usize,
    column_offset: usize,
    mode: Mode,
    dirty: bool,
    notice: Option<Notice>,
}

impl GridState {
    pub fn new(snapshot: Snapshot, today: NaiveDate) -> Self {
        let filters = FilterPanelState::new(&snapshot, today);
        let mut state = Self {
            snapshot,
            filters,
            rows: Vec::new(),
            hidden: 0,
            table_state: TableState::default(),
            column: 0,
            column_offset: 0,
            mode: Mode::Browse,
            dirty: false,
            notice: None,
        };
        state.apply_filters();
        state
    }

    /// Swap in a fresh snapshot after a write, keeping the filter choices.
    pub fn reload(&mut self, snapshot: Snapshot) {
        self.filters.refresh_options(&snapshot);
        self.snapshot = snapshot;
        self.apply_filters();
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    fn apply_filters(&mut self) {
        let criteria = self.filters.criteria();
        let shown = filter::apply(&self.snapshot, &criteria);

        self.hidden = self.snapshot.len() - shown.len();
        self.rows = shown.iter().map(|record| RecordDraft::from(&record.entry)).collect();
        self.dirty = false;
        self.table_state
            .select(if self.rows.is_empty() { None } else { Some(0) });
    }

    fn selected_row(&self) -> Option<usize> {
        self.table_state.selected().filter(|&i| i < self.rows.len())
    }

    fn current_field(&self) -> Field {
        Field::ALL[self.column]
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    fn move_column(&mut self, forward: bool) {
        let last = Field::ALL.len() - 1;
        self.column = if forward {
            (self.column + 1).min(last)
        } else {
            self.column.saturating_sub(1)
        };

        if self.column < self.column_offset {
            self.column_offset = self.column;
        } else if self.column >= self.column_offset + VISIBLE_COLUMNS {
            self.column_offset = self.column + 1 - VISIBLE_COLUMNS;
        }
    }

    fn add_row(&mut self) {
        self.rows.push(RecordDraft::new());
        self.table_state.select(Some(self.rows.len() - 1));
        self.dirty = true;
    }

    fn delete_row(&mut self) {
        if let Some(i) = self.selected_row() {
            self.rows.remove(i);
            self.dirty = true;
            let selected = if self.rows.is_empty() {
                None
            } else {
                Some(i.min(self.rows.len() - 1))
            };
            self.table_state.select(selected);
        }
    }

    fn begin_edit(&mut self) {
        if let Some(i) = self.selected_row() {
            let current = self.rows[i]
                .get(self.current_field())
                .unwrap_or_default()
                .to_string();
            self.mode = Mode::EditCell(current);
        }
    }

    fn commit_edit(&mut self, value: String) {
        let field = self.current_field();
        if let Some(i) = self.selected_row() {
            if field.is_numeric() && !value.trim().is_empty() && parse_amount(&value).is_none() {
                self.notice = Some(Notice::Info(format!(
                    "{} \"{}\" is not a number and will be saved empty",
                    field.label(),
                    value
                )));
            }
            if self.rows[i].get(field) != Some(value.as_str()) {
                self.rows[i].set(field, value);
                self.dirty = true;
            }
        }
        self.mode = Mode::Browse;
    }

    fn filters_changed(&mut self) {
        let discarded = self.dirty;
        self.apply_filters();
        if discarded {
            self.notice = Some(Notice::Info("Filters changed; unsaved edits discarded".into()));
        }
    }
}

pub fn render_grid<B: Backend>(frame: &mut Frame<B>, state: &mut GridState) {
    let size = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
            Constraint::Length(3),
        ])
        .split(size);

    render_tabs(frame, chunks[0], Tab::Grid);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[1]);

    filters::render_filters(frame, body[0], &state.filters, state.mode == Mode::Filters);
    render_table(frame, body[1], state);
    render_notice(frame, chunks[2], state.notice.as_ref());

    let help_text = match &state.mode {
        Mode::Browse => {
            "<Enter> Edit cell | <A> Add row | <D> Delete row | <S> Save | <I> Import CSV | \
             <E> Export CSV | <F> Filters | <Tab> Dashboard | <Q> Quit"
        }
        Mode::Filters => "<Up/Down> Move | <Space> Toggle | <Enter> Edit date | <Esc> Back to grid",
        Mode::EditCell(_) => "<Enter> Keep value | <Esc> Cancel",
        Mode::ConfirmSave => "<Y> Save | <N> Cancel",
        Mode::ConfirmQuit => "<Y> Quit without saving | <N> Keep editing",
        Mode::Prompt(_, _) => "<Enter> Confirm | <Esc> Cancel",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);

    match &state.mode {
        Mode::ConfirmSave => {
            let mut lines = vec![
                Spans::from(""),
                Spans::from(format!(
                    "Save {} rows? This replaces every stored record.",
                    state.rows.len()
                )),
            ];
            if state.hidden > 0 {
                lines.push(Spans::from(""));
                lines.push(Spans::from(format!(
                    "{} stored records hidden by the filters will be removed.",
                    state.hidden
                )));
            }
            lines.push(Spans::from(""));
            lines.push(Spans::from("<Y> Yes  <N> No"));
            render_popup(frame, size, "Confirm Save", lines);
        }
        Mode::ConfirmQuit => {
            let lines = vec![
                Spans::from(""),
                Spans::from("The grid has unsaved changes. Quit and discard them?"),
                Spans::from(""),
                Spans::from("<Y> Yes  <N> No"),
            ];
            render_popup(frame, size, "Unsaved Changes", lines);
        }
        Mode::Prompt(kind, path) => {
            let (title, label) = match kind {
                PromptKind::Import => ("Upload CSV", "Import records from:"),
                PromptKind::Export => ("Download CSV", "Export all records to:"),
            };
            let lines = vec![
                Spans::from(""),
                Spans::from(label),
                Spans::from(format!("{path}|")),
            ];
            render_popup(frame, size, title, lines);
        }
        _ => {}
    }
}

fn render_table<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut GridState) {
    let end = (state.column_offset + VISIBLE_COLUMNS).min(Field::ALL.len());
    let all = Field::ALL;
    let visible = &all[state.column_offset..end];
    let selected_row = state.selected_row();

    let header = Row::new(visible.iter().map(|field| {
        let style = if *field == state.current_field() {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(field.label()).style(style)
    }));

    let rows: Vec<Row> = state
        .rows
        .iter()
        .enumerate()
        .map(|(i, draft)| {
            let cells = visible.iter().map(|&field| {
                let is_current = Some(i) == selected_row && field == state.current_field();
                match (&state.mode, is_current) {
                    (Mode::EditCell(buffer), true) => Cell::from(format!("{buffer}|"))
                        .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                    (_, true) => Cell::from(draft.get(field).unwrap_or_default().to_string())
                        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                    _ => Cell::from(draft.get(field).unwrap_or_default().to_string()),
                }
            });
            Row::new(cells)
        })
        .collect();

    let title = format!(
        "Edit 5W2H Records ({} shown, {} hidden by filters{}) [columns {}-{} of {}]",
        state.rows.len(),
        state.hidden,
        if state.dirty { ", unsaved changes" } else { "" },
        state.column_offset + 1,
        end,
        Field::ALL.len()
    );

    let widths = vec![Constraint::Percentage((100 / VISIBLE_COLUMNS) as u16); visible.len()];
    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

pub fn handle_input(state: &mut GridState) -> Result<Option<GridAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut GridState, key: KeyCode) -> Option<GridAction> {
    match std::mem::replace(&mut state.mode, Mode::Browse) {
        Mode::Browse => handle_browse_key(state, key),
        Mode::Filters => {
            state.mode = Mode::Filters;
            match filters::handle_key(&mut state.filters, key) {
                Some(FilterAction::Changed) => state.filters_changed(),
                Some(FilterAction::Leave) => state.mode = Mode::Browse,
                None => {}
            }
            None
        }
        Mode::EditCell(mut buffer) => {
            match key {
                KeyCode::Enter => state.commit_edit(buffer),
                KeyCode::Esc => {}
                KeyCode::Backspace => {
                    buffer.pop();
                    state.mode = Mode::EditCell(buffer);
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    state.mode = Mode::EditCell(buffer);
                }
                _ => state.mode = Mode::EditCell(buffer),
            }
            None
        }
        Mode::ConfirmSave => match key {
            KeyCode::Char('y') => Some(GridAction::Save(state.rows.clone())),
            KeyCode::Char('n') | KeyCode::Esc => None,
            _ => {
                state.mode = Mode::ConfirmSave;
                None
            }
        },
        Mode::ConfirmQuit => match key {
            KeyCode::Char('y') => Some(GridAction::Quit),
            KeyCode::Char('n') | KeyCode::Esc => None,
            _ => {
                state.mode = Mode::ConfirmQuit;
                None
            }
        },
        Mode::Prompt(kind, mut path) => match key {
            KeyCode::Enter if !path.trim().is_empty() => {
                let path = PathBuf::from(path.trim());
                Some(match kind {
                    PromptKind::Import => GridAction::Import(path),
                    PromptKind::Export => GridAction::Export(path),
                })
            }
            KeyCode::Esc => None,
            KeyCode::Backspace => {
                path.pop();
                state.mode = Mode::Prompt(kind, path);
                None
            }
            KeyCode::Char(c) => {
                path.push(c);
                state.mode = Mode::Prompt(kind, path);
                None
            }
            _ => {
                state.mode = Mode::Prompt(kind, path);
                None
            }
        },
    }
}

fn handle_browse_key(state: &mut GridState, key: KeyCode) -> Option<GridAction> {
    match key {
        KeyCode::Char('q') if state.dirty => state.mode = Mode::ConfirmQuit,
        KeyCode::Char('q') => return Some(GridAction::Quit),
        KeyCode::Tab => return Some(GridAction::SwitchTab),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Right => state.move_column(true),
        KeyCode::Left => state.move_column(false),
        KeyCode::Enter => state.begin_edit(),
        KeyCode::Char('a') => state.add_row(),
        KeyCode::Char('d') => state.delete_row(),
        KeyCode::Char('s') => state.mode = Mode::ConfirmSave,
        KeyCode::Char('i') => state.mode = Mode::Prompt(PromptKind::Import, String::new()),
        KeyCode::Char('e') => {
            state.mode = Mode::Prompt(PromptKind::Export, DEFAULT_EXPORT_PATH.to_string())
        }
        KeyCode::Char('f') => state.mode = Mode::Filters,
        _ => {}
    }
    None
}
