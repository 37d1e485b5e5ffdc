use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// A date typed in part by part: four year digits, two month digits, two
/// day digits. Left/Right move between parts.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pending: String,
    // Date to restore when an edit is cancelled.
    before_edit: NaiveDate,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            pending: String::new(),
            before_edit: date,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.before_edit = self.date;
        }
        self.date_part = DatePart::Year;
        self.pending.clear();
    }

    /// Leave edit mode and put back the date it started from.
    pub fn cancel_editing(&mut self) {
        if self.editing {
            self.date = self.before_edit;
            self.toggle_editing();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.pending.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.pending.clear();
    }

    fn part_width(&self) -> usize {
        match self.date_part {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.pending.push(c);
                if self.pending.len() == self.part_width() {
                    self.apply_pending();
                    self.pending.clear();
                }
            }
            KeyCode::Backspace => {
                self.pending.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    // Out-of-range parts are dropped; a day past the end of the new month is
    // clamped to that month's last day.
    fn apply_pending(&mut self) {
        let Ok(value) = self.pending.parse::<u32>() else {
            return;
        };

        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        let candidate = match self.date_part {
            DatePart::Year if (1900..=2100).contains(&value) => {
                clamped_date(value as i32, month, day)
            }
            DatePart::Month if (1..=12).contains(&value) => clamped_date(year, value, day),
            DatePart::Day => NaiveDate::from_ymd_opt(year, month, value),
            _ => None,
        };

        if let Some(date) = candidate {
            self.date = date;
        }
    }

    pub fn get_display_string(&self) -> String {
        let date_str = self.date.format("%Y-%m-%d").to_string();
        if !self.editing {
            return date_str;
        }

        let marker = if self.pending.is_empty() {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        } else {
            format!("[{}]", self.pending)
        };

        let (year, month, day) = (&date_str[0..4], &date_str[5..7], &date_str[8..10]);
        match self.date_part {
            DatePart::Year => format!("{year}{marker}-{month}-{day}"),
            DatePart::Month => format!("{year}-{month}{marker}-{day}"),
            DatePart::Day => format!("{year}-{month}-{day}{marker}"),
        }
    }
}

fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing(date: NaiveDate) -> DateInputState {
        let mut state = DateInputState::new(date);
        state.toggle_editing();
        state
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_each_part_builds_a_date() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        type_digits(&mut state, "2025");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "06");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "15");

        assert_eq!(state.date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn month_change_clamps_the_day() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "02");

        assert_eq!(state.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn invalid_parts_are_ignored() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let mut state = editing(start);
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "13");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "31");

        assert_eq!(state.date, start);
    }

    #[test]
    fn cancelling_restores_the_starting_date() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 10).unwrap();
        let mut state = editing(start);
        type_digits(&mut state, "2030");
        assert_eq!(state.date.year(), 2030);

        state.cancel_editing();

        assert_eq!(state.date, start);
        assert!(!state.editing);
    }

    #[test]
    fn display_marks_the_part_being_typed() {
        let mut state = editing(NaiveDate::from_ymd_opt(2024, 4, 10).unwrap());
        state.handle_input(KeyCode::Right);
        state.handle_input(KeyCode::Char('1'));

        assert_eq!(state.get_display_string(), "2024-04[1]-10");
    }
}
