use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Best-effort parse of a free-text date. Anything unrecognised is `None`;
/// callers treat that as "no date" rather than as an error.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Calendar month of a date as a sortable `(year, month)` key.
pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

pub fn month_label((year, month): (i32, u32)) -> String {
    format!("{year:04}-{month:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_shapes() {
        assert_eq!(parse_date("2024-01-10"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date(" 2024/03/05 "), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("03/05/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("05.03.2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024-01-10 14:30:00"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date("2024-01-10T08:00:00Z"), Some(ymd(2024, 1, 10)));
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn month_labels_sort_like_their_keys() {
        let key = month_key(ymd(2024, 3, 5));
        assert_eq!(key, (2024, 3));
        assert_eq!(month_label(key), "2024-03");
    }
}
