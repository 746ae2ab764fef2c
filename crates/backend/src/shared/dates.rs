use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Parses vendor timestamps.
///
/// Accepts ISO strings (anything containing `T`) and the `DD/MM/YYYY[ HH:mm[:ss]]`
/// form used by the XML endpoints. Empty or invalid input yields the current local time.
pub fn parse_api_datetime(s: &str) -> NaiveDateTime {
    let s = s.trim();
    if s.is_empty() {
        return now();
    }

    if s.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return dt.naive_local();
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return dt;
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
            return dt;
        }
        tracing::warn!("Unparseable ISO date from API: {}", s);
        return now();
    }

    let mut parts = s.split_whitespace();
    let date_part = parts.next().unwrap_or_default();
    let time_part = parts.next().unwrap_or_default();

    let mut dmy = date_part.split('/');
    let day = number_or(dmy.next(), 1);
    let month = number_or(dmy.next(), 1);
    let year = number_or(dmy.next(), 1970);

    let mut hms = time_part.split(':');
    let hour = number_or(hms.next(), 0);
    let minute = number_or(hms.next(), 0);
    let second = number_or(hms.next(), 0);

    let date = NaiveDate::from_ymd_opt(year as i32, month, day);
    let time = NaiveTime::from_hms_opt(hour, minute, second);
    match (date, time) {
        (Some(d), Some(t)) => d.and_time(t),
        _ => {
            tracing::warn!("Invalid date from API: {}", s);
            now()
        }
    }
}

fn number_or(part: Option<&str>, default: u32) -> u32 {
    part.map(str::trim)
        .filter(|p| !p.is_empty())
        .and_then(|p| p.parse().ok())
        .unwrap_or(default)
}

/// Tracker dates: `YYYY-MM-DD HH:mm:ss`
pub fn parse_plain_datetime(s: &str) -> NaiveDateTime {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|d| d.naive_local()))
        .unwrap_or_else(|_| {
            tracing::warn!("Invalid position date '{}', using current time", s);
            now()
        })
}

/// Accepts `YYYY-MM-DD` and `YYYYMMDD`
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y%m%d"))
        .ok()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn yesterday() -> NaiveDate {
    today() - Duration::days(1)
}

pub fn first_day_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MIN)
}

/// Every day between `from` and `to`, both inclusive
pub fn date_range_inclusive(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

/// Calendar months covering `[from, to]`. The first period starts on the 1st of
/// `from`'s month and the last one is clamped to `to`.
pub fn monthly_periods(from: NaiveDate, to: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let mut periods = Vec::new();
    if from > to {
        return periods;
    }
    let mut start = first_day_of_month(from);
    while start <= to {
        let end = last_day_of_month(start.year(), start.month()).min(to);
        periods.push((start, end));
        start = match end.succ_opt() {
            Some(next) if end < to => first_day_of_month(next),
            _ => break,
        };
    }
    periods
}

/// `2024-3-5` → `20240305`
pub fn to_compact_date(s: &str) -> String {
    let parts: Vec<&str> = s.trim().split('-').collect();
    if parts.len() == 3 {
        format!("{}{:0>2}{:0>2}", parts[0], parts[1], parts[2])
    } else {
        s.replace('-', "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_vendor_slash_format() {
        let dt = parse_api_datetime("05/03/2024 7:04:09");
        assert_eq!(dt, ymd(2024, 3, 5).and_hms_opt(7, 4, 9).unwrap());

        let date_only = parse_api_datetime("31/12/2023");
        assert_eq!(date_only, ymd(2023, 12, 31).and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn parses_iso_without_timezone_shift() {
        let dt = parse_api_datetime("2024-03-05T10:15:00");
        assert_eq!(dt, ymd(2024, 3, 5).and_hms_opt(10, 15, 0).unwrap());

        let with_fraction = parse_api_datetime("2024-03-05T10:15:00.123");
        assert_eq!(with_fraction.date(), ymd(2024, 3, 5));

        let with_offset = parse_api_datetime("2024-03-05T10:15:00-03:00");
        assert_eq!(with_offset, ymd(2024, 3, 5).and_hms_opt(10, 15, 0).unwrap());
    }

    #[test]
    fn invalid_dates_fall_back_to_now() {
        let before = now() - Duration::seconds(1);
        assert!(parse_api_datetime("") >= before);
        assert!(parse_api_datetime("99/99/2024") >= before);
        assert!(parse_plain_datetime("garbage") >= before);
    }

    #[test]
    fn parses_tracker_dates() {
        assert_eq!(
            parse_plain_datetime("2024-06-01 12:30:45"),
            ymd(2024, 6, 1).and_hms_opt(12, 30, 45).unwrap()
        );
    }

    #[test]
    fn inclusive_range() {
        let days = date_range_inclusive(ymd(2024, 2, 27), ymd(2024, 3, 1));
        assert_eq!(
            days,
            vec![ymd(2024, 2, 27), ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]
        );
        assert!(date_range_inclusive(ymd(2024, 3, 2), ymd(2024, 3, 1)).is_empty());
    }

    #[test]
    fn monthly_periods_clamp_last_month() {
        let periods = monthly_periods(ymd(2023, 11, 15), ymd(2024, 1, 10));
        assert_eq!(
            periods,
            vec![
                (ymd(2023, 11, 1), ymd(2023, 11, 30)),
                (ymd(2023, 12, 1), ymd(2023, 12, 31)),
                (ymd(2024, 1, 1), ymd(2024, 1, 10)),
            ]
        );
        assert!(monthly_periods(ymd(2024, 2, 1), ymd(2024, 1, 1)).is_empty());
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(last_day_of_month(2024, 2), ymd(2024, 2, 29));
        assert_eq!(last_day_of_month(2023, 12), ymd(2023, 12, 31));
        assert_eq!(first_day_of_month(ymd(2024, 5, 17)), ymd(2024, 5, 1));
    }

    #[test]
    fn compact_dates() {
        assert_eq!(to_compact_date("2024-03-05"), "20240305");
        assert_eq!(to_compact_date("2024-3-5"), "20240305");
        assert_eq!(to_compact_date("20240305"), "20240305");
        assert_eq!(parse_date("20240305"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("march"), None);
    }
}
