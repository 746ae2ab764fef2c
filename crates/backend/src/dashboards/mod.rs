pub mod d401_pc_monthly;
pub mod d402_subdiary;
pub mod d403_closures_monthly;
pub mod d404_billing_daily;

use chrono::NaiveDate;
use contracts::shared::date_range::DateRangeQuery;

use crate::shared::dates::{first_day_of_month, parse_date, today};

/// Report range. Missing or invalid dates fall back to the current month up to today.
pub fn month_to_date(query: &DateRangeQuery) -> (NaiveDate, NaiveDate) {
    let from = query.fecha_inicio.as_deref().and_then(parse_date);
    let to = query.fecha_fin.as_deref().and_then(parse_date);
    match (from, to) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            let today = today();
            (first_day_of_month(today), today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_range_is_kept() {
        let q = DateRangeQuery {
            fecha_inicio: Some("2024-02-01".into()),
            fecha_fin: Some("2024-02-29".into()),
        };
        let (from, to) = month_to_date(&q);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn half_range_falls_back_to_current_month() {
        let q = DateRangeQuery {
            fecha_inicio: Some("2024-02-01".into()),
            fecha_fin: None,
        };
        let (from, to) = month_to_date(&q);
        assert_eq!(to, today());
        assert_eq!(from, first_day_of_month(today()));
    }
}
