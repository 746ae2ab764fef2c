use contracts::domain::a004_vehicle_position::aggregate::Position;

/// Positions without a plate cannot be keyed in `positions`
pub fn is_storable(position: &Position) -> bool {
    !position.plate.trim().is_empty() && !position.date.trim().is_empty()
}

/// Label used in per-row error messages
pub fn describe(position: &Position) -> String {
    format!("{} @ {}", position.plate, position.date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storable_positions_need_plate_and_date() {
        let mut p = Position {
            plate: "AB123CD".into(),
            date: "2024-06-01 10:00:00".into(),
            ..Default::default()
        };
        assert!(is_storable(&p));
        assert_eq!(describe(&p), "AB123CD @ 2024-06-01 10:00:00");

        p.plate = "  ".into();
        assert!(!is_storable(&p));
    }
}
