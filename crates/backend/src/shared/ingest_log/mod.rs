pub mod repository;

use contracts::shared::logger::IngestKind;
use std::time::Duration;

/// `Insertados: X, Actualizados: Y, Duración: Z.Zs`
pub fn success_message(insertados: i64, actualizados: i64, duration: Duration) -> String {
    format!(
        "Insertados: {}, Actualizados: {}, Duración: {:.1}s",
        insertados,
        actualizados,
        duration.as_secs_f64()
    )
}

pub fn success_state(kind: IngestKind) -> String {
    format!("EXITO - {}", kind.as_str())
}

pub fn failure_state(kind: IngestKind) -> String {
    format!("ERROR - {}", kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            success_message(10, 3, Duration::from_millis(2540)),
            "Insertados: 10, Actualizados: 3, Duración: 2.5s"
        );
        assert_eq!(success_state(IngestKind::Facturas), "EXITO - FACTURAS");
        assert_eq!(failure_state(IngestKind::Recibos), "ERROR - RECIBOS");
    }
}
