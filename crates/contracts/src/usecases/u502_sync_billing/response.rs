use serde::{Deserialize, Serialize};

/// Contadores de una corrida de facturas o recibos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounts {
    pub registros: i64,
    pub insertados: i64,
    pub actualizados: i64,
}

impl SyncCounts {
    pub fn record(&mut self, inserted: bool) {
        self.registros += 1;
        if inserted {
            self.insertados += 1;
        } else {
            self.actualizados += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingSyncResult {
    pub facturas: SyncCounts,
    pub recibos: SyncCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPeriodResult {
    pub periodo: String,
    pub facturas: SyncCounts,
    pub recibos: SyncCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub periodos: usize,
    pub facturas_insertadas: i64,
    pub facturas_actualizadas: i64,
    pub recibos_insertados: i64,
    pub recibos_actualizados: i64,
    pub errores: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySyncResult {
    pub data: Vec<HistoryPeriodResult>,
    pub resumen: HistorySummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_splits_inserted_and_updated() {
        let mut counts = SyncCounts::default();
        counts.record(true);
        counts.record(false);
        counts.record(true);
        assert_eq!(
            counts,
            SyncCounts {
                registros: 3,
                insertados: 2,
                actualizados: 1
            }
        );
    }
}
