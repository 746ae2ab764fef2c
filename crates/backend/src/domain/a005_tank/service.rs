use contracts::domain::a005_tank::aggregate::{TankLevel, VALID_TANK_PRODUCTS};
use serde_json::Value;

use crate::shared::dates::{now, parse_api_datetime};
use crate::shared::xml::{field_f64, field_i64, field_str, pick};

/// A tank from `Tanques/GetAllTanques` worth monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredTank {
    pub id_tanque: i64,
    pub producto: String,
}

pub fn is_valid_product(descripcion: &str) -> bool {
    let upper = descripcion.trim().to_uppercase();
    VALID_TANK_PRODUCTS.contains(&upper.as_str())
}

/// Tanks whose `articulo.descripcion` is one of the monitored fuels
pub fn monitored_tanks(tanks: &[Value]) -> Vec<MonitoredTank> {
    tanks
        .iter()
        .filter_map(|t| {
            let id_tanque = field_i64(t, &["idTanque", "IdTanque"])?;
            let producto = pick(t, &["articulo.descripcion", "Articulo.Descripcion"])
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())?;
            is_valid_product(&producto).then_some(MonitoredTank { id_tanque, producto })
        })
        .collect()
}

/// Builds the current level from `Tanques/GetInformacionActualTanque`
pub fn level_from_info(tank: &MonitoredTank, info: &Value) -> TankLevel {
    let litros = field_f64(info, &["litros", "Litros"]).unwrap_or(0.0);
    let vacio = field_f64(info, &["litrosVacio", "LitrosVacio"]).unwrap_or(0.0);
    let fecha_actualizacion = field_str(info, &["fechaHoraMedicion", "FechaHoraMedicion"])
        .map(|s| parse_api_datetime(&s))
        .unwrap_or_else(now);

    TankLevel {
        id_tanque: tank.id_tanque,
        producto: tank.producto.clone(),
        capacidad: litros + vacio,
        nivel_actual: litros,
        temperatura: field_f64(info, &["temperatura", "Temperatura"]),
        fecha_actualizacion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn filters_monitored_products() {
        let tanks = vec![
            json!({"idTanque": 1, "articulo": {"descripcion": "Nafta Super"}}),
            json!({"idTanque": 2, "articulo": {"descripcion": "GNC"}}),
            json!({"idTanque": 3, "articulo": {"descripcion": "QUANTIUM DIESEL"}}),
            json!({"idTanque": 4}),
        ];
        let monitored = monitored_tanks(&tanks);
        assert_eq!(
            monitored.iter().map(|t| t.id_tanque).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(!is_valid_product("DIESEL"));
    }

    #[test]
    fn capacity_is_full_plus_empty() {
        let tank = MonitoredTank {
            id_tanque: 3,
            producto: "DIESEL X10".into(),
        };
        let info = json!({
            "litros": 12000.5, "litrosVacio": 7999.5, "temperatura": 18.2,
            "fechaHoraMedicion": "2024-03-05T08:00:00"
        });
        let level = level_from_info(&tank, &info);
        assert_eq!(level.capacidad, 20000.0);
        assert_eq!(level.nivel_actual, 12000.5);
        assert_eq!(level.temperatura, Some(18.2));
        assert_eq!(
            level.fecha_actualizacion,
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(8, 0, 0).unwrap()
        );
    }
}
