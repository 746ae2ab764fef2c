use contracts::domain::a001_shift_closure::aggregate::{ShiftClosure, ShiftClosureInfo};
use serde_json::Value;

use crate::shared::numbers::safe_number;
use crate::shared::xml::{as_list, field_i64, field_str, pick};

/// Department and product ids for a register name
///
/// `PLAYA` → (1, 4), `SHOP` → (2, 8), `LUBRIC` → (3, 7), anything else → (1, 1).
pub fn classify_register(caja_name: &str) -> (i64, i64) {
    let caja = caja_name.to_uppercase();
    if caja.contains("PLAYA") {
        (1, 4)
    } else if caja.contains("SHOP") {
        (2, 8)
    } else if caja.contains("LUBRIC") {
        (3, 7)
    } else {
        (1, 1)
    }
}

/// `ArrayOfCierreTurno.CierreTurno`, single item or list
pub fn parse_closures(doc: &Value) -> Vec<ShiftClosure> {
    let Some(items) = pick(doc, &["ArrayOfCierreTurno.CierreTurno", "CierreTurno"]) else {
        return Vec::new();
    };

    as_list(items)
        .into_iter()
        .map(|c| ShiftClosure {
            fecha: field_str(c, &["Fecha"]),
            id_cierre_turno: field_i64(c, &["IdCierreTurno"]),
            numero_turno: field_i64(c, &["NumeroTurno"]),
            id_caja: field_i64(c, &["IdCaja"]),
            caja: field_str(c, &["Caja"]),
            id_cierre_caja_tesoreria: field_i64(c, &["IdCierreCajaTesoreria"]),
        })
        .collect()
}

/// Totals of one closure. A missing document yields zeros.
pub fn parse_closure_info(doc: &Value) -> ShiftClosureInfo {
    let info = pick(doc, &["InformacionCierreTurno"]).unwrap_or(&Value::Null);
    ShiftClosureInfo {
        importe_ventas_totales_contado: safe_number(info.get("ImporteVentasTotalesContado"), 2),
        total_litros_despachados: safe_number(info.get("TotalLitrosDespachados"), 2),
        total_efectivo_recaudado: safe_number(info.get("TotalEfectivoRecaudado"), 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::xml::xml_to_value;

    #[test]
    fn register_classification() {
        assert_eq!(classify_register("Playa 1"), (1, 4));
        assert_eq!(classify_register("SHOP"), (2, 8));
        assert_eq!(classify_register("lubricentro"), (3, 7));
        assert_eq!(classify_register("Administracion"), (1, 1));
        assert_eq!(classify_register(""), (1, 1));
    }

    #[test]
    fn closures_single_and_list() {
        let single = xml_to_value(
            "<ArrayOfCierreTurno><CierreTurno><Fecha>05/03/2024 06:00:00</Fecha>\
             <IdCierreTurno>10</IdCierreTurno><NumeroTurno>1</NumeroTurno><Caja>PLAYA</Caja>\
             </CierreTurno></ArrayOfCierreTurno>",
        )
        .unwrap();
        let closures = parse_closures(&single);
        assert_eq!(closures.len(), 1);
        assert_eq!(closures[0].id_cierre_turno, Some(10));
        assert_eq!(closures[0].caja.as_deref(), Some("PLAYA"));

        let empty = xml_to_value("<ArrayOfCierreTurno />").unwrap();
        assert!(parse_closures(&empty).is_empty());
    }

    #[test]
    fn closure_without_date_keeps_none() {
        let doc = xml_to_value(
            "<ArrayOfCierreTurno><CierreTurno><IdCierreTurno>3</IdCierreTurno></CierreTurno>\
             <CierreTurno><IdCierreTurno>4</IdCierreTurno><Fecha>x</Fecha></CierreTurno></ArrayOfCierreTurno>",
        )
        .unwrap();
        let closures = parse_closures(&doc);
        assert_eq!(closures.len(), 2);
        assert!(closures[0].fecha.is_none());
    }

    #[test]
    fn info_amount_falls_back_to_cash() {
        let doc = xml_to_value(
            "<InformacionCierreTurno><ImporteVentasTotalesContado>0</ImporteVentasTotalesContado>\
             <TotalLitrosDespachados>1520.456</TotalLitrosDespachados>\
             <TotalEfectivoRecaudado>98000.5</TotalEfectivoRecaudado></InformacionCierreTurno>",
        )
        .unwrap();
        let info = parse_closure_info(&doc);
        assert_eq!(info.total_litros_despachados, 1520.46);
        assert_eq!(info.effective_amount(), 98000.5);

        assert_eq!(parse_closure_info(&Value::Null), ShiftClosureInfo::default());
    }
}
