//! Conversion of vendor XML into `serde_json::Value` and lookup helpers
//! shared by every payload parser.
//!
//! The produced shape follows the usual "non-explicit array, merged attributes"
//! convention: single children are plain values, repeated children become arrays,
//! text-only elements become strings and `xsi:nil="true"` elements become `null`.

use anyhow::Context;
use serde_json::{Map, Value};

pub fn xml_to_value(text: &str) -> anyhow::Result<Value> {
    let doc = roxmltree::Document::parse(text).context("Invalid XML document")?;
    let root = doc.root_element();
    let mut map = Map::new();
    map.insert(root.tag_name().name().to_string(), element_to_value(root));
    Ok(Value::Object(map))
}

fn is_nil(node: roxmltree::Node) -> bool {
    node.attributes()
        .any(|a| a.name() == "nil" && a.value().eq_ignore_ascii_case("true"))
}

fn element_to_value(node: roxmltree::Node) -> Value {
    if is_nil(node) {
        return Value::Null;
    }

    let has_children = node.children().any(|c| c.is_element());
    let has_attributes = node.attributes().len() > 0;
    let text: String = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();
    let text = text.trim();

    if !has_children && !has_attributes {
        return Value::String(text.to_string());
    }

    let mut map = Map::new();
    for attr in node.attributes() {
        map.insert(attr.name().to_string(), Value::String(attr.value().to_string()));
    }

    for child in node.children().filter(|c| c.is_element()) {
        let key = child.tag_name().name().to_string();
        let value = element_to_value(child);
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }

    if !text.is_empty() {
        map.insert("_".to_string(), Value::String(text.to_string()));
    }

    Value::Object(map)
}

/// JSON first, XML otherwise. Blank input is `Null`.
pub fn parse_any(text: &str) -> anyhow::Result<Value> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Ok(v);
    }
    xml_to_value(trimmed)
}

/// null → empty, array → items, anything else → one item
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

pub fn path<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .filter(|k| !k.is_empty())
        .try_fold(value, |current, key| current.get(key))
}

/// First non-null value among the dotted `paths`
pub fn pick<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|p| path(value, p))
        .find(|v| !v.is_null())
}

/// First non-null field among `names`
pub fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find(|v| !v.is_null())
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("_").and_then(scalar_to_string),
        _ => None,
    }
}

/// First present, non-empty scalar among `names`, as a string
pub fn field_str(obj: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find_map(scalar_to_string)
}

pub fn field_f64(obj: &Value, names: &[&str]) -> Option<f64> {
    field_str(obj, names).and_then(|s| s.replace(',', ".").parse::<f64>().ok())
}

pub fn field_i64(obj: &Value, names: &[&str]) -> Option<i64> {
    field_str(obj, names).and_then(|s| {
        s.parse::<i64>()
            .ok()
            .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
    })
}

/// Short preview of a payload for log lines
pub fn preview(text: &str) -> String {
    text.chars().take(300).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_nested_elements() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<ArrayOfCierreTurno xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns="http://tempuri.org/">
  <CierreTurno>
    <Fecha>05/03/2024 06:00:00</Fecha>
    <IdCierreTurno>123</IdCierreTurno>
    <Caja>PLAYA</Caja>
  </CierreTurno>
  <CierreTurno>
    <Fecha>05/03/2024 14:00:00</Fecha>
    <IdCierreTurno>124</IdCierreTurno>
    <Caja>SHOP</Caja>
  </CierreTurno>
</ArrayOfCierreTurno>"#;

        let value = xml_to_value(xml).unwrap();
        let items = as_list(pick(&value, &["ArrayOfCierreTurno.CierreTurno"]).unwrap());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["Caja"], json!("PLAYA"));
        assert_eq!(field_i64(items[1], &["IdCierreTurno"]), Some(124));
    }

    #[test]
    fn single_child_is_not_an_array() {
        let value = xml_to_value("<Root><Item><A>1</A></Item></Root>").unwrap();
        assert!(value["Root"]["Item"].is_object());
        assert_eq!(as_list(&value["Root"]["Item"]).len(), 1);
    }

    #[test]
    fn nil_and_empty_elements() {
        let xml = r#"<Cab xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <IdLocalidad xsi:nil="true" />
            <Patente />
            <Moneda>PES</Moneda>
        </Cab>"#;
        let value = xml_to_value(xml).unwrap();
        assert_eq!(value["Cab"]["IdLocalidad"], Value::Null);
        assert_eq!(value["Cab"]["Patente"], json!(""));
        assert_eq!(field_str(&value["Cab"], &["Patente", "Moneda"]), Some("PES".into()));
    }

    #[test]
    fn attributes_are_merged() {
        let value = xml_to_value(r#"<Tanque id="7" tipo="A">NAFTA</Tanque>"#).unwrap();
        assert_eq!(value["Tanque"]["id"], json!("7"));
        assert_eq!(value["Tanque"]["_"], json!("NAFTA"));
        assert_eq!(field_str(&value, &["Tanque"]), Some("NAFTA".into()));
    }

    #[test]
    fn parse_any_prefers_json() {
        assert_eq!(parse_any(r#"[{"idTanque": 1}]"#).unwrap(), json!([{"idTanque": 1}]));
        assert_eq!(parse_any("   ").unwrap(), Value::Null);
        assert!(parse_any("<A>x</A>").unwrap()["A"].is_string());
        assert!(parse_any("not xml and not json").is_err());
    }

    #[test]
    fn pick_skips_missing_and_null_paths() {
        let v = json!({"FacturasVenta": null, "ArrayOfFacturasVenta": {"FacturasVenta": [1, 2]}});
        let found = pick(
            &v,
            &["root.FacturasVenta", "FacturasVenta", "ArrayOfFacturasVenta.FacturasVenta"],
        );
        assert_eq!(found, Some(&json!([1, 2])));
        assert!(pick(&v, &["missing.path"]).is_none());
    }

    #[test]
    fn field_guessing() {
        let v = json!({"idEstacion": "3", "nombre": "  Centro  ", "Vacio": ""});
        assert_eq!(field_i64(&v, &["IdEstacion", "idEstacion"]), Some(3));
        assert_eq!(field_str(&v, &["Vacio", "Nombre", "nombre"]), Some("Centro".into()));
        assert_eq!(field_f64(&json!({"x": "1,25"}), &["x"]), Some(1.25));
        assert!(field_str(&v, &["nope"]).is_none());
    }
}
