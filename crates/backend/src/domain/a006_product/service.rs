use contracts::domain::a006_product::aggregate::{FuelArticle, Product};
use serde_json::Value;

use crate::shared::numbers::truthy;
use crate::shared::xml::{field_i64, field_str};

/// Reporting category from product id and name. First matching rule wins.
pub fn categorize_product(producto_id: i64, nombre: &str) -> &'static str {
    let nombre = nombre.to_uppercase();
    let has_any = |words: &[&str]| words.iter().any(|w| nombre.contains(w));

    if producto_id == 8 || has_any(&["SHOP"]) {
        "SHOP"
    } else if has_any(&["GOLOSINA", "BEBIDA"]) {
        "GOLOSINAS"
    } else if has_any(&["GNC"]) {
        "GNC"
    } else if has_any(&["SUPER", "INFINIA", "DIESEL", "ULTRA", "PREMIUM", "NAFTA"]) {
        "COMBUSTIBLES"
    } else if has_any(&["LUBRI"]) {
        "LUBRICANTES"
    } else if has_any(&["ADBLUE"]) {
        "ADBLUE"
    } else if has_any(&["SPOT", "BAR", "FOOD"]) {
        "SPOT"
    } else {
        "OTROS"
    }
}

/// `(origen, categoria)` for an article of the vendor catalog.
/// Later rules override earlier ones.
pub fn classify_article(nombre: &str, es_combustible: bool, es_lubricante: bool) -> (&'static str, &'static str) {
    let upper = nombre.to_uppercase();
    let mut origen = "Playa";
    let mut categoria = "OTROS";

    if es_combustible {
        categoria = "LIQUIDOS";
    }
    if es_lubricante {
        categoria = "LUBRICANTES";
    }
    if upper.contains("GNC") {
        categoria = "GNC";
    }
    if ["SHOP", "GOLOSINAS", "BEBIDAS"].iter().any(|w| upper.contains(w)) {
        origen = "Shop";
    }
    (origen, categoria)
}

/// `dim_producto` row from an `Articulos/GetAllArticulos` item
pub fn product_from_article(art: &Value) -> Option<Product> {
    let producto_id = field_i64(art, &["IdArticulo", "idArticulo"])?;
    let nombre = field_str(art, &["Descripcion", "descripcion"])
        .unwrap_or_else(|| "Sin nombre".to_string());
    let (origen, categoria) = classify_article(
        &nombre,
        truthy(art.get("EsCombustible")),
        truthy(art.get("EsLubricante")),
    );
    Some(Product {
        producto_id,
        nombre,
        origen: Some(origen.to_string()),
        categoria: Some(categoria.to_string()),
    })
}

/// `articulos_combustibles` row from an `Articulos/GetAllCombustibles` item
pub fn fuel_from_article(art: &Value) -> Option<FuelArticle> {
    let id_articulo = field_str(art, &["IdArticulo", "idArticulo"])?;
    Some(FuelArticle {
        id_articulo,
        descripcion: field_str(art, &["Descripcion", "descripcion"]).unwrap_or_default(),
        es_combustible: truthy(art.get("EsCombustible")),
        es_lubricante: truthy(art.get("EsLubricante")),
        color: field_str(art, &["ColorARGB", "Color"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_categories_follow_rule_order() {
        assert_eq!(categorize_product(8, "Cualquier cosa"), "SHOP");
        assert_eq!(categorize_product(1, "Bebidas Shop"), "SHOP");
        assert_eq!(categorize_product(1, "GOLOSINAS VARIAS"), "GOLOSINAS");
        assert_eq!(categorize_product(1, "gnc"), "GNC");
        assert_eq!(categorize_product(1, "INFINIA DIESEL"), "COMBUSTIBLES");
        assert_eq!(categorize_product(1, "Lubricantes Elaion"), "LUBRICANTES");
        assert_eq!(categorize_product(1, "AdBlue 20L"), "ADBLUE");
        assert_eq!(categorize_product(1, "Spot Cafe"), "SPOT");
        assert_eq!(categorize_product(1, "Lavado"), "OTROS");
    }

    #[test]
    fn article_classification() {
        assert_eq!(classify_article("NAFTA SUPER", true, false), ("Playa", "LIQUIDOS"));
        assert_eq!(classify_article("ELAION", false, true), ("Playa", "LUBRICANTES"));
        assert_eq!(classify_article("GNC", true, false), ("Playa", "GNC"));
        assert_eq!(classify_article("BEBIDAS FRIAS", false, false), ("Shop", "OTROS"));
    }

    #[test]
    fn maps_vendor_articles() {
        let art = json!({"IdArticulo": "12", "Descripcion": "", "EsCombustible": "true"});
        let product = product_from_article(&art).unwrap();
        assert_eq!(product.producto_id, 12);
        assert_eq!(product.nombre, "Sin nombre");
        assert_eq!(product.categoria.as_deref(), Some("LIQUIDOS"));

        assert!(product_from_article(&json!({"Descripcion": "x"})).is_none());

        let fuel = fuel_from_article(&json!({
            "IdArticulo": "3", "Descripcion": "DIESEL X10",
            "EsCombustible": "true", "EsLubricante": "false", "ColorARGB": "-16776961"
        }))
        .unwrap();
        assert!(fuel.es_combustible);
        assert!(!fuel.es_lubricante);
        assert_eq!(fuel.color.as_deref(), Some("-16776961"));
    }
}
