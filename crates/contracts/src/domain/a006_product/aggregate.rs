use serde::{Deserialize, Serialize};

/// Fila de `dim_producto`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub producto_id: i64,
    pub nombre: String,
    pub origen: Option<String>,
    pub categoria: Option<String>,
}

/// Articulo combustible (`articulos_combustibles`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelArticle {
    pub id_articulo: String,
    pub descripcion: String,
    pub es_combustible: bool,
    pub es_lubricante: bool,
    pub color: Option<String>,
}
