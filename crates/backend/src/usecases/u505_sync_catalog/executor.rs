use anyhow::Result;
use contracts::domain::a006_product::aggregate::Product;
use contracts::usecases::u505_sync_catalog::{CatalogSyncResult, RecategorizeResult};
use serde_json::Value;

use crate::domain::a006_product::{repository, service};
use crate::shared::station_api::StationApiClient;
use crate::shared::xml::{as_list, pick};

/// Executor для синхронизации справочника артикулов (u505)
#[derive(Default)]
pub struct SyncCatalogExecutor;

fn articles(doc: &Value) -> Vec<&Value> {
    match doc {
        Value::Array(_) => as_list(doc),
        _ => pick(doc, &["ArrayOfArticulo.Articulo", "Articulos.Articulo"])
            .map(as_list)
            .unwrap_or_default(),
    }
}

impl SyncCatalogExecutor {
    pub fn new() -> Self {
        Self
    }

    /// `Articulos/GetAllCombustibles` → `articulos_combustibles`
    pub async fn sync_fuels(&self) -> Result<CatalogSyncResult> {
        let client = StationApiClient::from_config()?;
        let doc = client.get_document("Articulos/GetAllCombustibles", &[]).await?;
        let items = articles(&doc);

        let mut result = CatalogSyncResult {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            let Some(article) = service::fuel_from_article(item) else {
                continue;
            };
            match repository::insert_fuel_article(&article).await {
                Ok(true) => result.guardados += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Fuel article {} failed: {:#}", article.id_articulo, e);
                    result
                        .errores
                        .push(format!("{}: {}", article.id_articulo, e));
                }
            }
        }
        result.mensaje = format!("Combustibles guardados: {}", result.guardados);
        tracing::info!("{}", result.mensaje);
        Ok(result)
    }

    /// `Articulos/GetAllArticulos` → `dim_producto`
    pub async fn sync_products(&self) -> Result<CatalogSyncResult> {
        let client = StationApiClient::from_config()?;
        let doc = client.get_document("Articulos/GetAllArticulos", &[]).await?;
        let items = articles(&doc);

        let mut result = CatalogSyncResult {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            let Some(product) = service::product_from_article(item) else {
                tracing::warn!("Article without IdArticulo skipped");
                continue;
            };
            match repository::insert_product(&product).await {
                Ok(true) => result.guardados += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Product {} failed: {:#}", product.producto_id, e);
                    result
                        .errores
                        .push(format!("{}: {}", product.producto_id, e));
                }
            }
        }
        result.mensaje = format!("Productos guardados: {}", result.guardados);
        tracing::info!("{}", result.mensaje);
        Ok(result)
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        repository::list_products().await
    }

    /// Applies the category rules to every stored product
    pub async fn recategorize(&self) -> Result<RecategorizeResult> {
        let products = repository::list_products().await?;
        let mut result = RecategorizeResult::default();
        for product in &products {
            let categoria = service::categorize_product(product.producto_id, &product.nombre);
            if product.categoria.as_deref() == Some(categoria) {
                continue;
            }
            repository::update_category(product.producto_id, categoria).await?;
            result.actualizados += 1;
        }
        tracing::info!("Products recategorized: {}", result.actualizados);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::xml::xml_to_value;
    use serde_json::json;

    #[test]
    fn articles_from_xml_and_json() {
        let xml = xml_to_value(
            "<ArrayOfArticulo><Articulo><IdArticulo>1</IdArticulo></Articulo>\
             <Articulo><IdArticulo>2</IdArticulo></Articulo></ArrayOfArticulo>",
        )
        .unwrap();
        assert_eq!(articles(&xml).len(), 2);

        let json = json!([{"IdArticulo": 1}]);
        assert_eq!(articles(&json).len(), 1);

        let wrapped = json!({"Articulos": {"Articulo": {"IdArticulo": 9}}});
        assert_eq!(articles(&wrapped).len(), 1);
    }
}
