// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::catalog::{Product, ProductPayload, Resource, ResourcePayload, Service, ServicePayload},
};

const SERVICE_COLUMNS: &str = "id, studio_id, name, duration_minutes, price, is_active, created_at";
const PRODUCT_COLUMNS: &str =
    "id, studio_id, name, sku, sale_price, cost_price, stock_quantity, is_active, created_at";

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &ServicePayload,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO services (studio_id, name, duration_minutes, price, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        let service = sqlx::query_as::<_, Service>(&sql)
            .bind(studio_id)
            .bind(&payload.name)
            .bind(payload.duration_minutes)
            .bind(payload.price)
            .bind(payload.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "serviço"))?;

        Ok(service)
    }

    pub async fn list_services<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE studio_id = $1 ORDER BY name ASC");
        let services = sqlx::query_as::<_, Service>(&sql)
            .bind(studio_id)
            .fetch_all(executor)
            .await?;

        Ok(services)
    }

    pub async fn get_service<'e, E>(&self, executor: E, studio_id: Uuid, service_id: Uuid) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE studio_id = $1 AND id = $2");
        sqlx::query_as::<_, Service>(&sql)
            .bind(studio_id)
            .bind(service_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Serviço {service_id}")))
    }

    pub async fn update_service<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        service_id: Uuid,
        payload: &ServicePayload,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE services SET name = $3, duration_minutes = $4, price = $5, is_active = $6
            WHERE studio_id = $1 AND id = $2
            RETURNING {SERVICE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Service>(&sql)
            .bind(studio_id)
            .bind(service_id)
            .bind(&payload.name)
            .bind(payload.duration_minutes)
            .bind(payload.price)
            .bind(payload.is_active)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_constraint_error(e, "serviço"))?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Serviço {service_id}")))
    }

    pub async fn delete_service<'e, E>(&self, executor: E, studio_id: Uuid, service_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM services WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(service_id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "serviço"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Serviço {service_id}")));
        }
        Ok(())
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO products (studio_id, name, sku, sale_price, cost_price, stock_quantity, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(studio_id)
            .bind(&payload.name)
            .bind(payload.sku.as_deref())
            .bind(payload.sale_price)
            .bind(payload.cost_price)
            .bind(payload.stock_quantity)
            .bind(payload.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "produto (SKU)"))?;

        Ok(product)
    }

    pub async fn list_products<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE studio_id = $1 ORDER BY name ASC");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(studio_id)
            .fetch_all(executor)
            .await?;

        Ok(products)
    }

    pub async fn get_product<'e, E>(&self, executor: E, studio_id: Uuid, product_id: Uuid) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE studio_id = $1 AND id = $2");
        sqlx::query_as::<_, Product>(&sql)
            .bind(studio_id)
            .bind(product_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Produto {product_id}")))
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        product_id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O estoque não é sobrescrito aqui; só muda por ajuste ou venda.
        let sql = format!(
            r#"
            UPDATE products SET name = $3, sku = $4, sale_price = $5, cost_price = $6, is_active = $7
            WHERE studio_id = $1 AND id = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(studio_id)
            .bind(product_id)
            .bind(&payload.name)
            .bind(payload.sku.as_deref())
            .bind(payload.sale_price)
            .bind(payload.cost_price)
            .bind(payload.is_active)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_constraint_error(e, "produto (SKU)"))?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Produto {product_id}")))
    }

    pub async fn delete_product<'e, E>(&self, executor: E, studio_id: Uuid, product_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(product_id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "produto"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Produto {product_id}")));
        }
        Ok(())
    }

    /// Soma `delta` ao estoque sem deixá-lo negativo. Serve para o ajuste manual
    /// (delta positivo ou negativo) e para a baixa no fechamento da comanda.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        product_id: Uuid,
        delta: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE products SET stock_quantity = stock_quantity + $3
            WHERE studio_id = $1 AND id = $2 AND stock_quantity + $3 >= 0
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(studio_id)
            .bind(product_id)
            .bind(delta)
            .fetch_optional(executor)
            .await?
            // Sem linha: ou o produto não existe, ou o estoque ficaria negativo.
            .ok_or(AppError::InsufficientStock(product_id))
    }

    // =========================================================================
    //  RECURSOS
    // =========================================================================

    pub async fn create_resource<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &ResourcePayload,
    ) -> Result<Resource, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (studio_id, name, kind)
            VALUES ($1, $2, $3)
            RETURNING id, studio_id, name, kind, created_at
            "#,
        )
            .bind(studio_id)
            .bind(&payload.name)
            .bind(payload.kind.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "recurso"))?;

        Ok(resource)
    }

    pub async fn list_resources<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Vec<Resource>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT id, studio_id, name, kind, created_at FROM resources WHERE studio_id = $1 ORDER BY name ASC",
        )
            .bind(studio_id)
            .fetch_all(executor)
            .await?;

        Ok(resources)
    }

    pub async fn delete_resource<'e, E>(&self, executor: E, studio_id: Uuid, resource_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM resources WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(resource_id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "recurso"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Recurso {resource_id}")));
        }
        Ok(())
    }
}
