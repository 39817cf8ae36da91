// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// --- Serviços (o que é agendado) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Escova progressiva")]
    pub name: String,
    #[schema(example = 90)]
    pub duration_minutes: i32,
    #[schema(example = "250.00")]
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServicePayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(range(min = 1, max = 1440, message = "Duração entre 1 e 1440 minutos."))]
    pub duration_minutes: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

// --- Produtos (estoque / revenda) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Shampoo 300ml")]
    pub name: String,
    #[schema(example = "SHP-300")]
    pub sku: Option<String>,
    #[schema(example = "59.90")]
    pub sale_price: Decimal,
    #[schema(example = "25.00")]
    pub cost_price: Decimal,
    #[schema(example = "12")]
    pub stock_quantity: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,
    pub sku: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub sale_price: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub cost_price: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub stock_quantity: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Entrada (positivo) ou baixa manual (negativo) de estoque.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentPayload {
    #[validate(custom(function = "validate_not_zero"))]
    #[schema(example = "-2")]
    pub delta: Decimal,
    #[schema(example = "Produto avariado")]
    pub reason: Option<String>,
}

// --- Recursos (salas, cadeiras, equipamentos) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Cadeira 2")]
    pub name: String,
    #[schema(example = "chair")]
    pub kind: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    #[validate(length(min = 1, max = 120, message = "O nome é obrigatório."))]
    pub name: String,
    pub kind: Option<String>,
}

fn validate_not_zero(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("O ajuste não pode ser zero.".into());
        return Err(err);
    }
    Ok(())
}

fn default_active() -> bool {
    true
}
