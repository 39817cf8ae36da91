// src/models/finance.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,  // Entrada
    Expense, // Saída
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// Categoria usada nas entradas geradas pelo fechamento de comanda.
pub const CATEGORY_SERVICES: &str = "servicos";

// --- Structs ---

/// Registro durável de movimentação de dinheiro.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialTransaction {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[schema(example = "servicos")]
    pub category: String,
    #[schema(example = "Comanda #3f2a - pix")]
    pub description: String,
    /// Valor bruto
    #[schema(example = "150.00")]
    pub amount: Decimal,
    /// Valor líquido (depois da taxa)
    #[schema(example = "144.75")]
    pub net_amount: Decimal,
    /// Taxa (%) aplicada
    #[schema(example = "3.5")]
    pub tax_rate: Decimal,
    pub professional_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    #[schema(example = "paid")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Entradas do procedimento `register_payment` no banco.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRegistration {
    pub amount: Decimal,
    pub net_amount: Decimal,
    pub tax_rate: Decimal,
    pub description: String,
    pub transaction_type: TransactionType,
    pub category: String,
    pub studio_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

/// Lançamento manual (despesa do estúdio, entrada avulsa).
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualTransactionPayload {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[validate(length(min = 1, max = 60, message = "A categoria é obrigatória."))]
    #[schema(example = "aluguel")]
    pub category: String,
    #[validate(length(min = 1, max = 200, message = "A descrição é obrigatória."))]
    pub description: String,
    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,
    pub professional_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FinanceQuery {
    /// Mês no formato AAAA-MM (padrão: mês atual)
    pub month: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    #[schema(example = "2026-10")]
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    /// Taxas retidas pelas operadoras nas entradas
    pub fees: Decimal,
    /// Entradas líquidas menos saídas
    pub balance: Decimal,
    pub transaction_count: i64,
}
