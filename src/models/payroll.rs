// src/models/payroll.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Como atribuir as vendas a um profissional.
///
/// `Transaction` soma as transações pagas pelo profissional da comanda.
/// `Item` soma as linhas das comandas pagas pelo profissional de cada item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CommissionBasis {
    #[default]
    Transaction,
    Item,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PayrollQuery {
    /// Mês no formato AAAA-MM (padrão: mês atual)
    pub month: Option<String>,
    pub basis: Option<CommissionBasis>,
}

/// Vendas brutas de um profissional no período (vem do banco).
#[derive(Debug, Clone, FromRow)]
pub struct ProfessionalSales {
    pub professional_id: Uuid,
    pub full_name: String,
    pub commission_rate: Decimal,
    pub gross_sales: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionLine {
    pub professional_id: Uuid,
    pub full_name: String,
    #[schema(example = "50.00")]
    pub commission_rate: Decimal,
    #[schema(example = "1000.00")]
    pub gross_sales: Decimal,
    #[schema(example = "500.00")]
    pub commission: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    #[schema(example = "2026-10")]
    pub month: String,
    pub basis: CommissionBasis,
    pub lines: Vec<CommissionLine>,
    pub total_gross: Decimal,
    pub total_commission: Decimal,
}
