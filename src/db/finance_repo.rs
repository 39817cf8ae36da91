// src/db/finance_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{FinancialTransaction, PaymentRegistration, TransactionType},
};

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct FinanceRepository;

/// Totais brutos do mês, antes de montar o `FinanceSummary`.
#[derive(Debug, Clone, FromRow)]
pub struct FinanceTotals {
    pub income: Decimal,
    pub income_net: Decimal,
    pub expense: Decimal,
    pub transaction_count: i64,
}

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    /// Chama o procedimento `register_payment`, que grava a transação e devolve o id.
    pub async fn register_payment<'e, E>(&self, executor: E, reg: &PaymentRegistration) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id: Uuid = sqlx::query_scalar(
            r#"
            SELECT register_payment(
                p_amount => $1,
                p_net_amount => $2,
                p_tax_rate => $3,
                p_description => $4,
                p_type => $5,
                p_category => $6,
                p_studio_id => $7,
                p_professional_id => $8,
                p_client_id => $9,
                p_payment_method_id => $10
            )
            "#,
        )
            .bind(reg.amount)
            .bind(reg.net_amount)
            .bind(reg.tax_rate)
            .bind(&reg.description)
            .bind(reg.transaction_type)
            .bind(&reg.category)
            .bind(reg.studio_id)
            .bind(reg.professional_id)
            .bind(reg.client_id)
            .bind(reg.payment_method_id)
            .fetch_one(executor)
            .await?;

        Ok(id)
    }

    pub async fn get_transaction<'e, E>(&self, executor: E, studio_id: Uuid, id: Uuid) -> Result<FinancialTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, FinancialTransaction>(
            r#"
            SELECT id, studio_id, type, category, description, amount, net_amount, tax_rate,
                   professional_id, client_id, payment_method_id, status, created_at
            FROM financial_transactions
            WHERE studio_id = $1 AND id = $2
            "#,
        )
            .bind(studio_id)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Transação {id}")))
    }

    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<FinancialTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transactions = sqlx::query_as::<_, FinancialTransaction>(
            r#"
            SELECT id, studio_id, type, category, description, amount, net_amount, tax_rate,
                   professional_id, client_id, payment_method_id, status, created_at
            FROM financial_transactions
            WHERE studio_id = $1
              AND created_at >= $2 AND created_at < $3
              AND ($4::transaction_type IS NULL OR type = $4)
            ORDER BY created_at DESC
            "#,
        )
            .bind(studio_id)
            .bind(start)
            .bind(end)
            .bind(transaction_type)
            .fetch_all(executor)
            .await?;

        Ok(transactions)
    }

    pub async fn month_totals<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<FinanceTotals, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = sqlx::query_as::<_, FinanceTotals>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE type = 'income'), 0)     AS income,
                COALESCE(SUM(net_amount) FILTER (WHERE type = 'income'), 0) AS income_net,
                COALESCE(SUM(amount) FILTER (WHERE type = 'expense'), 0)    AS expense,
                COUNT(*)                                                    AS transaction_count
            FROM financial_transactions
            WHERE studio_id = $1
              AND status = 'paid'
              AND created_at >= $2 AND created_at < $3
            "#,
        )
            .bind(studio_id)
            .bind(start)
            .bind(end)
            .fetch_one(executor)
            .await?;

        Ok(totals)
    }
}
