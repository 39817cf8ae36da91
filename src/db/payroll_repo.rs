// src/db/payroll_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::payroll::ProfessionalSales};

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct PayrollRepository;

impl PayrollRepository {
    pub fn new() -> Self {
        Self
    }

    /// Vendas por profissional a partir das transações pagas do mês.
    /// Profissionais sem venda aparecem com zero.
    pub async fn sales_by_transaction<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProfessionalSales>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, ProfessionalSales>(
            r#"
            SELECT
                p.id AS professional_id,
                p.full_name,
                p.commission_rate,
                COALESCE(SUM(t.amount), 0) AS gross_sales
            FROM professionals p
            LEFT JOIN financial_transactions t
                ON t.professional_id = p.id
               AND t.studio_id = p.studio_id
               AND t.type = 'income'
               AND t.status = 'paid'
               AND t.created_at >= $2 AND t.created_at < $3
            WHERE p.studio_id = $1
            GROUP BY p.id, p.full_name, p.commission_rate
            ORDER BY p.full_name ASC
            "#,
        )
            .bind(studio_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

        Ok(sales)
    }

    /// Vendas por profissional a partir dos itens das comandas pagas no mês,
    /// usando o profissional de cada item.
    pub async fn sales_by_item<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProfessionalSales>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sales = sqlx::query_as::<_, ProfessionalSales>(
            r#"
            SELECT
                p.id AS professional_id,
                p.full_name,
                p.commission_rate,
                COALESCE(SUM(ROUND(i.quantity * i.unit_price, 2)) FILTER (WHERE c.id IS NOT NULL), 0) AS gross_sales
            FROM professionals p
            LEFT JOIN command_items i ON i.professional_id = p.id
            LEFT JOIN commands c
                ON c.id = i.command_id
               AND c.studio_id = p.studio_id
               AND c.status = 'paid'
               AND c.closed_at >= $2 AND c.closed_at < $3
            WHERE p.studio_id = $1
            GROUP BY p.id, p.full_name, p.commission_rate
            ORDER BY p.full_name ASC
            "#,
        )
            .bind(studio_id)
            .bind(start)
            .bind(end)
            .fetch_all(executor)
            .await?;

        Ok(sales)
    }
}
