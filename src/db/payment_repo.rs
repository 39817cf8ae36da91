// src/db/payment_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::payment::{
        normalize_brand, PaymentMethod, PaymentMethodKind, PaymentMethodPayload, PaymentRate,
        PaymentRatePayload,
    },
};

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    // --- Formas de pagamento ---

    pub async fn create_method<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &PaymentMethodPayload,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let method = sqlx::query_as::<_, PaymentMethod>(
            r#"
            INSERT INTO payment_methods (studio_id, name, kind, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, studio_id, name, kind, is_active, created_at
            "#,
        )
            .bind(studio_id)
            .bind(payload.name.trim())
            .bind(payload.kind)
            .bind(payload.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "forma de pagamento"))?;

        Ok(method)
    }

    pub async fn list_methods<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Vec<PaymentMethod>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let methods = sqlx::query_as::<_, PaymentMethod>(
            r#"
            SELECT id, studio_id, name, kind, is_active, created_at
            FROM payment_methods
            WHERE studio_id = $1
            ORDER BY name ASC
            "#,
        )
            .bind(studio_id)
            .fetch_all(executor)
            .await?;

        Ok(methods)
    }

    pub async fn get_method<'e, E>(&self, executor: E, studio_id: Uuid, method_id: Uuid) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentMethod>(
            "SELECT id, studio_id, name, kind, is_active, created_at FROM payment_methods WHERE studio_id = $1 AND id = $2",
        )
            .bind(studio_id)
            .bind(method_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Forma de pagamento {method_id}")))
    }

    /// Trava a forma de pagamento até o fim da transação.
    pub async fn lock_method<'e, E>(&self, executor: E, studio_id: Uuid, method_id: Uuid) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentMethod>(
            r#"
            SELECT id, studio_id, name, kind, is_active, created_at
            FROM payment_methods
            WHERE studio_id = $1 AND id = $2
            FOR UPDATE
            "#,
        )
            .bind(studio_id)
            .bind(method_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Forma de pagamento {method_id}")))
    }

    pub async fn count_rates<'e, E>(&self, executor: E, studio_id: Uuid, method_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payment_rates WHERE studio_id = $1 AND payment_method_id = $2",
        )
            .bind(studio_id)
            .bind(method_id)
            .fetch_one(executor)
            .await?;

        Ok(count)
    }

    pub async fn update_method<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        method_id: Uuid,
        payload: &PaymentMethodPayload,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PaymentMethod>(
            r#"
            UPDATE payment_methods
            SET name = $3, kind = $4, is_active = $5
            WHERE studio_id = $1 AND id = $2
            RETURNING id, studio_id, name, kind, is_active, created_at
            "#,
        )
            .bind(studio_id)
            .bind(method_id)
            .bind(payload.name.trim())
            .bind(payload.kind)
            .bind(payload.is_active)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_constraint_error(e, "forma de pagamento"))?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Forma de pagamento {method_id}")))
    }

    pub async fn delete_method<'e, E>(&self, executor: E, studio_id: Uuid, method_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM payment_methods WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(method_id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "forma de pagamento"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Forma de pagamento {method_id}")));
        }
        Ok(())
    }

    // --- Taxas ---

    /// Cadastra uma taxa. O tipo vem da forma de pagamento; a bandeira é gravada normalizada.
    pub async fn create_rate<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        kind: PaymentMethodKind,
        payload: &PaymentRatePayload,
    ) -> Result<PaymentRate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Débito e pix não usam parcelas; crédito sem parcelas vale como 1x
        let installments = match kind {
            PaymentMethodKind::CartaoCredito => Some(payload.installments.unwrap_or(1)),
            _ => None,
        };
        let brand = if kind.is_card() {
            normalize_brand(payload.brand.as_deref())
        } else {
            None
        };
        if kind.is_card() && brand.is_none() {
            return Err(AppError::InvalidPayment("bandeira do cartão é obrigatória".into()));
        }

        let rate = sqlx::query_as::<_, PaymentRate>(
            r#"
            INSERT INTO payment_rates (studio_id, payment_method_id, kind, brand, installments, fee_percentage)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, studio_id, payment_method_id, kind, brand, installments, fee_percentage, created_at
            "#,
        )
            .bind(studio_id)
            .bind(payload.payment_method_id)
            .bind(kind)
            .bind(brand)
            .bind(installments)
            .bind(payload.fee_percentage)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "taxa"))?;

        Ok(rate)
    }

    /// Tabela de taxas das formas de pagamento ativas do estúdio.
    pub async fn list_rates<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Vec<PaymentRate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rates = sqlx::query_as::<_, PaymentRate>(
            r#"
            SELECT r.id, r.studio_id, r.payment_method_id, r.kind, r.brand, r.installments,
                   r.fee_percentage, r.created_at
            FROM payment_rates r
            JOIN payment_methods m ON m.id = r.payment_method_id
            WHERE r.studio_id = $1 AND m.is_active = TRUE
            ORDER BY r.kind, r.brand NULLS FIRST, r.installments NULLS FIRST
            "#,
        )
            .bind(studio_id)
            .fetch_all(executor)
            .await?;

        Ok(rates)
    }

    pub async fn delete_rate<'e, E>(&self, executor: E, studio_id: Uuid, rate_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM payment_rates WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(rate_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Taxa {rate_id}")));
        }
        Ok(())
    }
}
