// src/services/payment_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PaymentRepository,
    models::payment::{ensure_kind_change_allowed, PaymentMethod, PaymentMethodPayload},
};

#[derive(Clone)]
pub struct PaymentService {
    repo: PaymentRepository,
}

impl PaymentService {
    pub fn new(repo: PaymentRepository) -> Self {
        Self { repo }
    }

    /// Edita a forma de pagamento. A troca de tipo só passa sem taxas cadastradas.
    pub async fn update_method<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        method_id: Uuid,
        payload: &PaymentMethodPayload,
    ) -> Result<PaymentMethod, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self.repo.lock_method(&mut *tx, studio_id, method_id).await?;
        if current.kind != payload.kind {
            let rate_count = self.repo.count_rates(&mut *tx, studio_id, method_id).await?;
            if let Err(e) = ensure_kind_change_allowed(&current, payload.kind, rate_count) {
                tracing::warn!(%method_id, rate_count, "Troca de tipo recusada: forma de pagamento possui taxas");
                return Err(e);
            }
        }

        let updated = self.repo.update_method(&mut *tx, studio_id, method_id, payload).await?;
        tx.commit().await?;
        Ok(updated)
    }
}
