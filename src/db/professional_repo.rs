// src/db/professional_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::professional::{Professional, ProfessionalPayload},
};

const PROFESSIONAL_COLUMNS: &str =
    "id, studio_id, full_name, phone, email, commission_rate, is_active, created_at, updated_at";

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct ProfessionalRepository;

impl ProfessionalRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_professional<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &ProfessionalPayload,
    ) -> Result<Professional, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO professionals (studio_id, full_name, phone, email, commission_rate, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROFESSIONAL_COLUMNS}
            "#
        );
        let professional = sqlx::query_as::<_, Professional>(&sql)
            .bind(studio_id)
            .bind(&payload.full_name)
            .bind(payload.phone.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.commission_rate)
            .bind(payload.is_active)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "profissional"))?;

        Ok(professional)
    }

    pub async fn list_professionals<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
    ) -> Result<Vec<Professional>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {PROFESSIONAL_COLUMNS} FROM professionals WHERE studio_id = $1 ORDER BY full_name ASC"
        );
        let professionals = sqlx::query_as::<_, Professional>(&sql)
            .bind(studio_id)
            .fetch_all(executor)
            .await?;

        Ok(professionals)
    }

    pub async fn update_professional<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        professional_id: Uuid,
        payload: &ProfessionalPayload,
    ) -> Result<Professional, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE professionals SET
                full_name = $3, phone = $4, email = $5, commission_rate = $6, is_active = $7,
                updated_at = NOW()
            WHERE studio_id = $1 AND id = $2
            RETURNING {PROFESSIONAL_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Professional>(&sql)
            .bind(studio_id)
            .bind(professional_id)
            .bind(&payload.full_name)
            .bind(payload.phone.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.commission_rate)
            .bind(payload.is_active)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Profissional {professional_id}")))
    }

    pub async fn delete_professional<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        professional_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM professionals WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(professional_id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "profissional"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Profissional {professional_id}")));
        }
        Ok(())
    }
}
