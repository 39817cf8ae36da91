// src/db/studio_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::studio::{MemberRole, MyStudio, Studio, UpdateStudioPayload},
};

const STUDIO_COLUMNS: &str = "id, name, document_number, phone, address, created_at, updated_at";

#[derive(Clone)]
pub struct StudioRepository {
    pool: PgPool,
}

impl StudioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_studio<'e, E>(
        &self,
        executor: E,
        name: &str,
        document_number: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "INSERT INTO studios (name, document_number, phone, address) VALUES ($1, $2, $3, $4) RETURNING {STUDIO_COLUMNS}"
        );
        let studio = sqlx::query_as::<_, Studio>(&sql)
            .bind(name)
            .bind(document_number)
            .bind(phone)
            .bind(address)
            .fetch_one(executor)
            .await?;

        Ok(studio)
    }

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO studio_members (studio_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
            .bind(studio_id)
            .bind(user_id)
            .bind(role)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "membro do estúdio"))?;

        Ok(())
    }

    /// Verifica se o usuário já é dono de um estúdio com o mesmo nome.
    pub async fn owner_has_studio_named(&self, user_id: Uuid, name: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM studios s
                JOIN studio_members m ON m.studio_id = s.id
                WHERE m.user_id = $1 AND m.role = 'owner' AND lower(s.name) = lower($2)
            )
            "#,
        )
            .bind(user_id)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MyStudio>, AppError> {
        let studios = sqlx::query_as::<_, MyStudio>(
            r#"
            SELECT s.id, s.name, m.role
            FROM studios s
            JOIN studio_members m ON m.studio_id = s.id
            WHERE m.user_id = $1
            ORDER BY s.name ASC
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(studios)
    }

    /// Usado pelo guard de tenancy a cada requisição.
    pub async fn is_member(&self, user_id: Uuid, studio_id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM studio_members WHERE user_id = $1 AND studio_id = $2)",
        )
            .bind(user_id)
            .bind(studio_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    pub async fn get_studio<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {STUDIO_COLUMNS} FROM studios WHERE id = $1");
        sqlx::query_as::<_, Studio>(&sql)
            .bind(studio_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Estúdio {studio_id}")))
    }

    /// COALESCE mantém os valores atuais quando o campo não foi enviado.
    pub async fn update_studio<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &UpdateStudioPayload,
    ) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE studios SET
                name = COALESCE($2, name),
                document_number = COALESCE($3, document_number),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STUDIO_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Studio>(&sql)
            .bind(studio_id)
            .bind(payload.name.as_deref())
            .bind(payload.document_number.as_deref())
            .bind(payload.phone.as_deref())
            .bind(payload.address.as_deref())
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Estúdio {studio_id}")))
    }
}
