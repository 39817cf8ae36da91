// src/db/client_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::client::{Client, ClientPayload},
};

const CLIENT_COLUMNS: &str =
    "id, studio_id, full_name, phone, email, birth_date, notes, created_at, updated_at";

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (studio_id, full_name, phone, email, birth_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(studio_id)
            .bind(&payload.full_name)
            .bind(payload.phone.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.birth_date)
            .bind(payload.notes.as_deref())
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "cliente"))?;

        Ok(client)
    }

    /// Lista os clientes; `search` filtra por nome ou telefone (ILIKE).
    pub async fn list_clients<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        search: Option<&str>,
    ) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let sql = format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE studio_id = $1
              AND ($2::text IS NULL OR full_name ILIKE $2 OR phone ILIKE $2)
            ORDER BY full_name ASC
            "#
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(studio_id)
            .bind(pattern)
            .fetch_all(executor)
            .await?;

        Ok(clients)
    }

    pub async fn get_client<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        client_id: Uuid,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE studio_id = $1 AND id = $2");
        sqlx::query_as::<_, Client>(&sql)
            .bind(studio_id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Cliente {client_id}")))
    }

    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        client_id: Uuid,
        payload: &ClientPayload,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients SET
                full_name = $3, phone = $4, email = $5, birth_date = $6, notes = $7,
                updated_at = NOW()
            WHERE studio_id = $1 AND id = $2
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Client>(&sql)
            .bind(studio_id)
            .bind(client_id)
            .bind(&payload.full_name)
            .bind(payload.phone.as_deref())
            .bind(payload.email.as_deref())
            .bind(payload.birth_date)
            .bind(payload.notes.as_deref())
            .fetch_optional(executor)
            .await
            .map_err(|e| map_constraint_error(e, "cliente"))?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Cliente {client_id}")))
    }

    pub async fn delete_client<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(client_id)
            .execute(executor)
            .await
            .map_err(|e| map_constraint_error(e, "cliente"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Cliente {client_id}")));
        }
        Ok(())
    }
}
