// src/db/command_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_error, AppError},
    models::command::{Command, CommandItem, CommandSettlement, CommandStatus, CommandSummary},
};

const COMMAND_COLUMNS: &str = "id, studio_id, client_id, professional_id, appointment_id, status, \
     total_amount, discount_amount, opened_at, closed_at";

const ITEM_COLUMNS: &str =
    "id, command_id, title, unit_price, quantity, product_id, service_id, professional_id, created_at";

/// Sem estado: cada método recebe o executor (conexão RLS ou transação).
#[derive(Clone, Default)]
pub struct CommandRepository;

/// Dados de um novo item de comanda.
#[derive(Debug, Clone)]
pub struct NewCommandItem<'a> {
    pub title: &'a str,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub product_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
}

impl CommandRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  COMANDAS
    // =========================================================================

    pub async fn create_command<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        client_id: Uuid,
        professional_id: Option<Uuid>,
        appointment_id: Option<Uuid>,
    ) -> Result<Command, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO commands (studio_id, client_id, professional_id, appointment_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMAND_COLUMNS}
            "#
        );
        let command = sqlx::query_as::<_, Command>(&sql)
            .bind(studio_id)
            .bind(client_id)
            .bind(professional_id)
            .bind(appointment_id)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "comanda"))?;

        Ok(command)
    }

    pub async fn list_commands<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        status: Option<CommandStatus>,
    ) -> Result<Vec<CommandSummary>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let commands = sqlx::query_as::<_, CommandSummary>(
            r#"
            SELECT
                c.id, c.studio_id, c.client_id, c.professional_id, c.appointment_id, c.status,
                c.total_amount, c.discount_amount, c.opened_at, c.closed_at,
                cl.full_name AS client_name
            FROM commands c
            JOIN clients cl ON cl.id = c.client_id
            WHERE c.studio_id = $1
              AND ($2::command_status IS NULL OR c.status = $2)
            ORDER BY c.opened_at DESC
            "#,
        )
            .bind(studio_id)
            .bind(status)
            .fetch_all(executor)
            .await?;

        Ok(commands)
    }

    pub async fn get_command_summary<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        command_id: Uuid,
    ) -> Result<CommandSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, CommandSummary>(
            r#"
            SELECT
                c.id, c.studio_id, c.client_id, c.professional_id, c.appointment_id, c.status,
                c.total_amount, c.discount_amount, c.opened_at, c.closed_at,
                cl.full_name AS client_name
            FROM commands c
            JOIN clients cl ON cl.id = c.client_id
            WHERE c.studio_id = $1 AND c.id = $2
            "#,
        )
            .bind(studio_id)
            .bind(command_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Comanda {command_id}")))
    }

    pub async fn get_command<'e, E>(&self, executor: E, studio_id: Uuid, command_id: Uuid) -> Result<Command, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COMMAND_COLUMNS} FROM commands WHERE studio_id = $1 AND id = $2");
        sqlx::query_as::<_, Command>(&sql)
            .bind(studio_id)
            .bind(command_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Comanda {command_id}")))
    }

    /// Igual a `get_command`, mas trava a linha até o fim da transação.
    /// Dois operadores fechando a mesma comanda ficam em fila aqui.
    pub async fn lock_command<'e, E>(&self, executor: E, studio_id: Uuid, command_id: Uuid) -> Result<Command, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {COMMAND_COLUMNS} FROM commands WHERE studio_id = $1 AND id = $2 FOR UPDATE");
        sqlx::query_as::<_, Command>(&sql)
            .bind(studio_id)
            .bind(command_id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Comanda {command_id}")))
    }

    /// Recalcula o total da comanda aberta a partir dos itens, numa única query.
    pub async fn recalculate_total<'e, E>(&self, executor: E, studio_id: Uuid, command_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar(
            r#"
            UPDATE commands
            SET total_amount = GREATEST(
                (
                    SELECT COALESCE(SUM(ROUND(quantity * unit_price, 2)), 0)
                    FROM command_items
                    WHERE command_items.command_id = commands.id
                ) - discount_amount,
                0
            )
            WHERE id = $1 AND studio_id = $2
            RETURNING total_amount
            "#,
        )
            .bind(command_id)
            .bind(studio_id)
            .fetch_one(executor)
            .await?;

        Ok(total)
    }

    /// Fecha a comanda. Só afeta comandas abertas; devolve `CommandNotOpen` caso contrário.
    pub async fn close_command<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        command_id: Uuid,
        total_amount: Decimal,
        discount_amount: Decimal,
    ) -> Result<Command, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE commands
            SET status = 'paid', closed_at = NOW(), total_amount = $3, discount_amount = $4
            WHERE studio_id = $1 AND id = $2 AND status = 'open'
            RETURNING {COMMAND_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Command>(&sql)
            .bind(studio_id)
            .bind(command_id)
            .bind(total_amount)
            .bind(discount_amount)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::CommandNotOpen(command_id))
    }

    // =========================================================================
    //  ITENS
    // =========================================================================

    pub async fn list_items<'e, E>(&self, executor: E, command_id: Uuid) -> Result<Vec<CommandItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM command_items WHERE command_id = $1 ORDER BY created_at ASC");
        let items = sqlx::query_as::<_, CommandItem>(&sql)
            .bind(command_id)
            .fetch_all(executor)
            .await?;

        Ok(items)
    }

    pub async fn add_item<'e, E>(&self, executor: E, command_id: Uuid, item: &NewCommandItem<'_>) -> Result<CommandItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO command_items (
                command_id, title, unit_price, quantity, product_id, service_id, professional_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#
        );
        let item = sqlx::query_as::<_, CommandItem>(&sql)
            .bind(command_id)
            .bind(item.title)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.product_id)
            .bind(item.service_id)
            .bind(item.professional_id)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "item da comanda"))?;

        Ok(item)
    }

    pub async fn remove_item<'e, E>(&self, executor: E, command_id: Uuid, item_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM command_items WHERE command_id = $1 AND id = $2")
            .bind(command_id)
            .bind(item_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ResourceNotFound(format!("Item {item_id}")));
        }
        Ok(())
    }

    // =========================================================================
    //  FECHAMENTO
    // =========================================================================

    pub async fn link_transaction<'e, E>(&self, executor: E, command_id: Uuid, transaction_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO command_transactions (command_id, transaction_id) VALUES ($1, $2)")
            .bind(command_id)
            .bind(transaction_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn find_settlement<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        idempotency_key: Uuid,
    ) -> Result<Option<CommandSettlement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settlement = sqlx::query_as::<_, CommandSettlement>(
            r#"
            SELECT studio_id, idempotency_key, command_id, total_amount, transaction_ids, created_at
            FROM command_settlements
            WHERE studio_id = $1 AND idempotency_key = $2
            "#,
        )
            .bind(studio_id)
            .bind(idempotency_key)
            .fetch_optional(executor)
            .await?;

        Ok(settlement)
    }

    pub async fn record_settlement<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        idempotency_key: Uuid,
        command_id: Uuid,
        total_amount: Decimal,
        transaction_ids: &[Uuid],
    ) -> Result<CommandSettlement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settlement = sqlx::query_as::<_, CommandSettlement>(
            r#"
            INSERT INTO command_settlements (studio_id, idempotency_key, command_id, total_amount, transaction_ids)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING studio_id, idempotency_key, command_id, total_amount, transaction_ids, created_at
            "#,
        )
            .bind(studio_id)
            .bind(idempotency_key)
            .bind(command_id)
            .bind(total_amount)
            .bind(transaction_ids)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_error(e, "chave de idempotência"))?;

        Ok(settlement)
    }
}
