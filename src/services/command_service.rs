// src/services/command_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::{command_repo::NewCommandItem, CatalogRepository, CommandRepository},
    models::{
        checkout::subtotal_of,
        command::{AddItemPayload, Command, CommandDetail, CommandStatus, CommandSummary, OpenCommandPayload},
    },
    services::agenda_service::AgendaService,
};

#[derive(Clone)]
pub struct CommandService {
    command_repo: CommandRepository,
    agenda_service: AgendaService,
    catalog_repo: CatalogRepository,
}

fn field_error(field: &'static str, code: &'static str, message: &'static str) -> AppError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    AppError::ValidationError(errors)
}

/// Comanda paga não aceita mais alterações.
pub fn ensure_open(command: &Command) -> Result<(), AppError> {
    match command.status {
        CommandStatus::Open => Ok(()),
        CommandStatus::Paid => Err(AppError::CommandNotOpen(command.id)),
    }
}

impl CommandService {
    pub fn new(command_repo: CommandRepository, agenda_service: AgendaService, catalog_repo: CatalogRepository) -> Self {
        Self { command_repo, agenda_service, catalog_repo }
    }

    pub async fn open_command<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &OpenCommandPayload,
    ) -> Result<CommandDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let command = match payload.appointment_id {
            Some(appointment_id) => {
                let appointment = self.agenda_service
                    .get_appointment(&mut *tx, studio_id, appointment_id)
                    .await?;
                let service = self.catalog_repo
                    .get_service(&mut *tx, studio_id, appointment.service_id)
                    .await?;

                let command = self.command_repo
                    .create_command(
                        &mut *tx,
                        studio_id,
                        appointment.client_id,
                        Some(appointment.professional_id),
                        Some(appointment.id),
                    )
                    .await?;

                // O serviço agendado vira o primeiro item
                let item = NewCommandItem {
                    title: &service.name,
                    unit_price: service.price,
                    quantity: Decimal::ONE,
                    product_id: None,
                    service_id: Some(service.id),
                    professional_id: Some(appointment.professional_id),
                };
                self.command_repo.add_item(&mut *tx, command.id, &item).await?;
                self.command_repo.recalculate_total(&mut *tx, studio_id, command.id).await?;
                command
            }
            None => {
                let client_id = payload
                    .client_id
                    .ok_or_else(|| field_error("clientId", "required", "Informe o cliente ou o agendamento."))?;

                self.command_repo
                    .create_command(&mut *tx, studio_id, client_id, payload.professional_id, None)
                    .await?
            }
        };

        let detail = self.load_detail(&mut tx, studio_id, command.id).await?;
        tx.commit().await?;

        tracing::info!(command_id = %command.id, studio_id = %studio_id, "Comanda aberta");
        Ok(detail)
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
        self.command_repo.list_commands(executor, studio_id, status).await
    }

    pub async fn get_detail(&self, conn: &mut PgConnection, studio_id: Uuid, command_id: Uuid) -> Result<CommandDetail, AppError> {
        self.load_detail(conn, studio_id, command_id).await
    }

    pub async fn add_item<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        command_id: Uuid,
        payload: &AddItemPayload,
    ) -> Result<CommandDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let command = self.command_repo.lock_command(&mut *tx, studio_id, command_id).await?;
        ensure_open(&command)?;

        // Título e preço vêm do catálogo quando o item referencia um serviço ou produto
        let (title, unit_price) = match (payload.service_id, payload.product_id) {
            (Some(_), Some(_)) => {
                return Err(field_error("serviceId", "exclusive", "Informe serviço ou produto, não ambos."));
            }
            (Some(service_id), None) => {
                let service = self.catalog_repo.get_service(&mut *tx, studio_id, service_id).await?;
                (payload.title.clone().unwrap_or(service.name), payload.unit_price.unwrap_or(service.price))
            }
            (None, Some(product_id)) => {
                let product = self.catalog_repo.get_product(&mut *tx, studio_id, product_id).await?;
                (payload.title.clone().unwrap_or(product.name), payload.unit_price.unwrap_or(product.sale_price))
            }
            (None, None) => {
                let title = payload
                    .title
                    .clone()
                    .ok_or_else(|| field_error("title", "required", "Item avulso precisa de título."))?;
                let price = payload
                    .unit_price
                    .ok_or_else(|| field_error("unitPrice", "required", "Item avulso precisa de preço."))?;
                (title, price)
            }
        };

        if unit_price.is_sign_negative() {
            return Err(field_error("unitPrice", "range", "O preço não pode ser negativo."));
        }

        let item = NewCommandItem {
            title: title.trim(),
            unit_price,
            quantity: payload.quantity,
            product_id: payload.product_id,
            service_id: payload.service_id,
            // Sem profissional no item, vale o profissional da comanda
            professional_id: payload.professional_id.or(command.professional_id),
        };
        self.command_repo.add_item(&mut *tx, command.id, &item).await?;
        self.command_repo.recalculate_total(&mut *tx, studio_id, command.id).await?;

        let detail = self.load_detail(&mut tx, studio_id, command.id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    pub async fn remove_item<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        command_id: Uuid,
        item_id: Uuid,
    ) -> Result<CommandDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let command = self.command_repo.lock_command(&mut *tx, studio_id, command_id).await?;
        ensure_open(&command)?;

        self.command_repo.remove_item(&mut *tx, command.id, item_id).await?;
        self.command_repo.recalculate_total(&mut *tx, studio_id, command.id).await?;

        let detail = self.load_detail(&mut tx, studio_id, command.id).await?;
        tx.commit().await?;
        Ok(detail)
    }

    async fn load_detail(&self, conn: &mut PgConnection, studio_id: Uuid, command_id: Uuid) -> Result<CommandDetail, AppError> {
        let summary = self.command_repo.get_command_summary(&mut *conn, studio_id, command_id).await?;
        let items = self.command_repo.list_items(&mut *conn, command_id).await?;

        Ok(CommandDetail {
            subtotal: subtotal_of(&items),
            header: summary.command,
            client_name: summary.client_name,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn command(status: CommandStatus) -> Command {
        Command {
            id: Uuid::new_v4(),
            studio_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            professional_id: None,
            appointment_id: None,
            status,
            total_amount: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn paid_commands_are_frozen() {
        assert!(ensure_open(&command(CommandStatus::Open)).is_ok());
        let paid = command(CommandStatus::Paid);
        assert!(matches!(ensure_open(&paid), Err(AppError::CommandNotOpen(id)) if id == paid.id));
    }

    #[test]
    fn field_errors_are_validation_errors() {
        let err = field_error("clientId", "required", "obrigatório");
        assert!(matches!(err, AppError::ValidationError(ref e) if e.field_errors().contains_key("clientId")));
    }
}
