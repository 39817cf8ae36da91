// src/models/command.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "command_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Open,
    Paid,
}

/// Comanda: a "conta" aberta de um atendimento.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    pub client_id: Uuid,
    // Profissional principal; é quem recebe o vínculo nas transações do fechamento
    pub professional_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
    pub status: CommandStatus,
    #[schema(example = "180.00")]
    pub total_amount: Decimal,
    #[schema(example = "20.00")]
    pub discount_amount: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandItem {
    pub id: Uuid,
    pub command_id: Uuid,
    #[schema(example = "Corte feminino")]
    pub title: String,
    #[schema(example = "80.00")]
    pub unit_price: Decimal,
    #[schema(example = "1")]
    pub quantity: Decimal,
    pub product_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl CommandItem {
    /// Arredonda como o `ROUND(numeric, 2)` do Postgres, usado no total gravado.
    pub fn line_total(&self) -> Decimal {
        (self.unit_price * self.quantity).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Listagem: comanda + nome do cliente.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub command: Command,
    pub client_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandDetail {
    #[serde(flatten)]
    pub header: Command,
    pub client_name: String,
    pub items: Vec<CommandItem>,
    #[schema(example = "200.00")]
    pub subtotal: Decimal,
}

/// Fechamento gravado, indexado pela chave de idempotência.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandSettlement {
    #[schema(ignore)]
    pub studio_id: Uuid,
    pub idempotency_key: Uuid,
    pub command_id: Uuid,
    pub total_amount: Decimal,
    pub transaction_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

/// Abre uma comanda. Com `appointmentId`, cliente e profissional vêm do agendamento
/// e o serviço agendado vira o primeiro item.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenCommandPayload {
    pub client_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    pub appointment_id: Option<Uuid>,
}

fn validate_quantity(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("A quantidade deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

/// Item novo. Com `serviceId` ou `productId`, título e preço vêm do catálogo
/// quando não forem enviados.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
    #[validate(length(min = 1, max = 160, message = "O título não pode ser vazio."))]
    pub title: Option<String>,
    #[schema(example = "80.00")]
    pub unit_price: Option<Decimal>,
    #[serde(default = "default_quantity")]
    #[validate(custom(function = "validate_quantity"))]
    #[schema(example = "1")]
    pub quantity: Decimal,
    pub product_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommandQuery {
    /// `open` ou `paid`
    pub status: Option<CommandStatus>,
}
