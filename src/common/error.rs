// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

/// Classificação grossa dos erros. É o que o frontend usa para decidir
/// se mostra "revise o formulário" ou "falha no servidor".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Usuário sem acesso ao estúdio {0}")]
    StudioAccessDenied(Uuid),

    #[error("Cabeçalho x-studio-id ausente ou inválido")]
    InvalidStudioHeader,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Registro em uso por outros dados: {0}")]
    ResourceInUse(String),

    // --- Checkout ---

    #[error("A comanda {0} não está aberta")]
    CommandNotOpen(Uuid),

    #[error("A comanda não possui itens")]
    EmptyCommand,

    #[error("Nenhum pagamento informado")]
    NoPayments,

    #[error("Pagamento inválido: {0}")]
    InvalidPayment(String),

    #[error("Pagamento de {amount} excede o restante de {remaining}")]
    PaymentExceedsRemaining { amount: Decimal, remaining: Decimal },

    #[error("Pagamentos incompletos: faltam {remaining}")]
    CheckoutIncomplete { remaining: Decimal },

    #[error("Soma dos pagamentos ({paid}) difere do total ({total})")]
    PaymentTotalMismatch { paid: Decimal, total: Decimal },

    #[error("Taxa não cadastrada para {method} {brand:?} {installments:?}")]
    FeeRateNotFound {
        method: String,
        brand: Option<String>,
        installments: Option<i32>,
    },

    #[error("Falha ao registrar o pagamento {position} de {count}: {reason}")]
    SettlementFailed {
        position: usize,
        count: usize,
        reason: String,
    },

    #[error("A forma de pagamento {0} possui taxas cadastradas")]
    PaymentMethodHasRates(Uuid),

    // --- Agenda / Estoque ---

    #[error("Conflito de horário com o agendamento {0}")]
    AppointmentConflict(Uuid),

    #[error("Estoque insuficiente para o produto {0}")]
    InsufficientStock(Uuid),

    #[error("Período inválido: {0}")]
    InvalidPeriod(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationError(_)
            | AppError::EmptyCommand
            | AppError::NoPayments
            | AppError::InvalidPayment(_)
            | AppError::PaymentExceedsRemaining { .. }
            | AppError::CheckoutIncomplete { .. }
            | AppError::PaymentTotalMismatch { .. }
            | AppError::FeeRateNotFound { .. }
            | AppError::InsufficientStock(_)
            | AppError::InvalidPeriod(_)
            | AppError::InvalidStudioHeader => ErrorKind::Validation,

            AppError::InvalidCredentials | AppError::InvalidToken => ErrorKind::Unauthorized,

            AppError::StudioAccessDenied(_) => ErrorKind::Forbidden,

            AppError::UserNotFound | AppError::ResourceNotFound(_) => ErrorKind::NotFound,

            AppError::EmailAlreadyExists
            | AppError::UniqueConstraintViolation(_)
            | AppError::ResourceInUse(_)
            | AppError::CommandNotOpen(_)
            | AppError::PaymentMethodHasRates(_)
            | AppError::AppointmentConflict(_) => ErrorKind::Conflict,

            AppError::SettlementFailed { .. }
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorKind::Internal,
        }
    }

    /// Código estável enviado ao cliente. Também é a chave de tradução.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::StudioAccessDenied(_) => "STUDIO_ACCESS_DENIED",
            AppError::InvalidStudioHeader => "INVALID_STUDIO_HEADER",
            AppError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            AppError::UniqueConstraintViolation(_) => "UNIQUE_VIOLATION",
            AppError::ResourceInUse(_) => "RESOURCE_IN_USE",
            AppError::CommandNotOpen(_) => "COMMAND_NOT_OPEN",
            AppError::EmptyCommand => "EMPTY_COMMAND",
            AppError::NoPayments => "NO_PAYMENTS",
            AppError::InvalidPayment(_) => "INVALID_PAYMENT",
            AppError::PaymentExceedsRemaining { .. } => "PAYMENT_EXCEEDS_REMAINING",
            AppError::CheckoutIncomplete { .. } => "CHECKOUT_INCOMPLETE",
            AppError::PaymentTotalMismatch { .. } => "PAYMENT_TOTAL_MISMATCH",
            AppError::FeeRateNotFound { .. } => "FEE_RATE_NOT_FOUND",
            AppError::SettlementFailed { .. } => "SETTLEMENT_FAILED",
            AppError::PaymentMethodHasRates(_) => "PAYMENT_METHOD_HAS_RATES",
            AppError::AppointmentConflict(_) => "APPOINTMENT_CONFLICT",
            AppError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            AppError::InvalidPeriod(_) => "INVALID_PERIOD",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => match self {
                AppError::ValidationError(_) | AppError::InvalidStudioHeader => StatusCode::BAD_REQUEST,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detalhes estruturados que ajudam a UI (ex.: quanto falta pagar).
    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::PaymentExceedsRemaining { amount, remaining } => {
                Some(json!({ "amount": amount, "remaining": remaining }))
            }
            AppError::CheckoutIncomplete { remaining } => Some(json!({ "remaining": remaining })),
            AppError::PaymentTotalMismatch { paid, total } => Some(json!({ "paid": paid, "total": total })),
            AppError::FeeRateNotFound { method, brand, installments } => Some(json!({
                "method": method,
                "brand": brand,
                "installments": installments,
            })),
            AppError::SettlementFailed { position, count, .. } => {
                Some(json!({ "position": position, "count": count }))
            }
            AppError::AppointmentConflict(id) => Some(json!({ "appointmentId": id })),
            AppError::PaymentMethodHasRates(id) => Some(json!({ "paymentMethodId": id })),
            AppError::InsufficientStock(id) => Some(json!({ "productId": id })),
            _ => None,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        if self.kind() == ErrorKind::Internal {
            tracing::error!(code = self.code(), "Erro Interno do Servidor: {}", self);
        }

        ApiError {
            status,
            error: store.translate(&locale.0, self.code()),
            code: self.code().to_string(),
            details: self.details(),
        }
    }
}

/// Erro já pronto para virar resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub code: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.error,
            "code": self.code,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

/// Mapeia violações de chave (unique / foreign key) para erros de domínio.
/// Usado nos repositórios que fazem INSERT/UPDATE/DELETE.
pub(crate) fn map_constraint_error(e: sqlx::Error, subject: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(subject.to_string());
        }
        if db_err.is_foreign_key_violation() {
            return AppError::ResourceInUse(subject.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> I18nStore {
        I18nStore::new()
    }

    #[test]
    fn settlement_failure_is_not_a_validation_error() {
        let err = AppError::SettlementFailed {
            position: 2,
            count: 3,
            reason: "connection reset".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), "SETTLEMENT_FAILED");

        let incomplete = AppError::CheckoutIncomplete { remaining: Decimal::new(1000, 2) };
        assert_eq!(incomplete.kind(), ErrorKind::Validation);
        assert_ne!(err.code(), incomplete.code());
    }

    #[test]
    fn api_error_carries_status_code_and_details() {
        let api = AppError::CheckoutIncomplete { remaining: Decimal::new(2550, 2) }
            .to_api_error(&Locale("en".into()), &store());

        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.code, "CHECKOUT_INCOMPLETE");
        assert_eq!(api.details, Some(json!({ "remaining": 25.5 })));
    }

    #[test]
    fn settlement_failure_reports_position_without_reason() {
        let api = AppError::SettlementFailed {
            position: 2,
            count: 3,
            reason: "deadlock detected".into(),
        }
        .to_api_error(&Locale("pt".into()), &store());

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.details, Some(json!({ "position": 2, "count": 3 })));
        assert!(!api.error.contains("deadlock"));
    }

    #[test]
    fn conflicts_map_to_409() {
        let api = AppError::CommandNotOpen(Uuid::nil()).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);

        let api = AppError::AppointmentConflict(Uuid::nil()).to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);

        let api = AppError::PaymentMethodHasRates(Uuid::nil()).to_api_error(&Locale("pt".into()), &store());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.code, "PAYMENT_METHOD_HAS_RATES");
    }

    #[test]
    fn bad_header_is_400_and_auth_is_401() {
        let api = AppError::InvalidStudioHeader.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);

        let api = AppError::InvalidToken.to_api_error(&Locale("en".into()), &store());
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
    }
}
