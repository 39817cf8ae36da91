// src/models/professional.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Professional {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Ana Lima")]
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Percentual fixo de comissão (0 a 100)
    #[schema(example = "40.00")]
    pub commission_rate: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalPayload {
    #[validate(length(min = 1, max = 160, message = "O nome é obrigatório."))]
    pub full_name: String,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "40.00")]
    pub commission_rate: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payload(rate: &str) -> ProfessionalPayload {
        ProfessionalPayload {
            full_name: "Ana".into(),
            phone: None,
            email: None,
            commission_rate: Decimal::from_str(rate).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn commission_rate_must_be_a_percentage() {
        assert!(payload("0").validate().is_ok());
        assert!(payload("100").validate().is_ok());
        assert!(payload("42.5").validate().is_ok());
        assert!(payload("-1").validate().is_err());
        assert!(payload("100.01").validate().is_err());
    }
}
