// src/models/payment.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, models::professional::validate_percentage};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Pix,
    Dinheiro,
    CartaoCredito,
    CartaoDebito,
}

impl PaymentMethodKind {
    pub fn is_card(self) -> bool {
        matches!(self, PaymentMethodKind::CartaoCredito | PaymentMethodKind::CartaoDebito)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethodKind::Pix => "pix",
            PaymentMethodKind::Dinheiro => "dinheiro",
            PaymentMethodKind::CartaoCredito => "cartao_credito",
            PaymentMethodKind::CartaoDebito => "cartao_debito",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Maquininha Stone")]
    pub name: String,
    pub kind: PaymentMethodKind,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Linha da tabela de taxas (MDR). A chave é (tipo, bandeira, parcelas).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRate {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    pub payment_method_id: Uuid,
    pub kind: PaymentMethodKind,
    #[schema(example = "visa")]
    pub brand: Option<String>,
    #[schema(example = 3)]
    pub installments: Option<i32>,
    #[schema(example = "3.5")]
    pub fee_percentage: Decimal,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    #[schema(example = "Maquininha Stone")]
    pub name: String,
    pub kind: PaymentMethodKind,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRatePayload {
    pub payment_method_id: Uuid,
    #[schema(example = "visa")]
    pub brand: Option<String>,
    #[validate(range(min = 1, max = 24))]
    #[schema(example = 1)]
    pub installments: Option<i32>,
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "3.5")]
    pub fee_percentage: Decimal,
}

/// As taxas guardam o tipo da forma de pagamento; trocar o tipo com taxas
/// cadastradas deixaria a tabela apontando para o tipo antigo.
pub fn ensure_kind_change_allowed(
    method: &PaymentMethod,
    new_kind: PaymentMethodKind,
    rate_count: i64,
) -> Result<(), AppError> {
    if method.kind != new_kind && rate_count > 0 {
        return Err(AppError::PaymentMethodHasRates(method.id));
    }
    Ok(())
}

/// Resultado da busca de taxa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFee {
    pub fee_percentage: Decimal,
    pub payment_method_id: Option<Uuid>,
}

/// Bandeiras são comparadas sem diferenciar maiúsculas e espaços ("Visa " == "visa").
pub fn normalize_brand(brand: Option<&str>) -> Option<String> {
    brand
        .map(|b| b.trim().to_lowercase())
        .filter(|b| !b.is_empty())
}

/// Busca a taxa de uma forma de pagamento.
///
/// - `pix` e `dinheiro`: ignora bandeira e parcelas; sem cadastro a taxa é 0%.
/// - `cartao_debito`: exige bandeira.
/// - `cartao_credito`: exige bandeira e o número de parcelas (padrão 1).
///
/// Para cartões, a ausência de taxa cadastrada é erro: cobrar 0% em silêncio
/// esconderia uma configuração faltando.
pub fn resolve_fee(
    rates: &[PaymentRate],
    kind: PaymentMethodKind,
    brand: Option<&str>,
    installments: Option<i32>,
) -> Result<ResolvedFee, AppError> {
    match kind {
        PaymentMethodKind::Pix | PaymentMethodKind::Dinheiro => {
            let found = rates.iter().find(|r| r.kind == kind);
            Ok(match found {
                Some(rate) => ResolvedFee {
                    fee_percentage: rate.fee_percentage,
                    payment_method_id: Some(rate.payment_method_id),
                },
                None => ResolvedFee {
                    fee_percentage: Decimal::ZERO,
                    payment_method_id: None,
                },
            })
        }
        PaymentMethodKind::CartaoDebito | PaymentMethodKind::CartaoCredito => {
            let brand = normalize_brand(brand)
                .ok_or_else(|| AppError::InvalidPayment("bandeira do cartão é obrigatória".into()))?;

            let installments = match kind {
                PaymentMethodKind::CartaoCredito => {
                    let n = installments.unwrap_or(1);
                    if n < 1 {
                        return Err(AppError::InvalidPayment("número de parcelas deve ser >= 1".into()));
                    }
                    Some(n)
                }
                _ => None,
            };

            let found = rates.iter().find(|r| {
                r.kind == kind
                    && normalize_brand(r.brand.as_deref()).as_deref() == Some(brand.as_str())
                    && match installments {
                        Some(n) => r.installments.unwrap_or(1) == n,
                        None => true,
                    }
            });

            match found {
                Some(rate) => Ok(ResolvedFee {
                    fee_percentage: rate.fee_percentage,
                    payment_method_id: Some(rate.payment_method_id),
                }),
                None => Err(AppError::FeeRateNotFound {
                    method: kind.as_str().to_string(),
                    brand: Some(brand),
                    installments,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn rate(kind: PaymentMethodKind, brand: Option<&str>, installments: Option<i32>, fee: &str) -> PaymentRate {
        PaymentRate {
            id: Uuid::new_v4(),
            studio_id: Uuid::nil(),
            payment_method_id: Uuid::new_v4(),
            kind,
            brand: brand.map(str::to_string),
            installments,
            fee_percentage: Decimal::from_str(fee).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn table() -> Vec<PaymentRate> {
        vec![
            rate(PaymentMethodKind::Pix, None, None, "0.99"),
            rate(PaymentMethodKind::CartaoDebito, Some("visa"), None, "1.5"),
            rate(PaymentMethodKind::CartaoCredito, Some("visa"), Some(1), "3.5"),
            rate(PaymentMethodKind::CartaoCredito, Some("visa"), Some(3), "5.2"),
            rate(PaymentMethodKind::CartaoCredito, Some("master"), Some(1), "3.2"),
        ]
    }

    #[test]
    fn pix_ignores_brand_and_installments() {
        let rates = table();
        let plain = resolve_fee(&rates, PaymentMethodKind::Pix, None, None).unwrap();
        let noisy = resolve_fee(&rates, PaymentMethodKind::Pix, Some("visa"), Some(12)).unwrap();
        assert_eq!(plain.fee_percentage, Decimal::from_str("0.99").unwrap());
        assert_eq!(plain, noisy);
    }

    #[test]
    fn cash_without_rate_is_free() {
        let fee = resolve_fee(&table(), PaymentMethodKind::Dinheiro, Some("elo"), Some(2)).unwrap();
        assert_eq!(fee.fee_percentage, Decimal::ZERO);
        assert_eq!(fee.payment_method_id, None);
    }

    #[test]
    fn credit_matches_brand_and_installments_exactly() {
        let rates = table();
        let one = resolve_fee(&rates, PaymentMethodKind::CartaoCredito, Some("visa"), Some(1)).unwrap();
        let three = resolve_fee(&rates, PaymentMethodKind::CartaoCredito, Some("visa"), Some(3)).unwrap();
        assert_eq!(one.fee_percentage, Decimal::from_str("3.5").unwrap());
        assert_eq!(three.fee_percentage, Decimal::from_str("5.2").unwrap());

        let missing = resolve_fee(&rates, PaymentMethodKind::CartaoCredito, Some("visa"), Some(2));
        assert!(matches!(missing, Err(AppError::FeeRateNotFound { installments: Some(2), .. })));
    }

    #[test]
    fn credit_defaults_to_one_installment() {
        let fee = resolve_fee(&table(), PaymentMethodKind::CartaoCredito, Some("master"), None).unwrap();
        assert_eq!(fee.fee_percentage, Decimal::from_str("3.2").unwrap());
    }

    #[test]
    fn debit_ignores_installments_but_needs_brand() {
        let rates = table();
        let fee = resolve_fee(&rates, PaymentMethodKind::CartaoDebito, Some(" VISA "), Some(6)).unwrap();
        assert_eq!(fee.fee_percentage, Decimal::from_str("1.5").unwrap());

        let no_brand = resolve_fee(&rates, PaymentMethodKind::CartaoDebito, None, None);
        assert!(matches!(no_brand, Err(AppError::InvalidPayment(_))));

        let unknown = resolve_fee(&rates, PaymentMethodKind::CartaoDebito, Some("elo"), None);
        assert!(matches!(unknown, Err(AppError::FeeRateNotFound { .. })));
    }

    fn method(kind: PaymentMethodKind) -> PaymentMethod {
        PaymentMethod {
            id: Uuid::new_v4(),
            studio_id: Uuid::nil(),
            name: "Maquininha".into(),
            kind,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn kind_change_blocked_while_rates_exist() {
        let credit = method(PaymentMethodKind::CartaoCredito);

        let result = ensure_kind_change_allowed(&credit, PaymentMethodKind::Pix, 2);
        assert!(matches!(result, Err(AppError::PaymentMethodHasRates(id)) if id == credit.id));

        // Sem taxas, ou mantendo o tipo, a edição passa
        assert!(ensure_kind_change_allowed(&credit, PaymentMethodKind::Pix, 0).is_ok());
        assert!(ensure_kind_change_allowed(&credit, PaymentMethodKind::CartaoCredito, 5).is_ok());
    }

    #[test]
    fn rejects_zero_installments() {
        let result = resolve_fee(&table(), PaymentMethodKind::CartaoCredito, Some("visa"), Some(0));
        assert!(matches!(result, Err(AppError::InvalidPayment(_))));
    }

    #[test]
    fn card_rate_returns_its_payment_method() {
        let rates = table();
        let fee = resolve_fee(&rates, PaymentMethodKind::CartaoCredito, Some("visa"), Some(3)).unwrap();
        assert_eq!(fee.payment_method_id, Some(rates[3].payment_method_id));
    }
}
