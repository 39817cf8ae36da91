// src/models/checkout.rs
//
// Cálculo do fechamento de comanda. Nada aqui acessa o banco: as taxas já
// chegam carregadas e o resultado é um plano que o serviço grava numa
// única transação.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{
        command::{Command, CommandItem},
        payment::{normalize_brand, resolve_fee, PaymentMethodKind, PaymentRate},
    },
};

/// Pagamento parcial como vem do cliente (ainda sem taxa).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    pub method: PaymentMethodKind,

    #[schema(example = "100.00")]
    pub amount: Decimal,

    #[schema(example = "visa")]
    pub brand: Option<String>,

    #[validate(range(min = 1, max = 24, message = "Parcelas entre 1 e 24."))]
    #[schema(example = 1)]
    pub installments: Option<i32>,
}

/// Pagamento parcial confirmado, já com taxa e valor líquido.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEntry {
    pub method: PaymentMethodKind,
    pub amount: Decimal,
    pub brand: Option<String>,
    pub installments: Option<i32>,
    pub fee_percentage: Decimal,
    pub net_amount: Decimal,
    pub payment_method_id: Option<Uuid>,
}

/// Valor líquido depois da taxa: amount × (1 − fee/100), em centavos.
pub fn net_amount(amount: Decimal, fee_percentage: Decimal) -> Decimal {
    (amount * (Decimal::ONE_HUNDRED - fee_percentage) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Soma das linhas da comanda.
pub fn subtotal_of(items: &[CommandItem]) -> Decimal {
    items.iter().map(CommandItem::line_total).sum()
}

fn ensure_cents(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.round_dp(2) != value {
        return Err(AppError::InvalidPayment(format!("{field} deve ter no máximo 2 casas decimais")));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Checkout {
    subtotal: Decimal,
    discount: Decimal,
    payments: Vec<PaymentEntry>,
}

impl Checkout {
    pub fn new(subtotal: Decimal, discount: Decimal) -> Result<Self, AppError> {
        if discount.is_sign_negative() {
            return Err(AppError::InvalidPayment("desconto não pode ser negativo".into()));
        }
        ensure_cents(discount, "desconto")?;

        Ok(Self {
            subtotal,
            discount,
            payments: Vec::new(),
        })
    }

    pub fn for_items(items: &[CommandItem], discount: Decimal) -> Result<Self, AppError> {
        if items.is_empty() {
            return Err(AppError::EmptyCommand);
        }
        Self::new(subtotal_of(items), discount)
    }

    /// Monta o checkout aplicando os pagamentos na ordem recebida.
    pub fn with_payments(
        items: &[CommandItem],
        discount: Decimal,
        inputs: &[PaymentInput],
        rates: &[PaymentRate],
    ) -> Result<Self, AppError> {
        let mut checkout = Self::for_items(items, discount)?;
        for input in inputs {
            checkout.add_payment(input, rates)?;
        }
        Ok(checkout)
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// max(0, subtotal − desconto)
    pub fn total(&self) -> Decimal {
        (self.subtotal - self.discount).max(Decimal::ZERO)
    }

    pub fn paid(&self) -> Decimal {
        self.payments.iter().map(|p| p.amount).sum()
    }

    pub fn remaining(&self) -> Decimal {
        (self.total() - self.paid()).max(Decimal::ZERO)
    }

    pub fn payments(&self) -> &[PaymentEntry] {
        &self.payments
    }

    /// Só fecha com saldo zerado e ao menos um pagamento. Comanda de total zero
    /// (desconto integral) fecha sem pagamentos, pois não há valor a receber.
    pub fn can_finalize(&self) -> bool {
        if self.total().is_zero() {
            return self.payments.is_empty();
        }
        !self.payments.is_empty() && self.remaining().is_zero()
    }

    pub fn add_payment(&mut self, input: &PaymentInput, rates: &[PaymentRate]) -> Result<&PaymentEntry, AppError> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::InvalidPayment("valor deve ser maior que zero".into()));
        }
        ensure_cents(input.amount, "valor")?;

        let remaining = self.remaining();
        if input.amount > remaining {
            return Err(AppError::PaymentExceedsRemaining {
                amount: input.amount,
                remaining,
            });
        }

        let fee = resolve_fee(rates, input.method, input.brand.as_deref(), input.installments)?;

        let (brand, installments) = match input.method {
            PaymentMethodKind::CartaoCredito => (normalize_brand(input.brand.as_deref()), Some(input.installments.unwrap_or(1))),
            PaymentMethodKind::CartaoDebito => (normalize_brand(input.brand.as_deref()), None),
            _ => (None, None),
        };

        self.payments.push(PaymentEntry {
            method: input.method,
            amount: input.amount,
            brand,
            installments,
            fee_percentage: fee.fee_percentage,
            net_amount: net_amount(input.amount, fee.fee_percentage),
            payment_method_id: fee.payment_method_id,
        });

        Ok(&self.payments[self.payments.len() - 1])
    }

    pub fn remove_payment(&mut self, index: usize) -> Option<PaymentEntry> {
        if index < self.payments.len() {
            Some(self.payments.remove(index))
        } else {
            None
        }
    }

    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary {
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total(),
            paid: self.paid(),
            remaining: self.remaining(),
            fees: self.payments.iter().map(|p| p.amount - p.net_amount).sum(),
            net_total: self.payments.iter().map(|p| p.net_amount).sum(),
            can_finalize: self.can_finalize(),
            payments: self.payments.clone(),
        }
    }

    /// Valida o fechamento e devolve o plano de gravação.
    pub fn settle(&self) -> Result<SettlementPlan, AppError> {
        if self.payments.is_empty() && !self.total().is_zero() {
            return Err(AppError::NoPayments);
        }
        let paid = self.paid();
        if paid < self.total() {
            return Err(AppError::CheckoutIncomplete { remaining: self.remaining() });
        }
        if paid != self.total() {
            return Err(AppError::PaymentTotalMismatch { paid, total: self.total() });
        }

        let count = self.payments.len();
        Ok(SettlementPlan {
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total(),
            payments: self
                .payments
                .iter()
                .enumerate()
                .map(|(i, entry)| PlannedPayment {
                    position: i + 1,
                    count,
                    entry: entry.clone(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
    pub fees: Decimal,
    pub net_total: Decimal,
    pub can_finalize: bool,
    pub payments: Vec<PaymentEntry>,
}

#[derive(Debug, Clone)]
pub struct PlannedPayment {
    pub position: usize,
    pub count: usize,
    pub entry: PaymentEntry,
}

#[derive(Debug, Clone)]
pub struct SettlementPlan {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub payments: Vec<PlannedPayment>,
}

fn zero() -> Decimal {
    Decimal::ZERO
}

/// Corpo da pré-visualização: desconto e pagamentos ainda não gravados.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default = "zero")]
    #[schema(example = "20.00")]
    pub discount: Decimal,
    #[serde(default)]
    #[validate(nested)]
    pub payments: Vec<PaymentInput>,
}

/// Corpo do fechamento. A chave evita fechar duas vezes num clique duplo.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub idempotency_key: Uuid,
    #[serde(default = "zero")]
    #[schema(example = "20.00")]
    pub discount: Decimal,
    #[validate(nested)]
    pub payments: Vec<PaymentInput>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub command: Command,
    pub transaction_ids: Vec<Uuid>,
    /// `true` quando a chave já tinha sido usada e nada foi gravado de novo.
    pub replayed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(price: &str, qty: &str) -> CommandItem {
        CommandItem {
            id: Uuid::new_v4(),
            command_id: Uuid::nil(),
            title: "Item".into(),
            unit_price: dec(price),
            quantity: dec(qty),
            product_id: None,
            service_id: None,
            professional_id: None,
            created_at: Utc::now(),
        }
    }

    fn pay(method: PaymentMethodKind, amount: &str) -> PaymentInput {
        PaymentInput {
            method,
            amount: dec(amount),
            brand: None,
            installments: None,
        }
    }

    fn card(amount: &str, brand: &str, installments: i32) -> PaymentInput {
        PaymentInput {
            method: PaymentMethodKind::CartaoCredito,
            amount: dec(amount),
            brand: Some(brand.into()),
            installments: Some(installments),
        }
    }

    fn rates() -> Vec<PaymentRate> {
        vec![PaymentRate {
            id: Uuid::new_v4(),
            studio_id: Uuid::nil(),
            payment_method_id: Uuid::new_v4(),
            kind: PaymentMethodKind::CartaoCredito,
            brand: Some("visa".into()),
            installments: Some(1),
            fee_percentage: dec("3.5"),
            created_at: Utc::now(),
        }]
    }

    #[test]
    fn single_card_payment_with_fee() {
        let checkout = Checkout::with_payments(
            &[item("150.00", "1")],
            Decimal::ZERO,
            &[card("150.00", "visa", 1)],
            &rates(),
        )
        .unwrap();

        let entry = &checkout.payments()[0];
        assert_eq!(entry.fee_percentage, dec("3.5"));
        assert_eq!(entry.net_amount, dec("144.75"));
        assert_eq!(checkout.remaining(), Decimal::ZERO);
        assert!(checkout.can_finalize());
    }

    #[test]
    fn discount_and_split_payment() {
        let checkout = Checkout::with_payments(
            &[item("120.00", "1"), item("40.00", "2")],
            dec("20.00"),
            &[pay(PaymentMethodKind::Pix, "100.00"), pay(PaymentMethodKind::Dinheiro, "80.00")],
            &[],
        )
        .unwrap();

        assert_eq!(checkout.subtotal(), dec("200.00"));
        assert_eq!(checkout.total(), dec("180.00"));
        assert_eq!(checkout.remaining(), Decimal::ZERO);
        assert!(checkout.can_finalize());

        let plan = checkout.settle().unwrap();
        assert_eq!(plan.payments.len(), 2);
        assert_eq!(plan.payments[1].position, 2);
        assert_eq!(plan.payments[1].count, 2);
    }

    #[test]
    fn removing_a_payment_recomputes_remaining() {
        let mut checkout = Checkout::for_items(&[item("200.00", "1")], dec("20.00")).unwrap();
        checkout.add_payment(&pay(PaymentMethodKind::Pix, "100.00"), &[]).unwrap();
        checkout.add_payment(&pay(PaymentMethodKind::Dinheiro, "80.00"), &[]).unwrap();
        let paid_before = checkout.paid();

        let removed = checkout.remove_payment(0).unwrap();

        assert_eq!(checkout.paid(), paid_before - removed.amount);
        assert_eq!(checkout.remaining(), dec("100.00"));
        assert!(!checkout.can_finalize());
        assert!(checkout.remove_payment(5).is_none());
    }

    #[test]
    fn cannot_finalize_without_payments() {
        let checkout = Checkout::for_items(&[item("50.00", "1")], Decimal::ZERO).unwrap();
        assert!(!checkout.can_finalize());
        assert!(matches!(checkout.settle(), Err(AppError::NoPayments)));
    }

    #[test]
    fn partial_payment_is_incomplete() {
        let mut checkout = Checkout::for_items(&[item("50.00", "1")], Decimal::ZERO).unwrap();
        checkout.add_payment(&pay(PaymentMethodKind::Pix, "30.00"), &[]).unwrap();

        assert!(!checkout.can_finalize());
        match checkout.settle() {
            Err(AppError::CheckoutIncomplete { remaining }) => assert_eq!(remaining, dec("20.00")),
            other => panic!("esperava CheckoutIncomplete, veio {other:?}"),
        }
    }

    #[test]
    fn overpayment_is_rejected() {
        let mut checkout = Checkout::for_items(&[item("50.00", "1")], Decimal::ZERO).unwrap();
        let result = checkout.add_payment(&pay(PaymentMethodKind::Dinheiro, "60.00"), &[]);
        assert!(matches!(result, Err(AppError::PaymentExceedsRemaining { .. })));
        assert!(checkout.payments().is_empty());
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        let mut checkout = Checkout::for_items(&[item("50.00", "1")], Decimal::ZERO).unwrap();
        assert!(checkout.add_payment(&pay(PaymentMethodKind::Pix, "0"), &[]).is_err());
        assert!(checkout.add_payment(&pay(PaymentMethodKind::Pix, "-5"), &[]).is_err());
        assert!(checkout.add_payment(&pay(PaymentMethodKind::Pix, "10.005"), &[]).is_err());
    }

    #[test]
    fn discount_larger_than_subtotal_clamps_to_zero() {
        let checkout = Checkout::for_items(&[item("30.00", "1")], dec("50.00")).unwrap();
        assert_eq!(checkout.total(), Decimal::ZERO);
        assert!(checkout.can_finalize());
        let plan = checkout.settle().unwrap();
        assert!(plan.payments.is_empty());
        assert_eq!(plan.total, Decimal::ZERO);
    }

    #[test]
    fn negative_discount_is_rejected() {
        assert!(Checkout::new(dec("10.00"), dec("-1.00")).is_err());
    }

    #[test]
    fn empty_command_cannot_checkout() {
        assert!(matches!(Checkout::for_items(&[], Decimal::ZERO), Err(AppError::EmptyCommand)));
    }

    #[test]
    fn card_without_configured_rate_fails() {
        let result = Checkout::with_payments(
            &[item("100.00", "1")],
            Decimal::ZERO,
            &[card("100.00", "elo", 1)],
            &rates(),
        );
        assert!(matches!(result, Err(AppError::FeeRateNotFound { .. })));
    }

    #[test]
    fn summary_reports_fees_and_net() {
        let checkout = Checkout::with_payments(
            &[item("150.00", "1"), item("50.00", "1")],
            Decimal::ZERO,
            &[card("150.00", "visa", 1), pay(PaymentMethodKind::Dinheiro, "50.00")],
            &rates(),
        )
        .unwrap();

        let summary = checkout.summary();
        assert_eq!(summary.total, dec("200.00"));
        assert_eq!(summary.fees, dec("5.25"));
        assert_eq!(summary.net_total, dec("194.75"));
        assert!(summary.can_finalize);
    }

    #[test]
    fn net_amount_rounds_half_away_from_zero() {
        // 10.01 × 0.975 = 9.75975
        assert_eq!(net_amount(dec("10.01"), dec("2.5")), dec("9.76"));
        assert_eq!(net_amount(dec("80.00"), Decimal::ZERO), dec("80.00"));
    }

    #[test]
    fn line_total_uses_quantity() {
        assert_eq!(subtotal_of(&[item("12.50", "3"), item("7.25", "2")]), dec("52.00"));
    }

    #[test]
    fn midpoint_line_matches_stored_total() {
        // 0.05 × 2.5 = 0.125; o banco grava 0.13
        let items = [item("0.05", "2.5")];
        assert_eq!(items[0].line_total(), dec("0.13"));

        let mut checkout = Checkout::for_items(&items, Decimal::ZERO).unwrap();
        assert_eq!(checkout.total(), dec("0.13"));
        checkout.add_payment(&pay(PaymentMethodKind::Pix, "0.13"), &[]).unwrap();
        assert!(checkout.can_finalize());
    }
}
