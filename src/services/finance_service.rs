// src/services/finance_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::MonthPeriod},
    db::{finance_repo::FinanceTotals, FinanceRepository},
    models::finance::{
        FinanceSummary, FinancialTransaction, ManualTransactionPayload, PaymentRegistration, TransactionType,
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

/// Monta o resumo do mês: taxas são a diferença entre bruto e líquido das entradas.
pub fn summarize(period: &MonthPeriod, totals: &FinanceTotals) -> FinanceSummary {
    FinanceSummary {
        month: period.label(),
        income: totals.income,
        expense: totals.expense,
        fees: totals.income - totals.income_net,
        balance: totals.income_net - totals.expense,
        transaction_count: totals.transaction_count,
    }
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        period: &MonthPeriod,
        transaction_type: Option<TransactionType>,
    ) -> Result<Vec<FinancialTransaction>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .list_transactions(executor, studio_id, period.start_utc(), period.end_utc(), transaction_type)
            .await
    }

    pub async fn month_summary<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        period: &MonthPeriod,
    ) -> Result<FinanceSummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totals = self.repo
            .month_totals(executor, studio_id, period.start_utc(), period.end_utc())
            .await?;
        Ok(summarize(period, &totals))
    }

    /// Lançamento avulso. Passa pelo mesmo procedimento do fechamento de comanda,
    /// sem taxa: o líquido é igual ao bruto.
    pub async fn record_manual<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &ManualTransactionPayload,
    ) -> Result<FinancialTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let registration = PaymentRegistration {
            amount: payload.amount,
            net_amount: payload.amount,
            tax_rate: Decimal::ZERO,
            description: payload.description.trim().to_string(),
            transaction_type: payload.transaction_type,
            category: payload.category.trim().to_lowercase(),
            studio_id,
            professional_id: payload.professional_id,
            client_id: payload.client_id,
            payment_method_id: payload.payment_method_id,
        };

        let id = self.repo.register_payment(&mut *tx, &registration).await?;
        let transaction = self.repo.get_transaction(&mut *tx, studio_id, id).await?;

        tx.commit().await?;

        tracing::info!(
            transaction_id = %id,
            kind = transaction.transaction_type.as_str(),
            amount = %transaction.amount,
            "Lançamento manual registrado"
        );
        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn summary_separates_fees_from_balance() {
        let period = MonthPeriod::parse("2026-10").unwrap();
        let totals = FinanceTotals {
            income: dec("1150.00"),
            income_net: dec("1125.25"),
            expense: dec("400.00"),
            transaction_count: 9,
        };

        let summary = summarize(&period, &totals);

        assert_eq!(summary.month, "2026-10");
        assert_eq!(summary.fees, dec("24.75"));
        assert_eq!(summary.balance, dec("725.25"));
        assert_eq!(summary.transaction_count, 9);
    }

    #[test]
    fn empty_month_is_all_zero() {
        let period = MonthPeriod::parse("2026-01").unwrap();
        let totals = FinanceTotals {
            income: Decimal::ZERO,
            income_net: Decimal::ZERO,
            expense: Decimal::ZERO,
            transaction_count: 0,
        };
        let summary = summarize(&period, &totals);
        assert!(summary.balance.is_zero());
        assert!(summary.fees.is_zero());
    }
}
