// src/services/payroll_service.rs

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, period::MonthPeriod},
    db::PayrollRepository,
    models::payroll::{CommissionBasis, CommissionLine, CommissionReport, ProfessionalSales},
};

#[derive(Clone)]
pub struct PayrollService {
    repo: PayrollRepository,
}

/// comissão = bruto × taxa / 100, em centavos. Sem faixas nem teto.
pub fn commission_for(gross_sales: Decimal, commission_rate: Decimal) -> Decimal {
    (gross_sales * commission_rate / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn compute_commissions(sales: Vec<ProfessionalSales>, basis: CommissionBasis, period: &MonthPeriod) -> CommissionReport {
    let lines: Vec<CommissionLine> = sales
        .into_iter()
        .map(|s| CommissionLine {
            commission: commission_for(s.gross_sales, s.commission_rate),
            professional_id: s.professional_id,
            full_name: s.full_name,
            commission_rate: s.commission_rate,
            gross_sales: s.gross_sales,
        })
        .collect();

    CommissionReport {
        month: period.label(),
        basis,
        total_gross: lines.iter().map(|l| l.gross_sales).sum(),
        total_commission: lines.iter().map(|l| l.commission).sum(),
        lines,
    }
}

impl PayrollService {
    pub fn new(repo: PayrollRepository) -> Self {
        Self { repo }
    }

    pub async fn commission_report<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        period: &MonthPeriod,
        basis: CommissionBasis,
    ) -> Result<CommissionReport, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (start, end) = (period.start_utc(), period.end_utc());
        let sales = match basis {
            CommissionBasis::Transaction => self.repo.sales_by_transaction(executor, studio_id, start, end).await?,
            CommissionBasis::Item => self.repo.sales_by_item(executor, studio_id, start, end).await?,
        };

        Ok(compute_commissions(sales, basis, period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sales(name: &str, rate: &str, gross: &str) -> ProfessionalSales {
        ProfessionalSales {
            professional_id: Uuid::new_v4(),
            full_name: name.into(),
            commission_rate: dec(rate),
            gross_sales: dec(gross),
        }
    }

    #[test]
    fn half_of_a_thousand() {
        assert_eq!(commission_for(dec("1000.00"), dec("50")), dec("500.00"));
    }

    #[test]
    fn commission_rounds_to_cents() {
        assert_eq!(commission_for(dec("99.99"), dec("33.3")), dec("33.30"));
        assert_eq!(commission_for(dec("0.05"), dec("50")), dec("0.03"));
    }

    #[test]
    fn report_totals_every_professional() {
        let period = MonthPeriod::parse("2026-10").unwrap();
        let report = compute_commissions(
            vec![
                sales("Ana", "50", "1000.00"),
                sales("Bia", "40", "250.00"),
                sales("Caio", "30", "0"),
            ],
            CommissionBasis::Item,
            &period,
        );

        assert_eq!(report.month, "2026-10");
        assert_eq!(report.basis, CommissionBasis::Item);
        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.lines[0].commission, dec("500.00"));
        assert_eq!(report.lines[1].commission, dec("100.00"));
        assert!(report.lines[2].commission.is_zero());
        assert_eq!(report.total_gross, dec("1250.00"));
        assert_eq!(report.total_commission, dec("600.00"));
    }

    #[test]
    fn transaction_basis_is_the_default() {
        assert_eq!(CommissionBasis::default(), CommissionBasis::Transaction);
    }
}
