// src/common/period.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::common::error::AppError;

/// Um mês de competência, no formato "AAAA-MM".
/// `start` é inclusivo e `end` é exclusivo (primeiro dia do mês seguinte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthPeriod {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let invalid = || AppError::InvalidPeriod(value.to_string());

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    /// Mês corrente (UTC), usado quando o cliente não informa o período.
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        // Dia 1 de um mês válido sempre existe.
        Self::parse(&format!("{:04}-{:02}", today.year(), today.month()))
            .unwrap_or(Self { start: today, end: today.succ_opt().unwrap_or(today) })
    }

    pub fn from_query(value: Option<&str>) -> Result<Self, AppError> {
        match value {
            Some(v) => Self::parse(v),
            None => Ok(Self::current()),
        }
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.and_time(chrono::NaiveTime::MIN).and_utc()
    }

    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.start.year(), self.start.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_regular_month() {
        let period = MonthPeriod::parse("2024-02").unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(period.label(), "2024-02");
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let period = MonthPeriod::parse("2025-12").unwrap();
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn rejects_malformed_values() {
        for bad in ["2024", "2024-13", "2024-1", "24-01", "abcd-ef", ""] {
            assert!(
                matches!(MonthPeriod::parse(bad), Err(AppError::InvalidPeriod(_))),
                "{bad} deveria ser rejeitado"
            );
        }
    }

    #[test]
    fn utc_bounds_cover_the_whole_month() {
        let period = MonthPeriod::parse("2024-06").unwrap();
        assert_eq!(period.start_utc().to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(period.end_utc().to_rfc3339(), "2024-07-01T00:00:00+00:00");
    }

    #[test]
    fn missing_query_means_current_month() {
        let period = MonthPeriod::from_query(None).unwrap();
        assert_eq!(period.start.day(), 1);
        assert!(period.end > period.start);
    }
}
