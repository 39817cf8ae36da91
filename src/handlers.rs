pub mod agenda;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod commands;
pub mod finance;
pub mod payments;
pub mod payroll;
pub mod professionals;
pub mod studios;
