pub mod agenda;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod command;
pub mod finance;
pub mod payment;
pub mod payroll;
pub mod professional;
pub mod studio;
