pub mod agenda_service;
pub mod auth;
pub mod checkout_service;
pub mod command_service;
pub mod finance_service;
pub mod payment_service;
pub mod payroll_service;
pub mod studio_service;
