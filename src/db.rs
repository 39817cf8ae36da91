pub mod agenda_repo;
pub mod catalog_repo;
pub mod client_repo;
pub mod command_repo;
pub mod finance_repo;
pub mod payment_repo;
pub mod payroll_repo;
pub mod professional_repo;
pub mod studio_repo;
pub mod user_repo;

pub use agenda_repo::AgendaRepository;
pub use catalog_repo::CatalogRepository;
pub use client_repo::ClientRepository;
pub use command_repo::CommandRepository;
pub use finance_repo::FinanceRepository;
pub use payment_repo::PaymentRepository;
pub use payroll_repo::PayrollRepository;
pub use professional_repo::ProfessionalRepository;
pub use studio_repo::StudioRepository;
pub use user_repo::UserRepository;
