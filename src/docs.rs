// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Studios ---
        handlers::studios::create_studio,
        handlers::studios::list_my_studios,
        handlers::studios::get_settings,
        handlers::studios::update_settings,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Professionals ---
        handlers::professionals::create_professional,
        handlers::professionals::list_professionals,
        handlers::professionals::update_professional,
        handlers::professionals::delete_professional,

        // --- Catalog ---
        handlers::catalog::create_service,
        handlers::catalog::list_services,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,
        handlers::catalog::create_product,
        handlers::catalog::list_products,
        handlers::catalog::update_product,
        handlers::catalog::delete_product,
        handlers::catalog::adjust_stock,
        handlers::catalog::create_resource,
        handlers::catalog::list_resources,
        handlers::catalog::delete_resource,

        // --- Agenda ---
        handlers::agenda::create_appointment,
        handlers::agenda::list_appointments,
        handlers::agenda::update_appointment_status,

        // --- Commands ---
        handlers::commands::open_command,
        handlers::commands::list_commands,
        handlers::commands::get_command,
        handlers::commands::add_item,
        handlers::commands::remove_item,

        // --- Checkout ---
        handlers::checkout::preview,
        handlers::checkout::finalize,

        // --- Payments ---
        handlers::payments::create_method,
        handlers::payments::list_methods,
        handlers::payments::update_method,
        handlers::payments::delete_method,
        handlers::payments::create_rate,
        handlers::payments::list_rates,
        handlers::payments::delete_rate,

        // --- Finance ---
        handlers::finance::list_transactions,
        handlers::finance::month_summary,
        handlers::finance::create_transaction,

        // --- Payroll ---
        handlers::payroll::commissions,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Studios ---
            models::studio::MemberRole,
            models::studio::Studio,
            models::studio::MyStudio,
            models::studio::CreateStudioPayload,
            models::studio::UpdateStudioPayload,

            // --- Cadastros ---
            models::client::Client,
            models::client::ClientPayload,
            models::professional::Professional,
            models::professional::ProfessionalPayload,
            models::catalog::Service,
            models::catalog::ServicePayload,
            models::catalog::Product,
            models::catalog::ProductPayload,
            models::catalog::StockAdjustmentPayload,
            models::catalog::Resource,
            models::catalog::ResourcePayload,

            // --- Agenda ---
            models::agenda::AppointmentStatus,
            models::agenda::Appointment,
            models::agenda::AgendaEntry,
            models::agenda::CreateAppointmentPayload,
            models::agenda::UpdateAppointmentStatusPayload,

            // --- Commands / Checkout ---
            models::command::CommandStatus,
            models::command::Command,
            models::command::CommandItem,
            models::command::CommandSummary,
            models::command::CommandDetail,
            models::command::OpenCommandPayload,
            models::command::AddItemPayload,
            models::checkout::PaymentInput,
            models::checkout::PaymentEntry,
            models::checkout::CheckoutRequest,
            models::checkout::CheckoutSummary,
            models::checkout::FinalizeRequest,
            models::checkout::FinalizeResponse,

            // --- Payments ---
            models::payment::PaymentMethodKind,
            models::payment::PaymentMethod,
            models::payment::PaymentMethodPayload,
            models::payment::PaymentRate,
            models::payment::PaymentRatePayload,

            // --- Finance / Payroll ---
            models::finance::TransactionType,
            models::finance::FinancialTransaction,
            models::finance::ManualTransactionPayload,
            models::finance::FinanceSummary,
            models::payroll::CommissionBasis,
            models::payroll::CommissionLine,
            models::payroll::CommissionReport,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Studios", description = "Estúdios e configurações"),
        (name = "Clients", description = "Cadastro de clientes"),
        (name = "Professionals", description = "Profissionais e comissões"),
        (name = "Catalog", description = "Serviços, produtos e recursos"),
        (name = "Agenda", description = "Agendamentos"),
        (name = "Commands", description = "Comandas"),
        (name = "Checkout", description = "Fechamento de comanda"),
        (name = "Payments", description = "Formas de pagamento e taxas"),
        (name = "Finance", description = "Transações e resumo do mês"),
        (name = "Payroll", description = "Remuneração dos profissionais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_checkout_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/commands/{id}/checkout"));
        assert!(doc.paths.paths.contains_key("/api/payroll/commissions"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
