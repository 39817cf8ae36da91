//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::auth::{auth_guard, tenant_guard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logger: RUST_LOG manda; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Só token: ainda não há estúdio ativo
    let user_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .route(
            "/studios",
            post(handlers::studios::create_studio).get(handlers::studios::list_my_studios),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Token + x-studio-id
    let studio_routes = Router::new()
        .route(
            "/studio",
            get(handlers::studios::get_settings).put(handlers::studios::update_settings),
        )
        // Cadastros
        .route(
            "/clients",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/professionals",
            post(handlers::professionals::create_professional).get(handlers::professionals::list_professionals),
        )
        .route(
            "/professionals/{id}",
            put(handlers::professionals::update_professional).delete(handlers::professionals::delete_professional),
        )
        .route(
            "/services",
            post(handlers::catalog::create_service).get(handlers::catalog::list_services),
        )
        .route(
            "/services/{id}",
            put(handlers::catalog::update_service).delete(handlers::catalog::delete_service),
        )
        .route(
            "/products",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        )
        .route(
            "/products/{id}",
            put(handlers::catalog::update_product).delete(handlers::catalog::delete_product),
        )
        .route("/products/{id}/stock", post(handlers::catalog::adjust_stock))
        .route(
            "/resources",
            post(handlers::catalog::create_resource).get(handlers::catalog::list_resources),
        )
        .route("/resources/{id}", delete(handlers::catalog::delete_resource))
        // Agenda
        .route(
            "/appointments",
            post(handlers::agenda::create_appointment).get(handlers::agenda::list_appointments),
        )
        .route("/appointments/{id}/status", patch(handlers::agenda::update_appointment_status))
        // Comandas e fechamento
        .route(
            "/commands",
            post(handlers::commands::open_command).get(handlers::commands::list_commands),
        )
        .route("/commands/{id}", get(handlers::commands::get_command))
        .route("/commands/{id}/items", post(handlers::commands::add_item))
        .route("/commands/{id}/items/{item_id}", delete(handlers::commands::remove_item))
        .route("/commands/{id}/checkout/preview", post(handlers::checkout::preview))
        .route("/commands/{id}/checkout", post(handlers::checkout::finalize))
        // Pagamentos
        .route(
            "/payment-methods",
            post(handlers::payments::create_method).get(handlers::payments::list_methods),
        )
        .route(
            "/payment-methods/{id}",
            put(handlers::payments::update_method).delete(handlers::payments::delete_method),
        )
        .route(
            "/payment-rates",
            post(handlers::payments::create_rate).get(handlers::payments::list_rates),
        )
        .route("/payment-rates/{id}", delete(handlers::payments::delete_rate))
        // Financeiro e remuneração
        .route(
            "/finance/transactions",
            get(handlers::finance::list_transactions).post(handlers::finance::create_transaction),
        )
        .route("/finance/summary", get(handlers::finance::month_summary))
        .route("/payroll/commissions", get(handlers::payroll::commissions))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), tenant_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", user_routes.merge(studio_routes))
        .with_state(app_state)
}
