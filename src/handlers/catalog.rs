// src/handlers/catalog.rs
//
// Serviços, produtos e recursos. CRUD direto no repositório.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::catalog::{
        Product, ProductPayload, Resource, ResourcePayload, Service, ServicePayload, StockAdjustmentPayload,
    },
};

// =============================================================================
//  SERVIÇOS
// =============================================================================

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Catalog",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let service = app_state.catalog_repo
        .create_service(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(service)))
}

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Catalog",
    responses(
        (status = 200, description = "Serviços do estúdio", body = Vec<Service>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let services = app_state.catalog_repo
        .list_services(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(services)))
}

// PUT /api/services/{id}
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Catalog",
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 404, description = "Serviço não encontrado")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do serviço")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(service_id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let service = app_state.catalog_repo
        .update_service(&mut *rls_conn, studio.0, service_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(service)))
}

// DELETE /api/services/{id}
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Serviço removido"),
        (status = 409, description = "Serviço usado em agendamentos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do serviço")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(service_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.catalog_repo
        .delete_service(&mut *rls_conn, studio.0, service_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  PRODUTOS
// =============================================================================

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state.catalog_repo
        .create_product(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses(
        (status = 200, description = "Produtos do estúdio", body = Vec<Product>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let products = app_state.catalog_repo
        .list_products(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(products)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state.catalog_repo
        .update_product(&mut *rls_conn, studio.0, product_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 409, description = "Produto vendido em comandas")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.catalog_repo
        .delete_product(&mut *rls_conn, studio.0, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/products/{id}/stock
#[utoipa::path(
    post,
    path = "/api/products/{id}/stock",
    tag = "Catalog",
    request_body = StockAdjustmentPayload,
    responses(
        (status = 200, description = "Estoque ajustado", body = Product),
        (status = 409, description = "O estoque ficaria negativo")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do produto")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<StockAdjustmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let product = app_state.catalog_repo
        .adjust_stock(&mut *rls_conn, studio.0, product_id, payload.delta)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!(
        product_id = %product.id,
        delta = %payload.delta,
        reason = payload.reason.as_deref().unwrap_or("-"),
        "Estoque ajustado"
    );

    Ok((StatusCode::OK, Json(product)))
}

// =============================================================================
//  RECURSOS
// =============================================================================

// POST /api/resources
#[utoipa::path(
    post,
    path = "/api/resources",
    tag = "Catalog",
    request_body = ResourcePayload,
    responses(
        (status = 201, description = "Recurso criado", body = Resource),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_resource(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<ResourcePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let resource = app_state.catalog_repo
        .create_resource(&mut *rls_conn, studio.0, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(resource)))
}

// GET /api/resources
#[utoipa::path(
    get,
    path = "/api/resources",
    tag = "Catalog",
    responses(
        (status = 200, description = "Recursos do estúdio", body = Vec<Resource>)
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_resources(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let resources = app_state.catalog_repo
        .list_resources(&mut *rls_conn, studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(resources)))
}

// DELETE /api/resources/{id}
#[utoipa::path(
    delete,
    path = "/api/resources/{id}",
    tag = "Catalog",
    responses(
        (status = 204, description = "Recurso removido"),
        (status = 409, description = "Recurso usado em agendamentos")
    ),
    params(
        ("x-studio-id" = Uuid, Header, description = "ID do estúdio"),
        ("id" = Uuid, Path, description = "ID do recurso")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_resource(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Path(resource_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &studio, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    app_state.catalog_repo
        .delete_resource(&mut *rls_conn, studio.0, resource_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
