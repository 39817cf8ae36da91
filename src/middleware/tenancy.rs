// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// O nome do nosso cabeçalho HTTP customizado
pub const STUDIO_ID_HEADER: &str = "x-studio-id";

/// Estúdio ativo da requisição. Só chega ao handler depois do `tenant_guard`
/// ter conferido que o usuário é membro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudioContext(pub Uuid);

impl StudioContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        headers
            .get(STUDIO_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(StudioContext)
            .ok_or(AppError::InvalidStudioHeader)
    }
}

impl FromRequestParts<AppState> for StudioContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StudioContext>()
            .copied()
            .ok_or_else(|| {
                AppError::InvalidStudioHeader.to_api_error(&Locale::from_headers(&parts.headers), &state.i18n_store)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_a_valid_uuid() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(STUDIO_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(StudioContext::from_headers(&headers).unwrap(), StudioContext(id));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(
            StudioContext::from_headers(&HeaderMap::new()),
            Err(AppError::InvalidStudioHeader)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(STUDIO_ID_HEADER, HeaderValue::from_static("loja-1"));
        assert!(matches!(StudioContext::from_headers(&headers), Err(AppError::InvalidStudioHeader)));
    }
}
