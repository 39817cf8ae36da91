// src/config.rs

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        AgendaRepository, CatalogRepository, ClientRepository, CommandRepository,
        FinanceRepository, PaymentRepository, PayrollRepository, ProfessionalRepository,
        StudioRepository, UserRepository,
    },
    services::{
        agenda_service::AgendaService, auth::AuthService, checkout_service::CheckoutService,
        command_service::CommandService, finance_service::FinanceService,
        payment_service::PaymentService,
        payroll_service::PayrollService, studio_service::StudioService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_JWT_EXPIRATION_DAYS: i64 = 7;

/// Configuração lida do ambiente (ou do .env).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub max_connections: u32,
    pub jwt_expiration_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca, o que permite testar
    /// sem mexer nas variáveis do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret = lookup("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET deve ser definido"))?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET não pode ser vazio"));
        }

        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {v}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let jwt_expiration_days = match lookup("JWT_EXPIRATION_DAYS") {
            Some(v) => v
                .parse::<i64>()
                .with_context(|| format!("JWT_EXPIRATION_DAYS inválido: {v}"))?,
            None => DEFAULT_JWT_EXPIRATION_DAYS,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr,
            max_connections,
            jwt_expiration_days,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: I18nStore,

    pub auth_service: AuthService,
    pub studio_service: StudioService,
    pub agenda_service: AgendaService,
    pub command_service: CommandService,
    pub checkout_service: CheckoutService,
    pub finance_service: FinanceService,
    pub payroll_service: PayrollService,
    pub payment_service: PaymentService,

    // CRUD simples: os handlers falam direto com o repositório
    pub client_repo: ClientRepository,
    pub professional_repo: ProfessionalRepository,
    pub catalog_repo: CatalogRepository,
    pub payment_repo: PaymentRepository,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let studio_repo = StudioRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new();
        let professional_repo = ProfessionalRepository::new();
        let catalog_repo = CatalogRepository::new();
        let agenda_repo = AgendaRepository::new();
        let command_repo = CommandRepository::new();
        let payment_repo = PaymentRepository::new();
        let finance_repo = FinanceRepository::new();
        let payroll_repo = PayrollRepository::new();

        let auth_service = AuthService::new(
            user_repo,
            config.jwt_secret.clone(),
            config.jwt_expiration_days,
            db_pool.clone(),
        );
        let studio_service = StudioService::new(studio_repo, db_pool.clone());
        let agenda_service = AgendaService::new(agenda_repo, catalog_repo.clone());
        let command_service = CommandService::new(command_repo.clone(), agenda_service.clone(), catalog_repo.clone());
        let checkout_service = CheckoutService::new(
            command_repo,
            payment_repo.clone(),
            finance_repo.clone(),
            catalog_repo.clone(),
        );
        let finance_service = FinanceService::new(finance_repo);
        let payroll_service = PayrollService::new(payroll_repo);
        let payment_service = PaymentService::new(payment_repo.clone());

        Ok(Self {
            db_pool,
            i18n_store: I18nStore::new(),
            auth_service,
            studio_service,
            agenda_service,
            command_service,
            checkout_service,
            finance_service,
            payroll_service,
            payment_service,
            client_repo,
            professional_repo,
            catalog_repo,
            payment_repo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults_for_optional_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/studio"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.jwt_expiration_days, 7);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/studio"),
            ("JWT_SECRET", "segredo"),
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("DATABASE_MAX_CONNECTIONS", "20"),
            ("JWT_EXPIRATION_DAYS", "1"),
        ]))
        .unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.jwt_expiration_days, 1);
    }

    #[test]
    fn missing_required_values_fail() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", "x")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://db")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "  "),
        ]))
        .is_err());
    }

    #[test]
    fn invalid_numbers_fail() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", "x"),
            ("DATABASE_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }
}
