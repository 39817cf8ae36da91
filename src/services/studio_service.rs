// src/services/studio_service.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StudioRepository,
    models::studio::{CreateStudioPayload, MemberRole, MyStudio, Studio, UpdateStudioPayload},
};

#[derive(Clone)]
pub struct StudioService {
    studio_repo: StudioRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl StudioService {
    pub fn new(studio_repo: StudioRepository, pool: PgPool) -> Self {
        Self { studio_repo, pool }
    }

    /// Cria o estúdio e, na mesma transação, torna o criador seu dono.
    pub async fn create_studio_with_owner(
        &self,
        payload: &CreateStudioPayload,
        owner_id: Uuid,
    ) -> Result<Studio, AppError> {
        let name = payload.name.trim();

        let already_exists = self.studio_repo
            .owner_has_studio_named(owner_id, name)
            .await?;
        if already_exists {
            return Err(AppError::UniqueConstraintViolation(format!("Estúdio '{name}'")));
        }

        let mut tx = self.pool.begin().await?;

        let studio = self.studio_repo
            .create_studio(
                &mut *tx,
                name,
                payload.document_number.as_deref(),
                payload.phone.as_deref(),
                payload.address.as_deref(),
            )
            .await?;

        self.studio_repo
            .add_member(&mut *tx, studio.id, owner_id, MemberRole::Owner)
            .await?;

        tx.commit().await?;

        tracing::info!(studio_id = %studio.id, owner_id = %owner_id, "Estúdio criado");
        Ok(studio)
    }

    pub async fn list_user_studios(&self, user_id: Uuid) -> Result<Vec<MyStudio>, AppError> {
        self.studio_repo.list_for_user(user_id).await
    }

    pub async fn is_member(&self, user_id: Uuid, studio_id: Uuid) -> Result<bool, AppError> {
        self.studio_repo.is_member(user_id, studio_id).await
    }

    pub async fn get_studio<'e, E>(&self, executor: E, studio_id: Uuid) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.studio_repo.get_studio(executor, studio_id).await
    }

    pub async fn update_studio<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        payload: &UpdateStudioPayload,
    ) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.studio_repo.update_studio(executor, studio_id, payload).await
    }
}
