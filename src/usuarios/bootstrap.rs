// src/usuarios/bootstrap.rs

use sqlx::{query, Pool, Postgres};
use tracing::info;

use crate::auth::senha;
use crate::config::Config;
use crate::shared::erros::ApiError;

/// Garante que exista pelo menos um admin. Idempotente: roda uma única vez
/// na subida do processo, depois da criação das tabelas, e não faz nada se
/// já houver uma linha com papel admin.
pub async fn inicializar_admin(pool: &Pool<Postgres>, config: &Config) -> Result<(), ApiError> {
    let existente = query("SELECT id FROM users WHERE role = 'admin' LIMIT 1")
        .fetch_optional(pool)
        .await?;

    if existente.is_some() {
        info!("Admin já existe no banco de dados");
        return Ok(());
    }

    let digest = senha::gerar_hash(&config.admin_password)?;

    query("INSERT INTO users (name, password, role) VALUES ($1, $2, 'admin')")
        .bind(&config.admin_name)
        .bind(&digest)
        .execute(pool)
        .await?;

    info!("Admin criado com sucesso");
    Ok(())
}
