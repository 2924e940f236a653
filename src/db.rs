// src/db.rs

use sqlx::{Pool, Postgres};

/// Cria as tabelas na subida do processo, caso ainda não existam.
///
/// As unicidades de nome, sku e (tipo_produto, ordem) ficam também como
/// restrições UNIQUE no banco, além das pré-verificações dos handlers: a
/// janela de corrida entre verificação e escrita é estreita mas existe, e a
/// violação é mapeada para 409 na camada de erros.
pub async fn criar_tabelas(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          SERIAL PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'user',
            description TEXT,
            created_by  INTEGER,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS login_attempts (
            id         SERIAL PRIMARY KEY,
            ip         TEXT NOT NULL,
            attempts   INTEGER NOT NULL DEFAULT 1,
            blocked_at TIMESTAMPTZ,
            expires_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS recortes (
            id           SERIAL PRIMARY KEY,
            nome         TEXT NOT NULL,
            ordem        INTEGER NOT NULL,
            sku          TEXT NOT NULL UNIQUE,
            tipo_recorte TEXT NOT NULL,
            posicao      TEXT NOT NULL,
            tipo_produto TEXT NOT NULL,
            material     TEXT NOT NULL,
            cor          TEXT NOT NULL,
            url_imagem   TEXT NOT NULL,
            status       BOOLEAN NOT NULL DEFAULT TRUE,
            created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
            UNIQUE (tipo_produto, ordem)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
