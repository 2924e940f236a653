// src/config.rs

use std::env;

use tracing::{info, warn};

/// Configuração carregada das variáveis de ambiente, com os mesmos padrões
/// de desenvolvimento do front de administração. Em produção, `JWT_SECRET`,
/// `ADMIN_PASSWORD` e `DATABASE_URL` precisam vir do ambiente.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,

    // JWT
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,

    // Admin inicial
    pub admin_name: String,
    pub admin_password: String,

    // Limite de tentativas de login por IP
    pub login_attempts_limit: i32,
    /// Janela de bloqueio em milissegundos (padrão: 15 minutos).
    pub login_block_time_ms: i64,

    // Host externo de imagens
    pub image_host_url: String,
    pub image_host_api_key: String,
    pub image_host_folder: String,
}

fn var_ou(nome: &str, padrao: &str) -> String {
    env::var(nome).unwrap_or_else(|_| padrao.to_string())
}

fn var_numerica<T: std::str::FromStr>(nome: &str, padrao: T) -> T {
    env::var(nome)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(padrao)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: var_ou("HOST", "localhost"),
            port: var_numerica("PORT", 3000),
            database_url: var_ou("DATABASE_URL", ""),
            jwt_secret: var_ou("JWT_SECRET", "default-jwt-secret-for-development"),
            jwt_expires_in_days: var_numerica("JWT_EXPIRES_IN_DAYS", 7),
            admin_name: var_ou("ADMIN_NAME", "Administrador"),
            admin_password: var_ou("ADMIN_PASSWORD", "admin123"),
            login_attempts_limit: var_numerica("LOGIN_ATTEMPTS_LIMIT", 5),
            login_block_time_ms: var_numerica("LOGIN_BLOCK_TIME", 900_000),
            image_host_url: var_ou("IMAGE_HOST_URL", ""),
            image_host_api_key: var_ou("IMAGE_HOST_API_KEY", ""),
            image_host_folder: var_ou("IMAGE_HOST_FOLDER", "recortes"),
        }
    }

    /// Janela de bloqueio do guardião de força bruta.
    pub fn janela_bloqueio(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.login_block_time_ms)
    }

    /// Loga a configuração carregada na subida do processo, sem expor
    /// segredos, e avisa quando valores de desenvolvimento estão em uso.
    pub fn registrar(&self) {
        info!("Configuração carregada:");
        info!("  HOST: {}", self.host);
        info!("  PORT: {}", self.port);
        info!(
            "  DATABASE_URL: {}",
            if self.database_url.is_empty() { "ausente" } else { "definida" }
        );
        info!(
            "  JWT_SECRET: {}",
            if self.jwt_secret == "default-jwt-secret-for-development" {
                "padrão de desenvolvimento"
            } else {
                "definida"
            }
        );
        info!("  LOGIN_ATTEMPTS_LIMIT: {}", self.login_attempts_limit);
        info!("  LOGIN_BLOCK_TIME: {}ms", self.login_block_time_ms);

        if self.database_url.is_empty() {
            warn!("DATABASE_URL não definida");
        }
        if self.jwt_secret == "default-jwt-secret-for-development" {
            warn!("JWT_SECRET usando o padrão de desenvolvimento");
        }
        if self.admin_password == "admin123" {
            warn!("ADMIN_PASSWORD usando o padrão de desenvolvimento");
        }
        if self.image_host_url.is_empty() {
            warn!("IMAGE_HOST_URL não definida; uploads de imagem vão falhar");
        }
    }
}
