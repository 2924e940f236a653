// src/auth/auth_router.rs

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::query_as;

use super::auth_middleware::UsuarioAutenticado;
use super::brute_force::{self, Portao};
use super::{senha, token};
use crate::shared::erros::ApiError;
use crate::usuarios::usuario_structs::Usuario;
use crate::AppState;

/// Corpo do login. Só existe senha compartilhada, sem nome de usuário.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// Identidade pública do usuário, devolvida no login e na validação.
#[derive(Serialize)]
pub struct UsuarioPublico {
    pub id: i32,
    pub name: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UsuarioPublico,
    pub message: String,
}

fn ip_do_cliente(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rota de login.
///
/// A senha informada é testada contra todos os digests cadastrados, na
/// ordem do banco, e o primeiro que bater vence. Varredura linear de
/// propósito: o alvo da busca é um hash salgado, não uma chave. O(n) em
/// usuários, aceitável só em escala pequena.
#[post("/login")]
pub async fn fazer_login(
    data: web::Data<AppState>,
    req: HttpRequest,
    corpo: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let ip = ip_do_cliente(&req);

    // Portão do guardião de força bruta, antes de tocar nas credenciais.
    if let Portao::Bloqueado { minutos_restantes } =
        brute_force::verificar_bloqueio(&data.db_pool, &ip).await
    {
        return Err(ApiError::muitas_tentativas(format!(
            "IP bloqueado devido a muitas tentativas de login. Tente novamente em {} minutos.",
            minutos_restantes
        )));
    }

    let Some(senha_informada) = corpo.password.as_deref().filter(|s| !s.is_empty()) else {
        brute_force::registrar_tentativa(&data.db_pool, &ip, false, &data.config).await;
        return Err(ApiError::validacao("MISSING_PASSWORD", "Senha é obrigatória"));
    };

    let usuarios = query_as::<_, Usuario>(
        "SELECT id, name, password, role, description, created_by, created_at, updated_at
         FROM users ORDER BY id",
    )
    .fetch_all(&data.db_pool)
    .await?;

    let mut autenticado = None;
    for usuario in &usuarios {
        if senha::conferir(senha_informada, &usuario.password)? {
            autenticado = Some(usuario);
            break;
        }
    }

    let Some(usuario) = autenticado else {
        brute_force::registrar_tentativa(&data.db_pool, &ip, false, &data.config).await;
        return Err(ApiError::nao_autenticado("INVALID_PASSWORD", "Senha incorreta"));
    };

    let token = token::emitir(
        usuario.id,
        &usuario.name,
        &usuario.role,
        &data.config.jwt_secret,
        data.config.jwt_expires_in_days,
    )?;

    // Sucesso zera o livro-razão do IP, qualquer que fosse a contagem.
    brute_force::registrar_tentativa(&data.db_pool, &ip, true, &data.config).await;

    Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        token,
        user: UsuarioPublico {
            id: usuario.id,
            name: usuario.name.clone(),
            role: usuario.role.clone(),
        },
        message: "Login realizado com sucesso".to_string(),
    }))
}

/// Confirma que o token é válido e devolve a identidade embutida nele.
#[get("/validate")]
pub async fn validar_token(usuario: UsuarioAutenticado) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": {
            "id": usuario.user_id,
            "name": usuario.user_name,
            "role": usuario.user_role,
        },
        "message": "Token válido",
    }))
}
