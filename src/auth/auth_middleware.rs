// src/auth/auth_middleware.rs

use actix_web::{
    dev::Payload, error::InternalError, web, FromRequest, HttpRequest, HttpResponse,
};
use futures::future::{ready, Ready};
use tracing::error;

use super::token::{self, ErroToken};
use crate::shared::respostas::RespostaApi;
use crate::AppState;

/// Identidade extraída do token de sessão, disponível para qualquer rota
/// protegida como parâmetro do handler. A verificação é puramente
/// computacional: nenhum acesso ao banco acontece aqui.
#[derive(Debug, Clone)]
pub struct UsuarioAutenticado {
    pub user_id: i32,
    pub user_name: String,
    pub user_role: String,
}

fn recusar(resposta: HttpResponse) -> actix_web::Error {
    InternalError::from_response("autenticação recusada", resposta).into()
}

/// Extrator de autenticação para Actix Web: valida o JWT do cabeçalho
/// `Authorization: Bearer <token>`.
impl FromRequest for UsuarioAutenticado {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            error!("AppState indisponível no extrator de autenticação");
            return ready(Err(recusar(HttpResponse::InternalServerError().json(
                RespostaApi::erro("INTERNAL_ERROR", "Erro interno do servidor"),
            ))));
        };

        // Cabeçalho Authorization no formato "Bearer <token>"
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
        {
            Some(valor) if valor.starts_with("Bearer ") => {
                valor.trim_start_matches("Bearer ").to_string()
            }
            _ => {
                return ready(Err(recusar(HttpResponse::Unauthorized().json(
                    RespostaApi::erro("MISSING_TOKEN", "Token de acesso requerido"),
                ))));
            }
        };

        match token::verificar(&token, &state.config.jwt_secret) {
            Ok(claims) => ready(Ok(Self {
                user_id: claims.user_id,
                user_name: claims.user_name,
                user_role: claims.user_role,
            })),
            Err(ErroToken::Expirado) => ready(Err(recusar(
                HttpResponse::Unauthorized()
                    .json(RespostaApi::erro("TOKEN_EXPIRED", "Token expirado")),
            ))),
            Err(ErroToken::Invalido) => ready(Err(recusar(
                HttpResponse::Forbidden()
                    .json(RespostaApi::erro("INVALID_TOKEN", "Token inválido")),
            ))),
        }
    }
}
