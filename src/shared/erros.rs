// src/shared/erros.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use super::respostas::RespostaApi;

/// Taxonomia de erros da API. As variantes "de negócio" carregam o código
/// estável e a mensagem mostrada ao cliente; as variantes de infraestrutura
/// (banco, bcrypt, token, multipart, host de imagens) são convertidas via
/// `From` e rebaixadas para um 500 genérico na borda: o detalhe interno vai
/// para o log, nunca para o cliente.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{mensagem}")]
    Validacao {
        codigo: &'static str,
        mensagem: String,
    },

    #[error("{mensagem}")]
    NaoAutenticado {
        codigo: &'static str,
        mensagem: String,
    },

    #[error("{mensagem}")]
    Proibido {
        codigo: &'static str,
        mensagem: String,
    },

    #[error("{mensagem}")]
    NaoEncontrado {
        codigo: &'static str,
        mensagem: String,
    },

    #[error("{mensagem}")]
    Conflito {
        codigo: &'static str,
        mensagem: String,
    },

    #[error("{mensagem}")]
    MuitasTentativas { mensagem: String },

    #[error("erro de banco de dados: {0}")]
    Banco(#[from] sqlx::Error),

    #[error("erro ao processar senha: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("erro ao assinar token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("multipart inválido: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error("falha no host de imagens: {0}")]
    Upload(#[from] crate::recortes::image_host::ErroImagem),
}

impl ApiError {
    pub fn validacao(codigo: &'static str, mensagem: impl Into<String>) -> Self {
        Self::Validacao {
            codigo,
            mensagem: mensagem.into(),
        }
    }

    pub fn nao_autenticado(codigo: &'static str, mensagem: impl Into<String>) -> Self {
        Self::NaoAutenticado {
            codigo,
            mensagem: mensagem.into(),
        }
    }

    pub fn proibido(codigo: &'static str, mensagem: impl Into<String>) -> Self {
        Self::Proibido {
            codigo,
            mensagem: mensagem.into(),
        }
    }

    pub fn nao_encontrado(codigo: &'static str, mensagem: impl Into<String>) -> Self {
        Self::NaoEncontrado {
            codigo,
            mensagem: mensagem.into(),
        }
    }

    pub fn conflito(codigo: &'static str, mensagem: impl Into<String>) -> Self {
        Self::Conflito {
            codigo,
            mensagem: mensagem.into(),
        }
    }

    pub fn muitas_tentativas(mensagem: impl Into<String>) -> Self {
        Self::MuitasTentativas {
            mensagem: mensagem.into(),
        }
    }
}

/// Violação de restrição UNIQUE do Postgres (código SQLSTATE 23505).
fn violacao_unicidade(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validacao { .. } | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::NaoAutenticado { .. } => StatusCode::UNAUTHORIZED,
            Self::Proibido { .. } => StatusCode::FORBIDDEN,
            Self::NaoEncontrado { .. } => StatusCode::NOT_FOUND,
            Self::Conflito { .. } => StatusCode::CONFLICT,
            Self::MuitasTentativas { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Banco(e) if violacao_unicidade(e) => StatusCode::CONFLICT,
            Self::Banco(_) | Self::Hash(_) | Self::Token(_) | Self::Upload(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Validacao { codigo, mensagem } => {
                HttpResponse::BadRequest().json(RespostaApi::erro(codigo, mensagem.clone()))
            }
            Self::NaoAutenticado { codigo, mensagem } => {
                HttpResponse::Unauthorized().json(RespostaApi::erro(codigo, mensagem.clone()))
            }
            Self::Proibido { codigo, mensagem } => {
                HttpResponse::Forbidden().json(RespostaApi::erro(codigo, mensagem.clone()))
            }
            Self::NaoEncontrado { codigo, mensagem } => {
                HttpResponse::NotFound().json(RespostaApi::erro(codigo, mensagem.clone()))
            }
            Self::Conflito { codigo, mensagem } => {
                HttpResponse::Conflict().json(RespostaApi::erro(codigo, mensagem.clone()))
            }
            Self::MuitasTentativas { mensagem } => HttpResponse::TooManyRequests()
                .json(RespostaApi::erro("TOO_MANY_ATTEMPTS", mensagem.clone())),
            Self::Multipart(e) => {
                HttpResponse::BadRequest().json(RespostaApi::erro(
                    "INVALID_MULTIPART",
                    format!("Requisição multipart inválida: {}", e),
                ))
            }
            // A corrida estreita entre pré-verificação e escrita é coberta
            // pelas restrições UNIQUE do banco; a violação vira 409.
            Self::Banco(e) if violacao_unicidade(e) => HttpResponse::Conflict().json(
                RespostaApi::erro(
                    "UNIQUE_CONSTRAINT_ERROR",
                    "Violação de restrição única no banco de dados",
                ),
            ),
            Self::Banco(e) => {
                error!("erro de banco de dados: {:?}", e);
                resposta_interna()
            }
            Self::Hash(e) => {
                error!("erro de bcrypt: {:?}", e);
                resposta_interna()
            }
            Self::Token(e) => {
                error!("erro ao assinar token: {:?}", e);
                resposta_interna()
            }
            Self::Upload(e) => {
                error!("falha no host de imagens: {:?}", e);
                HttpResponse::InternalServerError()
                    .json(RespostaApi::erro("UPLOAD_ERROR", "Erro interno do servidor"))
            }
        }
    }
}

fn resposta_interna() -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(RespostaApi::erro("INTERNAL_ERROR", "Erro interno do servidor"))
}
