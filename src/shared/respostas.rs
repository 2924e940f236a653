// src/shared/respostas.rs

use serde::Serialize;

/// Envelope padrão das respostas da API: `{ success, message, error? }`.
/// `error` carrega o código estável (machine-readable); `message` é o texto
/// exibido ao usuário final.
#[derive(Serialize)]
pub struct RespostaApi {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")] // Não serializa 'error' se for None
    pub error: Option<String>,
}

impl RespostaApi {
    pub fn sucesso(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
        }
    }

    pub fn erro(codigo: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(codigo.to_string()),
        }
    }
}
