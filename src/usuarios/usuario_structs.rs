// src/usuarios/usuario_structs.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Usuário como persistido no banco. O hash da senha nunca sai na resposta.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub description: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Corpo do cadastro de um novo usuário. Campos opcionais para que a
/// ausência vire erro de validação com código próprio, não 400 genérico.
#[derive(Deserialize)]
pub struct NovoUsuario {
    pub name: Option<String>,
    pub password: Option<String>,
    pub description: Option<String>,
}

/// Distingue campo presente (mesmo que `null`) de campo ausente: o serde
/// padrão colapsaria os dois em `None`.
fn presente_ou_nulo<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarUsuario {
    pub user_id: Option<i32>,
    pub name: Option<String>,
    /// Ausente preserva a descrição atual; `null` explícito a limpa.
    #[serde(default, deserialize_with = "presente_ou_nulo")]
    pub description: Option<Option<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletarUsuario {
    pub user_id: Option<i32>,
}

/// Parâmetros de busca e ordenação da listagem.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltroUsuarios {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Item da listagem, com o nome do criador já resolvido. `creatorName` é
/// nulo para usuários criados pelo sistema e "Sistema" quando a referência
/// de criador ficou pendurada (criador deletado).
#[derive(Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioListado {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<i32>,
    pub creator_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltrosAplicados {
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_order: String,
}

#[derive(Serialize)]
pub struct ListaUsuariosResponse {
    pub success: bool,
    pub users: Vec<UsuarioListado>,
    pub total: usize,
    pub filters: FiltrosAplicados,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descricao_ausente_e_nula_sao_distinguidas() {
        let ausente: AtualizarUsuario = serde_json::from_str(r#"{"userId": 1}"#).unwrap();
        assert_eq!(ausente.description, None);

        let nula: AtualizarUsuario =
            serde_json::from_str(r#"{"userId": 1, "description": null}"#).unwrap();
        assert_eq!(nula.description, Some(None));

        let presente: AtualizarUsuario =
            serde_json::from_str(r#"{"userId": 1, "description": "nova"}"#).unwrap();
        assert_eq!(presente.description, Some(Some("nova".to_string())));
    }
}
