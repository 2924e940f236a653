// src/recortes/recorte_structs.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Vocabulários fechados do catálogo. Valores fora destas listas são
/// rejeitados com o código de erro do campo correspondente.
pub const TIPOS_RECORTE: [&str; 3] = ["frente", "aba", "lateral"];
pub const POSICOES: [&str; 2] = ["frente", "traseira"];
pub const TIPOS_PRODUTO: [&str; 2] = ["americano", "trucker"];
pub const MATERIAIS: [&str; 1] = ["linho"];
pub const CORES: [&str; 2] = ["azul marinho", "laranja"];

pub fn vocabulario_contem(aceitos: &[&str], valor: &str) -> bool {
    aceitos.contains(&valor)
}

/// Recorte como persistido e serializado.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recorte {
    pub id: i32,
    pub nome: String,
    pub ordem: i32,
    pub sku: String,
    pub tipo_recorte: String,
    pub posicao: String,
    pub tipo_produto: String,
    pub material: String,
    pub cor: String,
    pub url_imagem: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Corpo da criação. Tudo opcional na desserialização para que os campos
/// ausentes apareçam listados em `missingFields`, em vez de um 400 genérico
/// do desserializador. `ordem` chega como número JSON e é validada como
/// inteiro ≥ 1 no handler.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovoRecorte {
    pub nome: Option<String>,
    pub ordem: Option<f64>,
    pub sku: Option<String>,
    pub tipo_recorte: Option<String>,
    pub posicao: Option<String>,
    pub tipo_produto: Option<String>,
    pub material: Option<String>,
    pub cor: Option<String>,
    pub url_imagem: Option<String>,
    pub status: Option<bool>,
}

/// Corpo da atualização parcial: só os campos presentes são alterados.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarRecorte {
    pub nome: Option<String>,
    pub ordem: Option<f64>,
    pub sku: Option<String>,
    pub tipo_recorte: Option<String>,
    pub posicao: Option<String>,
    pub tipo_produto: Option<String>,
    pub material: Option<String>,
    pub cor: Option<String>,
    pub url_imagem: Option<String>,
    pub status: Option<bool>,
}

/// Parâmetros de listagem: paginação, busca textual, filtros exatos e
/// ordenação.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltroRecortes {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub tipo_recorte: Option<String>,
    pub tipo_produto: Option<String>,
    pub material: Option<String>,
    pub cor: Option<String>,
    /// "true"/"false" na query string.
    pub status: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginacao {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Serialize)]
pub struct ListaRecortesResponse {
    pub success: bool,
    pub data: Vec<Recorte>,
    pub pagination: Paginacao,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabularios_aceitam_os_valores_do_dominio() {
        for v in TIPOS_RECORTE {
            assert!(vocabulario_contem(&TIPOS_RECORTE, v));
        }
        for v in POSICOES {
            assert!(vocabulario_contem(&POSICOES, v));
        }
        for v in TIPOS_PRODUTO {
            assert!(vocabulario_contem(&TIPOS_PRODUTO, v));
        }
        assert!(vocabulario_contem(&MATERIAIS, "linho"));
        // Cor com espaço é um valor válido, não dois tokens.
        assert!(vocabulario_contem(&CORES, "azul marinho"));
        assert!(vocabulario_contem(&CORES, "laranja"));
    }

    #[test]
    fn vocabularios_rejeitam_valores_estranhos() {
        assert!(!vocabulario_contem(&TIPOS_RECORTE, "invalid"));
        assert!(!vocabulario_contem(&TIPOS_RECORTE, "FRENTE"));
        assert!(!vocabulario_contem(&POSICOES, "lateral"));
        assert!(!vocabulario_contem(&CORES, "azul"));
        assert!(!vocabulario_contem(&MATERIAIS, ""));
    }
}
