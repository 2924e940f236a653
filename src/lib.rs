// src/lib.rs

use actix_web::web;
use sqlx::{Pool, Postgres};

// Importa os módulos
//
// O Rust encontrará o arquivo `src/<modulo>/mod.rs` e, a partir dele, os
// submódulos.
pub mod auth;     // Módulo de autenticação (login, token, brute force, policy)
pub mod config;   // Configuração via variáveis de ambiente
pub mod db;       // Criação idempotente das tabelas
pub mod recortes; // Módulo de recortes (catálogo)
pub mod shared;   // Módulo shared (erros e respostas)
pub mod usuarios; // Módulo de usuários

// Estado compartilhado entre as rotas: pool do banco, configuração carregada
// na subida e o cliente do host de imagens.
pub struct AppState {
    pub db_pool: Pool<Postgres>,
    pub config: config::Config,
    pub image_host: recortes::image_host::ImageHost,
}

/// Registra todas as rotas da API. Extraída para fora do `main` para que os
/// testes de integração montem o mesmo App.
///
/// A ordem importa nas rotas de recortes: `/recortes/sku/{sku}` e
/// `/recortes/{id}/imagem` precisam vir antes de `/recortes/{id}`.
pub fn configurar_rotas(cfg: &mut web::ServiceConfig) {
    cfg
        // Módulo de Autenticação
        .service(auth::auth_router::fazer_login)
        .service(auth::auth_router::validar_token)
        // Módulo de Usuários
        .service(usuarios::usuario_router::cadastrar_usuario)
        .service(usuarios::usuario_router::listar_usuarios)
        .service(usuarios::usuario_router::atualizar_usuario)
        .service(usuarios::usuario_router::deletar_usuario)
        // Módulo de Recortes
        .service(recortes::recorte_router::upload_imagem)
        .service(recortes::recorte_router::cadastrar_recorte)
        .service(recortes::recorte_router::buscar_recortes)
        .service(recortes::recorte_router::buscar_recorte_por_sku)
        .service(recortes::recorte_router::atualizar_imagem_recorte)
        .service(recortes::recorte_router::buscar_recorte_por_id)
        .service(recortes::recorte_router::atualizar_recorte)
        .service(recortes::recorte_router::deletar_recorte);
}
