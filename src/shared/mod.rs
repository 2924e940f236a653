// src/shared/mod.rs

// Envelope padrão de resposta da API
pub mod respostas;
// Taxonomia de erros e conversão para respostas HTTP
pub mod erros;
