// src/auth/mod.rs

// Primitivo de hash de senha (bcrypt)
pub mod senha;
// Emissão e verificação de tokens de sessão (JWT)
pub mod token;
// Extrator de usuário autenticado a partir do cabeçalho Authorization
pub mod auth_middleware;
// Guardião de força bruta por IP
pub mod brute_force;
// Política de autorização (funções puras de decisão)
pub mod policy;
// Rotas de login e validação de token
pub mod auth_router;
