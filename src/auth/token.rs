// src/auth/token.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Payload do token de sessão. Autocontido: depois que assinatura e
/// expiração passam, as claims são confiadas como estão: não há
/// revalidação no banco a cada requisição, então o token de um usuário
/// deletado continua válido até expirar naturalmente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i32,
    pub user_name: String,
    pub user_role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Falhas de verificação, distinguidas porque viram status diferentes na
/// borda HTTP (401 para expirado, 403 para inválido).
#[derive(Debug, PartialEq, Eq)]
pub enum ErroToken {
    Expirado,
    Invalido,
}

/// Assina um token HS256 com a identidade do usuário e validade em dias.
pub fn emitir(
    user_id: i32,
    user_name: &str,
    user_role: &str,
    secret: &str,
    validade_dias: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let agora = Utc::now().timestamp();
    let claims = Claims {
        user_id,
        user_name: user_name.to_string(),
        user_role: user_role.to_string(),
        iat: agora,
        exp: agora + validade_dias * 86_400,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

/// Decodifica e valida um token. Leeway zero: expirado é expirado.
pub fn verificar(token: &str, secret: &str) -> Result<Claims, ErroToken> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .map(|dados| dados.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ErroToken::Expirado,
        _ => ErroToken::Invalido,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEGREDO: &str = "segredo-de-teste";

    #[test]
    fn emite_e_verifica_antes_de_expirar() {
        let token = emitir(42, "Maria", "user", SEGREDO, 7).unwrap();
        let claims = verificar(&token, SEGREDO).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.user_name, "Maria");
        assert_eq!(claims.user_role, "user");
        assert_eq!(claims.exp - claims.iat, 7 * 86_400);
    }

    #[test]
    fn token_expirado_vira_erro_expirado() {
        // Validade negativa coloca o exp no passado.
        let token = emitir(1, "Administrador", "admin", SEGREDO, -1).unwrap();
        assert_eq!(verificar(&token, SEGREDO), Err(ErroToken::Expirado));
    }

    #[test]
    fn assinatura_errada_vira_erro_invalido() {
        let token = emitir(1, "Administrador", "admin", SEGREDO, 7).unwrap();
        assert_eq!(verificar(&token, "outro-segredo"), Err(ErroToken::Invalido));
    }

    #[test]
    fn lixo_vira_erro_invalido() {
        assert_eq!(verificar("nao-e-um-jwt", SEGREDO), Err(ErroToken::Invalido));
    }
}
