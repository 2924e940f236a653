// src/auth/senha.rs

/// Custo fixo do bcrypt. A verificação roda em tempo proporcional ao fator
/// de trabalho do digest armazenado, nunca ao conteúdo da senha.
pub const CUSTO_BCRYPT: u32 = 12;

/// Gera o digest salgado de uma senha em texto claro. Irreversível.
pub fn gerar_hash(senha: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(senha, CUSTO_BCRYPT)
}

/// Confere uma senha em texto claro contra um digest armazenado.
pub fn conferir(senha: &str, digest: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(senha, digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_e_verificacao() {
        let digest = gerar_hash("admin123").unwrap();
        assert_ne!(digest, "admin123");
        assert!(conferir("admin123", &digest).unwrap());
        assert!(!conferir("errada", &digest).unwrap());
    }

    #[test]
    fn digests_da_mesma_senha_diferem_pelo_sal() {
        let a = gerar_hash("mesma-senha").unwrap();
        let b = gerar_hash("mesma-senha").unwrap();
        assert_ne!(a, b);
        assert!(conferir("mesma-senha", &a).unwrap());
        assert!(conferir("mesma-senha", &b).unwrap());
    }
}
