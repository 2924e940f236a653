// src/auth/policy.rs
//
// Política de autorização: funções puras de decisão, sem I/O. Os handlers
// montam `Ator` a partir do token e `Alvo` a partir do registro buscado, e
// só então consultam a política.

/// Papéis reconhecidos pelo sistema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Papel {
    Admin,
    User,
}

impl Papel {
    /// Converte a coluna `role` do banco. Qualquer valor desconhecido cai
    /// em `User`, o papel de menor privilégio.
    pub fn parse(valor: &str) -> Self {
        if valor == "admin" {
            Self::Admin
        } else {
            Self::User
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

/// Quem faz a chamada, conforme o token de sessão.
#[derive(Debug, Clone, Copy)]
pub struct Ator {
    pub id: i32,
    pub papel: Papel,
}

/// Visão mínima do usuário-alvo necessária para decidir.
#[derive(Debug, Clone, Copy)]
pub struct Alvo {
    pub id: i32,
    pub papel: Papel,
    pub criado_por: Option<i32>,
}

/// Atualização de usuário: admin sempre pode; usuário comum pode atualizar
/// a si mesmo ou usuários comuns que ele criou.
pub fn pode_atualizar(ator: Ator, alvo: Alvo) -> bool {
    match ator.papel {
        Papel::Admin => true,
        Papel::User => {
            ator.id == alvo.id
                || (alvo.papel == Papel::User && alvo.criado_por == Some(ator.id))
        }
    }
}

/// Motivos de negação de deleção, cada um com seu código de erro na borda.
#[derive(Debug, PartialEq, Eq)]
pub enum MotivoNegacao {
    /// Alvo tem papel admin: ninguém deleta, nem outro admin.
    AlvoAdmin,
    /// Ninguém deleta a própria conta.
    AutoDelecao,
    /// Usuário comum só deleta usuários comuns que ele criou.
    SemPermissao,
}

/// Deleção de usuário. Os vetos incondicionais (alvo admin, auto-deleção)
/// são avaliados antes do papel do ator.
pub fn pode_deletar(ator: Ator, alvo: Alvo) -> Result<(), MotivoNegacao> {
    if alvo.papel == Papel::Admin {
        return Err(MotivoNegacao::AlvoAdmin);
    }
    if ator.id == alvo.id {
        return Err(MotivoNegacao::AutoDelecao);
    }
    match ator.papel {
        Papel::Admin => Ok(()),
        Papel::User => {
            if alvo.papel == Papel::User && alvo.criado_por == Some(ator.id) {
                Ok(())
            } else {
                Err(MotivoNegacao::SemPermissao)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Ator {
        Ator { id: 1, papel: Papel::Admin }
    }

    fn usuario(id: i32) -> Ator {
        Ator { id, papel: Papel::User }
    }

    fn alvo_comum(id: i32, criado_por: Option<i32>) -> Alvo {
        Alvo { id, papel: Papel::User, criado_por }
    }

    #[test]
    fn admin_atualiza_qualquer_um() {
        assert!(pode_atualizar(admin(), alvo_comum(10, None)));
        assert!(pode_atualizar(admin(), Alvo { id: 1, papel: Papel::Admin, criado_por: None }));
    }

    #[test]
    fn usuario_atualiza_a_si_mesmo() {
        assert!(pode_atualizar(usuario(5), alvo_comum(5, None)));
    }

    #[test]
    fn usuario_atualiza_quem_criou() {
        assert!(pode_atualizar(usuario(5), alvo_comum(9, Some(5))));
        assert!(!pode_atualizar(usuario(5), alvo_comum(9, Some(3))));
        assert!(!pode_atualizar(usuario(5), alvo_comum(9, None)));
    }

    #[test]
    fn usuario_nao_atualiza_admin_criado_por_ele() {
        // A relação de criação só vale para alvos com papel user.
        let alvo = Alvo { id: 9, papel: Papel::Admin, criado_por: Some(5) };
        assert!(!pode_atualizar(usuario(5), alvo));
    }

    #[test]
    fn ninguem_deleta_admin() {
        let alvo = Alvo { id: 2, papel: Papel::Admin, criado_por: None };
        assert_eq!(pode_deletar(admin(), alvo), Err(MotivoNegacao::AlvoAdmin));
        assert_eq!(pode_deletar(usuario(5), alvo), Err(MotivoNegacao::AlvoAdmin));
    }

    #[test]
    fn ninguem_deleta_a_propria_conta() {
        assert_eq!(
            pode_deletar(usuario(5), alvo_comum(5, None)),
            Err(MotivoNegacao::AutoDelecao)
        );
        // Vale até para admin (o veto de alvo admin vem antes).
        let proprio_admin = Alvo { id: 1, papel: Papel::Admin, criado_por: None };
        assert_eq!(pode_deletar(admin(), proprio_admin), Err(MotivoNegacao::AlvoAdmin));
    }

    #[test]
    fn admin_deleta_qualquer_nao_admin() {
        assert_eq!(pode_deletar(admin(), alvo_comum(10, Some(7))), Ok(()));
        assert_eq!(pode_deletar(admin(), alvo_comum(10, None)), Ok(()));
    }

    #[test]
    fn usuario_so_deleta_quem_criou() {
        assert_eq!(pode_deletar(usuario(5), alvo_comum(9, Some(5))), Ok(()));
        assert_eq!(
            pode_deletar(usuario(5), alvo_comum(9, Some(3))),
            Err(MotivoNegacao::SemPermissao)
        );
    }

    // Cenário completo: admin cria A; A cria B; A pode deletar B; C (sem
    // relação) não pode; admin pode.
    #[test]
    fn cadeia_de_criacao() {
        let a = usuario(2); // criado pelo admin
        let c = usuario(4); // sem relação com B
        let b = alvo_comum(3, Some(2));

        assert_eq!(pode_deletar(a, b), Ok(()));
        assert_eq!(pode_deletar(c, b), Err(MotivoNegacao::SemPermissao));
        assert_eq!(pode_deletar(admin(), b), Ok(()));
    }

    #[test]
    fn parse_de_papel_desconhecido_vira_user() {
        assert_eq!(Papel::parse("admin"), Papel::Admin);
        assert_eq!(Papel::parse("user"), Papel::User);
        assert_eq!(Papel::parse("qualquer-coisa"), Papel::User);
        assert_eq!(Papel::parse("admin").as_str(), "admin");
    }
}
