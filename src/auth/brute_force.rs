// src/auth/brute_force.rs

use chrono::{DateTime, Utc};
use sqlx::{query, query_as, FromRow, Pool, Postgres};
use tracing::warn;

use crate::config::Config;

/// Linha do livro-razão de tentativas de login, uma por IP ativo.
#[derive(FromRow)]
struct TentativaLogin {
    id: i32,
    attempts: i32,
    blocked_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
}

/// Decisão do portão, consultada antes de tocar nas credenciais.
#[derive(Debug, PartialEq, Eq)]
pub enum Portao {
    Liberado,
    Bloqueado { minutos_restantes: i64 },
}

/// Minutos inteiros até o fim do bloqueio, arredondando para cima.
fn minutos_restantes(expires_at: DateTime<Utc>, agora: DateTime<Utc>) -> i64 {
    let segundos = (expires_at - agora).num_seconds().max(0);
    (segundos + 59) / 60
}

/// Checa se o IP está bloqueado. Um bloqueio cuja janela já venceu é
/// removido preguiçosamente aqui mesmo. Erros de banco são logados e
/// tratados como liberado: disponibilidade ganha de lockout estrito.
pub async fn verificar_bloqueio(pool: &Pool<Postgres>, ip: &str) -> Portao {
    let agora = Utc::now();

    let linha = match query_as::<_, TentativaLogin>(
        "SELECT id, attempts, blocked_at, expires_at FROM login_attempts WHERE ip = $1 LIMIT 1",
    )
    .bind(ip)
    .fetch_optional(pool)
    .await
    {
        Ok(linha) => linha,
        Err(e) => {
            warn!("erro ao consultar tentativas de login de {}: {:?}", ip, e);
            return Portao::Liberado;
        }
    };

    let Some(linha) = linha else {
        return Portao::Liberado;
    };

    if linha.blocked_at.is_some() {
        if linha.expires_at > agora {
            return Portao::Bloqueado {
                minutos_restantes: minutos_restantes(linha.expires_at, agora),
            };
        }
        // Bloqueio vencido: limpa o registro e deixa passar.
        if let Err(e) = query("DELETE FROM login_attempts WHERE id = $1")
            .bind(linha.id)
            .execute(pool)
            .await
        {
            warn!("erro ao limpar bloqueio vencido de {}: {:?}", ip, e);
        }
    }

    Portao::Liberado
}

/// Transição do livro-razão após uma tentativa, decidida antes de qualquer
/// escrita. Função pura: a contagem anterior entra, o que fazer sai.
#[derive(Debug, PartialEq, Eq)]
enum Transicao {
    /// Sucesso apaga todas as linhas do IP, qualquer que fosse a contagem.
    Limpa,
    /// Falha abaixo do limite: só a contagem sobe.
    Incrementa { tentativas: i32 },
    /// Falha que atinge o limite: carimba o bloqueio pela janela inteira.
    Bloqueia {
        tentativas: i32,
        expira_em: DateTime<Utc>,
    },
}

fn transicao(
    sucesso: bool,
    tentativas_anteriores: Option<i32>,
    limite: i32,
    agora: DateTime<Utc>,
    janela: chrono::Duration,
) -> Transicao {
    if sucesso {
        return Transicao::Limpa;
    }
    let tentativas = tentativas_anteriores.unwrap_or(0) + 1;
    if tentativas >= limite {
        Transicao::Bloqueia {
            tentativas,
            expira_em: agora + janela,
        }
    } else {
        Transicao::Incrementa { tentativas }
    }
}

/// Registra o desfecho de uma tentativa de login. Sucesso apaga todas as
/// linhas do IP, inclusive contagens antigas; falha cria ou incrementa
/// o contador e, ao atingir o limite, carimba `blocked_at` e renova
/// `expires_at`. Falhas de escrita são engolidas com aviso: a requisição
/// nunca é derrubada por causa do livro-razão.
///
/// Duas falhas quase simultâneas do mesmo IP podem disputar o
/// read-then-write e subcontar em um. Relaxamento aceito; a alternativa
/// seria serializar todos os logins.
pub async fn registrar_tentativa(pool: &Pool<Postgres>, ip: &str, sucesso: bool, config: &Config) {
    if let Err(e) = registrar(pool, ip, sucesso, config).await {
        warn!("erro ao registrar tentativa de login de {}: {:?}", ip, e);
    }
}

async fn registrar(
    pool: &Pool<Postgres>,
    ip: &str,
    sucesso: bool,
    config: &Config,
) -> Result<(), sqlx::Error> {
    let agora = Utc::now();

    let existente = if sucesso {
        None
    } else {
        query_as::<_, TentativaLogin>(
            "SELECT id, attempts, blocked_at, expires_at FROM login_attempts WHERE ip = $1 LIMIT 1",
        )
        .bind(ip)
        .fetch_optional(pool)
        .await?
    };

    match transicao(
        sucesso,
        existente.as_ref().map(|linha| linha.attempts),
        config.login_attempts_limit,
        agora,
        config.janela_bloqueio(),
    ) {
        Transicao::Limpa => {
            query("DELETE FROM login_attempts WHERE ip = $1")
                .bind(ip)
                .execute(pool)
                .await?;
        }
        Transicao::Incrementa { tentativas } => match &existente {
            Some(linha) => {
                query("UPDATE login_attempts SET attempts = $1, updated_at = $2 WHERE id = $3")
                    .bind(tentativas)
                    .bind(agora)
                    .bind(linha.id)
                    .execute(pool)
                    .await?;
            }
            None => {
                // Primeira falha deste IP.
                query(
                    "INSERT INTO login_attempts (ip, attempts, expires_at, updated_at)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(ip)
                .bind(tentativas)
                .bind(agora + config.janela_bloqueio())
                .bind(agora)
                .execute(pool)
                .await?;
            }
        },
        Transicao::Bloqueia {
            tentativas,
            expira_em,
        } => match &existente {
            Some(linha) => {
                query(
                    "UPDATE login_attempts
                     SET attempts = $1, blocked_at = $2, expires_at = $3, updated_at = $2
                     WHERE id = $4",
                )
                .bind(tentativas)
                .bind(agora)
                .bind(expira_em)
                .bind(linha.id)
                .execute(pool)
                .await?;
            }
            None => {
                // Limite 1: a primeira falha já nasce bloqueada.
                query(
                    "INSERT INTO login_attempts (ip, attempts, blocked_at, expires_at, updated_at)
                     VALUES ($1, $2, $3, $4, $3)",
                )
                .bind(ip)
                .bind(tentativas)
                .bind(agora)
                .bind(expira_em)
                .execute(pool)
                .await?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn minutos_restantes_arredonda_para_cima() {
        let agora = Utc::now();
        assert_eq!(minutos_restantes(agora + Duration::seconds(61), agora), 2);
        assert_eq!(minutos_restantes(agora + Duration::seconds(60), agora), 1);
        assert_eq!(minutos_restantes(agora + Duration::seconds(1), agora), 1);
        assert_eq!(minutos_restantes(agora + Duration::minutes(15), agora), 15);
    }

    #[test]
    fn minutos_restantes_nunca_negativo() {
        let agora = Utc::now();
        assert_eq!(minutos_restantes(agora - Duration::minutes(5), agora), 0);
    }

    fn janela() -> Duration {
        Duration::milliseconds(900_000)
    }

    #[test]
    fn sucesso_limpa_o_livro_razao_qualquer_que_fosse_a_contagem() {
        let agora = Utc::now();
        assert_eq!(transicao(true, None, 5, agora, janela()), Transicao::Limpa);
        assert_eq!(transicao(true, Some(4), 5, agora, janela()), Transicao::Limpa);
        assert_eq!(transicao(true, Some(99), 5, agora, janela()), Transicao::Limpa);
    }

    #[test]
    fn falhas_abaixo_do_limite_so_incrementam() {
        let agora = Utc::now();
        assert_eq!(
            transicao(false, None, 5, agora, janela()),
            Transicao::Incrementa { tentativas: 1 }
        );
        // Quarta falha com limite 5: ainda não bloqueia.
        assert_eq!(
            transicao(false, Some(3), 5, agora, janela()),
            Transicao::Incrementa { tentativas: 4 }
        );
    }

    #[test]
    fn a_falha_que_atinge_o_limite_bloqueia_pela_janela_inteira() {
        let agora = Utc::now();
        assert_eq!(
            transicao(false, Some(4), 5, agora, janela()),
            Transicao::Bloqueia {
                tentativas: 5,
                expira_em: agora + janela(),
            }
        );
        // Acima do limite continua bloqueado, renovando a janela.
        assert_eq!(
            transicao(false, Some(7), 5, agora, janela()),
            Transicao::Bloqueia {
                tentativas: 8,
                expira_em: agora + janela(),
            }
        );
    }

    #[test]
    fn limite_um_bloqueia_na_primeira_falha() {
        let agora = Utc::now();
        assert_eq!(
            transicao(false, None, 1, agora, janela()),
            Transicao::Bloqueia {
                tentativas: 1,
                expira_em: agora + janela(),
            }
        );
    }
}
