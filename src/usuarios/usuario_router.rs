// src/usuarios/usuario_router.rs

use actix_web::{delete, get, post, put, web, HttpResponse};
use sqlx::{query, query_as, Row};

use super::usuario_structs::{
    AtualizarUsuario, DeletarUsuario, FiltroUsuarios, FiltrosAplicados, ListaUsuariosResponse,
    NovoUsuario, Usuario, UsuarioListado,
};
use crate::auth::auth_middleware::UsuarioAutenticado;
use crate::auth::policy::{self, Alvo, Ator, MotivoNegacao, Papel};
use crate::auth::senha;
use crate::shared::erros::ApiError;
use crate::shared::respostas::RespostaApi;
use crate::AppState;

fn ator_de(usuario: &UsuarioAutenticado) -> Ator {
    Ator {
        id: usuario.user_id,
        papel: Papel::parse(&usuario.user_role),
    }
}

fn alvo_de(usuario: &Usuario) -> Alvo {
    Alvo {
        id: usuario.id,
        papel: Papel::parse(&usuario.role),
        criado_por: usuario.created_by,
    }
}

async fn buscar_usuario_por_id(
    data: &web::Data<AppState>,
    user_id: i32,
) -> Result<Option<Usuario>, sqlx::Error> {
    query_as::<_, Usuario>(
        "SELECT id, name, password, role, description, created_by, created_at, updated_at
         FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&data.db_pool)
    .await
}

/// Rota para cadastrar um novo usuário. Qualquer autenticado pode criar;
/// o novo usuário nasce com papel 'user' e `created_by` apontando para o
/// criador.
#[post("/users")]
pub async fn cadastrar_usuario(
    data: web::Data<AppState>,
    ator: UsuarioAutenticado,
    corpo: web::Json<NovoUsuario>,
) -> Result<HttpResponse, ApiError> {
    let nome = corpo.name.as_deref().unwrap_or("").trim();
    let senha_nova = corpo.password.as_deref().unwrap_or("");

    if nome.is_empty() || senha_nova.is_empty() {
        return Err(ApiError::validacao(
            "MISSING_REQUIRED_FIELDS",
            "Nome e senha são obrigatórios",
        ));
    }

    if senha_nova.len() < 4 {
        return Err(ApiError::validacao(
            "PASSWORD_TOO_SHORT",
            "Senha deve ter pelo menos 4 caracteres",
        ));
    }

    // Nome único entre todos os usuários.
    let nome_existente = query("SELECT id FROM users WHERE name = $1")
        .bind(nome)
        .fetch_optional(&data.db_pool)
        .await?;

    if nome_existente.is_some() {
        return Err(ApiError::conflito(
            "USER_NAME_EXISTS",
            "Já existe um usuário com este nome",
        ));
    }

    // Unicidade de senha: como só existe senha compartilhada no login, duas
    // contas com a mesma senha seriam indistinguíveis. O candidato é
    // conferido contra todos os digests. Varredura linear, sem atalho
    // possível por causa do sal.
    let digests = query_as::<_, (String,)>("SELECT password FROM users ORDER BY id")
        .fetch_all(&data.db_pool)
        .await?;

    for (digest,) in &digests {
        if senha::conferir(senha_nova, digest)? {
            return Err(ApiError::conflito(
                "PASSWORD_ALREADY_EXISTS",
                "Esta senha já está sendo usada por outro usuário",
            ));
        }
    }

    let digest = senha::gerar_hash(senha_nova)?;

    let linha = query(
        "INSERT INTO users (name, password, role, description, created_by)
         VALUES ($1, $2, 'user', $3, $4) RETURNING id",
    )
    .bind(nome)
    .bind(&digest)
    .bind(&corpo.description)
    .bind(ator.user_id)
    .fetch_one(&data.db_pool)
    .await?;

    let id: i32 = linha.try_get("id")?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "userId": id,
        "message": "Usuário criado com sucesso",
    })))
}

/// Rota para listar usuários, com busca por nome e ordenação.
#[get("/users")]
pub async fn listar_usuarios(
    data: web::Data<AppState>,
    _ator: UsuarioAutenticado,
    filtros: web::Query<FiltroUsuarios>,
) -> Result<HttpResponse, ApiError> {
    // Campos e direções fora da lista aceita caem no padrão.
    let (sort_by, coluna) = match filtros.sort_by.as_deref() {
        Some("name") => ("name", "u.name"),
        Some("createdAt") => ("createdAt", "u.created_at"),
        _ => ("role", "u.role"),
    };
    let sort_order = match filtros.sort_order.as_deref() {
        Some("asc") => "asc",
        _ => "desc",
    };
    let direcao = if sort_order == "asc" { "ASC" } else { "DESC" };

    // Critério secundário fixo por campo, para uma ordem estável.
    let ordenacao = match sort_by {
        "name" => format!("{coluna} {direcao}, u.role DESC"),
        "createdAt" => format!("{coluna} {direcao}, u.name ASC"),
        _ => format!("{coluna} {direcao}, u.name ASC"),
    };

    let busca = filtros
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut sql = String::from(
        "SELECT u.id, u.name, u.role, u.description, u.created_at, u.created_by,
                CASE WHEN u.created_by IS NULL THEN NULL
                     ELSE COALESCE(c.name, 'Sistema') END AS creator_name
         FROM users u
         LEFT JOIN users c ON c.id = u.created_by",
    );
    if busca.is_some() {
        sql.push_str(" WHERE u.name ILIKE $1");
    }
    sql.push_str(&format!(" ORDER BY {ordenacao}"));

    let usuarios: Vec<UsuarioListado> = match busca {
        Some(s) => {
            query_as(&sql)
                .bind(format!("%{}%", s))
                .fetch_all(&data.db_pool)
                .await?
        }
        None => query_as(&sql).fetch_all(&data.db_pool).await?,
    };

    let total = usuarios.len();
    let message = match busca {
        Some(s) => format!("{} usuário(s) encontrado(s) para \"{}\"", total, s),
        None => "Usuários listados com sucesso".to_string(),
    };

    Ok(HttpResponse::Ok().json(ListaUsuariosResponse {
        success: true,
        users: usuarios,
        total,
        filters: FiltrosAplicados {
            search: busca.map(str::to_string),
            sort_by: sort_by.to_string(),
            sort_order: sort_order.to_string(),
        },
        message,
    }))
}

/// Rota para atualizar nome e descrição de um usuário, conforme a política
/// de autorização.
#[put("/users/update")]
pub async fn atualizar_usuario(
    data: web::Data<AppState>,
    ator: UsuarioAutenticado,
    corpo: web::Json<AtualizarUsuario>,
) -> Result<HttpResponse, ApiError> {
    let Some(user_id) = corpo.user_id else {
        return Err(ApiError::validacao(
            "MISSING_USER_ID",
            "ID do usuário é obrigatório",
        ));
    };

    let Some(alvo) = buscar_usuario_por_id(&data, user_id).await? else {
        return Err(ApiError::nao_encontrado("USER_NOT_FOUND", "Usuário não encontrado"));
    };

    if !policy::pode_atualizar(ator_de(&ator), alvo_de(&alvo)) {
        return Err(ApiError::proibido(
            "INSUFFICIENT_PERMISSIONS",
            "Sem permissão para atualizar este usuário",
        ));
    }

    // Se o nome mudou, revalida a unicidade contra os demais usuários.
    if let Some(nome) = corpo.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        if nome != alvo.name {
            let conflito = query("SELECT id FROM users WHERE name = $1 AND id <> $2")
                .bind(nome)
                .bind(user_id)
                .fetch_optional(&data.db_pool)
                .await?;

            if conflito.is_some() {
                return Err(ApiError::conflito(
                    "USER_NAME_EXISTS",
                    "Já existe um usuário com este nome",
                ));
            }
        }
    }

    let nome_novo = corpo.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    // Descrição ausente preserva o valor atual; `null` explícito limpa.
    match &corpo.description {
        Some(descricao) => {
            query(
                "UPDATE users
                 SET name = COALESCE($1, name),
                     description = $2,
                     updated_at = now()
                 WHERE id = $3",
            )
            .bind(nome_novo)
            .bind(descricao)
            .bind(user_id)
            .execute(&data.db_pool)
            .await?;
        }
        None => {
            query(
                "UPDATE users
                 SET name = COALESCE($1, name),
                     updated_at = now()
                 WHERE id = $2",
            )
            .bind(nome_novo)
            .bind(user_id)
            .execute(&data.db_pool)
            .await?;
        }
    }

    Ok(HttpResponse::Ok().json(RespostaApi::sucesso("Usuário atualizado com sucesso")))
}

/// Rota para deletar um usuário. Cada motivo de negação da política tem um
/// código de erro próprio.
#[delete("/users/delete")]
pub async fn deletar_usuario(
    data: web::Data<AppState>,
    ator: UsuarioAutenticado,
    corpo: web::Json<DeletarUsuario>,
) -> Result<HttpResponse, ApiError> {
    let Some(user_id) = corpo.user_id else {
        return Err(ApiError::validacao(
            "MISSING_USER_ID",
            "ID do usuário é obrigatório",
        ));
    };

    let Some(alvo) = buscar_usuario_por_id(&data, user_id).await? else {
        return Err(ApiError::nao_encontrado("USER_NOT_FOUND", "Usuário não encontrado"));
    };

    match policy::pode_deletar(ator_de(&ator), alvo_de(&alvo)) {
        Ok(()) => {}
        Err(MotivoNegacao::AlvoAdmin) => {
            return Err(ApiError::proibido(
                "CANNOT_DELETE_ADMIN",
                "Não é possível deletar o administrador principal",
            ));
        }
        Err(MotivoNegacao::AutoDelecao) => {
            return Err(ApiError::proibido(
                "CANNOT_DELETE_SELF",
                "Não é possível deletar sua própria conta",
            ));
        }
        Err(MotivoNegacao::SemPermissao) => {
            return Err(ApiError::proibido(
                "INSUFFICIENT_PERMISSIONS",
                "Sem permissão para deletar este usuário",
            ));
        }
    }

    query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&data.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(RespostaApi::sucesso("Usuário deletado com sucesso")))
}
