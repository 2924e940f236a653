// src/recortes/recorte_router.rs

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use sqlx::{query, query_as, Postgres, QueryBuilder};
use tracing::warn;

use super::recorte_structs::{
    AtualizarRecorte, FiltroRecortes, ListaRecortesResponse, NovoRecorte, Paginacao, Recorte,
    vocabulario_contem, CORES, MATERIAIS, POSICOES, TIPOS_PRODUTO, TIPOS_RECORTE,
};
use crate::auth::auth_middleware::UsuarioAutenticado;
use crate::shared::erros::ApiError;
use crate::shared::respostas::RespostaApi;
use crate::AppState;

const COLUNAS: &str = "id, nome, ordem, sku, tipo_recorte, posicao, tipo_produto, material, cor,
                       url_imagem, status, created_at, updated_at";

/// O id na URL precisa ser um inteiro; qualquer outra coisa é 400, não 404.
fn analisar_id(bruto: &str) -> Result<i32, ApiError> {
    bruto.parse().map_err(|_| {
        ApiError::validacao("INVALID_ID_FORMAT", "ID inválido. Deve ser um número inteiro")
    })
}

/// Nome de arquivo no host de imagens:
/// `{tipoProduto}_{tipoRecorte}_{material}_{cor}`, com espaços virando hífen.
fn nome_de_arquivo(tipo_produto: &str, tipo_recorte: &str, material: &str, cor: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        tipo_produto.replace(' ', "-"),
        tipo_recorte,
        material,
        cor.replace(' ', "-")
    )
}

fn validar_vocabulario(
    valor: &str,
    aceitos: &[&str],
    codigo: &'static str,
    rotulo: &str,
) -> Result<(), ApiError> {
    if vocabulario_contem(aceitos, valor) {
        Ok(())
    } else {
        Err(ApiError::validacao(
            codigo,
            format!("{}. Valores aceitos: {}", rotulo, aceitos.join(", ")),
        ))
    }
}

/// `ordem` chega como número JSON; só inteiros ≥ 1 são aceitos.
fn validar_ordem(ordem: f64) -> Result<i32, ApiError> {
    if ordem.fract() == 0.0 && ordem >= 1.0 && ordem <= i32::MAX as f64 {
        Ok(ordem as i32)
    } else {
        Err(ApiError::validacao(
            "INVALID_ORDEM",
            "Ordem deve ser um número inteiro positivo",
        ))
    }
}

/// Consome um corpo multipart, separando o campo `file` (bytes) dos campos
/// de texto.
async fn ler_multipart(
    mut payload: Multipart,
) -> Result<(Option<Vec<u8>>, HashMap<String, String>), ApiError> {
    let mut arquivo: Option<Vec<u8>> = None;
    let mut campos = HashMap::new();

    while let Some(mut field) = payload.try_next().await? {
        let nome = field.name().to_string();
        let mut dados = Vec::new();
        while let Some(pedaco) = field.next().await {
            dados.extend_from_slice(&pedaco?);
        }
        if nome == "file" {
            arquivo = Some(dados);
        } else {
            campos.insert(nome, String::from_utf8_lossy(&dados).into_owned());
        }
    }

    Ok((arquivo, campos))
}

async fn buscar_por_id(
    data: &web::Data<AppState>,
    id: i32,
) -> Result<Option<Recorte>, sqlx::Error> {
    query_as::<_, Recorte>(&format!("SELECT {COLUNAS} FROM recortes WHERE id = $1"))
        .bind(id)
        .fetch_optional(&data.db_pool)
        .await
}

/// Rota de upload de imagem. A imagem precisa estar hospedada antes do
/// cadastro do recorte; esta rota devolve a URL a ser usada no `urlImagem`.
#[post("/recortes/upload-imagem")]
pub async fn upload_imagem(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let (arquivo, campos) = ler_multipart(payload).await?;

    let Some(bytes) = arquivo.filter(|b| !b.is_empty()) else {
        return Err(ApiError::validacao("NO_FILE", "Nenhuma imagem foi enviada"));
    };

    let (Some(tipo_produto), Some(tipo_recorte), Some(material), Some(cor)) = (
        campos.get("tipoProduto"),
        campos.get("tipoRecorte"),
        campos.get("material"),
        campos.get("cor"),
    ) else {
        return Err(ApiError::validacao(
            "MISSING_FIELDS",
            "Campos obrigatórios: tipoProduto, tipoRecorte, material, cor",
        ));
    };

    let nome_arquivo = nome_de_arquivo(tipo_produto, tipo_recorte, material, cor);
    let imagem = data.image_host.enviar(bytes, &nome_arquivo).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Imagem enviada com sucesso",
        "data": {
            "imageUrl": imagem.url,
            "publicId": imagem.public_id,
            "fileName": nome_arquivo,
        },
    })))
}

/// Rota para cadastrar um recorte.
#[post("/recortes")]
pub async fn cadastrar_recorte(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    corpo: web::Json<NovoRecorte>,
) -> Result<HttpResponse, ApiError> {
    // Campos obrigatórios, com a lista dos ausentes no payload de erro.
    let mut faltando: Vec<&str> = Vec::new();
    if corpo.nome.as_deref().map_or(true, |v| v.trim().is_empty()) {
        faltando.push("nome");
    }
    if corpo.ordem.is_none() {
        faltando.push("ordem");
    }
    if corpo.sku.as_deref().map_or(true, |v| v.trim().is_empty()) {
        faltando.push("sku");
    }
    if corpo.tipo_recorte.is_none() {
        faltando.push("tipoRecorte");
    }
    if corpo.posicao.is_none() {
        faltando.push("posicao");
    }
    if corpo.tipo_produto.is_none() {
        faltando.push("tipoProduto");
    }
    if corpo.material.is_none() {
        faltando.push("material");
    }
    if corpo.cor.is_none() {
        faltando.push("cor");
    }

    if !faltando.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": format!("Campos obrigatórios não informados: {}", faltando.join(", ")),
            "error": "MISSING_REQUIRED_FIELDS",
            "missingFields": faltando,
        })));
    }

    // Depois da checagem acima, todos os campos existem.
    let nome = corpo.nome.as_deref().unwrap_or_default().trim();
    let sku = corpo.sku.as_deref().unwrap_or_default().trim();
    let tipo_recorte = corpo.tipo_recorte.as_deref().unwrap_or_default();
    let posicao = corpo.posicao.as_deref().unwrap_or_default();
    let tipo_produto = corpo.tipo_produto.as_deref().unwrap_or_default();
    let material = corpo.material.as_deref().unwrap_or_default();
    let cor = corpo.cor.as_deref().unwrap_or_default();

    let url_imagem = corpo.url_imagem.as_deref().map(str::trim).unwrap_or("");
    if url_imagem.is_empty() {
        return Err(ApiError::validacao(
            "IMAGE_REQUIRED",
            "URL da imagem é obrigatória. Faça upload da imagem primeiro usando /recortes/upload-imagem",
        ));
    }

    validar_vocabulario(tipo_recorte, &TIPOS_RECORTE, "INVALID_TIPO_RECORTE", "Tipo de recorte inválido")?;
    validar_vocabulario(posicao, &POSICOES, "INVALID_POSICAO", "Posição inválida")?;
    validar_vocabulario(tipo_produto, &TIPOS_PRODUTO, "INVALID_TIPO_PRODUTO", "Tipo de produto inválido")?;
    validar_vocabulario(material, &MATERIAIS, "INVALID_MATERIAL", "Material inválido")?;
    validar_vocabulario(cor, &CORES, "INVALID_COR", "Cor inválida")?;

    let ordem = validar_ordem(corpo.ordem.unwrap_or_default())?;

    // SKU único global.
    let sku_existente = query("SELECT id FROM recortes WHERE sku = $1")
        .bind(sku)
        .fetch_optional(&data.db_pool)
        .await?;

    if sku_existente.is_some() {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "message": "SKU já existe",
            "error": "SKU_EXISTS",
            "existingSku": sku,
        })));
    }

    // Ordem única dentro da partição do tipo de produto.
    let ordem_existente = query("SELECT id FROM recortes WHERE tipo_produto = $1 AND ordem = $2")
        .bind(tipo_produto)
        .bind(ordem)
        .fetch_optional(&data.db_pool)
        .await?;

    if ordem_existente.is_some() {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "success": false,
            "message": format!(
                "Ordem {} já está sendo usada para o tipo de produto \"{}\"",
                ordem, tipo_produto
            ),
            "error": "ORDEM_EXISTS",
            "conflictingOrder": ordem,
            "conflictingProduct": tipo_produto,
        })));
    }

    let recorte = query_as::<_, Recorte>(&format!(
        "INSERT INTO recortes (nome, ordem, sku, tipo_recorte, posicao, tipo_produto, material, cor, url_imagem, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING {COLUNAS}"
    ))
    .bind(nome)
    .bind(ordem)
    .bind(sku)
    .bind(tipo_recorte)
    .bind(posicao)
    .bind(tipo_produto)
    .bind(material)
    .bind(cor)
    .bind(url_imagem)
    .bind(corpo.status.unwrap_or(true)) // Padrão: ativo
    .fetch_one(&data.db_pool)
    .await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Recorte criado com sucesso",
        "data": recorte,
    })))
}

/// Acrescenta à consulta as cláusulas de busca e de filtros exatos.
fn aplicar_filtros(qb: &mut QueryBuilder<Postgres>, filtros: &FiltroRecortes) {
    if let Some(s) = filtros.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let padrao = format!("%{}%", s);
        qb.push(" AND (nome ILIKE ")
            .push_bind(padrao.clone())
            .push(" OR sku ILIKE ")
            .push_bind(padrao.clone())
            .push(" OR tipo_recorte ILIKE ")
            .push_bind(padrao)
            .push(")");
    }
    if let Some(v) = &filtros.tipo_recorte {
        qb.push(" AND tipo_recorte = ").push_bind(v.clone());
    }
    if let Some(v) = &filtros.tipo_produto {
        qb.push(" AND tipo_produto = ").push_bind(v.clone());
    }
    if let Some(v) = &filtros.material {
        qb.push(" AND material = ").push_bind(v.clone());
    }
    if let Some(v) = &filtros.cor {
        qb.push(" AND cor = ").push_bind(v.clone());
    }
    if let Some(v) = &filtros.status {
        qb.push(" AND status = ").push_bind(v == "true");
    }
}

/// Rota para listar recortes com paginação, busca e filtros.
#[get("/recortes")]
pub async fn buscar_recortes(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    filtros: web::Query<FiltroRecortes>,
) -> Result<HttpResponse, ApiError> {
    let page = filtros.page.unwrap_or(1).max(1);
    let limit = filtros.limit.unwrap_or(10).max(1);
    let offset = (page - 1) * limit;

    // Ordenação restrita a colunas conhecidas; fora da lista cai no padrão.
    let coluna = match filtros.sort_by.as_deref() {
        Some("nome") => "nome",
        Some("sku") => "sku",
        Some("createdAt") => "created_at",
        _ => "ordem",
    };
    let direcao = match filtros.sort_order.as_deref() {
        Some("desc") => "DESC",
        _ => "ASC",
    };

    let mut contagem: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM recortes WHERE 1=1");
    aplicar_filtros(&mut contagem, &filtros);
    let (total,): (i64,) = contagem
        .build_query_as()
        .fetch_one(&data.db_pool)
        .await?;

    let mut consulta: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {COLUNAS} FROM recortes WHERE 1=1"));
    aplicar_filtros(&mut consulta, &filtros);
    consulta.push(format!(
        " ORDER BY {coluna} {direcao} LIMIT {limit} OFFSET {offset}"
    ));

    let recortes: Vec<Recorte> = consulta
        .build_query_as()
        .fetch_all(&data.db_pool)
        .await?;

    let total_pages = (total + limit - 1) / limit;

    Ok(HttpResponse::Ok().json(ListaRecortesResponse {
        success: true,
        data: recortes,
        pagination: Paginacao {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        },
    }))
}

/// Rota para buscar um recorte pelo SKU.
#[get("/recortes/sku/{sku}")]
pub async fn buscar_recorte_por_sku(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let sku = path.into_inner();
    if sku.trim().is_empty() {
        return Err(ApiError::validacao("SKU_REQUIRED", "SKU é obrigatório"));
    }

    let recorte = query_as::<_, Recorte>(&format!("SELECT {COLUNAS} FROM recortes WHERE sku = $1"))
        .bind(sku.trim())
        .fetch_optional(&data.db_pool)
        .await?;

    match recorte {
        Some(recorte) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": recorte,
        }))),
        None => Err(ApiError::nao_encontrado(
            "NOT_FOUND",
            "Recorte não encontrado para o SKU informado",
        )),
    }
}

/// Rota para buscar um recorte pelo ID.
#[get("/recortes/{id}")]
pub async fn buscar_recorte_por_id(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = analisar_id(&path)?;

    match buscar_por_id(&data, id).await? {
        Some(recorte) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": recorte,
        }))),
        None => Err(ApiError::nao_encontrado(
            "NOT_FOUND",
            "Recorte não encontrado para o ID informado",
        )),
    }
}

/// Rota para atualizar um recorte. Atualização parcial: só os campos
/// presentes mudam, e unicidade de sku e ordem é reverificada quando esses
/// campos mudam.
#[put("/recortes/{id}")]
pub async fn atualizar_recorte(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    path: web::Path<String>,
    corpo: web::Json<AtualizarRecorte>,
) -> Result<HttpResponse, ApiError> {
    let id = analisar_id(&path)?;

    let Some(existente) = buscar_por_id(&data, id).await? else {
        return Err(ApiError::nao_encontrado("NOT_FOUND", "Recorte não encontrado"));
    };

    if let Some(v) = corpo.tipo_recorte.as_deref() {
        validar_vocabulario(v, &TIPOS_RECORTE, "INVALID_TIPO_RECORTE", "Tipo de recorte inválido")?;
    }
    if let Some(v) = corpo.posicao.as_deref() {
        validar_vocabulario(v, &POSICOES, "INVALID_POSICAO", "Posição inválida")?;
    }
    if let Some(v) = corpo.tipo_produto.as_deref() {
        validar_vocabulario(v, &TIPOS_PRODUTO, "INVALID_TIPO_PRODUTO", "Tipo de produto inválido")?;
    }
    if let Some(v) = corpo.material.as_deref() {
        validar_vocabulario(v, &MATERIAIS, "INVALID_MATERIAL", "Material inválido")?;
    }
    if let Some(v) = corpo.cor.as_deref() {
        validar_vocabulario(v, &CORES, "INVALID_COR", "Cor inválida")?;
    }

    // SKU mudou: precisa continuar único.
    if let Some(sku) = corpo.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if sku != existente.sku {
            let conflito = query("SELECT id FROM recortes WHERE sku = $1 AND id <> $2")
                .bind(sku)
                .bind(id)
                .fetch_optional(&data.db_pool)
                .await?;

            if conflito.is_some() {
                return Ok(HttpResponse::Conflict().json(serde_json::json!({
                    "success": false,
                    "message": "SKU já está sendo usado por outro recorte",
                    "error": "SKU_EXISTS",
                    "existingSku": sku,
                })));
            }
        }
    }

    // Ordem mudou: revalida e confere a unicidade na partição do tipo de
    // produto resultante da atualização.
    let mut ordem_nova: Option<i32> = None;
    if let Some(bruto) = corpo.ordem {
        let ordem = validar_ordem(bruto)?;
        ordem_nova = Some(ordem);

        if ordem != existente.ordem {
            let tipo_produto_alvo = corpo
                .tipo_produto
                .as_deref()
                .unwrap_or(&existente.tipo_produto);

            let conflito =
                query("SELECT id FROM recortes WHERE tipo_produto = $1 AND ordem = $2 AND id <> $3")
                    .bind(tipo_produto_alvo)
                    .bind(ordem)
                    .bind(id)
                    .fetch_optional(&data.db_pool)
                    .await?;

            if conflito.is_some() {
                return Ok(HttpResponse::Conflict().json(serde_json::json!({
                    "success": false,
                    "message": format!(
                        "Ordem {} já está sendo usada para o tipo de produto \"{}\"",
                        ordem, tipo_produto_alvo
                    ),
                    "error": "ORDEM_EXISTS",
                    "conflictingOrder": ordem,
                    "conflictingProduct": tipo_produto_alvo,
                })));
            }
        }
    }

    let recorte = query_as::<_, Recorte>(&format!(
        "UPDATE recortes
         SET nome = COALESCE($1, nome),
             ordem = COALESCE($2, ordem),
             sku = COALESCE($3, sku),
             tipo_recorte = COALESCE($4, tipo_recorte),
             posicao = COALESCE($5, posicao),
             tipo_produto = COALESCE($6, tipo_produto),
             material = COALESCE($7, material),
             cor = COALESCE($8, cor),
             url_imagem = COALESCE($9, url_imagem),
             status = COALESCE($10, status),
             updated_at = now()
         WHERE id = $11
         RETURNING {COLUNAS}"
    ))
    .bind(corpo.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()))
    .bind(ordem_nova)
    .bind(corpo.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    .bind(&corpo.tipo_recorte)
    .bind(&corpo.posicao)
    .bind(&corpo.tipo_produto)
    .bind(&corpo.material)
    .bind(&corpo.cor)
    .bind(corpo.url_imagem.as_deref().map(str::trim).filter(|u| !u.is_empty()))
    .bind(corpo.status)
    .bind(id)
    .fetch_one(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Recorte atualizado com sucesso",
        "data": recorte,
    })))
}

/// Rota para trocar a imagem de um recorte. A imagem anterior é removida do
/// host em melhor esforço; a nova recebe o nome derivado dos campos do
/// próprio recorte.
#[put("/recortes/{id}/imagem")]
pub async fn atualizar_imagem_recorte(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    path: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = analisar_id(&path)?;

    let (arquivo, _campos) = ler_multipart(payload).await?;
    let Some(bytes) = arquivo.filter(|b| !b.is_empty()) else {
        return Err(ApiError::validacao("NO_FILE", "Nenhuma imagem foi enviada"));
    };

    let Some(existente) = buscar_por_id(&data, id).await? else {
        return Err(ApiError::nao_encontrado("NOT_FOUND", "Recorte não encontrado"));
    };

    if !existente.url_imagem.is_empty() {
        if let Err(e) = data.image_host.remover_por_url(&existente.url_imagem).await {
            warn!("erro ao excluir imagem anterior do recorte {}: {:?}", id, e);
        }
    }

    let nome_arquivo = nome_de_arquivo(
        &existente.tipo_produto,
        &existente.tipo_recorte,
        &existente.material,
        &existente.cor,
    );
    let imagem = data.image_host.enviar(bytes, &nome_arquivo).await?;

    let recorte = query_as::<_, Recorte>(&format!(
        "UPDATE recortes SET url_imagem = $1, updated_at = now() WHERE id = $2 RETURNING {COLUNAS}"
    ))
    .bind(&imagem.url)
    .bind(id)
    .fetch_one(&data.db_pool)
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Imagem atualizada com sucesso",
        "data": recorte,
    })))
}

/// Rota para excluir um recorte, removendo também a imagem hospedada.
#[delete("/recortes/{id}")]
pub async fn deletar_recorte(
    data: web::Data<AppState>,
    _usuario: UsuarioAutenticado,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = analisar_id(&path)?;

    let Some(existente) = buscar_por_id(&data, id).await? else {
        return Err(ApiError::nao_encontrado("NOT_FOUND", "Recorte não encontrado"));
    };

    if !existente.url_imagem.is_empty() {
        if let Err(e) = data.image_host.remover_por_url(&existente.url_imagem).await {
            warn!("erro ao excluir imagem do recorte {}: {:?}", id, e);
        }
    }

    query("DELETE FROM recortes WHERE id = $1")
        .bind(id)
        .execute(&data.db_pool)
        .await?;

    Ok(HttpResponse::Ok().json(RespostaApi::sucesso("Recorte excluído com sucesso")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nome_de_arquivo_troca_espacos_por_hifen() {
        assert_eq!(
            nome_de_arquivo("americano", "frente", "linho", "azul marinho"),
            "americano_frente_linho_azul-marinho"
        );
        assert_eq!(
            nome_de_arquivo("trucker", "aba", "linho", "laranja"),
            "trucker_aba_linho_laranja"
        );
    }

    #[test]
    fn ordem_aceita_inteiros_positivos() {
        assert_eq!(validar_ordem(1.0).unwrap(), 1);
        assert_eq!(validar_ordem(42.0).unwrap(), 42);
    }

    #[test]
    fn ordem_rejeita_zero_negativos_e_fracoes() {
        assert!(validar_ordem(0.0).is_err());
        assert!(validar_ordem(-3.0).is_err());
        assert!(validar_ordem(1.5).is_err());
    }

    #[test]
    fn id_invalido_vira_erro_de_formato() {
        assert!(analisar_id("abc").is_err());
        assert!(analisar_id("").is_err());
        assert_eq!(analisar_id("7").unwrap(), 7);
    }
}
