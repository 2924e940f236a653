// src/main.rs

use actix_web::{web, App, HttpServer};
use sqlx::{Pool, Postgres};
use tracing::info;
use tracing_subscriber::EnvFilter;

use recortes_api::{config::Config, db, recortes::image_host::ImageHost, usuarios, AppState};

// Função principal da aplicação Actix Web.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Variáveis de ambiente do .env, se houver; as do processo têm prioridade.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    config.registrar();

    // Conecta ao banco de dados PostgreSQL usando um pool de conexões.
    // O .expect() fará com que o programa entre em pânico se a conexão falhar.
    let db_pool = Pool::<Postgres>::connect(&config.database_url)
        .await
        .expect("Falha ao conectar ao banco PostgreSQL");

    // Tabelas e admin inicial, antes de aceitar requisições.
    db::criar_tabelas(&db_pool)
        .await
        .expect("Falha ao criar as tabelas");
    usuarios::bootstrap::inicializar_admin(&db_pool, &config)
        .await
        .expect("Falha ao inicializar o admin");

    let image_host = ImageHost::new(&config);
    let endereco = format!("{}:{}", config.host, config.port);

    // Cria um estado compartilhado da aplicação com o pool de conexões.
    // web::Data é usado para compartilhar dados imutáveis entre as rotas.
    let app_state = web::Data::new(AppState {
        db_pool,
        config,
        image_host,
    });

    info!("Iniciando API de recortes em {}...", endereco);

    // Configura e inicia o servidor HTTP.
    HttpServer::new(move || {
        App::new()
            // Adiciona o estado compartilhado à aplicação.
            // .clone() é necessário porque a closure é movida
            // e pode ser executada várias vezes.
            .app_data(app_state.clone())
            .configure(recortes_api::configurar_rotas)
    })
    // Vincula o servidor ao endereço IP e porta. O '?' propaga erros.
    .bind(endereco)?
    // Inicia o servidor.
    .run()
    // Aguarda a finalização do servidor.
    .await
}
