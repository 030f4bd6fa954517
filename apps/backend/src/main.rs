use actix_web::{web, App, HttpServer};
use backend::config::EnvConfig;
use backend::infra::state::build_state;
use backend::middleware::{cors_middleware, RequestLog, RequestTrace};
use backend::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_db(config.db.clone())
        .with_security(config.security())
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    let data = web::Data::new(app_state);
    let allowed_origins = config.allowed_origins.clone();

    info!(
        host = %config.server_host,
        port = config.server_port,
        origins = ?allowed_origins,
        "Starting ticket backend"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&allowed_origins))
            .wrap(RequestLog)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
