// --- SIGESDA: servicio de cuotas y horarios ---

use sigesda::config::AppConfig;
use sigesda::run_server;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(json: bool) {
    let filtro = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registro = tracing_subscriber::registry().with(filtro);
    if json {
        registro.with(fmt::layer().json()).init();
    } else {
        registro.with(fmt::layer().with_target(false)).init();
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuración inválida: {}", e);
            std::process::exit(2);
        }
    };
    init_tracing(config.log_json);

    info!("=== SIGESDA: cuotas y horarios (API) ===");
    info!(bind = %config.bind_addr, "iniciando servidor en http://{}", config.bind_addr);
    run_server(config).await
}
