// Servicio HTTP: expone las operaciones del núcleo como endpoints JSON.
use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpResponse, HttpServer};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::config::{AppConfig, LedgerConfig};
use crate::cuotas::CatalogoItems;
use crate::server_handlers::{cuotas, docs, secciones};
use crate::store::MemoriaCuotas;

/// Estado compartido entre workers.
pub struct AppState {
    pub ledger: LedgerConfig,
    pub catalogo: Mutex<CatalogoItems>,
    pub cuotas: Mutex<MemoriaCuotas>,
    recalculos_en_curso: Mutex<HashSet<i64>>,
}

// las secciones críticas calculan todo antes de mutar, así que un mutex envenenado no deja datos a medias
fn bloquear<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl AppState {
    pub fn new(ledger: LedgerConfig) -> Self {
        AppState {
            ledger,
            catalogo: Mutex::new(CatalogoItems::predeterminado()),
            cuotas: Mutex::new(MemoriaCuotas::new()),
            recalculos_en_curso: Mutex::new(HashSet::new()),
        }
    }

    pub fn catalogo(&self) -> MutexGuard<'_, CatalogoItems> {
        bloquear(&self.catalogo)
    }

    pub fn cuotas(&self) -> MutexGuard<'_, MemoriaCuotas> {
        bloquear(&self.cuotas)
    }

    /// Orden de bloqueo: `cuotas` antes que este conjunto, nunca al revés.
    pub fn recalculo_en_curso(&self, cuota_id: i64) -> bool {
        bloquear(&self.recalculos_en_curso).contains(&cuota_id)
    }
}

/// Marca una cuota como "recalculándose" mientras vive. Un segundo pedido
/// para la misma cuota no obtiene guardia hasta que el primero termina.
pub struct GuardiaRecalculo {
    estado: web::Data<AppState>,
    cuota_id: i64,
}

impl GuardiaRecalculo {
    pub fn adquirir(estado: &web::Data<AppState>, cuota_id: i64) -> Option<Self> {
        if !bloquear(&estado.recalculos_en_curso).insert(cuota_id) {
            return None;
        }
        Some(GuardiaRecalculo { estado: estado.clone(), cuota_id })
    }
}

impl Drop for GuardiaRecalculo {
    fn drop(&mut self) {
        bloquear(&self.estado.recalculos_en_curso).remove(&self.cuota_id);
    }
}

/// Los cuerpos JSON mal formados responden con `{"error": ...}` como el resto.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detalle = err.to_string();
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(json!({"error": format!("invalid JSON body: {}", detalle)})))
            .into()
    })
}

/// Registra todas las rutas. Las rutas fijas van antes que las que llevan `{id}`.
pub fn configurar_rutas(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/help", web::get().to(docs::help_handler))
        .route("/catalogo/tipos-item", web::get().to(cuotas::catalogo_get_handler))
        .route("/catalogo/tipos-item", web::put().to(cuotas::catalogo_put_handler))
        .route("/cuotas", web::post().to(cuotas::registrar_cuota_handler))
        .route("/cuotas/desglose", web::post().to(cuotas::desglose_handler))
        .route("/cuotas/generacion/plan", web::post().to(cuotas::plan_generacion_handler))
        .route("/cuotas/{id}", web::get().to(cuotas::obtener_cuota_handler))
        .route("/cuotas/{id}/desglose", web::get().to(cuotas::desglose_cuota_handler))
        .route("/cuotas/{id}/items", web::post().to(cuotas::agregar_item_handler))
        .route("/cuotas/{id}/recalcular", web::post().to(cuotas::recalcular_handler))
        .route("/ajustes/activos", web::post().to(cuotas::ajustes_activos_handler))
        .route("/exenciones/activa", web::post().to(cuotas::exencion_activa_handler))
        .route("/exenciones/transicion", web::post().to(cuotas::exencion_transicion_handler))
        .route("/secciones/horarios/validar", web::post().to(secciones::validar_horarios_handler))
        .route("/secciones/conflictos", web::post().to(secciones::conflictos_asignacion_handler))
        .route("/secciones/conflictos/recurso", web::post().to(secciones::conflictos_recurso_handler))
        .route("/secciones/ocupacion", web::get().to(secciones::ocupacion_handler))
        .route("/secciones/inscripcion/verificar", web::post().to(secciones::verificar_inscripcion_handler));
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let estado = web::Data::new(AppState::new(config.ledger.clone()));
    let cors_origen = config.cors_origen.clone();
    info!(bind = %config.bind_addr, sistema_items = config.ledger.sistema_items, "servicio SIGESDA listo");

    HttpServer::new(move || {
        let cors = match &cors_origen {
            Some(origen) => Cors::default().allowed_origin(origen).allow_any_method().allow_any_header(),
            None => Cors::permissive(),
        };
        App::new()
            .app_data(estado.clone())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configurar_rutas)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
