use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{no_encontrada, respuesta_error};
use crate::cuotas::{
    add_manual_item, agrupar_en_bloques, columnas_debe_haber, desglose, find_active_ajustes, find_active_exencion,
    ordenar_por_alcance, planificar_generacion, recalculate, total_cuota, transicionar, AccionExencion, ContextoRecalculo,
    NuevoItemManual,
};
use crate::error::SigesdaError;
use crate::models::{validar_items, AjusteCuotaSocio, Cuota, EstadoExencion, ExencionCuota, ItemCuota, TipoItemCuota};
use crate::server::{AppState, GuardiaRecalculo};

/// Vista de libro: desglose por categoría, bloques de presentación y columnas DEBE/HABER.
fn vista_libro(items: &[ItemCuota]) -> serde_json::Value {
    let columnas: Vec<serde_json::Value> = items
        .iter()
        .map(|it| {
            let (debe, haber) = columnas_debe_haber(it);
            json!({"itemId": it.id, "concepto": it.concepto, "debe": debe, "haber": haber})
        })
        .collect();
    let d = desglose(items);
    json!({
        "desglose": d.desglose,
        "totales": d.totales,
        "bloques": agrupar_en_bloques(items),
        "columnas": columnas,
    })
}

pub async fn catalogo_get_handler(estado: web::Data<AppState>) -> impl Responder {
    let catalogo = estado.catalogo().clone();
    HttpResponse::Ok().json(catalogo)
}

pub async fn catalogo_put_handler(estado: web::Data<AppState>, body: web::Json<Vec<TipoItemCuota>>) -> impl Responder {
    let tipos = body.into_inner();
    if let Some(vacio) = tipos.iter().position(|t| t.codigo.trim().is_empty()) {
        return respuesta_error(&SigesdaError::campo(format!("tipos[{}].codigo", vacio), "el código es obligatorio"));
    }
    let cantidad = tipos.len();
    *estado.catalogo() = crate::cuotas::CatalogoItems::new(tipos);
    info!(cantidad, "catálogo de tipos de ítem reemplazado");
    HttpResponse::Ok().json(json!({"tipos": cantidad}))
}

pub async fn registrar_cuota_handler(estado: web::Data<AppState>, body: web::Json<Cuota>) -> impl Responder {
    let mut cuota = body.into_inner();
    if let Err(e) = cuota.validar() {
        return respuesta_error(&e);
    }
    cuota.monto_total = total_cuota(&cuota, &estado.ledger);

    let mut cuotas = estado.cuotas();
    // reemplazarla ahora pisaría el resultado del recálculo en curso
    if estado.recalculo_en_curso(cuota.id) {
        warn!(cuota_id = cuota.id, "registro rechazado: recálculo en curso");
        return en_recalculo(cuota.id);
    }
    cuotas.reemplazar(cuota.clone());
    info!(cuota_id = cuota.id, persona_id = cuota.persona_id, total = %cuota.monto_total, "cuota registrada");
    HttpResponse::Created().json(cuota)
}

pub async fn obtener_cuota_handler(estado: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match estado.cuotas().obtener(id) {
        Some(c) => HttpResponse::Ok().json(c),
        None => no_encontrada(id),
    }
}

pub async fn desglose_cuota_handler(estado: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let items = match estado.cuotas().obtener(id) {
        Some(c) => c.items.clone(),
        None => return no_encontrada(id),
    };
    HttpResponse::Ok().json(vista_libro(&items))
}

#[derive(Deserialize)]
pub struct DesgloseRequest {
    items: Vec<ItemCuota>,
}

pub async fn desglose_handler(body: web::Json<DesgloseRequest>) -> impl Responder {
    if let Err(e) = validar_items(&body.items) {
        return respuesta_error(&e);
    }
    HttpResponse::Ok().json(vista_libro(&body.items))
}

pub async fn agregar_item_handler(
    estado: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NuevoItemManual>,
) -> impl Responder {
    let mut nuevo = body.into_inner();
    nuevo.cuota_id = path.into_inner();
    let catalogo = estado.catalogo().clone();
    let resultado = add_manual_item(&mut *estado.cuotas(), &catalogo, &nuevo);
    match resultado {
        Ok(item) => HttpResponse::Created().json(item),
        Err(e) => respuesta_error(&e),
    }
}

fn en_recalculo(cuota_id: i64) -> HttpResponse {
    HttpResponse::Conflict().json(json!({"error": format!("la cuota {} ya se está recalculando", cuota_id)}))
}

pub async fn recalcular_handler(
    estado: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<ContextoRecalculo>,
) -> impl Responder {
    let cuota_id = path.into_inner();
    let ctx = body.into_inner();

    let Some(guardia) = GuardiaRecalculo::adquirir(&estado, cuota_id) else {
        warn!(cuota_id, "recálculo ya en curso");
        return en_recalculo(cuota_id);
    };

    let cuota = match estado.cuotas().obtener(cuota_id) {
        Some(c) => c.clone(),
        None => return no_encontrada(cuota_id),
    };

    let ledger = estado.ledger.clone();
    let start = std::time::Instant::now();
    let base = cuota.clone();
    let handle = tokio::task::spawn_blocking(move || recalculate(&cuota, &ctx, &ledger));
    let resultado = match handle.await {
        Ok(r) => r,
        Err(e) => return HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)})),
    };

    let respuesta = match resultado {
        Ok(mut r) => {
            let guardada = estado.cuotas().aplicar_recalculo(&base, r.cuota_recalculada.clone());
            match guardada {
                Ok(c) => r.cuota_recalculada = c,
                Err(e) => return respuesta_error(&SigesdaError::Remoto(e)),
            }
            info!(
                cuota_id,
                total = %r.cuota_recalculada.monto_total,
                obsoletos = r.cambios.items_obsoletos.len(),
                advertencias = r.advertencias.len(),
                ms = start.elapsed().as_millis() as u64,
                "cuota recalculada"
            );
            HttpResponse::Ok().json(r)
        }
        Err(e) => respuesta_error(&e),
    };
    drop(guardia);
    respuesta
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanGeneracionRequest {
    personas: Vec<i64>,
    mes: u32,
    anio: i32,
}

pub async fn plan_generacion_handler(estado: web::Data<AppState>, body: web::Json<PlanGeneracionRequest>) -> impl Responder {
    let existentes = estado.cuotas().todas();
    match planificar_generacion(&body.personas, &existentes, body.mes, body.anio) {
        Ok(plan) => HttpResponse::Ok().json(plan),
        Err(e) => respuesta_error(&e),
    }
}

#[derive(Deserialize)]
pub struct AjustesActivosRequest {
    ajustes: Vec<AjusteCuotaSocio>,
    fecha: NaiveDate,
}

pub async fn ajustes_activos_handler(body: web::Json<AjustesActivosRequest>) -> impl Responder {
    let activos = ordenar_por_alcance(find_active_ajustes(&body.ajustes, body.fecha));
    HttpResponse::Ok().json(json!({"ajustes": activos}))
}

#[derive(Deserialize)]
pub struct ExencionActivaRequest {
    exenciones: Vec<ExencionCuota>,
    fecha: NaiveDate,
}

pub async fn exencion_activa_handler(body: web::Json<ExencionActivaRequest>) -> impl Responder {
    HttpResponse::Ok().json(find_active_exencion(&body.exenciones, body.fecha))
}

#[derive(Deserialize)]
pub struct TransicionRequest {
    estado: EstadoExencion,
    accion: AccionExencion,
}

pub async fn exencion_transicion_handler(body: web::Json<TransicionRequest>) -> impl Responder {
    match transicionar(body.estado, body.accion) {
        Ok(nuevo) => HttpResponse::Ok().json(json!({"estado": nuevo})),
        Err(e) => respuesta_error(&e),
    }
}
