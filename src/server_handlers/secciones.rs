use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use super::respuesta_error;
use crate::horarios::{
    compute_occupancy, detect_resource_conflicts, detect_same_day_overlaps, detectar_conflictos_asignacion,
    verificar_inscripcion, Asignacion, Candidato, SolicitudAsignacion,
};
use crate::models::{HorarioInput, ParticipacionSeccion, Seccion};

#[derive(Deserialize)]
pub struct ValidarHorariosRequest {
    horarios: Vec<HorarioInput>,
}

pub async fn validar_horarios_handler(body: web::Json<ValidarHorariosRequest>) -> impl Responder {
    match detect_same_day_overlaps(&body.horarios) {
        Ok(solapamientos) => HttpResponse::Ok().json(json!({
            "valido": solapamientos.is_empty(),
            "solapamientos": solapamientos,
        })),
        Err(e) => respuesta_error(&e),
    }
}

pub async fn conflictos_asignacion_handler(body: web::Json<SolicitudAsignacion>) -> impl Responder {
    match detectar_conflictos_asignacion(&body) {
        Ok(conflictos) => HttpResponse::Ok().json(json!({
            "hayConflictos": !conflictos.is_empty(),
            "conflictos": conflictos,
        })),
        Err(e) => respuesta_error(&e),
    }
}

#[derive(Deserialize)]
pub struct ConflictoRecursoRequest {
    candidato: Candidato,
    #[serde(default)]
    existentes: Vec<Asignacion>,
}

pub async fn conflictos_recurso_handler(body: web::Json<ConflictoRecursoRequest>) -> impl Responder {
    match detect_resource_conflicts(&body.candidato, &body.existentes) {
        Ok(conflictos) => HttpResponse::Ok().json(json!({
            "hayConflictos": !conflictos.is_empty(),
            "conflictos": conflictos,
        })),
        Err(e) => respuesta_error(&e),
    }
}

#[derive(Deserialize)]
pub struct OcupacionQuery {
    participantes: u32,
    capacidad: Option<u32>,
}

/// GET /secciones/ocupacion?participantes=40&capacidad=50 (sin `capacidad` = ilimitada)
pub async fn ocupacion_handler(query: web::Query<OcupacionQuery>) -> impl Responder {
    HttpResponse::Ok().json(compute_occupancy(query.participantes, query.capacidad))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificarInscripcionRequest {
    persona_id: i64,
    seccion: Seccion,
    #[serde(default)]
    participaciones: Vec<ParticipacionSeccion>,
}

pub async fn verificar_inscripcion_handler(body: web::Json<VerificarInscripcionRequest>) -> impl Responder {
    match verificar_inscripcion(body.persona_id, &body.seccion, &body.participaciones) {
        Ok(ocupacion) => HttpResponse::Ok().json(json!({"permitida": true, "ocupacion": ocupacion})),
        Err(e) => respuesta_error(&e),
    }
}
