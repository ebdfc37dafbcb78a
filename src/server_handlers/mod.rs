pub mod cuotas;
pub mod docs;
pub mod secciones;

use actix_web::HttpResponse;
use serde_json::json;
use tracing::debug;

use crate::error::SigesdaError;

/// Traduce un error del núcleo a la respuesta HTTP correspondiente.
pub fn respuesta_error(err: &SigesdaError) -> HttpResponse {
    debug!(error = %err, "respuesta de error");
    match err {
        SigesdaError::Validacion(errores) => HttpResponse::BadRequest().json(json!({
            "error": err.to_string(),
            "errores": errores.errores,
        })),
        SigesdaError::Formato(e) => HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
        SigesdaError::Politica(mensaje) => HttpResponse::UnprocessableEntity().json(json!({"error": mensaje})),
        SigesdaError::Remoto(e) => HttpResponse::BadGateway().json(json!({
            "error": e.mensaje_usuario(),
            "status": e.status,
        })),
    }
}

pub(crate) fn no_encontrada(cuota_id: i64) -> HttpResponse {
    HttpResponse::NotFound().json(json!({"error": format!("la cuota {} no existe", cuota_id)}))
}
