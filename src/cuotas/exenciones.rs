// Ciclo de vida de una exención.
//
// PENDIENTE_APROBACION -> APROBADA -> VIGENTE -> {VENCIDA, REVOCADA}
// PENDIENTE_APROBACION -> RECHAZADA
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SigesdaError, SigesdaResult};
use crate::models::{EstadoExencion, ExencionCuota};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccionExencion {
    Aprobar,
    Rechazar,
    Activar,
    Vencer,
    Revocar,
}

impl fmt::Display for AccionExencion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccionExencion::Aprobar => "aprobar",
            AccionExencion::Rechazar => "rechazar",
            AccionExencion::Activar => "activar",
            AccionExencion::Vencer => "vencer",
            AccionExencion::Revocar => "revocar",
        };
        f.write_str(s)
    }
}

pub fn transicionar(estado: EstadoExencion, accion: AccionExencion) -> SigesdaResult<EstadoExencion> {
    use AccionExencion::*;
    use EstadoExencion::*;
    match (estado, accion) {
        (PendienteAprobacion, Aprobar) => Ok(Aprobada),
        (PendienteAprobacion, Rechazar) => Ok(Rechazada),
        (Aprobada, Activar) => Ok(Vigente),
        (Vigente, Vencer) => Ok(Vencida),
        (Vigente, Revocar) => Ok(Revocada),
        (e, a) if e.es_terminal() => Err(SigesdaError::politica(format!("la exención está en estado terminal {} y no admite {}", e, a))),
        (e, a) => Err(SigesdaError::politica(format!("no se puede {} una exención en estado {}", a, e))),
    }
}

/// Estado que corresponde leer en `fecha`: una VIGENTE cuya `fechaFin` ya pasó
/// se considera VENCIDA aunque nadie haya registrado la transición.
pub fn estado_efectivo(exencion: &ExencionCuota, fecha: NaiveDate) -> EstadoExencion {
    match (exencion.estado, exencion.fecha_fin) {
        (EstadoExencion::Vigente, Some(fin)) if fin < fecha => EstadoExencion::Vencida,
        (estado, _) => estado,
    }
}
