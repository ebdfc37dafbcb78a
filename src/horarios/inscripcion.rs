// Política de inscripción de una persona en una sección.
use tracing::warn;

use super::ocupacion::Ocupacion;
use crate::error::{SigesdaError, SigesdaResult};
use crate::models::{ParticipacionSeccion, Seccion};

/// Permite la inscripción salvo que la persona ya tenga una participación
/// activa en la sección o que no quede cupo. Devuelve la ocupación actual
/// para que el llamador pueda mostrarla.
///
/// El cupo se decide con los conteos exactos, no con el porcentaje
/// redondeado: 199 de 200 figura como 100% pero todavía admite una persona.
pub fn verificar_inscripcion(persona_id: i64, seccion: &Seccion, participaciones: &[ParticipacionSeccion]) -> SigesdaResult<Ocupacion> {
    let duplicada = participaciones
        .iter()
        .any(|p| p.activa && p.persona_id == persona_id && p.seccion_id == seccion.id);
    if duplicada {
        warn!(persona_id, seccion_id = seccion.id, "inscripción duplicada");
        return Err(SigesdaError::politica(format!(
            "la persona {} ya participa de la sección \"{}\"",
            persona_id, seccion.nombre
        )));
    }

    let sin_cupo = seccion.capacidad_maxima.is_some_and(|c| seccion.participaciones >= c);
    if sin_cupo {
        warn!(persona_id, seccion_id = seccion.id, "sección llena");
        return Err(SigesdaError::politica(format!("la sección \"{}\" no tiene cupo disponible", seccion.nombre)));
    }
    Ok(seccion.ocupacion())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn seccion(participaciones: u32, capacidad: Option<u32>) -> Seccion {
        Seccion {
            id: 3,
            actividad_id: 1,
            nombre: "Yoga mañana".to_string(),
            capacidad_maxima: capacidad,
            docentes: vec![],
            horarios: vec![],
            participaciones,
        }
    }

    fn participacion(persona_id: i64, activa: bool) -> ParticipacionSeccion {
        ParticipacionSeccion {
            id: 1,
            persona_id,
            seccion_id: 3,
            fecha_inicio: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            fecha_fin: None,
            precio_especial: None,
            activa,
        }
    }

    #[test]
    fn test_llena_bloquea() {
        assert!(matches!(verificar_inscripcion(9, &seccion(20, Some(20)), &[]), Err(SigesdaError::Politica(_))));
    }

    #[test]
    fn test_ultimo_lugar_se_admite_aunque_redondee_a_cien() {
        let ocup = verificar_inscripcion(9, &seccion(199, Some(200)), &[]).unwrap();
        assert_eq!(ocup.porcentaje, Some(100));
        assert!(verificar_inscripcion(9, &seccion(200, Some(200)), &[]).is_err());
    }

    #[test]
    fn test_capacidad_cero_no_admite() {
        assert!(verificar_inscripcion(9, &seccion(0, Some(0)), &[]).is_err());
    }

    #[test]
    fn test_duplicada_bloquea_solo_si_activa() {
        let s = seccion(5, Some(20));
        assert!(verificar_inscripcion(9, &s, &[participacion(9, true)]).is_err());
        assert!(verificar_inscripcion(9, &s, &[participacion(9, false)]).is_ok());
    }

    #[test]
    fn test_sin_cupo_maximo_siempre_admite() {
        let ocup = verificar_inscripcion(9, &seccion(500, None), &[]).unwrap();
        assert_eq!(ocup.porcentaje, None);
    }
}
