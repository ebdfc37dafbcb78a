// Planificación de la generación masiva de cuotas para un período.
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::error::{ErroresValidacion, SigesdaResult};
use crate::models::Cuota;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CuotaOmitida {
    pub persona_id: i64,
    pub cuota_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanGeneracion {
    pub mes: u32,
    pub anio: i32,
    pub a_generar: Vec<i64>,
    pub omitidas: Vec<CuotaOmitida>,
}

/// Decide a qué personas hay que generarles cuota en `(mes, anio)`. Las que ya
/// tienen una cuota para ese período se omiten; los ids repetidos en
/// `personas` se consideran una sola vez.
pub fn planificar_generacion(personas: &[i64], existentes: &[Cuota], mes: u32, anio: i32) -> SigesdaResult<PlanGeneracion> {
    let mut errores = ErroresValidacion::new();
    if !(1..=12).contains(&mes) {
        errores.agregar("mes", "el mes debe estar entre 1 y 12");
    } else if NaiveDate::from_ymd_opt(anio, mes, 1).is_none() || anio < 1900 {
        errores.agregar("anio", "año fuera de rango");
    }
    errores.into_result()?;

    let del_periodo: HashMap<i64, i64> = existentes
        .iter()
        .filter(|c| c.mes == mes && c.anio == anio)
        .map(|c| (c.persona_id, c.id))
        .collect();

    let mut vistas: HashSet<i64> = HashSet::new();
    let mut plan = PlanGeneracion { mes, anio, a_generar: Vec::new(), omitidas: Vec::new() };
    for &persona_id in personas {
        if !vistas.insert(persona_id) {
            continue;
        }
        match del_periodo.get(&persona_id) {
            Some(&cuota_id) => plan.omitidas.push(CuotaOmitida { persona_id, cuota_id }),
            None => plan.a_generar.push(persona_id),
        }
    }

    info!(mes, anio, a_generar = plan.a_generar.len(), omitidas = plan.omitidas.len(), "plan de generación");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SigesdaError;
    use rust_decimal::Decimal;

    fn cuota(id: i64, persona_id: i64, mes: u32, anio: i32) -> Cuota {
        Cuota {
            id,
            recibo_id: id,
            persona_id,
            mes,
            anio,
            categoria_id: 1,
            items: vec![],
            monto_total: Decimal::ZERO,
            monto_base: None,
            monto_actividades: None,
        }
    }

    #[test]
    fn test_omite_existentes_del_mismo_periodo() {
        let existentes = vec![cuota(100, 1, 3, 2025), cuota(101, 2, 2, 2025)];
        let plan = planificar_generacion(&[1, 2, 3, 3], &existentes, 3, 2025).unwrap();
        assert_eq!(plan.a_generar, vec![2, 3]);
        assert_eq!(plan.omitidas, vec![CuotaOmitida { persona_id: 1, cuota_id: 100 }]);
    }

    #[test]
    fn test_mes_invalido() {
        let err = planificar_generacion(&[1], &[], 13, 2025).unwrap_err();
        assert!(matches!(err, SigesdaError::Validacion(ref e) if e.contiene("mes")));
    }
}
