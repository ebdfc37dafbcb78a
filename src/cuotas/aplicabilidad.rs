// Qué ajustes y qué exención aplican a una persona en una fecha dada.
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::error::Advertencia;
use crate::models::{AjusteCuotaSocio, EstadoExencion, ExencionCuota};

pub const ANOMALIA_EXENCIONES_MULTIPLES: &str = "EXENCIONES_VIGENTES_MULTIPLES";

fn en_rango(inicio: NaiveDate, fin: Option<NaiveDate>, fecha: NaiveDate) -> bool {
    inicio <= fecha && fin.is_none_or(|f| f >= fecha)
}

/// Todos los ajustes activos y dentro de rango en `fecha`, en el orden recibido.
/// No elige un ganador: un descuento y un recargo pueden coexistir.
pub fn find_active_ajustes(ajustes: &[AjusteCuotaSocio], fecha: NaiveDate) -> Vec<AjusteCuotaSocio> {
    ajustes
        .iter()
        .filter(|a| a.activo && en_rango(a.fecha_inicio, a.fecha_fin, fecha))
        .cloned()
        .collect()
}

/// Orden de aplicación por alcance (BASE, ACTIVIDADES, ITEMS_ESPECIFICOS,
/// TOTAL_CUOTA). Estable: dentro de un alcance se conserva el orden original.
pub fn ordenar_por_alcance(mut ajustes: Vec<AjusteCuotaSocio>) -> Vec<AjusteCuotaSocio> {
    ajustes.sort_by_key(|a| a.aplica_a.orden());
    ajustes
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExencionActiva {
    pub exencion: Option<ExencionCuota>,
    pub advertencias: Vec<Advertencia>,
}

/// La exención VIGENTE en `fecha`. Si hay más de una (anomalía de datos) gana
/// la de `fechaInicio` más reciente; a igual fecha, la de id mayor. La
/// anomalía se informa como advertencia y queda en el log.
pub fn find_active_exencion(exenciones: &[ExencionCuota], fecha: NaiveDate) -> ExencionActiva {
    let candidatas: Vec<&ExencionCuota> = exenciones
        .iter()
        .filter(|e| e.estado == EstadoExencion::Vigente && en_rango(e.fecha_inicio, e.fecha_fin, fecha))
        .collect();

    let elegida = candidatas.iter().max_by_key(|e| (e.fecha_inicio, e.id)).map(|e| (*e).clone());

    let mut advertencias = Vec::new();
    if candidatas.len() > 1 {
        let ids: Vec<String> = candidatas.iter().map(|e| e.id.to_string()).collect();
        let elegida_id = elegida.as_ref().map(|e| e.id).unwrap_or_default();
        warn!(
            persona_id = candidatas[0].persona_id,
            candidatas = %ids.join(","),
            elegida = elegida_id,
            "más de una exención vigente"
        );
        advertencias.push(Advertencia::new(
            ANOMALIA_EXENCIONES_MULTIPLES,
            format!(
                "hay {} exenciones vigentes al {} (ids {}); se aplica la {} por tener el inicio más reciente",
                candidatas.len(),
                fecha,
                ids.join(", "),
                elegida_id
            ),
        ));
    }

    ExencionActiva { exencion: elegida, advertencias }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AlcanceAjuste, TipoAjuste, TipoExencion};
    use rust_decimal::Decimal;

    fn fecha(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ajuste(id: i64, alcance: AlcanceAjuste) -> AjusteCuotaSocio {
        AjusteCuotaSocio {
            id,
            persona_id: 1,
            tipo_ajuste: TipoAjuste::DescuentoFijo,
            valor: Decimal::from(100),
            aplica_a: alcance,
            items_afectados: vec![],
            concepto: None,
            fecha_inicio: fecha("2025-01-01"),
            fecha_fin: None,
            activo: true,
        }
    }

    #[test]
    fn test_total_cuota_va_al_final() {
        let orden = ordenar_por_alcance(vec![
            ajuste(1, AlcanceAjuste::TotalCuota),
            ajuste(2, AlcanceAjuste::Actividades),
            ajuste(3, AlcanceAjuste::Base),
            ajuste(4, AlcanceAjuste::TotalCuota),
        ]);
        let ids: Vec<i64> = orden.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_inactivo_no_aplica_aunque_este_en_rango() {
        let mut a = ajuste(1, AlcanceAjuste::Base);
        a.activo = false;
        assert!(find_active_ajustes(&[a], fecha("2025-03-01")).is_empty());
    }

    #[test]
    fn test_sin_exenciones() {
        let r = find_active_exencion(&[], fecha("2025-03-01"));
        assert!(r.exencion.is_none());
        assert!(r.advertencias.is_empty());
    }

    #[test]
    fn test_fecha_fin_inclusiva() {
        let ex = ExencionCuota {
            id: 1,
            persona_id: 1,
            tipo_exencion: TipoExencion::Parcial,
            porcentaje: Decimal::from(50),
            motivo_exencion: "Beca".to_string(),
            fecha_inicio: fecha("2025-01-01"),
            fecha_fin: Some(fecha("2025-03-31")),
            estado: EstadoExencion::Vigente,
        };
        assert!(find_active_exencion(std::slice::from_ref(&ex), fecha("2025-03-31")).exencion.is_some());
        assert!(find_active_exencion(&[ex], fecha("2025-04-01")).exencion.is_none());
    }
}
