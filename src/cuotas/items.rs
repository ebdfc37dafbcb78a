// Alta de ítems manuales: catálogo de tipos, validación y persistencia.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ledger::{classify_sign, Signo};
use crate::error::{ErroresValidacion, SigesdaError, SigesdaResult};
use crate::models::{CategoriaItem, ItemCuota, TipoItemCuota, CANTIDAD_MAXIMA, MONTO_MAXIMO};
use crate::store::ItemCuotaStore;

pub const CONCEPTO_MIN: usize = 3;
pub const CONCEPTO_MAX: usize = 200;
pub const OBSERVACIONES_MAX: usize = 500;

/// Catálogo de tipos de ítem tal como lo entrega el servicio de catálogos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogoItems {
    pub tipos: Vec<TipoItemCuota>,
}

impl CatalogoItems {
    pub fn new(tipos: Vec<TipoItemCuota>) -> Self {
        CatalogoItems { tipos }
    }

    /// Tipos habituales, usados cuando el servicio arranca sin catálogo cargado.
    pub fn predeterminado() -> Self {
        let tipo = |codigo: &str, nombre: &str, cat: &str, cat_nombre: &str| TipoItemCuota {
            codigo: codigo.to_string(),
            nombre: nombre.to_string(),
            categoria_item: CategoriaItem { codigo: cat.to_string(), nombre: cat_nombre.to_string() },
        };
        CatalogoItems::new(vec![
            tipo("CUOTA_BASE", "Cuota base", "BASE", "Base"),
            tipo("ACTIVIDAD", "Actividad", "ACTIVIDAD", "Actividades"),
            tipo("RECARGO_MANUAL", "Recargo manual", "RECARGO", "Recargos"),
            tipo("ADICIONAL", "Cargo adicional", "ADICIONAL", "Adicionales"),
            tipo("DESCUENTO_MANUAL", "Descuento manual", "DESCUENTO", "Descuentos"),
            tipo("BONIFICACION", "Bonificación", "OTRO", "Otros"),
        ])
    }

    pub fn buscar(&self, codigo: &str) -> Option<&TipoItemCuota> {
        let codigo = codigo.trim();
        self.tipos.iter().find(|t| t.codigo.eq_ignore_ascii_case(codigo))
    }
}

/// Datos que ingresa el usuario al agregar un ítem manual. `monto` es una
/// magnitud positiva; el signo lo decide la categoría del tipo elegido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevoItemManual {
    /// En el servicio HTTP lo fija la ruta.
    #[serde(default)]
    pub cuota_id: i64,
    pub tipo_item_codigo: String,
    pub concepto: String,
    pub monto: Decimal,
    pub cantidad: i64,
    #[serde(default)]
    pub observaciones: Option<String>,
}

/// Valida los campos y resuelve el tipo contra el catálogo. Los errores de
/// campo se reportan todos juntos; un código que no está en el catálogo es
/// una violación de política.
pub fn validar_item_manual<'a>(nuevo: &NuevoItemManual, catalogo: &'a CatalogoItems) -> SigesdaResult<&'a TipoItemCuota> {
    let mut errores = ErroresValidacion::new();

    if nuevo.tipo_item_codigo.trim().is_empty() {
        errores.agregar("tipoItemCodigo", "debe seleccionar un tipo de ítem");
    }
    let largo = nuevo.concepto.trim().chars().count();
    if largo < CONCEPTO_MIN {
        errores.agregar("concepto", format!("el concepto debe tener al menos {} caracteres", CONCEPTO_MIN));
    } else if largo > CONCEPTO_MAX {
        errores.agregar("concepto", format!("el concepto no puede superar {} caracteres", CONCEPTO_MAX));
    }
    if nuevo.monto <= Decimal::ZERO {
        errores.agregar("monto", "el monto debe ser mayor a 0");
    } else if nuevo.monto > MONTO_MAXIMO {
        errores.agregar("monto", format!("el monto no puede superar {}", MONTO_MAXIMO));
    }
    if nuevo.cantidad < 1 {
        errores.agregar("cantidad", "la cantidad debe ser un entero positivo");
    } else if nuevo.cantidad > i64::from(CANTIDAD_MAXIMA) {
        errores.agregar("cantidad", format!("la cantidad no puede superar {}", CANTIDAD_MAXIMA));
    }
    if let Some(obs) = &nuevo.observaciones {
        if obs.chars().count() > OBSERVACIONES_MAX {
            errores.agregar("observaciones", format!("las observaciones no pueden superar {} caracteres", OBSERVACIONES_MAX));
        }
    }
    errores.into_result()?;

    catalogo
        .buscar(&nuevo.tipo_item_codigo)
        .ok_or_else(|| SigesdaError::politica(format!("el tipo de ítem '{}' no existe en el catálogo", nuevo.tipo_item_codigo.trim())))
}

/// Arma el ítem a persistir (sin id) con el signo de su categoría.
pub fn construir_item_manual(nuevo: &NuevoItemManual, tipo: &TipoItemCuota) -> ItemCuota {
    let magnitud = nuevo.monto.abs();
    let monto = match classify_sign(&tipo.categoria_item.codigo) {
        Signo::Positivo => magnitud,
        Signo::Negativo => -magnitud,
    };
    ItemCuota {
        id: 0,
        cuota_id: nuevo.cuota_id,
        tipo_item_codigo: tipo.codigo.clone(),
        categoria_codigo: tipo.categoria_item.codigo.clone(),
        concepto: nuevo.concepto.trim().to_string(),
        monto,
        // validado en rango de u32
        cantidad: u32::try_from(nuevo.cantidad).unwrap_or(1),
        porcentaje: None,
        es_automatico: false,
        es_editable: true,
        observaciones: nuevo.observaciones.as_ref().map(|o| o.trim().to_string()).filter(|o| !o.is_empty()),
        metadata: None,
    }
}

/// Valida, construye y persiste un ítem manual. Las fallas del almacén se
/// propagan como `SigesdaError::Remoto` con el mensaje del servidor.
pub fn add_manual_item<S>(store: &mut S, catalogo: &CatalogoItems, nuevo: &NuevoItemManual) -> SigesdaResult<ItemCuota>
where
    S: ItemCuotaStore + ?Sized,
{
    let tipo = validar_item_manual(nuevo, catalogo)?;
    let item = construir_item_manual(nuevo, tipo);
    match store.guardar_item(item) {
        Ok(guardado) => {
            info!(cuota_id = guardado.cuota_id, item_id = guardado.id, tipo = %guardado.tipo_item_codigo, "ítem manual agregado");
            Ok(guardado)
        }
        Err(e) => {
            warn!(cuota_id = nuevo.cuota_id, error = %e, "no se pudo guardar el ítem manual");
            Err(SigesdaError::Remoto(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorRemoto;

    struct StoreCaido;

    impl ItemCuotaStore for StoreCaido {
        fn guardar_item(&mut self, _item: ItemCuota) -> Result<ItemCuota, ErrorRemoto> {
            Err(ErrorRemoto::con_mensaje("La cuota está bloqueada").con_status(409))
        }
    }

    fn nuevo(tipo: &str, concepto: &str, monto: i64, cantidad: i64) -> NuevoItemManual {
        NuevoItemManual {
            cuota_id: 1,
            tipo_item_codigo: tipo.to_string(),
            concepto: concepto.to_string(),
            monto: Decimal::from(monto),
            cantidad,
            observaciones: None,
        }
    }

    #[test]
    fn test_descuento_se_guarda_negativo() {
        let catalogo = CatalogoItems::predeterminado();
        let n = nuevo("DESCUENTO_MANUAL", "Descuento hermano", 300, 1);
        let tipo = validar_item_manual(&n, &catalogo).unwrap();
        let item = construir_item_manual(&n, tipo);
        assert_eq!(item.monto, Decimal::from(-300));
        assert!(!item.es_automatico);
        assert!(item.es_editable);
    }

    #[test]
    fn test_errores_por_campo_acumulados() {
        let catalogo = CatalogoItems::predeterminado();
        let mut n = nuevo("", "ab", 0, 0);
        n.observaciones = Some("x".repeat(501));
        match validar_item_manual(&n, &catalogo) {
            Err(SigesdaError::Validacion(e)) => {
                assert_eq!(e.campos(), vec!["tipoItemCodigo", "concepto", "monto", "cantidad", "observaciones"]);
            }
            other => panic!("se esperaba validación, fue {:?}", other),
        }
    }

    #[test]
    fn test_monto_y_cantidad_fuera_de_rango() {
        let catalogo = CatalogoItems::predeterminado();
        let mut n = nuevo("ADICIONAL", "Material", 1, 10_001);
        n.monto = Decimal::MAX;
        match validar_item_manual(&n, &catalogo) {
            Err(SigesdaError::Validacion(e)) => assert_eq!(e.campos(), vec!["monto", "cantidad"]),
            other => panic!("se esperaba validación, fue {:?}", other),
        }
        // el límite exacto se acepta
        n.monto = MONTO_MAXIMO;
        n.cantidad = i64::from(CANTIDAD_MAXIMA);
        assert!(validar_item_manual(&n, &catalogo).is_ok());
    }

    #[test]
    fn test_tipo_desconocido_es_politica() {
        let catalogo = CatalogoItems::predeterminado();
        let err = validar_item_manual(&nuevo("NO_EXISTE", "Concepto válido", 10, 1), &catalogo).unwrap_err();
        assert!(matches!(err, SigesdaError::Politica(_)));
    }

    #[test]
    fn test_falla_remota_conserva_mensaje() {
        let catalogo = CatalogoItems::predeterminado();
        let err = add_manual_item(&mut StoreCaido, &catalogo, &nuevo("ADICIONAL", "Material", 10, 1)).unwrap_err();
        match err {
            SigesdaError::Remoto(r) => {
                assert_eq!(r.mensaje_usuario(), "La cuota está bloqueada");
                assert_eq!(r.status, Some(409));
            }
            other => panic!("se esperaba error remoto, fue {:?}", other),
        }
    }
}
