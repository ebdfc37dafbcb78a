use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{ErroresValidacion, SigesdaResult};

/// Cota de cualquier monto individual, en valor absoluto (1.000 millones).
/// Junto con [`CANTIDAD_MAXIMA`] mantiene las sumas del libro lejos del
/// límite de `Decimal`.
pub const MONTO_MAXIMO: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

pub const CANTIDAD_MAXIMA: u32 = 10_000;

/// Línea del libro de una cuota. `monto * cantidad` es su aporte con signo.
///
/// El signo viaja en `monto` (las categorías HABER llevan montos negativos);
/// `cantidad` siempre es >= 1. `porcentaje` sólo documenta cómo se derivó el
/// monto y nunca entra en el total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCuota {
    pub id: i64,
    pub cuota_id: i64,
    pub tipo_item_codigo: String,
    pub categoria_codigo: String,
    pub concepto: String,
    pub monto: Decimal,
    pub cantidad: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub porcentaje: Option<Decimal>,
    pub es_automatico: bool,
    pub es_editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ItemCuota {
    pub fn contribucion(&self) -> Decimal {
        self.monto * Decimal::from(self.cantidad)
    }

    /// Como [`ItemCuota::contribucion`] pero sin entrar en pánico por desborde.
    pub fn contribucion_verificada(&self) -> Option<Decimal> {
        self.monto.checked_mul(Decimal::from(self.cantidad))
    }

    /// Clave de la regla que generó un ítem automático (`metadata.reglaOrigen`).
    pub fn regla_origen(&self) -> Option<&str> {
        self.metadata.as_ref()?.get("reglaOrigen")?.as_str()
    }
}

/// Acumula los errores de cada ítem (`items[i].campo`).
pub(crate) fn errores_items(items: &[ItemCuota], errores: &mut ErroresValidacion) {
    for (i, it) in items.iter().enumerate() {
        if it.cantidad < 1 {
            errores.agregar(format!("items[{}].cantidad", i), "la cantidad debe ser al menos 1");
        } else if it.cantidad > CANTIDAD_MAXIMA {
            errores.agregar(format!("items[{}].cantidad", i), format!("la cantidad no puede superar {}", CANTIDAD_MAXIMA));
        }
        if it.monto.abs() > MONTO_MAXIMO {
            errores.agregar(format!("items[{}].monto", i), format!("el monto no puede superar {}", MONTO_MAXIMO));
        }
    }
}

/// Valida una lista de ítems suelta (p. ej. para un desglose).
pub fn validar_items(items: &[ItemCuota]) -> SigesdaResult<()> {
    let mut errores = ErroresValidacion::new();
    errores_items(items, &mut errores);
    errores.into_result()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cuota {
    pub id: i64,
    pub recibo_id: i64,
    pub persona_id: i64,
    pub mes: u32,
    pub anio: i32,
    pub categoria_id: i64,
    #[serde(default)]
    pub items: Vec<ItemCuota>,
    pub monto_total: Decimal,
    // campos del cálculo previo a los ítems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monto_base: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monto_actividades: Option<Decimal>,
}

impl Cuota {
    /// Período válido, ítems con `cantidad` en `1..=CANTIDAD_MAXIMA` y montos
    /// (incluidos los del cálculo previo) dentro de [`MONTO_MAXIMO`].
    pub fn validar(&self) -> SigesdaResult<()> {
        let mut errores = ErroresValidacion::new();
        if !(1..=12).contains(&self.mes) {
            errores.agregar("mes", "el mes debe estar entre 1 y 12");
        }
        for (campo, monto) in [("montoBase", self.monto_base), ("montoActividades", self.monto_actividades)] {
            if monto.is_some_and(|m| m.abs() > MONTO_MAXIMO) {
                errores.agregar(campo, format!("el monto no puede superar {}", MONTO_MAXIMO));
            }
        }
        errores_items(&self.items, &mut errores);
        errores.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoRecibo {
    Pendiente,
    Pagado,
    PagadoParcial,
    Vencido,
    Anulado,
}

impl EstadoRecibo {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoRecibo::Pendiente => "PENDIENTE",
            EstadoRecibo::Pagado => "PAGADO",
            EstadoRecibo::PagadoParcial => "PAGADO_PARCIAL",
            EstadoRecibo::Vencido => "VENCIDO",
            EstadoRecibo::Anulado => "ANULADO",
        }
    }

    /// Un recibo pagado o anulado congela sus cuotas.
    pub fn bloquea_recalculo(&self) -> bool {
        matches!(self, EstadoRecibo::Pagado | EstadoRecibo::Anulado)
    }
}

impl fmt::Display for EstadoRecibo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoriaItem {
    pub codigo: String,
    pub nombre: String,
}

/// Entrada del catálogo de tipos de ítem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipoItemCuota {
    pub codigo: String,
    pub nombre: String,
    pub categoria_item: CategoriaItem,
}
