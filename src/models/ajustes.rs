use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErroresValidacion, SigesdaResult};
use crate::models::MONTO_MAXIMO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoAjuste {
    DescuentoPorcentaje,
    DescuentoFijo,
    RecargoPorcentaje,
    RecargoFijo,
    MontoFijoTotal,
}

impl TipoAjuste {
    pub fn es_porcentaje(&self) -> bool {
        matches!(self, TipoAjuste::DescuentoPorcentaje | TipoAjuste::RecargoPorcentaje)
    }
}

/// Alcance (`aplicaA`) de un ajuste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlcanceAjuste {
    TotalCuota,
    Base,
    Actividades,
    ItemsEspecificos,
}

impl AlcanceAjuste {
    /// Posición en el orden de aplicación: TOTAL_CUOTA siempre al final,
    /// sobre el total ya ajustado.
    pub fn orden(&self) -> u8 {
        match self {
            AlcanceAjuste::Base => 0,
            AlcanceAjuste::Actividades => 1,
            AlcanceAjuste::ItemsEspecificos => 2,
            AlcanceAjuste::TotalCuota => 3,
        }
    }
}

/// Ajuste manual recurrente de la cuota de un socio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AjusteCuotaSocio {
    pub id: i64,
    pub persona_id: i64,
    pub tipo_ajuste: TipoAjuste,
    pub valor: Decimal,
    pub aplica_a: AlcanceAjuste,
    /// Ids de ítems afectados cuando `aplica_a == ITEMS_ESPECIFICOS`.
    #[serde(default)]
    pub items_afectados: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepto: Option<String>,
    pub fecha_inicio: NaiveDate,
    #[serde(default)]
    pub fecha_fin: Option<NaiveDate>,
    pub activo: bool,
}

impl AjusteCuotaSocio {
    pub fn validar(&self) -> SigesdaResult<()> {
        let mut errores = ErroresValidacion::new();
        if self.tipo_ajuste.es_porcentaje() {
            if self.valor < Decimal::ZERO || self.valor > Decimal::ONE_HUNDRED {
                errores.agregar("valor", "el porcentaje debe estar entre 0 y 100");
            }
        } else if self.valor < Decimal::ZERO {
            errores.agregar("valor", "el monto no puede ser negativo");
        } else if self.valor > MONTO_MAXIMO {
            errores.agregar("valor", format!("el monto no puede superar {}", MONTO_MAXIMO));
        }
        if let Some(fin) = self.fecha_fin {
            if fin < self.fecha_inicio {
                errores.agregar("fechaFin", "la fecha de fin debe ser posterior o igual a la de inicio");
            }
        }
        if self.aplica_a == AlcanceAjuste::ItemsEspecificos && self.items_afectados.is_empty() {
            errores.agregar("itemsAfectados", "debe indicar al menos un ítem");
        }
        errores.into_result()
    }

    pub fn concepto_o_defecto(&self) -> String {
        match self.concepto.as_deref() {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => match self.tipo_ajuste {
                TipoAjuste::DescuentoPorcentaje | TipoAjuste::DescuentoFijo => "Descuento por ajuste".to_string(),
                TipoAjuste::RecargoPorcentaje | TipoAjuste::RecargoFijo => "Recargo por ajuste".to_string(),
                TipoAjuste::MontoFijoTotal => "Ajuste a monto fijo".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoExencion {
    Total,
    Parcial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoExencion {
    PendienteAprobacion,
    Aprobada,
    Vigente,
    Vencida,
    Revocada,
    Rechazada,
}

impl EstadoExencion {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoExencion::PendienteAprobacion => "PENDIENTE_APROBACION",
            EstadoExencion::Aprobada => "APROBADA",
            EstadoExencion::Vigente => "VIGENTE",
            EstadoExencion::Vencida => "VENCIDA",
            EstadoExencion::Revocada => "REVOCADA",
            EstadoExencion::Rechazada => "RECHAZADA",
        }
    }

    pub fn es_terminal(&self) -> bool {
        matches!(self, EstadoExencion::Vencida | EstadoExencion::Revocada | EstadoExencion::Rechazada)
    }
}

impl fmt::Display for EstadoExencion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exención temporal (total o parcial) sujeta a aprobación.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExencionCuota {
    pub id: i64,
    pub persona_id: i64,
    pub tipo_exencion: TipoExencion,
    pub porcentaje: Decimal,
    pub motivo_exencion: String,
    pub fecha_inicio: NaiveDate,
    #[serde(default)]
    pub fecha_fin: Option<NaiveDate>,
    pub estado: EstadoExencion,
}

impl ExencionCuota {
    pub fn validar(&self) -> SigesdaResult<()> {
        let mut errores = ErroresValidacion::new();
        if self.porcentaje < Decimal::ZERO || self.porcentaje > Decimal::ONE_HUNDRED {
            errores.agregar("porcentaje", "el porcentaje debe estar entre 0 y 100");
        }
        let es_cien = self.porcentaje == Decimal::ONE_HUNDRED;
        match self.tipo_exencion {
            TipoExencion::Total if !es_cien => {
                errores.agregar("porcentaje", "una exención TOTAL debe ser del 100%");
            }
            TipoExencion::Parcial if es_cien => {
                errores.agregar("tipoExencion", "una exención del 100% debe ser TOTAL");
            }
            _ => {}
        }
        if let Some(fin) = self.fecha_fin {
            if fin < self.fecha_inicio {
                errores.agregar("fechaFin", "la fecha de fin debe ser posterior o igual a la de inicio");
            }
        }
        errores.into_result()
    }
}
