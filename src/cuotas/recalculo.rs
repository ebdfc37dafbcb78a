//! Recálculo de una cuota.
//!
//! Regenera los ítems automáticos (base, actividades, exención, descuentos por
//! regla y ajustes) a partir de las reglas vigentes y deja intactos los ítems
//! manuales. Cada ítem automático lleva en `metadata.reglaOrigen` la clave de
//! la regla que lo produjo; así se detectan los ítems obsoletos y se conservan
//! los ids de los que siguen vigentes.
//!
//! Orden de aplicación:
//! 1. base bruta y cargos de actividades
//! 2. exención vigente sobre la base bruta
//! 3. descuentos por regla sobre su alcance (base neta o actividades)
//! 4. ajustes del socio por alcance: BASE, ACTIVIDADES, ITEMS_ESPECIFICOS y
//!    por último TOTAL_CUOTA sobre el total corriente (manuales incluidos)
//!
//! La cuota original nunca se modifica: el resultado trae ambas versiones.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::aplicabilidad::{find_active_ajustes, find_active_exencion, ordenar_por_alcance};
use super::ledger::{compute_category_subtotal, compute_grand_total, redondear, total_cuota};
use crate::config::{LedgerConfig, MomentoItemsEspecificos};
use crate::error::{Advertencia, ErroresValidacion, SigesdaError, SigesdaResult};
use crate::models::{
    AjusteCuotaSocio, AlcanceAjuste, Cuota, EstadoRecibo, ExencionCuota, ItemCuota, TipoAjuste, TipoExencion, CANTIDAD_MAXIMA,
    MONTO_MAXIMO,
};

pub const ORIGEN_BASE: &str = "BASE";

pub const TIPO_BASE: &str = "CUOTA_BASE";
pub const TIPO_ACTIVIDAD: &str = "ACTIVIDAD";
pub const TIPO_EXENCION: &str = "EXENCION";
pub const TIPO_DESCUENTO_REGLA: &str = "DESCUENTO_REGLA";
pub const TIPO_AJUSTE: &str = "AJUSTE_SOCIO";

pub const ANOMALIA_ITEMS_NO_ENCONTRADOS: &str = "ITEMS_AJUSTE_NO_ENCONTRADOS";
pub const ANOMALIA_OTRA_PERSONA: &str = "REGISTRO_DE_OTRA_PERSONA";

fn origen_actividad(participacion_id: i64) -> String {
    format!("ACTIVIDAD:{}", participacion_id)
}

fn origen_exencion(id: i64) -> String {
    format!("EXENCION:{}", id)
}

fn origen_descuento(id: i64) -> String {
    format!("DESCUENTO:{}", id)
}

fn origen_ajuste(id: i64) -> String {
    format!("AJUSTE:{}", id)
}

fn uno() -> u32 {
    1
}

fn verdadero() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpcionesRecalculo {
    #[serde(default = "verdadero")]
    pub aplicar_ajustes: bool,
    #[serde(default = "verdadero")]
    pub aplicar_descuentos: bool,
    #[serde(default = "verdadero")]
    pub aplicar_exenciones: bool,
}

impl Default for OpcionesRecalculo {
    fn default() -> Self {
        OpcionesRecalculo { aplicar_ajustes: true, aplicar_descuentos: true, aplicar_exenciones: true }
    }
}

/// Cargo de una actividad en la que participa la persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoActividad {
    pub participacion_id: i64,
    pub concepto: String,
    pub monto: Decimal,
    /// Si la participación tiene precio especial, reemplaza a `monto`.
    #[serde(default)]
    pub precio_especial: Option<Decimal>,
    #[serde(default = "uno")]
    pub cantidad: u32,
}

impl CargoActividad {
    pub fn monto_efectivo(&self) -> Decimal {
        self.precio_especial.unwrap_or(self.monto)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlcanceDescuento {
    Base,
    Actividades,
}

/// Descuento porcentual de una regla de la categoría (p. ej. grupo familiar).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReglaDescuento {
    pub id: i64,
    pub concepto: String,
    pub porcentaje: Decimal,
    pub aplica_a: AlcanceDescuento,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReglasCuota {
    pub monto_base: Decimal,
    #[serde(default)]
    pub actividades: Vec<CargoActividad>,
    #[serde(default)]
    pub descuentos: Vec<ReglaDescuento>,
}

impl ReglasCuota {
    pub fn validar(&self) -> SigesdaResult<()> {
        let mut errores = ErroresValidacion::new();
        if self.monto_base < Decimal::ZERO {
            errores.agregar("montoBase", "el monto base no puede ser negativo");
        } else if self.monto_base > MONTO_MAXIMO {
            errores.agregar("montoBase", format!("el monto base no puede superar {}", MONTO_MAXIMO));
        }
        let mut participaciones = HashSet::new();
        for (i, a) in self.actividades.iter().enumerate() {
            if a.monto_efectivo() < Decimal::ZERO {
                errores.agregar(format!("actividades[{}].monto", i), "el monto no puede ser negativo");
            } else if a.monto_efectivo() > MONTO_MAXIMO {
                errores.agregar(format!("actividades[{}].monto", i), format!("el monto no puede superar {}", MONTO_MAXIMO));
            }
            if a.cantidad == 0 {
                errores.agregar(format!("actividades[{}].cantidad", i), "la cantidad debe ser al menos 1");
            } else if a.cantidad > CANTIDAD_MAXIMA {
                errores.agregar(format!("actividades[{}].cantidad", i), format!("la cantidad no puede superar {}", CANTIDAD_MAXIMA));
            }
            if !participaciones.insert(a.participacion_id) {
                errores.agregar(format!("actividades[{}].participacionId", i), "participación repetida");
            }
        }
        let mut reglas = HashSet::new();
        for (i, d) in self.descuentos.iter().enumerate() {
            if d.porcentaje < Decimal::ZERO || d.porcentaje > Decimal::ONE_HUNDRED {
                errores.agregar(format!("descuentos[{}].porcentaje", i), "el porcentaje debe estar entre 0 y 100");
            }
            if !reglas.insert(d.id) {
                errores.agregar(format!("descuentos[{}].id", i), "regla repetida");
            }
        }
        errores.into_result()
    }
}

/// Todo lo que el recálculo necesita además de la cuota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextoRecalculo {
    pub fecha: chrono::NaiveDate,
    pub estado_recibo: EstadoRecibo,
    pub reglas: ReglasCuota,
    #[serde(default)]
    pub ajustes: Vec<AjusteCuotaSocio>,
    #[serde(default)]
    pub exenciones: Vec<ExencionCuota>,
    #[serde(default)]
    pub opciones: OpcionesRecalculo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Variacion {
    pub antes: Decimal,
    pub despues: Decimal,
    pub diferencia: Decimal,
}

impl Variacion {
    pub fn entre(antes: Decimal, despues: Decimal) -> Self {
        Variacion { antes, despues, diferencia: despues - antes }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AjusteAplicado {
    pub ajuste_id: i64,
    pub tipo_ajuste: TipoAjuste,
    pub aplica_a: AlcanceAjuste,
    /// Aporte con signo al total.
    pub monto: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExencionAplicada {
    pub exencion_id: i64,
    pub tipo_exencion: TipoExencion,
    pub porcentaje: Decimal,
    pub monto: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cambios {
    pub monto_base: Variacion,
    pub monto_actividades: Variacion,
    pub monto_total: Variacion,
    pub ajustes_aplicados: Vec<AjusteAplicado>,
    pub exenciones_aplicadas: Vec<ExencionAplicada>,
    /// Ids de ítems automáticos eliminados por obsoletos.
    pub items_obsoletos: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalculoResult {
    pub cuota_original: Cuota,
    pub cuota_recalculada: Cuota,
    pub cambios: Cambios,
    pub advertencias: Vec<Advertencia>,
}

/// Acumula los ítems automáticos nuevos, reutilizando el id del ítem previo
/// con la misma regla de origen.
struct Constructor {
    cuota_id: i64,
    previos: HashMap<String, i64>,
    usados: HashSet<String>,
    siguiente_id: i64,
    items: Vec<ItemCuota>,
}

impl Constructor {
    fn nuevo(cuota: &Cuota) -> Self {
        let mut previos = HashMap::new();
        for it in cuota.items.iter().filter(|i| i.es_automatico) {
            if let Some(origen) = it.regla_origen() {
                previos.entry(origen.to_string()).or_insert(it.id);
            }
        }
        let siguiente_id = cuota.items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        Constructor { cuota_id: cuota.id, previos, usados: HashSet::new(), siguiente_id, items: Vec::new() }
    }

    #[allow(clippy::too_many_arguments)]
    fn agregar(
        &mut self,
        origen: String,
        tipo: &str,
        categoria: &str,
        concepto: &str,
        monto: Decimal,
        cantidad: u32,
        porcentaje: Option<Decimal>,
    ) -> SigesdaResult<i64> {
        if !self.usados.insert(origen.clone()) {
            return Err(SigesdaError::campo("reglaOrigen", format!("regla de origen duplicada '{}'", origen)));
        }
        let id = match self.previos.get(&origen) {
            Some(&id) => id,
            None => {
                let id = self.siguiente_id;
                self.siguiente_id += 1;
                id
            }
        };
        self.items.push(ItemCuota {
            id,
            cuota_id: self.cuota_id,
            tipo_item_codigo: tipo.to_string(),
            categoria_codigo: categoria.to_string(),
            concepto: concepto.to_string(),
            monto,
            cantidad,
            porcentaje,
            es_automatico: true,
            es_editable: false,
            observaciones: None,
            metadata: Some(json!({ "reglaOrigen": origen })),
        });
        Ok(id)
    }
}

/// Aporte con signo de un ajuste dado el monto actual de su alcance.
/// Los descuentos fijos no llevan el alcance por debajo de cero.
fn delta_ajuste(tipo: TipoAjuste, valor: Decimal, referencia: Decimal) -> Decimal {
    let positiva = referencia.max(Decimal::ZERO);
    match tipo {
        TipoAjuste::DescuentoPorcentaje => -(positiva * valor / Decimal::ONE_HUNDRED),
        TipoAjuste::DescuentoFijo => -valor.min(positiva),
        TipoAjuste::RecargoPorcentaje => positiva * valor / Decimal::ONE_HUNDRED,
        TipoAjuste::RecargoFijo => valor,
        TipoAjuste::MontoFijoTotal => valor - referencia,
    }
}

/// Suma de los aportes de los ítems cuyo id está en `ids`, y los ids que no
/// aparecieron.
fn suma_por_ids<'a, I>(items: I, ids: &[i64]) -> (Decimal, Vec<i64>)
where
    I: IntoIterator<Item = &'a ItemCuota>,
{
    let buscados: HashSet<i64> = ids.iter().copied().collect();
    let mut encontrados = HashSet::new();
    let mut suma = Decimal::ZERO;
    for it in items {
        if buscados.contains(&it.id) && encontrados.insert(it.id) {
            suma += it.contribucion();
        }
    }
    let faltantes = ids.iter().copied().filter(|id| !encontrados.contains(id)).collect();
    (suma, faltantes)
}

fn subtotal_categoria(items: &[ItemCuota], categoria: &str) -> Decimal {
    items
        .iter()
        .filter(|i| i.categoria_codigo.trim().eq_ignore_ascii_case(categoria))
        .map(ItemCuota::contribucion)
        .sum()
}

fn montos_previos(cuota: &Cuota, config: &LedgerConfig) -> (Decimal, Decimal) {
    if config.sistema_items {
        (subtotal_categoria(&cuota.items, "BASE"), subtotal_categoria(&cuota.items, "ACTIVIDAD"))
    } else {
        (cuota.monto_base.unwrap_or(Decimal::ZERO), cuota.monto_actividades.unwrap_or(Decimal::ZERO))
    }
}

/// Recalcula la cuota con las reglas y registros del contexto.
///
/// Falla con `Politica` si el recibo está pagado o anulado y con `Validacion`
/// si las reglas, el ajuste o la exención aplicables tienen datos inválidos.
/// En cualquier error la cuota original queda como estaba.
pub fn recalculate(cuota: &Cuota, ctx: &ContextoRecalculo, config: &LedgerConfig) -> SigesdaResult<RecalculoResult> {
    if ctx.estado_recibo.bloquea_recalculo() {
        warn!(cuota_id = cuota.id, estado = %ctx.estado_recibo, "recálculo rechazado");
        return Err(SigesdaError::politica(format!(
            "la cuota {} pertenece a un recibo {} y no puede recalcularse",
            cuota.id, ctx.estado_recibo
        )));
    }
    cuota.validar()?;
    ctx.reglas.validar()?;

    let dec = config.decimales;
    let opciones = ctx.opciones;
    let mut advertencias: Vec<Advertencia> = Vec::new();

    let ajustes_propios: Vec<AjusteCuotaSocio> = ctx.ajustes.iter().filter(|a| a.persona_id == cuota.persona_id).cloned().collect();
    let exenciones_propias: Vec<ExencionCuota> = ctx.exenciones.iter().filter(|e| e.persona_id == cuota.persona_id).cloned().collect();
    let ajenos = (ctx.ajustes.len() - ajustes_propios.len()) + (ctx.exenciones.len() - exenciones_propias.len());
    if ajenos > 0 {
        warn!(cuota_id = cuota.id, ajenos, "se ignoran registros de otra persona");
        advertencias.push(Advertencia::new(
            ANOMALIA_OTRA_PERSONA,
            format!("se ignoraron {} ajustes/exenciones que no son de la persona {}", ajenos, cuota.persona_id),
        ));
    }

    let manuales: Vec<ItemCuota> = cuota.items.iter().filter(|i| !i.es_automatico).cloned().collect();
    let mut b = Constructor::nuevo(cuota);

    let base_bruta = redondear(ctx.reglas.monto_base, dec);
    b.agregar(ORIGEN_BASE.to_string(), TIPO_BASE, "BASE", "Cuota base", base_bruta, 1, None)?;

    let mut actividades_neta = Decimal::ZERO;
    for act in &ctx.reglas.actividades {
        let monto = redondear(act.monto_efectivo(), dec);
        b.agregar(origen_actividad(act.participacion_id), TIPO_ACTIVIDAD, "ACTIVIDAD", &act.concepto, monto, act.cantidad, None)?;
        actividades_neta += monto * Decimal::from(act.cantidad);
    }
    let mut base_neta = base_bruta;

    let mut exenciones_aplicadas = Vec::new();
    if opciones.aplicar_exenciones {
        let activa = find_active_exencion(&exenciones_propias, ctx.fecha);
        advertencias.extend(activa.advertencias);
        if let Some(ex) = activa.exencion {
            ex.validar()?;
            let monto = redondear(base_neta * ex.porcentaje / Decimal::ONE_HUNDRED, dec);
            if !monto.is_zero() {
                let concepto = format!("Exención: {}", ex.motivo_exencion.trim());
                b.agregar(origen_exencion(ex.id), TIPO_EXENCION, "DESCUENTO", &concepto, -monto, 1, Some(ex.porcentaje))?;
            }
            base_neta -= monto;
            exenciones_aplicadas.push(ExencionAplicada {
                exencion_id: ex.id,
                tipo_exencion: ex.tipo_exencion,
                porcentaje: ex.porcentaje,
                monto: -monto,
            });
        }
    }

    if opciones.aplicar_descuentos {
        for regla in &ctx.reglas.descuentos {
            let alcance = match regla.aplica_a {
                AlcanceDescuento::Base => &mut base_neta,
                AlcanceDescuento::Actividades => &mut actividades_neta,
            };
            let monto = redondear((*alcance).max(Decimal::ZERO) * regla.porcentaje / Decimal::ONE_HUNDRED, dec);
            if monto.is_zero() {
                continue;
            }
            *alcance -= monto;
            b.agregar(origen_descuento(regla.id), TIPO_DESCUENTO_REGLA, "DESCUENTO", &regla.concepto, -monto, 1, Some(regla.porcentaje))?;
        }
    }

    let mut ajustes_aplicados = Vec::new();
    if opciones.aplicar_ajustes {
        for ajuste in ordenar_por_alcance(find_active_ajustes(&ajustes_propios, ctx.fecha)) {
            ajuste.validar()?;
            let referencia = match ajuste.aplica_a {
                AlcanceAjuste::Base => base_neta,
                AlcanceAjuste::Actividades => actividades_neta,
                AlcanceAjuste::ItemsEspecificos => {
                    let (suma, faltantes) = match config.items_especificos {
                        MomentoItemsEspecificos::DespuesDeRegenerar => {
                            suma_por_ids(b.items.iter().chain(manuales.iter()), &ajuste.items_afectados)
                        }
                        MomentoItemsEspecificos::AntesDeRegenerar => suma_por_ids(cuota.items.iter(), &ajuste.items_afectados),
                    };
                    if !faltantes.is_empty() {
                        warn!(ajuste_id = ajuste.id, ?faltantes, "ítems del ajuste no encontrados");
                        advertencias.push(Advertencia::new(
                            ANOMALIA_ITEMS_NO_ENCONTRADOS,
                            format!("el ajuste {} referencia ítems inexistentes: {:?}", ajuste.id, faltantes),
                        ));
                    }
                    suma
                }
                AlcanceAjuste::TotalCuota => compute_grand_total(&b.items) + compute_grand_total(&manuales),
            };

            let delta = redondear(delta_ajuste(ajuste.tipo_ajuste, ajuste.valor, referencia), dec);
            match ajuste.aplica_a {
                AlcanceAjuste::Base => base_neta += delta,
                AlcanceAjuste::Actividades => actividades_neta += delta,
                _ => {}
            }
            if !delta.is_zero() {
                let categoria = if delta > Decimal::ZERO { "RECARGO" } else { "DESCUENTO" };
                let porcentaje = ajuste.tipo_ajuste.es_porcentaje().then_some(ajuste.valor);
                b.agregar(origen_ajuste(ajuste.id), TIPO_AJUSTE, categoria, &ajuste.concepto_o_defecto(), delta, 1, porcentaje)?;
            }
            ajustes_aplicados.push(AjusteAplicado {
                ajuste_id: ajuste.id,
                tipo_ajuste: ajuste.tipo_ajuste,
                aplica_a: ajuste.aplica_a,
                monto: delta,
            });
        }
    }

    // obsoletos: automáticos previos cuyo id no fue reutilizado
    let reutilizados: HashSet<i64> = b.items.iter().map(|i| i.id).collect();
    let items_obsoletos: Vec<i64> = cuota
        .items
        .iter()
        .filter(|i| i.es_automatico && !reutilizados.contains(&i.id))
        .map(|i| i.id)
        .collect();

    let mut items = b.items;
    items.extend(manuales);

    let (base_antes, actividades_antes) = montos_previos(cuota, config);
    let total_antes = total_cuota(cuota, config);

    let mut recalculada = cuota.clone();
    recalculada.items = items;
    let base_despues = subtotal_categoria(&recalculada.items, "BASE");
    let actividades_despues = subtotal_categoria(&recalculada.items, "ACTIVIDAD");
    recalculada.monto_base = Some(base_despues);
    recalculada.monto_actividades = Some(actividades_despues);
    recalculada.monto_total = redondear(compute_category_subtotal(&recalculada.items), dec);

    debug!(
        cuota_id = cuota.id,
        antes = %total_antes,
        despues = %recalculada.monto_total,
        obsoletos = items_obsoletos.len(),
        "cuota recalculada"
    );

    let cambios = Cambios {
        monto_base: Variacion::entre(base_antes, base_despues),
        monto_actividades: Variacion::entre(actividades_antes, actividades_despues),
        monto_total: Variacion::entre(total_antes, recalculada.monto_total),
        ajustes_aplicados,
        exenciones_aplicadas,
        items_obsoletos,
    };

    Ok(RecalculoResult { cuota_original: cuota.clone(), cuota_recalculada: recalculada, cambios, advertencias })
}
