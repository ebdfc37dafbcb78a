// Motor del libro de ítems: signo por categoría, subtotales, bloques y desglose.
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::LedgerConfig;
use crate::models::{Cuota, ItemCuota};

/// Categorías que suman al total (columna DEBE). Cualquier otra resta.
pub const CATEGORIAS_DEBE: [&str; 4] = ["BASE", "ACTIVIDAD", "RECARGO", "ADICIONAL"];

/// Categorías que se presentan juntas en el bloque de ajustes.
const CATEGORIAS_AJUSTES: [&str; 3] = ["DESCUENTO", "RECARGO", "OTRO"];

pub const BLOQUE_AJUSTES: &str = "AJUSTES";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signo {
    Positivo,
    Negativo,
}

fn normalizar_categoria(codigo: &str) -> String {
    codigo.trim().to_uppercase()
}

/// Signo contable de una categoría. Los códigos desconocidos se tratan como
/// HABER (restan), de modo que una categoría nueva nunca infla el total.
pub fn classify_sign(categoria_codigo: &str) -> Signo {
    let codigo = normalizar_categoria(categoria_codigo);
    if CATEGORIAS_DEBE.contains(&codigo.as_str()) { Signo::Positivo } else { Signo::Negativo }
}

/// Σ monto·cantidad de un bloque cualquiera; vacío => 0.
pub fn compute_category_subtotal(items: &[ItemCuota]) -> Decimal {
    items.iter().map(ItemCuota::contribucion).sum()
}

pub fn compute_grand_total(items: &[ItemCuota]) -> Decimal {
    compute_category_subtotal(items)
}

/// Total con aritmética verificada: `None` si algún producto o suma desborda.
pub fn total_verificado<'a, I>(items: I) -> Option<Decimal>
where
    I: IntoIterator<Item = &'a ItemCuota>,
{
    items
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, it| acc.checked_add(it.contribucion_verificada()?))
}

pub fn redondear(monto: Decimal, decimales: u32) -> Decimal {
    monto.round_dp_with_strategy(decimales, RoundingStrategy::MidpointAwayFromZero)
}

/// Importe absoluto del ítem repartido en columnas `(debe, haber)`.
pub fn columnas_debe_haber(item: &ItemCuota) -> (Decimal, Decimal) {
    let abs = item.contribucion().abs();
    match classify_sign(&item.categoria_codigo) {
        Signo::Positivo => (abs, Decimal::ZERO),
        Signo::Negativo => (Decimal::ZERO, abs),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bloque {
    pub clave: String,
    pub items: Vec<ItemCuota>,
    pub subtotal: Decimal,
}

fn clave_bloque(categoria: &str) -> String {
    let c = normalizar_categoria(categoria);
    if CATEGORIAS_AJUSTES.contains(&c.as_str()) { BLOQUE_AJUSTES.to_string() } else { c }
}

/// Agrupa en bloques BASE, ACTIVIDAD, AJUSTES y luego cada categoría propia
/// en orden alfabético. Dentro de cada bloque se respeta el orden de entrada.
pub fn agrupar_en_bloques(items: &[ItemCuota]) -> Vec<Bloque> {
    let mut por_clave: BTreeMap<String, Vec<ItemCuota>> = BTreeMap::new();
    for it in items {
        por_clave.entry(clave_bloque(&it.categoria_codigo)).or_default().push(it.clone());
    }

    let mut bloques = Vec::new();
    for fija in ["BASE", "ACTIVIDAD", BLOQUE_AJUSTES] {
        if let Some(its) = por_clave.remove(fija) {
            let subtotal = compute_category_subtotal(&its);
            bloques.push(Bloque { clave: fija.to_string(), items: its, subtotal });
        }
    }
    for (clave, its) in por_clave {
        let subtotal = compute_category_subtotal(&its);
        bloques.push(Bloque { clave, items: its, subtotal });
    }
    bloques
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtotalCategoria {
    pub items: Vec<ItemCuota>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totales {
    pub base: Decimal,
    pub actividades: Decimal,
    pub descuentos: Decimal,
    pub recargos: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Desglose {
    pub desglose: BTreeMap<String, SubtotalCategoria>,
    pub totales: Totales,
}

/// Desglose por categoría con los totales que muestra el detalle de cuota.
/// `descuentos` reúne todo lo que resta; `recargos` sólo RECARGO y ADICIONAL.
pub fn desglose(items: &[ItemCuota]) -> Desglose {
    let mut mapa: BTreeMap<String, SubtotalCategoria> = BTreeMap::new();
    for it in items {
        let entrada = mapa
            .entry(normalizar_categoria(&it.categoria_codigo))
            .or_insert_with(|| SubtotalCategoria { items: Vec::new(), subtotal: Decimal::ZERO });
        entrada.subtotal += it.contribucion();
        entrada.items.push(it.clone());
    }

    let subtotal_de = |cat: &str| mapa.get(cat).map(|s| s.subtotal).unwrap_or(Decimal::ZERO);
    let descuentos: Decimal = items
        .iter()
        .filter(|it| classify_sign(&it.categoria_codigo) == Signo::Negativo)
        .map(ItemCuota::contribucion)
        .sum();

    let totales = Totales {
        base: subtotal_de("BASE"),
        actividades: subtotal_de("ACTIVIDAD"),
        descuentos,
        recargos: subtotal_de("RECARGO") + subtotal_de("ADICIONAL"),
        total: compute_grand_total(items),
    };
    Desglose { desglose: mapa, totales }
}

/// Total de la cuota según el modo de cálculo configurado.
pub fn total_cuota(cuota: &Cuota, config: &LedgerConfig) -> Decimal {
    let total = if config.sistema_items {
        compute_grand_total(&cuota.items)
    } else {
        cuota.monto_base.unwrap_or(Decimal::ZERO) + cuota.monto_actividades.unwrap_or(Decimal::ZERO)
    };
    redondear(total, config.decimales)
}
