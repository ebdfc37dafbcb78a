// Motor de cuotas: libro de ítems, ítems manuales, aplicabilidad de ajustes y
// exenciones, recálculo, ciclo de vida de exenciones y generación masiva.
pub mod aplicabilidad;
pub mod exenciones;
pub mod generacion;
pub mod items;
pub mod ledger;
pub mod recalculo;

pub use aplicabilidad::{find_active_ajustes, find_active_exencion, ordenar_por_alcance, ExencionActiva};
pub use exenciones::{estado_efectivo, transicionar, AccionExencion};
pub use generacion::{planificar_generacion, CuotaOmitida, PlanGeneracion};
pub use items::{add_manual_item, CatalogoItems, NuevoItemManual};
pub use ledger::{
    agrupar_en_bloques, classify_sign, columnas_debe_haber, compute_category_subtotal, compute_grand_total, desglose,
    total_cuota, Bloque, Desglose, Signo,
};
pub use recalculo::{recalculate, ContextoRecalculo, OpcionesRecalculo, RecalculoResult, ReglasCuota};
