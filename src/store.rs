// Puerto de persistencia de cuotas e implementación en memoria usada por el servicio.
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::cuotas::ledger::total_verificado;
use crate::error::ErrorRemoto;
use crate::models::{Cuota, ItemCuota};

/// Guarda un ítem nuevo y devuelve la versión persistida (con id asignado).
/// Cualquier falla es remota: red, servidor o cuota inexistente del otro lado.
pub trait ItemCuotaStore {
    fn guardar_item(&mut self, item: ItemCuota) -> Result<ItemCuota, ErrorRemoto>;
}

/// Almacén en memoria de cuotas. Mantiene `montoTotal` al día en cada inserción.
#[derive(Debug, Default)]
pub struct MemoriaCuotas {
    cuotas: HashMap<i64, Cuota>,
    siguiente_item_id: i64,
}

impl MemoriaCuotas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta o reemplaza la cuota completa.
    pub fn reemplazar(&mut self, cuota: Cuota) {
        let max_id = cuota.items.iter().map(|i| i.id).max().unwrap_or(0);
        if max_id >= self.siguiente_item_id {
            self.siguiente_item_id = max_id + 1;
        }
        self.cuotas.insert(cuota.id, cuota);
    }

    fn asignar_item_id(&mut self) -> i64 {
        let id = self.siguiente_item_id.max(1);
        self.siguiente_item_id = id + 1;
        id
    }

    /// Guarda el resultado de un recálculo hecho sobre `base`.
    ///
    /// Los ítems que aparecieron en la cuota guardada después de tomar `base`
    /// (altas manuales concurrentes) se conservan al final. Los ítems nuevos
    /// del recálculo reciben ids del contador global. El total sólo se
    /// recalcula si hubo altas concurrentes. Si desborda no se modifica nada.
    pub fn aplicar_recalculo(&mut self, base: &Cuota, mut recalculada: Cuota) -> Result<Cuota, ErrorRemoto> {
        let actual = self
            .cuotas
            .get(&base.id)
            .ok_or_else(|| ErrorRemoto::con_mensaje(format!("La cuota {} no existe", base.id)).con_status(404))?;
        let ids_base: HashSet<i64> = base.items.iter().map(|i| i.id).collect();
        let concurrentes: Vec<ItemCuota> = actual.items.iter().filter(|i| !ids_base.contains(&i.id)).cloned().collect();

        let total = total_verificado(recalculada.items.iter().chain(&concurrentes)).ok_or_else(total_excedido)?;

        for item in recalculada.items.iter_mut().filter(|i| !ids_base.contains(&i.id)) {
            item.id = self.asignar_item_id();
        }
        if !concurrentes.is_empty() {
            warn!(cuota_id = base.id, items = concurrentes.len(), "se conservan ítems agregados durante el recálculo");
            recalculada.items.extend(concurrentes);
            recalculada.monto_total = total;
        }
        self.cuotas.insert(recalculada.id, recalculada.clone());
        Ok(recalculada)
    }

    pub fn obtener(&self, id: i64) -> Option<&Cuota> {
        self.cuotas.get(&id)
    }

    /// Copia de todas las cuotas, ordenadas por id.
    pub fn todas(&self) -> Vec<Cuota> {
        let mut v: Vec<Cuota> = self.cuotas.values().cloned().collect();
        v.sort_by_key(|c| c.id);
        v
    }

    pub fn len(&self) -> usize {
        self.cuotas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuotas.is_empty()
    }
}

impl ItemCuotaStore for MemoriaCuotas {
    fn guardar_item(&mut self, mut item: ItemCuota) -> Result<ItemCuota, ErrorRemoto> {
        let cuota = self
            .cuotas
            .get(&item.cuota_id)
            .ok_or_else(|| ErrorRemoto::con_mensaje(format!("La cuota {} no existe", item.cuota_id)).con_status(404))?;
        let total = total_verificado(cuota.items.iter().chain(std::iter::once(&item))).ok_or_else(total_excedido)?;

        item.id = self.asignar_item_id();
        let cuota = self
            .cuotas
            .get_mut(&item.cuota_id)
            .ok_or_else(|| ErrorRemoto::con_mensaje(format!("La cuota {} no existe", item.cuota_id)).con_status(404))?;
        cuota.items.push(item.clone());
        cuota.monto_total = total;
        debug!(cuota_id = cuota.id, item_id = item.id, total = %cuota.monto_total, "ítem guardado");
        Ok(item)
    }
}

fn total_excedido() -> ErrorRemoto {
    ErrorRemoto::con_mensaje("El monto total de la cuota excede el máximo representable").con_status(422)
}
