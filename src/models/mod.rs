// Estructuras de datos principales (DTOs intercambiados con la interfaz y los servicios)

mod ajustes;
mod cuota;
mod seccion;

pub use ajustes::{AjusteCuotaSocio, AlcanceAjuste, EstadoExencion, ExencionCuota, TipoAjuste, TipoExencion};
pub use cuota::{validar_items, CategoriaItem, Cuota, EstadoRecibo, ItemCuota, TipoItemCuota, CANTIDAD_MAXIMA, MONTO_MAXIMO};
pub use seccion::{DiaSemana, HorarioInput, HorarioSeccion, ParticipacionSeccion, Persona, Seccion};
