// Biblioteca raíz del crate `sigesda`.
// Núcleo de cuotas (libro de ítems, ajustes, exenciones y recálculo) y de
// horarios (solapamientos, conflictos de recursos y ocupación), más el
// servicio HTTP que los expone.
pub mod config;
pub mod cuotas;
pub mod error;
pub mod horarios;
pub mod models;
pub mod server;
pub mod server_handlers;
pub mod store;

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
