// Detector de conflictos de horario, ocupación de secciones y política de inscripción.
pub mod conflict;
pub mod inscripcion;
pub mod ocupacion;

pub use conflict::{
    detect_resource_conflicts, detect_same_day_overlaps, detectar_conflictos_asignacion, is_valid_interval, overlaps,
    to_minutes, Asignacion, Candidato, ConflictoRecurso, Intervalo, Recurso, SolapamientoHorario, SolicitudAsignacion,
};
pub use inscripcion::verificar_inscripcion;
pub use ocupacion::{compute_occupancy, EstadoOcupacion, Ocupacion};
