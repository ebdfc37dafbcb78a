// Funciones para parsear franjas horarias y detectar conflictos entre ellas.
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ErrorFormatoHora, ErroresValidacion, SigesdaError, SigesdaResult};
use crate::models::{DiaSemana, HorarioInput};

/// Convierte "HH:MM" (24 h, dos dígitos cada parte) a minutos desde medianoche.
pub fn to_minutes(hhmm: &str) -> Result<u16, ErrorFormatoHora> {
    let error = || ErrorFormatoHora { valor: hhmm.to_string() };
    let b = hhmm.as_bytes();
    if b.len() != 5 || b[2] != b':' {
        return Err(error());
    }
    let digitos = [b[0], b[1], b[3], b[4]];
    if !digitos.iter().all(u8::is_ascii_digit) {
        return Err(error());
    }
    let [h1, h2, m1, m2] = digitos.map(|d| u16::from(d - b'0'));
    let horas = h1 * 10 + h2;
    if h1 > 2 || horas > 23 || m1 > 5 {
        return Err(error());
    }
    Ok(horas * 60 + m1 * 10 + m2)
}

/// Convierte minutos desde medianoche a "HH:MM".
pub fn to_hhmm(minutos: u16) -> String {
    format!("{:02}:{:02}", minutos / 60, minutos % 60)
}

/// `fin > inicio`, sin cruzar medianoche. Una hora mal formada no es válida.
pub fn is_valid_interval(inicio: &str, fin: &str) -> bool {
    match (to_minutes(inicio), to_minutes(fin)) {
        (Ok(i), Ok(f)) => f > i,
        _ => false,
    }
}

/// Solapamiento de rangos semiabiertos `[inicio, fin)` en minutos.
/// Bloques consecutivos (`a.fin == b.inicio`) no se solapan.
pub fn overlaps(a: (u16, u16), b: (u16, u16)) -> bool {
    a.0 < b.1 && a.1 > b.0
}

/// Franja ya parseada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Intervalo {
    pub dia_semana: DiaSemana,
    pub inicio: u16,
    pub fin: u16,
}

impl Intervalo {
    pub fn nuevo(dia_semana: DiaSemana, hora_inicio: &str, hora_fin: &str) -> SigesdaResult<Self> {
        let inicio = to_minutes(hora_inicio)?;
        let fin = to_minutes(hora_fin)?;
        if fin <= inicio {
            return Err(SigesdaError::campo("horaFin", "la hora de fin debe ser posterior a la de inicio"));
        }
        Ok(Intervalo { dia_semana, inicio, fin })
    }

    pub fn desde_horario(h: &HorarioInput) -> SigesdaResult<Self> {
        Intervalo::nuevo(h.dia_semana, &h.hora_inicio, &h.hora_fin)
    }

    /// Mismo día y rangos solapados.
    pub fn solapa(&self, otro: &Intervalo) -> bool {
        self.dia_semana == otro.dia_semana && overlaps((self.inicio, self.fin), (otro.inicio, otro.fin))
    }
}

/// Dos horarios de una misma lista que se pisan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolapamientoHorario {
    pub indice_a: usize,
    pub indice_b: usize,
    pub dia_semana: DiaSemana,
    pub mensaje: String,
}

/// Parsea todos los horarios reportando cada campo mal formado con su índice.
fn parsear_horarios(horarios: &[HorarioInput]) -> SigesdaResult<Vec<Intervalo>> {
    let mut errores = ErroresValidacion::new();
    let mut intervalos = Vec::with_capacity(horarios.len());
    for (i, h) in horarios.iter().enumerate() {
        let inicio = to_minutes(&h.hora_inicio);
        let fin = to_minutes(&h.hora_fin);
        if let Err(e) = &inicio {
            errores.agregar(format!("horarios[{}].horaInicio", i), e.to_string());
        }
        if let Err(e) = &fin {
            errores.agregar(format!("horarios[{}].horaFin", i), e.to_string());
        }
        if let (Ok(inicio), Ok(fin)) = (inicio, fin) {
            if fin <= inicio {
                errores.agregar(format!("horarios[{}].horaFin", i), "la hora de fin debe ser posterior a la de inicio");
            } else {
                intervalos.push(Intervalo { dia_semana: h.dia_semana, inicio, fin });
            }
        }
    }
    errores.into_result()?;
    Ok(intervalos)
}

/// Comparación por pares de los horarios activos de una sección. Emite un
/// conflicto por cada par no ordenado `(i, j)` del mismo día que se solapa.
pub fn detect_same_day_overlaps(horarios: &[HorarioInput]) -> SigesdaResult<Vec<SolapamientoHorario>> {
    let intervalos = parsear_horarios(horarios)?;
    let mut conflictos = Vec::new();
    for i in 0..intervalos.len() {
        if !horarios[i].activo {
            continue;
        }
        for j in (i + 1)..intervalos.len() {
            if !horarios[j].activo {
                continue;
            }
            let (a, b) = (&intervalos[i], &intervalos[j]);
            if a.solapa(b) {
                conflictos.push(SolapamientoHorario {
                    indice_a: i,
                    indice_b: j,
                    dia_semana: a.dia_semana,
                    mensaje: format!(
                        "El horario {} {}-{} se superpone con {}-{}",
                        a.dia_semana,
                        to_hhmm(a.inicio),
                        to_hhmm(a.fin),
                        to_hhmm(b.inicio),
                        to_hhmm(b.fin)
                    ),
                });
            }
        }
    }
    Ok(conflictos)
}

/// Recurso compartido que no puede estar en dos lugares a la vez.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recurso {
    DocenteId(i64),
    AulaId(i64),
}

impl Recurso {
    fn descripcion(&self) -> String {
        match self {
            Recurso::DocenteId(id) => format!("El docente {}", id),
            Recurso::AulaId(id) => format!("El aula {}", id),
        }
    }
}

/// Asignación propuesta: `{diaSemana, horaInicio, horaFin, docenteId | aulaId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidato {
    pub dia_semana: DiaSemana,
    pub hora_inicio: String,
    pub hora_fin: String,
    #[serde(flatten)]
    pub recurso: Recurso,
}

/// Asignación existente de un recurso a una sección.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asignacion {
    #[serde(flatten)]
    pub recurso: Recurso,
    pub dia_semana: DiaSemana,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub seccion_id: i64,
    pub seccion_nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetalleConflicto {
    pub dia_semana: DiaSemana,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub seccion_nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictoRecurso {
    pub recurso: Recurso,
    pub seccion_id: i64,
    pub mensaje: String,
    pub detalle: DetalleConflicto,
}

fn conflictos_contra<'a, I>(recurso: Recurso, franja: &Intervalo, existentes: I) -> Vec<ConflictoRecurso>
where
    I: IntoIterator<Item = &'a Asignacion>,
{
    let mut conflictos = Vec::new();
    for ex in existentes {
        if ex.recurso != recurso || ex.dia_semana != franja.dia_semana {
            continue;
        }
        let otro = match Intervalo::nuevo(ex.dia_semana, &ex.hora_inicio, &ex.hora_fin) {
            Ok(i) => i,
            Err(e) => {
                warn!(seccion_id = ex.seccion_id, error = %e, "asignación existente con horario inválido, se ignora");
                continue;
            }
        };
        if franja.solapa(&otro) {
            conflictos.push(ConflictoRecurso {
                recurso,
                seccion_id: ex.seccion_id,
                mensaje: format!(
                    "{} ya está asignado el {} de {} a {} en la sección \"{}\"",
                    recurso.descripcion(),
                    ex.dia_semana,
                    ex.hora_inicio,
                    ex.hora_fin,
                    ex.seccion_nombre
                ),
                detalle: DetalleConflicto {
                    dia_semana: ex.dia_semana,
                    hora_inicio: ex.hora_inicio.clone(),
                    hora_fin: ex.hora_fin.clone(),
                    seccion_nombre: ex.seccion_nombre.clone(),
                },
            });
        }
    }
    conflictos
}

/// Conflictos del candidato con las asignaciones existentes del mismo recurso
/// y el mismo día. Sólo informa: decidir si se continúa es del llamador.
pub fn detect_resource_conflicts(candidato: &Candidato, existentes: &[Asignacion]) -> SigesdaResult<Vec<ConflictoRecurso>> {
    let franja = Intervalo::nuevo(candidato.dia_semana, &candidato.hora_inicio, &candidato.hora_fin)?;
    Ok(conflictos_contra(candidato.recurso, &franja, existentes))
}

/// Asignación en lote de docentes a los horarios de una sección.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitudAsignacion {
    pub seccion_id: i64,
    pub seccion_nombre: String,
    #[serde(default)]
    pub docente_ids: Vec<i64>,
    #[serde(default)]
    pub aula_ids: Vec<i64>,
    pub horarios: Vec<HorarioInput>,
    #[serde(default)]
    pub existentes: Vec<Asignacion>,
}

/// Todas las verificaciones (recurso × horario) de una asignación en una sola
/// pasada. Cada candidato se compara también con los anteriores del mismo
/// lote. Las asignaciones existentes de la propia sección se ignoran porque la
/// solicitud las reemplaza.
pub fn detectar_conflictos_asignacion(solicitud: &SolicitudAsignacion) -> SigesdaResult<Vec<ConflictoRecurso>> {
    let intervalos = parsear_horarios(&solicitud.horarios)?;
    let activos: Vec<&Intervalo> = intervalos
        .iter()
        .zip(solicitud.horarios.iter())
        .filter(|(_, h)| h.activo)
        .map(|(i, _)| i)
        .collect();

    let mut vistos: Vec<Asignacion> = solicitud
        .existentes
        .iter()
        .filter(|a| a.seccion_id != solicitud.seccion_id)
        .cloned()
        .collect();

    let recursos = solicitud
        .docente_ids
        .iter()
        .map(|&id| Recurso::DocenteId(id))
        .chain(solicitud.aula_ids.iter().map(|&id| Recurso::AulaId(id)));

    let mut conflictos = Vec::new();
    for recurso in recursos {
        for franja in &activos {
            conflictos.extend(conflictos_contra(recurso, franja, &vistos));
            vistos.push(Asignacion {
                recurso,
                dia_semana: franja.dia_semana,
                hora_inicio: to_hhmm(franja.inicio),
                hora_fin: to_hhmm(franja.fin),
                seccion_id: solicitud.seccion_id,
                seccion_nombre: solicitud.seccion_nombre.clone(),
            });
        }
    }
    debug!(seccion_id = solicitud.seccion_id, conflictos = conflictos.len(), "verificación de asignación");
    Ok(conflictos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_minutes() {
        assert_eq!(to_minutes("08:30"), Ok(510));
        assert_eq!(to_minutes("00:00"), Ok(0));
        assert_eq!(to_minutes("23:59"), Ok(1439));
    }

    #[test]
    fn test_to_minutes_rechaza_formatos() {
        for malo in ["24:00", "8:30", "08:60", "08-30", "0830", " 08:30", "ab:cd", "19:5", "30:00", ""] {
            assert!(to_minutes(malo).is_err(), "debió rechazar {:?}", malo);
        }
    }

    #[test]
    fn test_overlaps_tuplas() {
        // 08:30-09:50 y 09:00-10:00 se solapan
        assert!(overlaps((510, 590), (540, 600)));
        // 08:00-09:00 y 09:00-10:00 no se solapan (límite)
        assert!(!overlaps((480, 540), (540, 600)));
        // contenido completo
        assert!(overlaps((480, 720), (540, 600)));
    }

    #[test]
    fn test_to_hhmm() {
        assert_eq!(to_hhmm(510), "08:30");
        assert_eq!(to_hhmm(0), "00:00");
    }

    #[test]
    fn test_inactivos_no_cuentan() {
        let mut b = HorarioInput::new(DiaSemana::Lunes, "09:30", "10:30");
        b.activo = false;
        let horarios = vec![HorarioInput::new(DiaSemana::Lunes, "09:00", "10:00"), b];
        assert!(detect_same_day_overlaps(&horarios).unwrap().is_empty());
    }

    #[test]
    fn test_candidato_json_con_docente() {
        let c: Candidato =
            serde_json::from_str(r#"{"diaSemana":"LUNES","horaInicio":"09:30","horaFin":"10:30","docenteId":4}"#).unwrap();
        assert_eq!(c.recurso, Recurso::DocenteId(4));
    }
}
