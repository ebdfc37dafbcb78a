use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiaSemana {
    Lunes,
    Martes,
    Miercoles,
    Jueves,
    Viernes,
    Sabado,
    Domingo,
}

impl DiaSemana {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiaSemana::Lunes => "LUNES",
            DiaSemana::Martes => "MARTES",
            DiaSemana::Miercoles => "MIERCOLES",
            DiaSemana::Jueves => "JUEVES",
            DiaSemana::Viernes => "VIERNES",
            DiaSemana::Sabado => "SABADO",
            DiaSemana::Domingo => "DOMINGO",
        }
    }

    /// Acepta el nombre completo o las abreviaturas "LU", "LUN", etc.
    /// Ignora mayúsculas y tildes ("Miércoles" -> MIERCOLES).
    pub fn desde_codigo(codigo: &str) -> Option<DiaSemana> {
        let normal: String = codigo
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| match c {
                'Á' => 'A',
                'É' => 'E',
                'Í' => 'I',
                'Ó' => 'O',
                'Ú' => 'U',
                other => other,
            })
            .collect();
        let token: String = normal.chars().take(3).collect();
        match token.as_str() {
            "LUN" | "LU" => Some(DiaSemana::Lunes),
            "MAR" | "MA" => Some(DiaSemana::Martes),
            "MIE" | "MI" => Some(DiaSemana::Miercoles),
            "JUE" | "JU" => Some(DiaSemana::Jueves),
            "VIE" | "VI" => Some(DiaSemana::Viernes),
            "SAB" | "SA" => Some(DiaSemana::Sabado),
            "DOM" | "DO" => Some(DiaSemana::Domingo),
            _ => None,
        }
    }
}

impl fmt::Display for DiaSemana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn activo_por_defecto() -> bool {
    true
}

/// Franja semanal: día + hora de inicio y fin en "HH:MM" (mismo día).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorarioInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub dia_semana: DiaSemana,
    pub hora_inicio: String,
    pub hora_fin: String,
    #[serde(default = "activo_por_defecto")]
    pub activo: bool,
}

impl HorarioInput {
    pub fn new(dia_semana: DiaSemana, hora_inicio: &str, hora_fin: &str) -> Self {
        HorarioInput {
            id: None,
            dia_semana,
            hora_inicio: hora_inicio.to_string(),
            hora_fin: hora_fin.to_string(),
            activo: true,
        }
    }
}

/// Un horario ya persistido en una sección: mismo formato con `id`.
pub type HorarioSeccion = HorarioInput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub apellido: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seccion {
    pub id: i64,
    pub actividad_id: i64,
    pub nombre: String,
    #[serde(default)]
    pub capacidad_maxima: Option<u32>,
    #[serde(default)]
    pub docentes: Vec<Persona>,
    #[serde(default)]
    pub horarios: Vec<HorarioSeccion>,
    /// Cantidad de participaciones activas.
    #[serde(default)]
    pub participaciones: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipacionSeccion {
    pub id: i64,
    pub persona_id: i64,
    pub seccion_id: i64,
    pub fecha_inicio: NaiveDate,
    #[serde(default)]
    pub fecha_fin: Option<NaiveDate>,
    #[serde(default)]
    pub precio_especial: Option<Decimal>,
    pub activa: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dia_desde_codigo() {
        assert_eq!(DiaSemana::desde_codigo("LU"), Some(DiaSemana::Lunes));
        assert_eq!(DiaSemana::desde_codigo("miércoles"), Some(DiaSemana::Miercoles));
        assert_eq!(DiaSemana::desde_codigo("SABADO"), Some(DiaSemana::Sabado));
        assert_eq!(DiaSemana::desde_codigo("XX"), None);
    }

    #[test]
    fn test_horario_activo_por_defecto() {
        let h: HorarioInput = serde_json::from_str(r#"{"diaSemana":"LUNES","horaInicio":"09:00","horaFin":"10:00"}"#).unwrap();
        assert!(h.activo);
        assert_eq!(h.dia_semana, DiaSemana::Lunes);
    }
}
