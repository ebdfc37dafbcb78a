// Ocupación de una sección respecto de su capacidad máxima.
use serde::{Deserialize, Serialize};

use crate::models::Seccion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoOcupacion {
    Disponible,
    Parcial,
    CasiLlena,
    Llena,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ocupacion {
    /// `None` cuando la sección no tiene cupo máximo.
    pub porcentaje: Option<u32>,
    pub estado: EstadoOcupacion,
}

fn estado_para(porcentaje: u32) -> EstadoOcupacion {
    match porcentaje {
        0..=49 => EstadoOcupacion::Disponible,
        50..=80 => EstadoOcupacion::Parcial,
        81..=99 => EstadoOcupacion::CasiLlena,
        _ => EstadoOcupacion::Llena,
    }
}

/// Porcentaje redondeado (mitades hacia arriba) y estado de la sección.
/// Sin capacidad es ilimitada; con capacidad 0 no admite a nadie.
pub fn compute_occupancy(participantes: u32, capacidad_maxima: Option<u32>) -> Ocupacion {
    match capacidad_maxima {
        None => Ocupacion { porcentaje: None, estado: EstadoOcupacion::Disponible },
        Some(0) => Ocupacion { porcentaje: Some(100), estado: EstadoOcupacion::Llena },
        Some(cap) => {
            let (p, c) = (u64::from(participantes), u64::from(cap));
            let pct = (p * 200 + c) / (2 * c);
            let porcentaje = u32::try_from(pct).unwrap_or(u32::MAX);
            Ocupacion { porcentaje: Some(porcentaje), estado: estado_para(porcentaje) }
        }
    }
}

impl Seccion {
    pub fn ocupacion(&self) -> Ocupacion {
        compute_occupancy(self.participaciones, self.capacidad_maxima)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_umbrales() {
        assert_eq!(compute_occupancy(24, Some(50)).estado, EstadoOcupacion::Disponible);
        assert_eq!(compute_occupancy(25, Some(50)).estado, EstadoOcupacion::Parcial);
        assert_eq!(compute_occupancy(41, Some(50)).estado, EstadoOcupacion::CasiLlena);
        assert_eq!(compute_occupancy(49, Some(50)).estado, EstadoOcupacion::CasiLlena);
        assert_eq!(compute_occupancy(60, Some(50)), Ocupacion { porcentaje: Some(120), estado: EstadoOcupacion::Llena });
    }

    #[test]
    fn test_redondeo() {
        // 1/3 = 33.3 -> 33 ; 2/3 = 66.7 -> 67 ; 1/8 = 12.5 -> 13
        assert_eq!(compute_occupancy(1, Some(3)).porcentaje, Some(33));
        assert_eq!(compute_occupancy(2, Some(3)).porcentaje, Some(67));
        assert_eq!(compute_occupancy(1, Some(8)).porcentaje, Some(13));
    }

    #[test]
    fn test_capacidad_cero() {
        assert_eq!(compute_occupancy(0, Some(0)).estado, EstadoOcupacion::Llena);
    }
}
