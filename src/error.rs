//! Tipos de error del núcleo SIGESDA.
//!
//! Cuatro familias: validación por campo, violación de política de negocio,
//! falla remota de un colaborador y formato de hora inválido. Las anomalías de
//! datos no son errores: se devuelven como [`Advertencia`] junto al resultado.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Mensaje mostrado cuando el servidor remoto no entrega uno propio.
pub const MENSAJE_REMOTO_GENERICO: &str = "No se pudo completar la operación. Intente nuevamente.";

pub type SigesdaResult<T> = Result<T, SigesdaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SigesdaError {
    /// Uno o más campos no cumplen las reglas de entrada
    #[error("datos inválidos: {0}")]
    Validacion(ErroresValidacion),

    /// La operación está prohibida por el estado del negocio
    #[error("operación no permitida: {0}")]
    Politica(String),

    #[error(transparent)]
    Remoto(#[from] ErrorRemoto),

    #[error(transparent)]
    Formato(#[from] ErrorFormatoHora),
}

impl SigesdaError {
    pub fn politica(mensaje: impl Into<String>) -> Self {
        SigesdaError::Politica(mensaje.into())
    }

    /// Atajo para un error de validación de un único campo.
    pub fn campo(campo: impl Into<String>, mensaje: impl Into<String>) -> Self {
        let mut errores = ErroresValidacion::new();
        errores.agregar(campo, mensaje);
        SigesdaError::Validacion(errores)
    }
}

impl From<ErroresValidacion> for SigesdaError {
    fn from(e: ErroresValidacion) -> Self {
        SigesdaError::Validacion(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCampo {
    pub campo: String,
    pub mensaje: String,
}

/// Acumulador de errores por campo. Se reportan todos juntos para que el
/// formulario pueda marcar cada campo en una sola pasada.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErroresValidacion {
    pub errores: Vec<ErrorCampo>,
}

impl ErroresValidacion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agregar(&mut self, campo: impl Into<String>, mensaje: impl Into<String>) {
        self.errores.push(ErrorCampo { campo: campo.into(), mensaje: mensaje.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.errores.is_empty()
    }

    pub fn campos(&self) -> Vec<&str> {
        self.errores.iter().map(|e| e.campo.as_str()).collect()
    }

    pub fn contiene(&self, campo: &str) -> bool {
        self.errores.iter().any(|e| e.campo == campo)
    }

    /// `Ok(())` si no se acumuló nada.
    pub fn into_result(self) -> SigesdaResult<()> {
        if self.is_empty() { Ok(()) } else { Err(SigesdaError::Validacion(self)) }
    }
}

impl fmt::Display for ErroresValidacion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partes: Vec<String> = self.errores.iter().map(|e| format!("{}: {}", e.campo, e.mensaje)).collect();
        write!(f, "{}", partes.join("; "))
    }
}

/// Hora que no respeta el formato `HH:MM` de 24 horas.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("formato de hora inválido '{valor}' (se espera HH:MM entre 00:00 y 23:59)")]
pub struct ErrorFormatoHora {
    pub valor: String,
}

/// Falla de un colaborador remoto (red o servidor).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("error remoto: {}", self.mensaje_usuario())]
pub struct ErrorRemoto {
    pub mensaje: Option<String>,
    pub status: Option<u16>,
}

impl ErrorRemoto {
    pub fn con_mensaje(mensaje: impl Into<String>) -> Self {
        ErrorRemoto { mensaje: Some(mensaje.into()), status: None }
    }

    pub fn generico() -> Self {
        ErrorRemoto { mensaje: None, status: None }
    }

    pub fn con_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Mensaje específico del servidor si vino uno no vacío, si no el genérico.
    pub fn mensaje_usuario(&self) -> &str {
        match self.mensaje.as_deref() {
            Some(m) if !m.trim().is_empty() => m,
            _ => MENSAJE_REMOTO_GENERICO,
        }
    }
}

/// Anomalía de datos recuperable (p. ej. dos exenciones vigentes a la vez).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advertencia {
    pub codigo: String,
    pub mensaje: String,
}

impl Advertencia {
    pub fn new(codigo: impl Into<String>, mensaje: impl Into<String>) -> Self {
        Advertencia { codigo: codigo.into(), mensaje: mensaje.into() }
    }
}
