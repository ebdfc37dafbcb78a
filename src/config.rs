//! Configuración del servicio y del motor de cuotas.
//!
//! Se lee de variables de entorno (con `.env` opcional) y se pasa de forma
//! explícita a quien la necesita; no hay banderas globales.
//!
//! | Variable                    | Default          |
//! |-----------------------------|------------------|
//! | `SIGESDA_BIND`              | `127.0.0.1:8080` |
//! | `SIGESDA_SISTEMA_ITEMS`     | `true`           |
//! | `SIGESDA_DECIMALES`         | `2`              |
//! | `SIGESDA_ITEMS_ESPECIFICOS` | `despues`        |
//! | `SIGESDA_LOG_JSON`          | `false`          |
//! | `SIGESDA_CORS_ORIGEN`       | (sin restricción)|

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{ErroresValidacion, SigesdaError, SigesdaResult};

/// Sobre qué lista se resuelven los ids de un ajuste ITEMS_ESPECIFICOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentoItemsEspecificos {
    /// Contra los ítems ya regenerados (ids conservados por regla de origen).
    #[default]
    DespuesDeRegenerar,
    /// Contra los ítems de la cuota tal como llegó.
    AntesDeRegenerar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Cálculo basado en ítems; si está apagado el total sale de los campos
    /// `montoBase + montoActividades` de la cuota.
    pub sistema_items: bool,
    pub decimales: u32,
    pub items_especificos: MomentoItemsEspecificos,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig { sistema_items: true, decimales: 2, items_especificos: MomentoItemsEspecificos::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub log_json: bool,
    pub cors_origen: Option<String>,
    pub ledger: LedgerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_addr: "127.0.0.1:8080".to_string(),
            log_json: false,
            cors_origen: None,
            ledger: LedgerConfig::default(),
        }
    }
}

// cargar .env si existe
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn parse_bool(valor: &str) -> Option<bool> {
    match valor.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" | "si" | "SI" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    pub fn from_env() -> SigesdaResult<Self> {
        load_dotenv();
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Construye la configuración desde una función de búsqueda; permite
    /// probar sin tocar el entorno del proceso.
    pub fn from_lookup<F>(lookup: F) -> SigesdaResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        let mut errores = ErroresValidacion::new();

        if let Some(b) = lookup("SIGESDA_BIND").filter(|s| !s.trim().is_empty()) {
            cfg.bind_addr = b.trim().to_string();
        }
        if let Some(v) = lookup("SIGESDA_LOG_JSON") {
            match parse_bool(&v) {
                Some(b) => cfg.log_json = b,
                None => errores.agregar("SIGESDA_LOG_JSON", format!("valor booleano inválido '{}'", v)),
            }
        }
        cfg.cors_origen = lookup("SIGESDA_CORS_ORIGEN").filter(|s| !s.trim().is_empty());

        if let Some(v) = lookup("SIGESDA_SISTEMA_ITEMS") {
            match parse_bool(&v) {
                Some(b) => cfg.ledger.sistema_items = b,
                None => errores.agregar("SIGESDA_SISTEMA_ITEMS", format!("valor booleano inválido '{}'", v)),
            }
        }
        if let Some(v) = lookup("SIGESDA_DECIMALES") {
            match v.trim().parse::<u32>() {
                Ok(d) if d <= 6 => cfg.ledger.decimales = d,
                _ => errores.agregar("SIGESDA_DECIMALES", format!("se espera un entero entre 0 y 6, llegó '{}'", v)),
            }
        }
        if let Some(v) = lookup("SIGESDA_ITEMS_ESPECIFICOS") {
            match v.trim().to_lowercase().as_str() {
                "despues" => cfg.ledger.items_especificos = MomentoItemsEspecificos::DespuesDeRegenerar,
                "antes" => cfg.ledger.items_especificos = MomentoItemsEspecificos::AntesDeRegenerar,
                _ => errores.agregar("SIGESDA_ITEMS_ESPECIFICOS", format!("se espera 'antes' o 'despues', llegó '{}'", v)),
            }
        }

        if errores.is_empty() { Ok(cfg) } else { Err(SigesdaError::Validacion(errores)) }
    }
}
