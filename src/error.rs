//! Errores fatales del proceso de limpieza.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentKind;

#[derive(Debug, Error)]
pub enum ScrubError {
    /// Falta una entrada que el formato 3MF exige para proyectos exportados.
    #[error("El archivo 3MF no contiene la entrada requerida `{entry}`")]
    MissingEntry { entry: String },

    #[error("La entrada `{entry}` no es un documento {kind} válido: {message}")]
    MalformedDocument {
        entry: String,
        kind: DocumentKind,
        message: String,
    },

    #[error("No se pudo escribir el documento `{entry}`: {message}")]
    Serialize { entry: String, message: String },

    #[error("Error en el contenedor ZIP: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Error de entrada/salida: {0}")]
    Io(#[from] std::io::Error),

    #[error("No se pudo cargar el catálogo de reglas `{}`: {message}", path.display())]
    Catalog { path: PathBuf, message: String },

    #[error("La fecha `{value}` no tiene el formato AAAA-MM-DD")]
    InvalidDate { value: String },
}

impl ScrubError {
    pub(crate) fn malformed(entry: &str, kind: DocumentKind, message: impl ToString) -> Self {
        ScrubError::MalformedDocument {
            entry: entry.to_string(),
            kind,
            message: message.to_string(),
        }
    }

    pub(crate) fn serialize(entry: &str, message: impl ToString) -> Self {
        ScrubError::Serialize {
            entry: entry.to_string(),
            message: message.to_string(),
        }
    }
}
