//! Lectura y escritura de los documentos XML y JSON que se limpian.

pub mod json;
pub mod namespaces;
pub mod xml;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScrubError;

pub use json::JsonDocument;
pub use namespaces::NamespaceTable;
pub use self::xml::{XmlCodec, XmlDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Xml,
    Json,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Xml => f.write_str("XML"),
            DocumentKind::Json => f.write_str("JSON"),
        }
    }
}

/// Documento ya interpretado; pertenece al manejador que lo leyó.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Xml(XmlDocument),
    Json(JsonDocument),
}

impl Document {
    /// Interpreta el contenido de `entry` según su tipo.
    pub fn parse(
        entry: &str,
        contents: &[u8],
        kind: DocumentKind,
        codec: &XmlCodec,
    ) -> Result<Self, ScrubError> {
        let parsed = match kind {
            DocumentKind::Xml => codec.parse(contents).map(Document::Xml),
            DocumentKind::Json => json::parse(contents).map(Document::Json),
        };
        parsed.map_err(|message| ScrubError::malformed(entry, kind, message))
    }

    pub fn serialize(&self, entry: &str, codec: &XmlCodec) -> Result<Vec<u8>, ScrubError> {
        let written = match self {
            Document::Xml(document) => codec.serialize(document),
            Document::Json(document) => json::serialize(document),
        };
        written.map_err(|message| ScrubError::serialize(entry, message))
    }
}
