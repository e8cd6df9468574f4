use chrono::NaiveDate;

use crate::locator::NodeHandle;
use crate::options::{DATE_FORMAT, DateRedaction};

/// Texto que marca un campo vaciado a propósito.
///
/// Un salto de línea evita que el elemento se escriba como etiqueta autocerrada,
/// igual que hace la aplicación de origen.
pub const EMPTY_SENTINEL: &str = "\n";

/// Cómo se sustituye el valor de un campo localizado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactionPolicy {
    /// Vacía el campo con [`EMPTY_SENTINEL`].
    Clear,
    /// Conserva solo el último componente de la ruta original.
    Basename,
    /// Escribe una fecha `AAAA-MM-DD` fija.
    Date(NaiveDate),
    /// Deja una cadena vacía sea cual sea el valor original.
    Blank,
}

impl RedactionPolicy {
    pub fn for_model_path(keep_filename: bool) -> Self {
        if keep_filename {
            RedactionPolicy::Basename
        } else {
            RedactionPolicy::Clear
        }
    }

    /// `None` cuando la fecha se conserva.
    pub fn for_date(redaction: DateRedaction) -> Option<Self> {
        match redaction {
            DateRedaction::Keep => None,
            DateRedaction::ClearToEmpty => Some(RedactionPolicy::Clear),
            DateRedaction::ClearToDate(date) => Some(RedactionPolicy::Date(date)),
        }
    }

    /// Nuevo texto para un elemento XML.
    pub fn text_replacement(&self, original: &str) -> String {
        match self {
            RedactionPolicy::Clear => EMPTY_SENTINEL.to_string(),
            RedactionPolicy::Basename => match basename(original) {
                "" => EMPTY_SENTINEL.to_string(),
                name => name.to_string(),
            },
            RedactionPolicy::Date(date) => date.format(DATE_FORMAT).to_string(),
            RedactionPolicy::Blank => String::new(),
        }
    }

    /// Nuevo valor para atributos y valores JSON, donde no hace falta el centinela.
    pub fn value_replacement(&self, original: &str) -> String {
        match self.text_replacement(original) {
            text if text == EMPTY_SENTINEL => String::new(),
            text => text,
        }
    }

    /// Aplica la política a un nodo y, si existe, a su atributo `value_attribute`.
    ///
    /// Devuelve `true` si algo cambió.
    pub fn apply(&self, node: &mut NodeHandle<'_>, value_attribute: Option<&str>) -> bool {
        let original = node.text();
        let replacement = if matches!(node, NodeHandle::Element(_)) {
            self.text_replacement(&original)
        } else {
            self.value_replacement(&original)
        };
        let mut changed = node.set_text(&replacement);

        if let Some(attribute) = value_attribute
            && let Some(current) = node.attribute(attribute)
        {
            let replacement = self.value_replacement(current);
            changed |= node.set_attribute(attribute, &replacement);
        }

        changed
    }
}

/// Último componente de una ruta con separadores `/` o `\`.
pub fn basename(path: &str) -> &str {
    path.trim().rsplit(['/', '\\']).next().unwrap_or("")
}
