//! Opciones que deciden qué categorías de metadata se limpian.

use chrono::NaiveDate;

use crate::error::ScrubError;

/// Formato de las fechas que se escriben en `CreationDate`/`ModificationDate`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Tratamiento de un campo de fecha del modelo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRedaction {
    Keep,
    #[default]
    ClearToEmpty,
    ClearToDate(NaiveDate),
}

impl DateRedaction {
    /// Construye la variante a partir de los flags de la línea de comandos.
    ///
    /// Conservar la fecha tiene prioridad sobre una fecha explícita.
    pub fn from_flags(keep: bool, date: Option<NaiveDate>) -> Self {
        match (keep, date) {
            (true, _) => DateRedaction::Keep,
            (false, Some(date)) => DateRedaction::ClearToDate(date),
            (false, None) => DateRedaction::ClearToEmpty,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, DateRedaction::Keep)
    }
}

/// Interpreta una fecha `AAAA-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, ScrubError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ScrubError::InvalidDate {
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubOptions {
    pub strip_designer: bool,
    pub strip_model_path: bool,
    /// Con la ruta del modelo limpia, conserva solo el nombre del archivo.
    pub keep_model_filename: bool,
    pub creation_date: DateRedaction,
    pub modification_date: DateRedaction,
    pub strip_application_version: bool,
    pub normalize_archive: bool,
}

impl Default for ScrubOptions {
    fn default() -> Self {
        Self {
            strip_designer: true,
            strip_model_path: true,
            keep_model_filename: false,
            creation_date: DateRedaction::ClearToEmpty,
            modification_date: DateRedaction::ClearToEmpty,
            strip_application_version: false,
            normalize_archive: true,
        }
    }
}

impl ScrubOptions {
    /// Indica si alguna limpieza afecta a `3D/3dmodel.model`.
    pub fn touches_model(&self) -> bool {
        self.strip_designer
            || self.creation_date.is_enabled()
            || self.modification_date.is_enabled()
            || self.strip_application_version
    }
}
