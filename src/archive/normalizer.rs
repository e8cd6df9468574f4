//! Parámetros de empaquetado deterministas para cada entrada escrita.

use zip::write::FullFileOptions;
use zip::{CompressionMethod, DateTime, System, ZIP64_BYTES_THR};

/// Comentario fijo que se adjunta a cada entrada normalizada.
pub const ENTRY_COMMENT: &str = "scrub3mf";

/// Plataforma fija registrada en el campo "version made by".
pub const PLATFORM: System = System::Unix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackingHints {
    pub compression: CompressionMethod,
    /// 1980-01-01 00:00:00, la fecha mínima que admite ZIP.
    pub timestamp: DateTime,
    pub platform: System,
    pub comment: String,
}

impl Default for PackingHints {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
            timestamp: DateTime::DEFAULT,
            platform: PLATFORM,
            comment: ENTRY_COMMENT.to_string(),
        }
    }
}

/// Decide las opciones de escritura de cada entrada del archivo de salida.
///
/// Sin normalización se usan los valores por defecto del escritor: deflate, la
/// hora actual y la plataforma del sistema. Nada se copia de la entrada original.
#[derive(Debug, Clone, Default)]
pub struct ArchiveNormalizer {
    hints: Option<PackingHints>,
}

impl ArchiveNormalizer {
    pub fn new(normalize: bool) -> Self {
        Self {
            hints: normalize.then(PackingHints::default),
        }
    }

    pub fn hints(&self) -> Option<&PackingHints> {
        self.hints.as_ref()
    }

    /// Opciones para un fichero de `size` bytes sin comprimir.
    pub fn file_options(&self, size: u64) -> FullFileOptions<'static> {
        self.base_options().large_file(size >= ZIP64_BYTES_THR)
    }

    /// Opciones para una entrada de directorio; el escritor fuerza `Stored`.
    pub fn directory_options(&self) -> FullFileOptions<'static> {
        self.base_options()
    }

    fn base_options(&self) -> FullFileOptions<'static> {
        match &self.hints {
            Some(hints) => FullFileOptions::default()
                .compression_method(hints.compression)
                .last_modified_time(hints.timestamp)
                .system(hints.platform)
                .with_file_comment(hints.comment.as_str()),
            None => FullFileOptions::default(),
        }
    }
}
