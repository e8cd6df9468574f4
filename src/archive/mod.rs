//! Lectura y escritura de entradas del contenedor ZIP.

pub mod normalizer;

use std::io::{Read, Seek, Write};

use tracing::debug;
use zip::result::ZipError;
use zip::{ZipArchive, ZipWriter};

use crate::error::ScrubError;

pub use normalizer::{ArchiveNormalizer, PackingHints};

/// Entrada leída del archivo de origen. No se modifica; se crea otra si cambia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub contents: Vec<u8>,
    pub is_dir: bool,
}

/// Origen del que los manejadores leen sus entradas por nombre.
pub trait EntrySource {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ScrubError>;
}

impl<R: Read + Seek> EntrySource for ZipArchive<R> {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ScrubError> {
        let mut file = match self.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(ScrubError::MissingEntry {
                    entry: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }
}

/// Lee la entrada `index` completa, descomprimida.
pub fn read_entry_at<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
) -> Result<ArchiveEntry, ScrubError> {
    let mut file = archive.by_index(index)?;
    let name = file.name().to_string();
    let is_dir = file.is_dir();

    let mut contents = Vec::new();
    if !is_dir {
        file.read_to_end(&mut contents)?;
    }

    Ok(ArchiveEntry {
        name,
        contents,
        is_dir,
    })
}

/// Escritor de salida que pasa cada entrada por el [`ArchiveNormalizer`].
pub struct ArchiveWriter<W: Write + Seek> {
    writer: ZipWriter<W>,
    normalizer: ArchiveNormalizer,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W, normalizer: ArchiveNormalizer) -> Self {
        Self {
            writer: ZipWriter::new(inner),
            normalizer,
        }
    }

    pub fn write_file(&mut self, name: &str, contents: &[u8]) -> Result<(), ScrubError> {
        let options = self.normalizer.file_options(contents.len() as u64);
        self.writer.start_file(name, options)?;
        self.writer.write_all(contents)?;
        debug!(entry = name, bytes = contents.len(), "Entrada escrita");
        Ok(())
    }

    pub fn write_entry(&mut self, entry: &ArchiveEntry) -> Result<(), ScrubError> {
        if entry.is_dir {
            self.writer
                .add_directory(entry.name.as_str(), self.normalizer.directory_options())?;
            debug!(entry = entry.name.as_str(), "Directorio escrito");
            return Ok(());
        }
        self.write_file(&entry.name, &entry.contents)
    }

    pub fn finish(self) -> Result<W, ScrubError> {
        Ok(self.writer.finish()?)
    }
}
