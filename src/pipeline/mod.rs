//! Orquestación de una pasada completa sobre un proyecto 3MF.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::archive::{ArchiveNormalizer, ArchiveWriter, EntrySource, read_entry_at};
use crate::catalog::RuleCatalog;
use crate::document::XmlCodec;
use crate::document::namespaces::NamespaceTable;
use crate::error::ScrubError;
use crate::options::ScrubOptions;
use crate::redaction::{RedactedEntry, RedactionContext, redactors_for};

#[cfg(test)]
mod tests;

/// Resumen de una ejecución.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrubReport {
    /// Entradas reescritas por algún manejador, en orden de escritura.
    pub replaced: Vec<String>,
    /// Entradas copiadas sin cambios.
    pub copied: usize,
}

/// Limpia `input` y escribe el resultado en `output`.
///
/// La salida se escribe primero en un archivo temporal oculto junto a `output` y
/// solo se renombra al terminar, así que un fallo nunca deja un 3MF a medias.
pub fn scrub_archive(
    input: &Path,
    output: &Path,
    options: &ScrubOptions,
    catalog: &RuleCatalog,
) -> Result<ScrubReport, ScrubError> {
    let temp_path = generate_temp_filename(output);
    debug!(temp = %temp_path.display(), "Escribiendo archivo temporal");

    let result = File::open(input)
        .map_err(ScrubError::from)
        .and_then(|source| {
            let target = File::create(&temp_path)?;
            let report = rewrite_archive(source, target, options, catalog)?;
            fs::rename(&temp_path, output)?;
            Ok(report)
        });

    match result {
        Ok(report) => {
            info!(
                output = %output.display(),
                replaced = report.replaced.len(),
                copied = report.copied,
                "Archivo 3MF limpio escrito"
            );
            Ok(report)
        }
        Err(error) => {
            if temp_path.exists()
                && let Err(e) = fs::remove_file(&temp_path)
            {
                warn!(temp = %temp_path.display(), "No se pudo borrar el temporal: {}", e);
            }
            Err(error)
        }
    }
}

/// Ejecuta los manejadores activos y copia el resto de entradas en su orden original.
pub fn rewrite_archive<R, W>(
    source: R,
    target: W,
    options: &ScrubOptions,
    catalog: &RuleCatalog,
) -> Result<ScrubReport, ScrubError>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut archive = ZipArchive::new(source)?;
    let codec = XmlCodec::new(NamespaceTable::threemf());
    let context = RedactionContext {
        catalog,
        codec: &codec,
    };

    let mut redacted: Vec<RedactedEntry> = Vec::new();
    for redactor in redactors_for(options) {
        let entry = {
            let mut source = LayeredSource {
                archive: &mut archive,
                redacted: &redacted,
            };
            redactor.redact(&mut source, &context)?
        };
        match redacted.iter_mut().find(|done| done.name == entry.name) {
            Some(done) => *done = entry,
            None => redacted.push(entry),
        }
    }

    let mut writer = ArchiveWriter::new(target, ArchiveNormalizer::new(options.normalize_archive));
    let mut modified: HashSet<&str> = HashSet::new();
    for entry in &redacted {
        writer.write_file(&entry.name, &entry.contents)?;
        modified.insert(entry.name.as_str());
    }

    let mut copied = 0;
    for index in 0..archive.len() {
        if archive
            .name_for_index(index)
            .is_some_and(|name| modified.contains(name))
        {
            continue;
        }
        let entry = read_entry_at(&mut archive, index)?;
        writer.write_entry(&entry)?;
        copied += 1;
    }
    writer.finish()?;

    Ok(ScrubReport {
        replaced: redacted.into_iter().map(|entry| entry.name).collect(),
        copied,
    })
}

/// Sirve a cada manejador la versión más reciente de una entrada, para que dos
/// reglas sobre la misma entrada se acumulen en lugar de pisarse.
struct LayeredSource<'a, R> {
    archive: &'a mut ZipArchive<R>,
    redacted: &'a [RedactedEntry],
}

impl<R: Read + Seek> EntrySource for LayeredSource<'_, R> {
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ScrubError> {
        match self.redacted.iter().find(|entry| entry.name == name) {
            Some(entry) => Ok(entry.contents.clone()),
            None => self.archive.read_entry(name),
        }
    }
}

/// Ruta temporal oculta en el mismo directorio que `path`.
fn generate_temp_filename(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let extension = path.extension().unwrap_or_default().to_string_lossy();

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    parent.join(format!(
        ".{}_temp_{}_{}.{}",
        stem,
        timestamp,
        std::process::id(),
        extension
    ))
}
