//! Reglas de limpieza por entrada del proyecto 3MF.
//!
//! Cada manejador lee una única entrada, la interpreta, limpia sus campos y la
//! vuelve a escribir entera. Los manejadores son independientes entre sí.

mod model;
mod model_settings;
pub mod policy;
mod project_settings;
mod slice_info;

use tracing::{info, warn};

use crate::archive::EntrySource;
use crate::catalog::RuleCatalog;
use crate::document::{Document, DocumentKind, XmlCodec};
use crate::error::ScrubError;
use crate::locator::{FieldPath, find_all};
use crate::options::ScrubOptions;

pub use model::ModelRedactor;
pub use model_settings::ModelSettingsRedactor;
pub use policy::{EMPTY_SENTINEL, RedactionPolicy};
pub use project_settings::ProjectSettingsRedactor;
pub use slice_info::SliceInfoRedactor;

/// Entrada reescrita por un manejador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedEntry {
    pub name: String,
    pub contents: Vec<u8>,
    /// Campos cuyo valor cambió.
    pub fields_changed: usize,
}

/// Dependencias compartidas por todos los manejadores.
#[derive(Debug, Clone, Copy)]
pub struct RedactionContext<'a> {
    pub catalog: &'a RuleCatalog,
    pub codec: &'a XmlCodec,
}

pub trait EntryRedactor {
    /// Nombre de la entrada que limpia este manejador.
    fn entry<'c>(&self, catalog: &'c RuleCatalog) -> &'c str;

    fn kind(&self) -> DocumentKind;

    /// Limpia el documento y devuelve cuántos campos cambiaron.
    fn apply(&self, document: &mut Document, context: &RedactionContext<'_>) -> usize;

    /// Lee, limpia y vuelve a escribir la entrada de este manejador.
    fn redact(
        &self,
        source: &mut dyn EntrySource,
        context: &RedactionContext<'_>,
    ) -> Result<RedactedEntry, ScrubError> {
        let entry = self.entry(context.catalog);
        let contents = source.read_entry(entry)?;
        let mut document = Document::parse(entry, &contents, self.kind(), context.codec)?;

        let fields_changed = self.apply(&mut document, context);
        info!(entry, fields_changed, "Entrada limpiada");

        Ok(RedactedEntry {
            name: entry.to_string(),
            contents: document.serialize(entry, context.codec)?,
            fields_changed,
        })
    }
}

/// Manejadores activos para `options`, en el orden fijo de ejecución.
pub fn redactors_for(options: &ScrubOptions) -> Vec<Box<dyn EntryRedactor>> {
    let mut redactors: Vec<Box<dyn EntryRedactor>> = Vec::new();
    if options.strip_model_path {
        redactors.push(Box::new(ModelSettingsRedactor {
            keep_filename: options.keep_model_filename,
        }));
    }
    if options.strip_application_version {
        redactors.push(Box::new(ProjectSettingsRedactor));
        redactors.push(Box::new(SliceInfoRedactor));
    }
    if options.touches_model() {
        redactors.push(Box::new(ModelRedactor::from_options(options)));
    }
    redactors
}

/// Alcance de la búsqueda de un campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchScope {
    First,
    All,
}

/// Aplica `policy` a los nodos de `path`. Un campo ausente solo genera un aviso.
pub(crate) fn redact_field(
    document: &mut Document,
    context: &RedactionContext<'_>,
    entry: &str,
    path: FieldPath<'_>,
    policy: RedactionPolicy,
    scope: MatchScope,
) -> usize {
    let mut nodes = find_all(document, path);
    if scope == MatchScope::First {
        nodes.truncate(1);
    }

    if nodes.is_empty() {
        warn!(entry, field = %path, "Campo no encontrado; se deja sin cambios");
        return 0;
    }

    let value_attribute = context.catalog.value_attribute();
    nodes
        .into_iter()
        .map(|mut node| policy.apply(&mut node, value_attribute))
        .filter(|changed| *changed)
        .count()
}
