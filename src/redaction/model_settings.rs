use crate::catalog::RuleCatalog;
use crate::document::{Document, DocumentKind};
use crate::locator::FieldPath;

use super::{EntryRedactor, MatchScope, RedactionContext, RedactionPolicy, redact_field};

/// Limpia la ruta de origen de cada pieza en `Metadata/model_settings.config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelSettingsRedactor {
    /// Conserva el nombre del archivo en lugar de vaciar la ruta.
    pub keep_filename: bool,
}

impl EntryRedactor for ModelSettingsRedactor {
    fn entry<'c>(&self, catalog: &'c RuleCatalog) -> &'c str {
        &catalog.model_settings.entry
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Xml
    }

    fn apply(&self, document: &mut Document, context: &RedactionContext<'_>) -> usize {
        let rules = &context.catalog.model_settings;
        redact_field(
            document,
            context,
            &rules.entry,
            FieldPath::Xml(&rules.source_file),
            RedactionPolicy::for_model_path(self.keep_filename),
            MatchScope::All,
        )
    }
}
