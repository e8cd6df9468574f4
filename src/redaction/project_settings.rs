use crate::catalog::RuleCatalog;
use crate::document::{Document, DocumentKind};
use crate::locator::FieldPath;

use super::{EntryRedactor, MatchScope, RedactionContext, RedactionPolicy, redact_field};

/// Vacía la versión de la aplicación en `Metadata/project_settings.config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectSettingsRedactor;

impl EntryRedactor for ProjectSettingsRedactor {
    fn entry<'c>(&self, catalog: &'c RuleCatalog) -> &'c str {
        &catalog.project_settings.entry
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Json
    }

    fn apply(&self, document: &mut Document, context: &RedactionContext<'_>) -> usize {
        let rules = &context.catalog.project_settings;
        redact_field(
            document,
            context,
            &rules.entry,
            FieldPath::JsonKey(&rules.version_key),
            RedactionPolicy::Blank,
            MatchScope::First,
        )
    }
}
