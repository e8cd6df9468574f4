use crate::catalog::RuleCatalog;
use crate::document::{Document, DocumentKind};
use crate::locator::FieldPath;

use super::{EntryRedactor, MatchScope, RedactionContext, RedactionPolicy, redact_field};

/// Vacía la versión del cliente en `Metadata/slice_info.config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliceInfoRedactor;

impl EntryRedactor for SliceInfoRedactor {
    fn entry<'c>(&self, catalog: &'c RuleCatalog) -> &'c str {
        &catalog.slice_info.entry
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Xml
    }

    fn apply(&self, document: &mut Document, context: &RedactionContext<'_>) -> usize {
        let rules = &context.catalog.slice_info;
        redact_field(
            document,
            context,
            &rules.entry,
            FieldPath::Xml(&rules.client_version),
            RedactionPolicy::Clear,
            MatchScope::First,
        )
    }
}
