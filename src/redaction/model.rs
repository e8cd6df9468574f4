use crate::catalog::RuleCatalog;
use crate::document::{Document, DocumentKind};
use crate::locator::{FieldPath, XmlPath};
use crate::options::{DateRedaction, ScrubOptions};

use super::{EntryRedactor, MatchScope, RedactionContext, RedactionPolicy, redact_field};

/// Limpia la metadata de autoría de `3D/3dmodel.model` en una sola pasada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRedactor {
    pub strip_designer: bool,
    pub creation_date: DateRedaction,
    pub modification_date: DateRedaction,
    pub strip_application_version: bool,
}

impl ModelRedactor {
    pub fn from_options(options: &ScrubOptions) -> Self {
        Self {
            strip_designer: options.strip_designer,
            creation_date: options.creation_date,
            modification_date: options.modification_date,
            strip_application_version: options.strip_application_version,
        }
    }
}

impl EntryRedactor for ModelRedactor {
    fn entry<'c>(&self, catalog: &'c RuleCatalog) -> &'c str {
        &catalog.model.entry
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Xml
    }

    fn apply(&self, document: &mut Document, context: &RedactionContext<'_>) -> usize {
        let rules = &context.catalog.model;
        let mut redact = |path: &XmlPath, policy: RedactionPolicy| {
            redact_field(
                document,
                context,
                &rules.entry,
                FieldPath::Xml(path),
                policy,
                MatchScope::First,
            )
        };

        let mut changed = 0;
        if self.strip_designer {
            for path in &rules.designer {
                changed += redact(path, RedactionPolicy::Clear);
            }
        }
        if let Some(policy) = RedactionPolicy::for_date(self.creation_date) {
            changed += redact(&rules.creation_date, policy);
        }
        if let Some(policy) = RedactionPolicy::for_date(self.modification_date) {
            changed += redact(&rules.modification_date, policy);
        }
        if self.strip_application_version {
            changed += redact(&rules.application, RedactionPolicy::Clear);
        }
        changed
    }
}
