//! Catálogo de reglas: qué entradas y qué campos filtran información.
//!
//! El catálogo por defecto cubre los proyectos que exporta BambuStudio. Se puede
//! sustituir total o parcialmente con un JSON; cada sección omitida conserva los
//! valores por defecto.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::namespaces::CORE_NS;
use crate::error::ScrubError;
use crate::locator::XmlPath;

pub const MODEL_SETTINGS_ENTRY: &str = "Metadata/model_settings.config";
pub const PROJECT_SETTINGS_ENTRY: &str = "Metadata/project_settings.config";
pub const SLICE_INFO_ENTRY: &str = "Metadata/slice_info.config";
pub const MODEL_ENTRY: &str = "3D/3dmodel.model";

/// Atributo donde la aplicación guarda el valor de `metadata`/`header_item`.
pub const VALUE_ATTRIBUTE: &str = "value";

pub const DESIGNER_FIELDS: [&str; 3] = ["Designer", "DesignerUserId", "DesignerCover"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleCatalog {
    /// Atributo que recibe la misma limpieza que el texto del elemento localizado.
    pub value_attribute: Option<String>,
    pub model_settings: ModelSettingsRules,
    pub project_settings: ProjectSettingsRules,
    pub slice_info: SliceInfoRules,
    pub model: ModelRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSettingsRules {
    pub entry: String,
    pub source_file: XmlPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSettingsRules {
    pub entry: String,
    pub version_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SliceInfoRules {
    pub entry: String,
    pub client_version: XmlPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelRules {
    pub entry: String,
    pub designer: Vec<XmlPath>,
    pub creation_date: XmlPath,
    pub modification_date: XmlPath,
    pub application: XmlPath,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self {
            value_attribute: Some(VALUE_ATTRIBUTE.to_string()),
            model_settings: ModelSettingsRules::default(),
            project_settings: ProjectSettingsRules::default(),
            slice_info: SliceInfoRules::default(),
            model: ModelRules::default(),
        }
    }
}

impl Default for ModelSettingsRules {
    fn default() -> Self {
        Self {
            entry: MODEL_SETTINGS_ENTRY.to_string(),
            source_file: XmlPath::under("part", "metadata", "key", "source_file"),
        }
    }
}

impl Default for ProjectSettingsRules {
    fn default() -> Self {
        Self {
            entry: PROJECT_SETTINGS_ENTRY.to_string(),
            version_key: "version".to_string(),
        }
    }
}

impl Default for SliceInfoRules {
    fn default() -> Self {
        Self {
            entry: SLICE_INFO_ENTRY.to_string(),
            client_version: XmlPath::under("header", "header_item", "key", "X-BBL-Client-Version"),
        }
    }
}

impl Default for ModelRules {
    fn default() -> Self {
        Self {
            entry: MODEL_ENTRY.to_string(),
            designer: DESIGNER_FIELDS.iter().map(|name| model_metadata(name)).collect(),
            creation_date: model_metadata("CreationDate"),
            modification_date: model_metadata("ModificationDate"),
            application: model_metadata("Application"),
        }
    }
}

fn model_metadata(name: &str) -> XmlPath {
    XmlPath::child("metadata", "name", name).in_namespace(CORE_NS)
}

impl RuleCatalog {
    /// Carga un catálogo JSON desde disco.
    pub fn from_path(path: &Path) -> Result<Self, ScrubError> {
        let contents = fs::read(path).map_err(|e| ScrubError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&contents).map_err(|e| ScrubError::Catalog {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn value_attribute(&self) -> Option<&str> {
        self.value_attribute.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_catalog_targets_the_four_entries() {
        let catalog = RuleCatalog::default();
        assert_eq!(catalog.model_settings.entry, "Metadata/model_settings.config");
        assert_eq!(catalog.project_settings.entry, "Metadata/project_settings.config");
        assert_eq!(catalog.slice_info.entry, "Metadata/slice_info.config");
        assert_eq!(catalog.model.entry, "3D/3dmodel.model");
        assert_eq!(catalog.model.designer.len(), 3);
        assert_eq!(
            catalog.model.application.namespace.as_deref(),
            Some(CORE_NS)
        );
    }

    #[test]
    fn partial_catalog_keeps_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{"project_settings": {"version_key": "app_version"}, "value_attribute": null}"#,
        )?;

        let catalog = RuleCatalog::from_path(&path)?;
        assert_eq!(catalog.project_settings.version_key, "app_version");
        assert_eq!(catalog.project_settings.entry, PROJECT_SETTINGS_ENTRY);
        assert_eq!(catalog.value_attribute(), None);
        assert_eq!(catalog.model, ModelRules::default());

        Ok(())
    }

    #[test]
    fn invalid_catalog_is_reported_with_its_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"unknown_section": {}}"#)?;

        match RuleCatalog::from_path(&path) {
            Err(ScrubError::Catalog { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("se esperaba un error de catálogo: {other:?}"),
        }

        Ok(())
    }
}
