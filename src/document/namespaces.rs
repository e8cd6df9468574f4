//! Prefijos fijos para los espacios de nombres conocidos de 3MF.

use xml::name::OwnedName;
use xml::namespace::{NS_XML_PREFIX, NS_XMLNS_PREFIX};
use xmltree::Namespace;

pub const CORE_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";
pub const PRODUCTION_NS: &str = "http://schemas.microsoft.com/3dmanufacturing/production/2015/06";
pub const VENDOR_NS: &str = "http://schemas.bambulab.com/package/2021";

pub const PRODUCTION_PREFIX: &str = "p";
pub const VENDOR_PREFIX: &str = "BambuStudio";

/// Tabla inmutable `URI -> prefijo` que el códec aplica al leer y escribir XML.
///
/// El prefijo vacío representa el espacio de nombres por defecto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTable {
    bindings: Vec<(String, String)>,
}

impl NamespaceTable {
    pub fn new<I, P, U>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (P, U)>,
        P: Into<String>,
        U: Into<String>,
    {
        Self {
            bindings: bindings
                .into_iter()
                .map(|(prefix, uri)| (prefix.into(), uri.into()))
                .collect(),
        }
    }

    /// Núcleo 3MF como espacio por defecto, `p` para producción y el prefijo del fabricante.
    pub fn threemf() -> Self {
        Self::new([
            ("", CORE_NS),
            (PRODUCTION_PREFIX, PRODUCTION_NS),
            (VENDOR_PREFIX, VENDOR_NS),
        ])
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Prefijo de la tabla para `uri`, salvo que en `scope` ese prefijo ya apunte
    /// a otro espacio de nombres.
    fn table_prefix(&self, uri: &str, scope: &Namespace) -> Option<&str> {
        self.prefix_for(uri).filter(|prefix| {
            scope
                .get(*prefix)
                .is_none_or(|bound| bound.is_empty() || bound == uri)
        })
    }

    /// Prefijo con el que se escribe un elemento del espacio `namespace`.
    pub(crate) fn element_prefix(
        &self,
        namespace: Option<&str>,
        source_prefix: Option<String>,
        scope: &Namespace,
    ) -> Option<String> {
        match namespace.and_then(|uri| self.table_prefix(uri, scope)) {
            Some("") => None,
            Some(prefix) => Some(prefix.to_string()),
            None => source_prefix,
        }
    }

    /// Clave cualificada (`p:UUID`) con la que se guarda un atributo.
    ///
    /// Los atributos no heredan el espacio por defecto, así que un prefijo vacío
    /// de la tabla no sirve y se conserva el de origen.
    pub(crate) fn attribute_key(&self, name: &OwnedName, scope: &Namespace) -> String {
        let prefix = name
            .namespace
            .as_deref()
            .and_then(|uri| self.table_prefix(uri, scope))
            .filter(|prefix| !prefix.is_empty())
            .or(name.prefix.as_deref());

        match prefix {
            Some(prefix) => format!("{}:{}", prefix, name.local_name),
            None => name.local_name.clone(),
        }
    }

    /// Reescribe las declaraciones visibles en un elemento con los prefijos de la tabla.
    ///
    /// Un prefijo de la tabla ocupado por otro URI deja la declaración de origen intacta.
    pub(crate) fn remap_scope(&self, scope: &Namespace) -> Option<Namespace> {
        let mut remapped = Namespace::empty();
        for (prefix, uri) in scope {
            if prefix == NS_XML_PREFIX || prefix == NS_XMLNS_PREFIX || uri.is_empty() {
                continue;
            }
            let prefix = self.table_prefix(uri, scope).unwrap_or(prefix);
            remapped.put(prefix, uri);
        }

        if remapped.is_empty() {
            None
        } else {
            Some(remapped)
        }
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::threemf()
    }
}
