//! Localización de campos dentro de un documento ya interpretado.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use xmltree::{Element, XMLNode};

use crate::document::Document;

/// Ruta a un elemento XML seleccionado por el valor de uno de sus atributos.
///
/// Sin `parent` se buscan hijos directos de la raíz; con `parent` se buscan hijos
/// de cualquier elemento con ese nombre, a cualquier profundidad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlPath {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub element: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub attribute: String,
    pub value: String,
}

impl XmlPath {
    pub fn child(element: &str, attribute: &str, value: &str) -> Self {
        Self {
            parent: None,
            element: element.to_string(),
            namespace: None,
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    pub fn under(parent: &str, element: &str, attribute: &str, value: &str) -> Self {
        Self {
            parent: Some(parent.to_string()),
            ..Self::child(element, attribute, value)
        }
    }

    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Comprueba nombre, espacio de nombres y atributo de un elemento.
    pub fn matches(&self, element: &Element) -> bool {
        if element.name != self.element {
            return false;
        }

        let namespace_ok = match (self.namespace.as_deref(), element.namespace.as_deref()) {
            (Some(expected), Some(actual)) => expected == actual,
            (Some(_), None) => false,
            (None, _) => true,
        };

        namespace_ok
            && element
                .attributes
                .get(&self.attribute)
                .is_some_and(|value| *value == self.value)
    }

    fn is_parent(&self, element: &Element) -> bool {
        self.parent.as_deref() == Some(element.name.as_str())
    }
}

impl fmt::Display for XmlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{}/", parent)?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, "{{{}}}", namespace)?;
        }
        write!(f, "{}[@{}='{}']", self.element, self.attribute, self.value)
    }
}

/// Ruta a un campo, según el tipo de documento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath<'p> {
    Xml(&'p XmlPath),
    /// Clave del objeto JSON raíz.
    JsonKey(&'p str),
}

impl fmt::Display for FieldPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Xml(path) => path.fmt(f),
            FieldPath::JsonKey(key) => write!(f, "{}", key),
        }
    }
}

/// Referencia mutable a un nodo localizado.
#[derive(Debug)]
pub enum NodeHandle<'d> {
    Element(&'d mut Element),
    Value(&'d mut Value),
}

impl NodeHandle<'_> {
    /// Texto actual del nodo, sin recortar.
    pub fn text(&self) -> String {
        match self {
            NodeHandle::Element(element) => element_text(element),
            NodeHandle::Value(Value::String(text)) => text.clone(),
            NodeHandle::Value(Value::Null) => String::new(),
            NodeHandle::Value(other) => other.to_string(),
        }
    }

    /// Sustituye el texto del nodo. Devuelve `true` si cambió.
    pub fn set_text(&mut self, new_value: &str) -> bool {
        match self {
            NodeHandle::Element(element) => set_element_text(element, new_value),
            NodeHandle::Value(value) => {
                if value.as_str() == Some(new_value) {
                    return false;
                }
                **value = Value::String(new_value.to_string());
                true
            }
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            NodeHandle::Element(element) => element.attributes.get(name).map(String::as_str),
            NodeHandle::Value(_) => None,
        }
    }

    /// Sustituye un atributo existente. Nunca crea atributos nuevos.
    pub fn set_attribute(&mut self, name: &str, new_value: &str) -> bool {
        let NodeHandle::Element(element) = self else {
            return false;
        };
        match element.attributes.get_mut(name) {
            Some(current) if current.as_str() != new_value => {
                *current = new_value.to_string();
                true
            }
            _ => false,
        }
    }
}

/// Devuelve todos los nodos que coinciden con `path`, en orden de documento.
///
/// Una ruta de otro tipo de documento no coincide con nada.
pub fn find_all<'d>(document: &'d mut Document, path: FieldPath<'_>) -> Vec<NodeHandle<'d>> {
    match (document, path) {
        (Document::Xml(document), FieldPath::Xml(path)) => find_elements(&mut document.root, path)
            .into_iter()
            .map(NodeHandle::Element)
            .collect(),
        (Document::Json(document), FieldPath::JsonKey(key)) => document
            .root
            .as_object_mut()
            .and_then(|object| object.get_mut(key))
            .map(NodeHandle::Value)
            .into_iter()
            .collect(),
        _ => Vec::new(),
    }
}

/// Devuelve el primer nodo que coincide con `path`, si existe.
pub fn find<'d>(document: &'d mut Document, path: FieldPath<'_>) -> Option<NodeHandle<'d>> {
    find_all(document, path).into_iter().next()
}

pub fn find_elements<'d>(root: &'d mut Element, path: &XmlPath) -> Vec<&'d mut Element> {
    let mut found = Vec::new();
    if path.parent.is_some() {
        collect_descendants(root, path, &mut found);
    } else {
        for node in root.children.iter_mut() {
            if let XMLNode::Element(child) = node
                && path.matches(child)
            {
                found.push(child);
            }
        }
    }
    found
}

fn collect_descendants<'d>(
    element: &'d mut Element,
    path: &XmlPath,
    found: &mut Vec<&'d mut Element>,
) {
    let is_parent = path.is_parent(element);
    for node in element.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            if is_parent && path.matches(child) {
                found.push(child);
            } else {
                collect_descendants(child, path, found);
            }
        }
    }
}

/// Devuelve el texto plano contenido dentro de un elemento.
pub(crate) fn element_text(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        match node {
            XMLNode::Text(text) | XMLNode::CData(text) => content.push_str(text),
            _ => {}
        }
    }
    content
}

/// Sustituye el texto de un elemento si difiere del valor actual.
pub(crate) fn set_element_text(element: &mut Element, new_value: &str) -> bool {
    if element_text(element) == new_value {
        return false;
    }

    element
        .children
        .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));

    if !new_value.is_empty() {
        element.children.push(XMLNode::Text(new_value.to_string()));
    }

    true
}
