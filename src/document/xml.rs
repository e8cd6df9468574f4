use std::io::Cursor;

use xml::attribute::OwnedAttribute;
use xml::name::OwnedName;
use xml::reader::{EventReader, ParserConfig, XmlEvent};
use xmltree::{Element, EmitterConfig, Namespace, XMLNode};

use super::namespaces::NamespaceTable;

/// Árbol XML con la información de la declaración original.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub root: Element,
    standalone: Option<bool>,
}

/// Lee y escribe XML con prefijos estables según una [`NamespaceTable`].
///
/// Conserva el orden de atributos e hijos, los nodos de solo espacios y los
/// atributos con prefijo como `p:UUID`. Las instrucciones de procesamiento, el
/// DOCTYPE y cualquier nodo fuera del elemento raíz se descartan.
#[derive(Debug, Clone, Default)]
pub struct XmlCodec {
    namespaces: NamespaceTable,
}

impl XmlCodec {
    pub fn new(namespaces: NamespaceTable) -> Self {
        Self { namespaces }
    }

    pub fn parse(&self, contents: &[u8]) -> Result<XmlDocument, String> {
        let mut config = ParserConfig::new();
        config.ignore_comments = false;
        config.whitespace_to_characters = true;
        config.trim_whitespace = false;

        let mut reader = EventReader::new_with_config(Cursor::new(contents), config);
        let mut standalone = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let event = reader
                .next()
                .map_err(|e| format!("Error leyendo XML: {}", e))?;
            match event {
                XmlEvent::StartDocument {
                    standalone: declared,
                    ..
                } => standalone = declared,
                XmlEvent::StartElement {
                    name,
                    attributes,
                    namespace,
                } => stack.push(self.build_element(name, attributes, &namespace)),
                XmlEvent::EndElement { .. } => {
                    let Some(element) = stack.pop() else {
                        continue;
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XMLNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                XmlEvent::Characters(text) | XmlEvent::Whitespace(text) => {
                    push_child(&mut stack, XMLNode::Text(text))
                }
                XmlEvent::CData(text) => push_child(&mut stack, XMLNode::CData(text)),
                XmlEvent::Comment(text) => push_child(&mut stack, XMLNode::Comment(text)),
                XmlEvent::EndDocument => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| "El documento XML no tiene elemento raíz".to_string())?;
        Ok(XmlDocument { root, standalone })
    }

    /// Escribe el documento en UTF-8 con su declaración y sin reindentar.
    pub fn serialize(&self, document: &XmlDocument) -> Result<Vec<u8>, String> {
        let mut output = declaration(document.standalone).into_bytes();

        let mut config = EmitterConfig::new();
        config.perform_indent = false;
        config.write_document_declaration = false;
        config.pad_self_closing = false;
        config.autopad_comments = false;
        document
            .root
            .write_with_config(&mut output, config)
            .map_err(|e| format!("Error escribiendo XML: {}", e))?;

        Ok(output)
    }

    fn build_element(
        &self,
        name: OwnedName,
        attributes: Vec<OwnedAttribute>,
        scope: &Namespace,
    ) -> Element {
        let mut element = Element::new(&name.local_name);
        element.prefix = self
            .namespaces
            .element_prefix(name.namespace.as_deref(), name.prefix, scope);
        element.namespace = name.namespace;
        element.namespaces = self.namespaces.remap_scope(scope);
        for attribute in attributes {
            let key = self.namespaces.attribute_key(&attribute.name, scope);
            element.attributes.insert(key, attribute.value);
        }
        element
    }
}

// Los nodos fuera del elemento raíz se descartan.
fn push_child(stack: &mut [Element], node: XMLNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn declaration(standalone: Option<bool>) -> String {
    match standalone {
        Some(true) => "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n".to_string(),
        Some(false) => "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n".to_string(),
        None => "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n".to_string(),
    }
}
