use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// Indentación que usa la aplicación de origen en sus ficheros de configuración.
const JSON_INDENT: &[u8] = b"    ";

#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    pub root: Value,
}

pub fn parse(contents: &[u8]) -> Result<JsonDocument, String> {
    let root = serde_json::from_slice(contents).map_err(|e| format!("Error leyendo JSON: {}", e))?;
    Ok(JsonDocument { root })
}

/// Escribe el JSON con 4 espacios de indentación, conservando el orden de las claves.
pub fn serialize(document: &JsonDocument) -> Result<Vec<u8>, String> {
    let mut output = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut output, formatter);
    document
        .root
        .serialize(&mut serializer)
        .map_err(|e| format!("Error escribiendo JSON: {}", e))?;
    Ok(output)
}
