//! Limpieza de metadata sensible en proyectos 3MF.
//!
//! Un proyecto 3MF es un ZIP con mallas binarias y varios documentos XML/JSON de
//! configuración. Algunos campos de esos documentos filtran el usuario del sistema,
//! la versión de la aplicación y las fechas de autoría. Este crate reescribe solo
//! esos campos y copia el resto de entradas sin tocarlas.

pub mod archive;
pub mod catalog;
pub mod document;
pub mod error;
pub mod locator;
pub mod options;
pub mod pipeline;
pub mod redaction;

pub use catalog::RuleCatalog;
pub use error::ScrubError;
pub use options::{DateRedaction, ScrubOptions};
pub use pipeline::{ScrubReport, scrub_archive};
