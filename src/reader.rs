//! Reading MARCXML collections from byte streams.
//!
//! [`read_collection`] runs the whole input pipeline: read every byte, parse
//! the XML, validate the document against a [`Schema`], and build the
//! [`Element`] tree. Any failure aborts before a tree exists, so callers never
//! see partially built input.
//!
//! # Examples
//!
//! ```
//! use mxtool::{read_collection, Schema};
//! use std::io::Cursor;
//!
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <leader>00000nam a2200000 a 4500</leader>
//!     <controlfield tag="001">42</controlfield>
//!   </record>
//! </collection>"#;
//!
//! let top = read_collection(Cursor::new(xml), &Schema::marc21_slim()?)?;
//! assert!(top.is_collection());
//! assert_eq!(top.records().count(), 1);
//! # Ok::<(), mxtool::MxError>(())
//! ```

use crate::document::Document;
use crate::element::Element;
use crate::error::{MxError, Result};
use crate::schema::Schema;
use std::io::Read;
use tracing::{debug, info};

/// Read, parse, validate, and build a collection from `reader`.
///
/// # Errors
///
/// - [`MxError::Io`] if reading fails
/// - [`MxError::Parse`] if the input is not well-formed XML or has no root
///   element
/// - [`MxError::SchemaMismatch`] if the document does not conform to `schema`
pub fn read_collection<R: Read>(mut reader: R, schema: &Schema) -> Result<Element> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    debug!(bytes = bytes.len(), "read input");

    let doc = Document::parse(&bytes)?;
    if let Some(violation) = schema.first_violation(&bytes) {
        return Err(MxError::SchemaMismatch(violation));
    }

    let top = Element::from_document(&doc)
        .ok_or_else(|| MxError::Parse("document has no root element".to_string()))?;
    info!(
        root = top.tag(),
        records = top.records().count(),
        elements = top.element_count(),
        "built element tree"
    );
    Ok(top)
}

/// Read a collection from a string.
///
/// # Errors
///
/// See [`read_collection`].
pub fn read_collection_str(xml: &str, schema: &Schema) -> Result<Element> {
    read_collection(xml.as_bytes(), schema)
}
