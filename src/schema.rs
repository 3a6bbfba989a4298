//! XML Schema validation of input documents.
//!
//! A [`Schema`] is a compiled W3C XML Schema. It is loaded from an `.xsd`
//! file with [`Schema::from_file`], or built from the MARC21 slim schema that
//! ships with the crate via [`Schema::marc21_slim`]. Compilation and
//! validation are done by `exml`; the diagnostics it reports are collected
//! and the first one is returned by [`Schema::first_violation`].
//!
//! # Examples
//!
//! ```
//! use mxtool::schema::Schema;
//!
//! let schema = Schema::marc21_slim()?;
//! let good = br#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record><leader>00000nam a2200000 a 4500</leader></record>
//! </collection>"#;
//! let bad = br#"<collection xmlns="http://www.loc.gov/MARC21/slim"><book/></collection>"#;
//!
//! assert!(schema.validate(good));
//! assert!(!schema.validate(bad));
//! # Ok::<(), mxtool::MxError>(())
//! ```

// exml exposes libxml2's pointer-based API.
#![allow(unsafe_code)]

use crate::document::Document;
use crate::error::{MxError, Result};
use exml::globals::{GenericError, GenericErrorContext};
use exml::libxml::xmlschemas::xml_schema_validate_doc;
use exml::parser::xml_read_memory;
use exml::tree::{xml_free_doc, XmlDocPtr};
use exml::xmlschemas::context::{
    xml_schema_free_parser_ctxt, xml_schema_free_valid_ctxt, xml_schema_new_doc_parser_ctxt,
    xml_schema_new_valid_ctxt, XmlSchemaParserCtxtPtr, XmlSchemaValidCtxtPtr,
};
use exml::xmlschemas::schema::{xml_schema_free, XmlSchemaPtr};
use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// The XML Schema instance namespace URI.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The XML Schema namespace URI.
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// The Library of Congress MARC21 slim schema.
const MARC21_SLIM_XSD: &str = include_str!("../schema/MARC21slim.xsd");

thread_local! {
    static DIAGNOSTICS: RefCell<String> = const { RefCell::new(String::new()) };
}

fn collect_diagnostic(_out: Option<GenericErrorContext>, message: &str) {
    DIAGNOSTICS.with(|d| d.borrow_mut().push_str(message));
}

fn take_diagnostics() -> String {
    DIAGNOSTICS.with(|d| std::mem::take(&mut *d.borrow_mut()))
}

/// The first complete line reported since the last take, or `fallback`.
fn first_diagnostic(fallback: impl FnOnce() -> String) -> String {
    take_diagnostics()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map_or_else(fallback, str::to_string)
}

/// A compiled schema handle.
///
/// The handle owns the compiled schema and the schema document it was
/// compiled from; both are released on drop.
pub struct Schema {
    compiled: XmlSchemaPtr,
    source: XmlDocPtr,
    target_namespace: Option<String>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("target_namespace", &self.target_namespace)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// The MARC21 slim schema, as published by the Library of Congress.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::SchemaLoad`] if the bundled schema fails to compile.
    pub fn marc21_slim() -> Result<Self> {
        Self::compile(MARC21_SLIM_XSD.as_bytes(), "MARC21slim.xsd")
    }

    /// Read and compile a schema from an `.xsd` file.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::SchemaLoad`] if the file cannot be read or does not
    /// compile as an XML Schema.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| MxError::SchemaLoad(format!("{}: {e}", path.display())))?;
        let url = path.to_string_lossy();
        let schema = Self::compile(&bytes, &url)
            .map_err(|e| MxError::SchemaLoad(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded schema");
        Ok(schema)
    }

    /// Compile a schema from the bytes of an `.xsd` document.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::SchemaLoad`] if the bytes are not a schema document
    /// or the schema does not compile.
    pub fn from_xsd(bytes: &[u8]) -> Result<Self> {
        Self::compile(bytes, "schema.xsd")
    }

    fn compile(bytes: &[u8], url: &str) -> Result<Self> {
        let target_namespace = schema_target_namespace(bytes)?;

        take_diagnostics();
        // SAFETY: every pointer comes straight from its exml constructor and
        // is null-checked before use. The parser context is freed before
        // returning; the schema document lives as long as the handle.
        unsafe {
            let source = xml_read_memory(bytes, Some(url), None, 0).ok_or_else(|| {
                MxError::SchemaLoad(first_diagnostic(|| "unreadable schema document".into()))
            })?;
            let ctxt: XmlSchemaParserCtxtPtr = xml_schema_new_doc_parser_ctxt(source);
            if ctxt.is_null() {
                xml_free_doc(source);
                return Err(MxError::SchemaLoad(
                    "could not create a schema parser context".to_string(),
                ));
            }
            (*ctxt).set_errors(
                Some(collect_diagnostic as GenericError),
                Some(collect_diagnostic as GenericError),
                None,
            );
            let compiled = (*ctxt).parse();
            xml_schema_free_parser_ctxt(ctxt);
            if compiled.is_null() {
                xml_free_doc(source);
                return Err(MxError::SchemaLoad(first_diagnostic(|| {
                    format!("{url} failed to compile")
                })));
            }
            take_diagnostics();
            Ok(Schema {
                compiled,
                source,
                target_namespace,
            })
        }
    }

    /// The namespace the schema's elements live in.
    #[must_use]
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Returns true if the XML document in `xml` is valid against the schema.
    #[must_use]
    pub fn validate(&self, xml: &[u8]) -> bool {
        match self.first_violation(xml) {
            Some(reason) => {
                warn!(%reason, "document does not match schema");
                false
            },
            None => true,
        }
    }

    /// Describes the first way the document in `xml` breaks the schema, if
    /// any.
    #[must_use]
    pub fn first_violation(&self, xml: &[u8]) -> Option<String> {
        take_diagnostics();
        // SAFETY: `self.compiled` is a live compiled schema owned by `self`.
        // The instance document and validation context are created, checked,
        // and freed within this block.
        let status = unsafe {
            let Some(doc) = xml_read_memory(xml, None, None, 0) else {
                return Some(first_diagnostic(|| "document is not well formed".into()));
            };
            let ctxt: XmlSchemaValidCtxtPtr = xml_schema_new_valid_ctxt(self.compiled);
            if ctxt.is_null() {
                xml_free_doc(doc);
                return Some("could not create a validation context".to_string());
            }
            (*ctxt).set_errors(
                Some(collect_diagnostic as GenericError),
                Some(collect_diagnostic as GenericError),
                None,
            );
            let status = xml_schema_validate_doc(ctxt, doc);
            xml_schema_free_valid_ctxt(ctxt);
            xml_free_doc(doc);
            status
        };
        match status {
            0 => {
                take_diagnostics();
                None
            },
            s if s > 0 => Some(first_diagnostic(|| "document is not valid".into())),
            s => Some(first_diagnostic(|| format!("validation failed internally ({s})"))),
        }
    }
}

impl Drop for Schema {
    fn drop(&mut self) {
        // SAFETY: both pointers were produced by `compile` and are released
        // exactly once, the schema before the document it was built from.
        unsafe {
            xml_schema_free(self.compiled);
            xml_free_doc(self.source);
        }
    }
}

/// Check that `bytes` hold an `xs:schema` document and read its target
/// namespace.
fn schema_target_namespace(bytes: &[u8]) -> Result<Option<String>> {
    let doc = Document::parse(bytes).map_err(|e| MxError::SchemaLoad(e.to_string()))?;
    let root = doc
        .root()
        .ok_or_else(|| MxError::SchemaLoad("empty schema document".to_string()))?;
    if root.name() != "schema" || root.namespace() != Some(XSD_NS) {
        return Err(MxError::SchemaLoad(format!(
            "root element <{}> is not an XML Schema",
            root.name()
        )));
    }
    Ok(root
        .attributes()
        .iter()
        .find(|a| a.name == "targetNamespace" && a.namespace.is_none())
        .map(|a| a.value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI_XSD: &str = r#"<?xml version="1.0"?>
<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"
            xmlns="http://www.loc.gov/MARC21/slim"
            targetNamespace="http://www.loc.gov/MARC21/slim"
            elementFormDefault="qualified">
  <xsd:element name="collection" type="collectionType"/>
  <xsd:complexType name="collectionType">
    <xsd:sequence>
      <xsd:element name="record" type="recordType" minOccurs="0" maxOccurs="unbounded"/>
    </xsd:sequence>
  </xsd:complexType>
  <xsd:complexType name="recordType">
    <xsd:sequence>
      <xsd:element name="datafield" minOccurs="0" maxOccurs="unbounded">
        <xsd:complexType>
          <xsd:attribute name="tag" use="required"/>
        </xsd:complexType>
      </xsd:element>
    </xsd:sequence>
  </xsd:complexType>
</xsd:schema>"#;

    const LEADER: &str = "<leader>00000nam a2200000 a 4500</leader>";

    fn marc(body: &str) -> Vec<u8> {
        format!(r#"<collection xmlns="{MARCXML_NS}">{body}</collection>"#).into_bytes()
    }

    #[test]
    fn test_from_xsd_reads_target_namespace() {
        let schema = Schema::from_xsd(MINI_XSD.as_bytes()).unwrap();
        assert_eq!(schema.target_namespace(), Some(MARCXML_NS));
    }

    #[test]
    fn test_from_xsd_rejects_non_schema() {
        assert!(matches!(
            Schema::from_xsd(b"<collection/>"),
            Err(MxError::SchemaLoad(_))
        ));
        assert!(matches!(
            Schema::from_xsd(b"<broken"),
            Err(MxError::SchemaLoad(_))
        ));
    }

    #[test]
    fn test_from_xsd_rejects_unresolved_type() {
        let xsd = format!(
            r#"<xsd:schema xmlns:xsd="{XSD_NS}"><xsd:element name="a" type="missingType"/></xsd:schema>"#
        );
        assert!(matches!(
            Schema::from_xsd(xsd.as_bytes()),
            Err(MxError::SchemaLoad(_))
        ));
    }

    #[test]
    fn test_loaded_schema_restricts_roots() {
        let schema = Schema::from_xsd(MINI_XSD.as_bytes()).unwrap();
        assert!(schema.validate(&marc(r#"<record><datafield tag="1"/></record>"#)));
        assert!(!schema.validate(format!(r#"<record xmlns="{MARCXML_NS}"/>"#).as_bytes()));
    }

    #[test]
    fn test_marc21_slim_accepts_records() {
        let schema = Schema::marc21_slim().unwrap();
        let body = format!(
            r#"<record type="Bibliographic">{LEADER}<controlfield tag="001">1</controlfield>
               <datafield tag="245" ind1="1" ind2="0"><subfield code="a">Title</subfield></datafield>
               </record>"#
        );
        assert_eq!(schema.first_violation(&marc(&body)), None);
    }

    #[test]
    fn test_namespace_must_match() {
        let schema = Schema::marc21_slim().unwrap();
        assert!(schema
            .first_violation(b"<collection><record/></collection>")
            .is_some());
    }

    #[test]
    fn test_content_model_is_enforced() {
        let schema = Schema::marc21_slim().unwrap();
        let reason = schema
            .first_violation(&marc(r#"<subfield code="a">x</subfield><leader>y</leader>"#))
            .unwrap();
        assert!(reason.contains("subfield"), "{reason}");

        let leader_last = format!(r#"<record><controlfield tag="001">1</controlfield>{LEADER}</record>"#);
        assert!(!schema.validate(&marc(&leader_last)));
    }

    #[test]
    fn test_undeclared_attribute_rejected_but_xsi_allowed() {
        let schema = Schema::marc21_slim().unwrap();
        let with_xsi = format!(
            r#"<marc:collection xmlns:marc="{MARCXML_NS}" xmlns:xsi="{XSI_NS}"
                xsi:schemaLocation="{MARCXML_NS} x.xsd">
                <marc:record type="Bibliographic"/>
            </marc:collection>"#
        );
        assert!(schema.validate(with_xsi.as_bytes()));
        assert!(!schema.validate(&marc(r#"<record colour="red"/>"#)));
    }

    #[test]
    fn test_mixed_content_rejected() {
        let schema = Schema::marc21_slim().unwrap();
        assert!(!schema.validate(&marc("stray<record/>")));
    }

    #[test]
    fn test_simple_type_patterns_are_checked() {
        let schema = Schema::marc21_slim().unwrap();
        let bad_tag = format!(
            r#"<record>{LEADER}<datafield tag="24" ind1=" " ind2=" "><subfield code="a">x</subfield></datafield></record>"#
        );
        assert!(!schema.validate(&marc(&bad_tag)));
        assert!(!schema.validate(&marc("<record><leader>short</leader></record>")));
    }
}
