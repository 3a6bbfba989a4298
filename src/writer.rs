//! Writing element trees as MARCXML.
//!
//! This module provides [`MarcXmlWriter`] for pretty-printing [`Element`]
//! trees to any destination implementing [`std::io::Write`]. Output is wrapped
//! in a fixed collection envelope: an XML declaration, a comment line, an
//! opening `<marc:collection>` carrying the `marc` and `xsi` namespace
//! declarations and the MARC21 slim schema location, the records, and a
//! closing `</marc:collection>`.
//!
//! Elements are indented with one tab per level and every tag is written with
//! the `marc:` prefix. Leaf text and attribute values are entity-escaped.
//!
//! # Examples
//!
//! ```
//! use mxtool::{Element, MarcXmlWriter};
//!
//! let record = Element::branch("record", vec![
//!     Element::leaf("controlfield", "12345").with_attribute("tag", "001"),
//! ]);
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = MarcXmlWriter::new(&mut buffer);
//!     writer.write_header().unwrap();
//!     writer.write_element(&record, 1).unwrap();
//!     writer.write_footer().unwrap();
//!     assert_eq!(writer.records_written(), 1);
//! }
//!
//! let xml = String::from_utf8(buffer).unwrap();
//! assert!(xml.contains("\t<marc:record>\n\t\t<marc:controlfield tag=\"001\">12345</marc:controlfield>\n\t</marc:record>\n"));
//! ```

use crate::element::Element;
use crate::error::{MxError, Result};
use crate::schema::{MARCXML_NS, XSI_NS};
use quick_xml::escape::escape;
use std::io::Write;
use tracing::debug;

/// Location of the published MARC21 slim schema.
pub const SCHEMA_LOCATION: &str =
    "http://www.loc.gov/MARC21/slim http://www.loc.gov/standards/marcxml/schema/MARC21slim.xsd";

/// Comment written on the second line of every output document.
pub const OUTPUT_COMMENT: &str = "<!-- Output by mxtool -->";

/// Namespace prefix used for every written tag.
const PREFIX: &str = "marc";

/// Writer for MARCXML collections.
#[derive(Debug)]
pub struct MarcXmlWriter<W: Write> {
    writer: W,
    elements_written: usize,
    records_written: usize,
    finished: bool,
}

impl<W: Write> MarcXmlWriter<W> {
    /// Create a new MARCXML writer.
    ///
    /// # Examples
    ///
    /// ```
    /// use mxtool::MarcXmlWriter;
    /// let buffer = Vec::new();
    /// let writer = MarcXmlWriter::new(buffer);
    /// ```
    pub fn new(writer: W) -> Self {
        MarcXmlWriter {
            writer,
            elements_written: 0,
            records_written: 0,
            finished: false,
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.finished {
            return Err(MxError::InvalidArgument(
                "Cannot write to a finished writer".to_string(),
            ));
        }
        Ok(())
    }

    /// Write the XML declaration, comment, and opening collection tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished or the write fails.
    pub fn write_header(&mut self) -> Result<()> {
        self.check_open()?;
        writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(self.writer, "{OUTPUT_COMMENT}")?;
        writeln!(
            self.writer,
            "<{PREFIX}:collection xmlns:{PREFIX}=\"{MARCXML_NS}\" xmlns:xsi=\"{XSI_NS}\" xsi:schemaLocation=\"{SCHEMA_LOCATION}\">"
        )?;
        Ok(())
    }

    /// Write the closing collection tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished or the write fails.
    pub fn write_footer(&mut self) -> Result<()> {
        self.check_open()?;
        writeln!(self.writer, "</{PREFIX}:collection>")?;
        Ok(())
    }

    /// Write an element and its subtree at `depth` levels of indentation.
    ///
    /// A `collection` element writes nothing itself: its children are written
    /// at `depth + 1`, and the envelope comes from [`write_header`] and
    /// [`write_footer`].
    ///
    /// Returns the number of elements written.
    ///
    /// [`write_header`]: MarcXmlWriter::write_header
    /// [`write_footer`]: MarcXmlWriter::write_footer
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished or any write fails; the
    /// output is then incomplete.
    pub fn write_element(&mut self, element: &Element, depth: usize) -> Result<usize> {
        self.check_open()?;
        if element.is_collection() {
            let mut count = 0;
            for child in element.children() {
                count += self.write_element(child, depth + 1)?;
            }
            return Ok(count);
        }

        let tag = element.tag();
        self.indent(depth)?;
        write!(self.writer, "<{PREFIX}:{tag}")?;
        for (name, value) in element.attributes() {
            write!(self.writer, " {name}=\"{}\"", escape(value.as_str()))?;
        }
        write!(self.writer, ">")?;

        let mut count = 1;
        if element.children().is_empty() {
            let text = element.text().unwrap_or_default();
            writeln!(self.writer, "{}</{PREFIX}:{tag}>", escape(text))?;
        } else {
            writeln!(self.writer)?;
            for child in element.children() {
                count += self.write_element(child, depth + 1)?;
            }
            self.indent(depth)?;
            writeln!(self.writer, "</{PREFIX}:{tag}>")?;
        }

        self.elements_written += 1;
        if element.is_record() {
            self.records_written += 1;
        }
        Ok(count)
    }

    fn indent(&mut self, depth: usize) -> Result<()> {
        for _ in 0..depth {
            self.writer.write_all(b"\t")?;
        }
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Number of elements written so far.
    #[must_use]
    pub fn elements_written(&self) -> usize {
        self.elements_written
    }

    /// Number of `record` elements written so far.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

/// Write a whole collection, envelope included.
///
/// Returns the number of elements written.
///
/// # Errors
///
/// Returns [`MxError::InvalidRoot`] if `top` is not a `collection`, or an IO
/// error if writing fails.
pub fn write_collection<W: Write>(top: &Element, writer: W) -> Result<usize> {
    if !top.is_collection() {
        return Err(MxError::InvalidRoot(top.tag().to_string()));
    }
    let mut writer = MarcXmlWriter::new(writer);
    writer.write_header()?;
    let count = writer.write_element(top, 0)?;
    writer.write_footer()?;
    writer.finish()?;
    debug!(
        elements = count,
        records = writer.records_written(),
        "wrote collection"
    );
    Ok(count)
}

/// Serialize a collection to a string.
///
/// # Errors
///
/// See [`write_collection`].
pub fn collection_to_string(top: &Element) -> Result<String> {
    let mut buffer = Vec::new();
    write_collection(top, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MxError::InvalidArgument(e.to_string()))
}
