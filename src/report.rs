//! Sorted one-line-per-record listings.
//!
//! A library listing orders records by call number and leads each line with
//! it; a bibliography listing orders by author and leads with the author.
//! Each line ends with a period, added only when the publication text does
//! not already end with one. Both listings can instead be written as JSON,
//! one [`BibSummary`] object per line.

use crate::bib_summary::{BibField, BibSummary};
use crate::collection::sort_by_field;
use crate::element::Element;
use crate::error::{MxError, Result};
use crate::locator::RecordView;
use std::io::Write;
use tracing::debug;

/// Output format of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable lines, each preceded by a blank line
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Which listing to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// Sorted by call number, call number first
    Library,
    /// Sorted by author, author first
    Bibliography,
}

impl Listing {
    fn sort_field(self) -> BibField {
        match self {
            Listing::Library => BibField::CallNumber,
            Listing::Bibliography => BibField::Author,
        }
    }

    fn line(self, s: &BibSummary) -> String {
        let period = if s.publication.ends_with('.') { "" } else { "." };
        match self {
            Listing::Library => format!(
                "{} {} {} {}{period}",
                s.call_number, s.author, s.title, s.publication
            ),
            Listing::Bibliography => format!(
                "{} {} {} {}{period}",
                s.author, s.call_number, s.title, s.publication
            ),
        }
    }
}

/// Sort the records of `collection` for `listing` and write one entry per
/// record.
///
/// The collection is left in the sorted order. Returns the number of entries
/// written.
///
/// # Errors
///
/// Returns [`MxError::InvalidRoot`] if `collection` is not a `collection`,
/// or an IO error if writing fails.
pub fn write_listing<W: Write>(
    collection: &mut Element,
    listing: Listing,
    format: ReportFormat,
    mut out: W,
) -> Result<usize> {
    if !collection.is_collection() {
        return Err(MxError::InvalidRoot(collection.tag().to_string()));
    }
    sort_by_field(collection, listing.sort_field())?;

    let mut written = 0;
    for record in collection.records() {
        let summary = BibSummary::from_record(&RecordView::new(record)?);
        match format {
            ReportFormat::Text => {
                write!(out, "\n{}\n", listing.line(&summary))?;
            },
            ReportFormat::Json => {
                serde_json::to_writer(&mut out, &summary).map_err(std::io::Error::from)?;
                writeln!(out)?;
            },
        }
        written += 1;
    }
    out.flush()?;
    debug!(?listing, entries = written, "wrote listing");
    Ok(written)
}

/// Write a library listing: records sorted and led by call number.
///
/// # Errors
///
/// See [`write_listing`].
pub fn library_listing<W: Write>(collection: &mut Element, format: ReportFormat, out: W) -> Result<usize> {
    write_listing(collection, Listing::Library, format, out)
}

/// Write a bibliography listing: records sorted and led by author.
///
/// # Errors
///
/// See [`write_listing`].
pub fn bibliography_listing<W: Write>(
    collection: &mut Element,
    format: ReportFormat,
    out: W,
) -> Result<usize> {
    write_listing(collection, Listing::Bibliography, format, out)
}
