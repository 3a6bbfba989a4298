//! Bibliographic summaries of records.
//!
//! A [`BibSummary`] reduces a record to four display strings: author, title,
//! publication information and call number. Each string is the concatenation
//! (with no separator) of the subfields listed below that exist, or `"na"`
//! when none of them do.
//!
//! | Field        | Sources                                                   |
//! |--------------|-----------------------------------------------------------|
//! | author       | 100 $a, else 130 $a                                       |
//! | title        | 245 $a $p $b                                              |
//! | publication  | 260 $a $b $c, 250 $a                                      |
//! | call number  | 090 $a $b, else 050 $a $b                                 |
//!
//! Summaries are computed on demand and never stored on the record.

use crate::locator::RecordView;
use serde::Serialize;
use std::fmt;

/// Placeholder used when a record has none of a summary field's sources.
pub const NOT_AVAILABLE: &str = "na";

/// The four fields of a [`BibSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BibField {
    /// Main entry: personal name or uniform title
    Author,
    /// Title statement
    Title,
    /// Imprint and edition
    Publication,
    /// Local or LC call number
    CallNumber,
}

impl fmt::Display for BibField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Author => write!(f, "author"),
            Self::Title => write!(f, "title"),
            Self::Publication => write!(f, "publication"),
            Self::CallNumber => write!(f, "call number"),
        }
    }
}

/// Display strings derived from one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibSummary {
    /// Author or uniform title
    pub author: String,
    /// Title with part name and remainder
    pub title: String,
    /// Place, publisher, date, and edition
    pub publication: String,
    /// Call number
    pub call_number: String,
}

/// Concatenate the subfields that exist, or `None` if none do.
fn join_subfields(view: &RecordView<'_>, sources: &[(i32, char)]) -> Option<String> {
    let mut found = false;
    let mut joined = String::new();
    for &(tag, code) in sources {
        if let Some(text) = view.data(tag, 1, code, 1) {
            found = true;
            joined.push_str(text);
        }
    }
    found.then_some(joined)
}

impl BibSummary {
    /// Derive the summary of a record.
    ///
    /// # Examples
    ///
    /// ```
    /// use mxtool::{BibSummary, Element, RecordView};
    ///
    /// let record = Element::branch("record", vec![
    ///     Element::branch("datafield", vec![
    ///         Element::leaf("subfield", "Beowulf.").with_attribute("code", "a"),
    ///     ]).with_attribute("tag", "130"),
    /// ]);
    ///
    /// let summary = BibSummary::from_record(&RecordView::new(&record).unwrap());
    /// assert_eq!(summary.author, "Beowulf.");
    /// assert_eq!(summary.title, "na");
    /// ```
    #[must_use]
    pub fn from_record(view: &RecordView<'_>) -> Self {
        let author = join_subfields(view, &[(100, 'a')])
            .or_else(|| join_subfields(view, &[(130, 'a')]));
        let title = join_subfields(view, &[(245, 'a'), (245, 'p'), (245, 'b')]);
        let publication =
            join_subfields(view, &[(260, 'a'), (260, 'b'), (260, 'c'), (250, 'a')]);
        let call_number = join_subfields(view, &[(90, 'a'), (90, 'b')])
            .or_else(|| join_subfields(view, &[(50, 'a'), (50, 'b')]));

        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        BibSummary {
            author: or_na(author),
            title: or_na(title),
            publication: or_na(publication),
            call_number: or_na(call_number),
        }
    }

    /// The string for one field.
    #[must_use]
    pub fn get(&self, field: BibField) -> &str {
        match field {
            BibField::Author => &self.author,
            BibField::Title => &self.title,
            BibField::Publication => &self.publication,
            BibField::CallNumber => &self.call_number,
        }
    }
}
