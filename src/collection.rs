//! Operations on whole collections: selection, concatenation, and sorting.
//!
//! Selection is driven by a small pattern language, `<field>=<regex>`, where
//! `<field>` is `a` (author), `t` (title), or `p` (publication) and the regex
//! is matched against that field of each record's [`BibSummary`]:
//!
//! ```
//! use mxtool::collection::Selector;
//! use mxtool::BibField;
//!
//! let selector: Selector = "t=^Design".parse().unwrap();
//! assert_eq!(selector.field(), BibField::Title);
//! assert!(selector.is_match("Design Patterns"));
//! assert!("x=abc".parse::<Selector>().is_err());
//! ```
//!
//! Selection and concatenation never modify their input; they control what
//! gets written. Sorting reorders the children of the collection in place.

use crate::bib_summary::{BibField, BibSummary, NOT_AVAILABLE};
use crate::element::Element;
use crate::error::{MxError, Result};
use crate::locator::RecordView;
use crate::writer::MarcXmlWriter;
use regex::Regex;
use std::io::Write;
use std::str::FromStr;
use tracing::debug;

/// Returns true if `data` matches the regular expression `pattern`.
///
/// # Errors
///
/// Returns [`MxError::InvalidRegex`] if `pattern` does not compile.
pub fn matches(data: &str, pattern: &str) -> Result<bool> {
    Ok(Regex::new(pattern)?.is_match(data))
}

/// Whether selected records are written or left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Write records that match
    Keep,
    /// Write records that do not match
    Discard,
}

/// A parsed `<field>=<regex>` record selector.
#[derive(Debug, Clone)]
pub struct Selector {
    field: BibField,
    regex: Regex,
}

impl Selector {
    /// Parse a selector.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::InvalidSelector`] if the pattern does not start with
    /// `a=`, `t=`, or `p=`, and [`MxError::InvalidRegex`] if the rest is not a
    /// valid regular expression.
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut chars = pattern.chars();
        let field = match chars.next() {
            Some('a') => BibField::Author,
            Some('t') => BibField::Title,
            Some('p') => BibField::Publication,
            _ => return Err(MxError::InvalidSelector(pattern.to_string())),
        };
        if chars.next() != Some('=') {
            return Err(MxError::InvalidSelector(pattern.to_string()));
        }
        let regex = Regex::new(chars.as_str())?;
        Ok(Selector { field, regex })
    }

    /// The summary field the selector looks at.
    #[must_use]
    pub fn field(&self) -> BibField {
        self.field
    }

    /// Returns true if `data` matches the selector's regex.
    #[must_use]
    pub fn is_match(&self, data: &str) -> bool {
        self.regex.is_match(data)
    }

    /// Returns true if the summary's selected field matches.
    #[must_use]
    pub fn matches_summary(&self, summary: &BibSummary) -> bool {
        self.is_match(summary.get(self.field))
    }
}

impl FromStr for Selector {
    type Err = MxError;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}

fn require_collection(top: &Element) -> Result<()> {
    if top.is_collection() {
        Ok(())
    } else {
        Err(MxError::InvalidRoot(top.tag().to_string()))
    }
}

/// Indices of the direct `record` children that `select` would write.
///
/// # Errors
///
/// Returns [`MxError::InvalidRoot`] if `top` is not a `collection`.
pub fn selected_indices(top: &Element, selector: &Selector, mode: SelectMode) -> Result<Vec<usize>> {
    require_collection(top)?;
    let mut indices = Vec::new();
    for (i, child) in top.children().iter().enumerate() {
        let Ok(view) = RecordView::new(child) else {
            continue;
        };
        let matched = selector.matches_summary(&BibSummary::from_record(&view));
        let keep = match mode {
            SelectMode::Keep => matched,
            SelectMode::Discard => !matched,
        };
        if keep {
            indices.push(i);
        }
    }
    Ok(indices)
}

/// Write a collection holding only the records chosen by `selector` and
/// `mode`.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`MxError::InvalidRoot`] if `top` is not a `collection`, or an IO
/// error if writing fails.
pub fn select<W: Write>(top: &Element, selector: &Selector, mode: SelectMode, out: W) -> Result<usize> {
    let indices = selected_indices(top, selector, mode)?;

    let mut writer = MarcXmlWriter::new(out);
    writer.write_header()?;
    for child in indices.iter().filter_map(|&i| top.children().get(i)) {
        writer.write_element(child, 1)?;
    }
    writer.write_footer()?;
    writer.finish()?;

    debug!(
        ?mode,
        field = %selector.field(),
        selected = writer.records_written(),
        total = top.records().count(),
        "selected records"
    );
    Ok(writer.records_written())
}

/// Write one collection holding every child of `first` followed by every
/// child of `second`.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`MxError::InvalidRoot`] if either input is not a `collection`,
/// or an IO error if writing fails.
pub fn concat<W: Write>(first: &Element, second: &Element, out: W) -> Result<usize> {
    require_collection(first)?;
    require_collection(second)?;

    let mut writer = MarcXmlWriter::new(out);
    writer.write_header()?;
    writer.write_element(first, 0)?;
    writer.write_element(second, 0)?;
    writer.write_footer()?;
    writer.finish()?;

    debug!(records = writer.records_written(), "concatenated collections");
    Ok(writer.records_written())
}

/// The order that sorts `keys` byte-wise, ties kept in original order.
///
/// Position `i` of the result is the original index of the key that ranks
/// `i`-th. For equal keys this is the same assignment as giving each rank the
/// first not-yet-used original index holding that key.
#[must_use]
pub fn sorted_order<S: AsRef<str>>(keys: &[S]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].as_ref().cmp(keys[b].as_ref()));
    order
}

/// Reorder the children of `collection` so their `keys` ascend.
///
/// `keys[i]` is the key of the `i`-th child.
///
/// # Errors
///
/// Returns [`MxError::InvalidArgument`] if there is not exactly one key per
/// child.
pub fn sort_records<S: AsRef<str>>(collection: &mut Element, keys: &[S]) -> Result<()> {
    if keys.len() != collection.children().len() {
        return Err(MxError::InvalidArgument(format!(
            "{} sort keys for {} children",
            keys.len(),
            collection.children().len()
        )));
    }
    if keys.len() < 2 {
        return Ok(());
    }
    collection.permute_children(&sorted_order(keys))
}

/// Reorder the children of `collection` by the key `key_fn` computes for each.
///
/// # Errors
///
/// See [`sort_records`].
pub fn sort_by_key(collection: &mut Element, key_fn: impl Fn(&Element) -> String) -> Result<()> {
    let keys: Vec<String> = collection.children().iter().map(key_fn).collect();
    sort_records(collection, &keys)?;
    debug!(children = keys.len(), "sorted collection");
    Ok(())
}

/// Reorder the records of `collection` by one field of their summaries.
///
/// Children that are not records sort as if the field were `"na"`.
///
/// # Errors
///
/// See [`sort_records`].
pub fn sort_by_field(collection: &mut Element, field: BibField) -> Result<()> {
    sort_by_key(collection, |child| match RecordView::new(child) {
        Ok(view) => BibSummary::from_record(&view).get(field).to_string(),
        Err(_) => NOT_AVAILABLE.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(author: &str, call_number: &str) -> Element {
        Element::branch(
            "record",
            vec![
                Element::branch(
                    "datafield",
                    vec![Element::leaf("subfield", call_number).with_attribute("code", "a")],
                )
                .with_attribute("tag", "090"),
                Element::branch(
                    "datafield",
                    vec![Element::leaf("subfield", author).with_attribute("code", "a")],
                )
                .with_attribute("tag", "100"),
            ],
        )
    }

    fn call_numbers(top: &Element) -> Vec<String> {
        top.records()
            .map(|r| BibSummary::from_record(&RecordView::new(r).unwrap()).call_number)
            .collect()
    }

    #[test]
    fn test_selector_parse_errors() {
        assert!(matches!(Selector::parse("a"), Err(MxError::InvalidSelector(_))));
        assert!(matches!(Selector::parse("a:x"), Err(MxError::InvalidSelector(_))));
        assert!(matches!(Selector::parse("c=x"), Err(MxError::InvalidSelector(_))));
        assert!(matches!(Selector::parse(""), Err(MxError::InvalidSelector(_))));
        assert!(matches!(Selector::parse("a=("), Err(MxError::InvalidRegex(_))));
        assert_eq!(Selector::parse("p=").unwrap().field(), BibField::Publication);
    }

    #[test]
    fn test_matches() {
        assert!(matches("Knuth, Donald", "^Kn").unwrap());
        assert!(!matches("Knuth, Donald", "^Do").unwrap());
        assert!(matches("anything", "").unwrap());
        assert!(matches("x", "[").is_err());
    }

    #[test]
    fn test_sort_example() {
        let mut top = Element::branch(
            "collection",
            vec![record("Zed", "QA76.1"), record("Amy", "AB12.3")],
        );
        sort_by_field(&mut top, BibField::CallNumber).unwrap();
        assert_eq!(call_numbers(&top), ["AB12.3", "QA76.1"]);
    }

    #[test]
    fn test_sort_by_author() {
        let mut top = Element::branch(
            "collection",
            vec![record("b", "1"), record("c", "2"), record("a", "3")],
        );
        sort_by_field(&mut top, BibField::Author).unwrap();
        assert_eq!(call_numbers(&top), ["3", "1", "2"]);
    }

    #[test]
    fn test_sorted_order_keeps_duplicates_in_original_order() {
        assert_eq!(sorted_order(&["b", "a", "b", "a"]), [1, 3, 0, 2]);
        assert_eq!(sorted_order(&["B", "a"]), [0, 1]);
        assert!(sorted_order::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_sort_records_key_count_mismatch() {
        let mut top = Element::branch("collection", vec![record("a", "1")]);
        assert!(matches!(
            sort_records(&mut top, &["x", "y"]),
            Err(MxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_selected_indices_partition() {
        let top = Element::branch(
            "collection",
            vec![
                record("Knuth", "1"),
                Element::leaf("note", "not a record"),
                record("Gamma", "2"),
                record("Kernighan", "3"),
            ],
        );
        let selector = Selector::parse("a=^K").unwrap();
        let kept = selected_indices(&top, &selector, SelectMode::Keep).unwrap();
        let discarded = selected_indices(&top, &selector, SelectMode::Discard).unwrap();
        assert_eq!(kept, [0, 3]);
        assert_eq!(discarded, [2]);
    }

    #[test]
    fn test_select_writes_matching_records() {
        let top = Element::branch(
            "collection",
            vec![record("Knuth", "1"), record("Gamma", "2")],
        );
        let selector = Selector::parse("a=Gamma").unwrap();
        let mut out = Vec::new();
        let written = select(&top, &selector, SelectMode::Keep, &mut out).unwrap();
        assert_eq!(written, 1);

        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("Gamma"));
        assert!(!xml.contains("Knuth"));
        assert!(xml.trim_end().ends_with("</marc:collection>"));
    }

    #[test]
    fn test_select_requires_collection() {
        let selector = Selector::parse("a=x").unwrap();
        assert!(matches!(
            select(&record("a", "1"), &selector, SelectMode::Keep, Vec::new()),
            Err(MxError::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_concat() {
        let first = Element::branch("collection", vec![record("A", "1")]);
        let second = Element::branch("collection", vec![record("B", "2"), record("C", "3")]);
        let mut out = Vec::new();
        assert_eq!(concat(&first, &second, &mut out).unwrap(), 3);

        let xml = String::from_utf8(out).unwrap();
        assert_eq!(xml.matches("<marc:collection ").count(), 1);
        assert_eq!(xml.matches("</marc:collection>").count(), 1);
        let a = xml.find(">A<").unwrap();
        let b = xml.find(">B<").unwrap();
        let c = xml.find(">C<").unwrap();
        assert!(a < b && b < c);
    }
}
