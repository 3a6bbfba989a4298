//! Field and subfield lookup within a record element.
//!
//! MARCXML fields are elements carrying a numeric `tag` attribute and
//! subfields are elements carrying a one-character `code` attribute. The
//! queries here address them by occurrence: "the 2nd field tagged 650" or
//! "the 1st subfield `a` of the 1st field tagged 245". Occurrences count from
//! 1; an occurrence outside the available range yields `None` (or a count of
//! zero) rather than an error.
//!
//! Queries require a `record` element. [`RecordView::new`] checks this once so
//! every query after it can rely on it.
//!
//! # Tag parsing
//!
//! Tag attributes are compared as integers using leading-integer parsing
//! (see [`parse_leading_int`]): `"090"` is 90 and `" 12x"` is 12. A value
//! with no leading digits parses as 0, so such an element is counted as a
//! field with tag 0.
//!
//! # Examples
//!
//! ```
//! use mxtool::{Element, RecordView};
//!
//! let record = Element::branch("record", vec![
//!     Element::branch("datafield", vec![
//!         Element::leaf("subfield", "Design Patterns").with_attribute("code", "a"),
//!     ]).with_attribute("tag", "245"),
//! ]);
//!
//! let view = RecordView::new(&record).unwrap();
//! assert_eq!(view.field_count(245), 1);
//! assert_eq!(view.data(245, 1, 'a', 1), Some("Design Patterns"));
//! assert_eq!(view.data(245, 2, 'a', 1), None);
//! ```

use crate::element::Element;
use crate::error::{MxError, Result};

/// Name of the attribute holding a field's tag.
pub const TAG_ATTRIBUTE: &str = "tag";

/// Name of the attribute holding a subfield's code.
pub const CODE_ATTRIBUTE: &str = "code";

/// Parse the leading integer of `s`, C `atoi` style.
///
/// Leading whitespace and one sign are accepted, digits are read until the
/// first non-digit, and anything unparseable is 0. Out-of-range values
/// saturate.
///
/// ```
/// use mxtool::locator::parse_leading_int;
///
/// assert_eq!(parse_leading_int("090"), 90);
/// assert_eq!(parse_leading_int("  -7abc"), -7);
/// assert_eq!(parse_leading_int("abc"), 0);
/// ```
#[must_use]
pub fn parse_leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for d in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(d - b'0'));
    }
    if negative {
        -value
    } else {
        value
    }
}

fn has_tag(element: &Element, tag: i32) -> bool {
    element
        .attributes()
        .iter()
        .any(|(name, value)| name == TAG_ATTRIBUTE && parse_leading_int(value) == i64::from(tag))
}

fn has_code(element: &Element, code: char) -> bool {
    element
        .attributes()
        .iter()
        .any(|(name, value)| name == CODE_ATTRIBUTE && value.starts_with(code))
}

fn count_descendants(element: &Element, pred: &impl Fn(&Element) -> bool) -> usize {
    element
        .children()
        .iter()
        .map(|child| usize::from(pred(child)) + count_descendants(child, pred))
        .sum()
}

fn nth_child_position(
    element: &Element,
    occurrence: usize,
    pred: impl Fn(&Element) -> bool,
) -> Option<usize> {
    element
        .children()
        .iter()
        .enumerate()
        .filter(|&(_, child)| pred(child))
        .nth(occurrence.checked_sub(1)?)
        .map(|(i, _)| i)
}

/// A read-only view of an element known to be a `record`.
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    record: &'a Element,
}

impl<'a> RecordView<'a> {
    /// Wrap a record element.
    ///
    /// # Errors
    ///
    /// Returns [`MxError::NotARecord`] if the element's tag is not `record`.
    pub fn new(record: &'a Element) -> Result<Self> {
        if record.is_record() {
            Ok(RecordView { record })
        } else {
            Err(MxError::NotARecord(record.tag().to_string()))
        }
    }

    /// The wrapped record element.
    #[must_use]
    pub fn element(&self) -> &'a Element {
        self.record
    }

    /// Number of elements anywhere below the record whose tag is `tag`.
    #[must_use]
    pub fn field_count(&self, tag: i32) -> usize {
        count_descendants(self.record, &|e| has_tag(e, tag))
    }

    /// Index among the record's direct children of the `occurrence`-th field
    /// tagged `tag`.
    #[must_use]
    pub fn field_position(&self, tag: i32, occurrence: usize) -> Option<usize> {
        nth_child_position(self.record, occurrence, |e| has_tag(e, tag))
    }

    /// The `occurrence`-th field tagged `tag`.
    #[must_use]
    pub fn field(&self, tag: i32, occurrence: usize) -> Option<&'a Element> {
        let position = self.field_position(tag, occurrence)?;
        self.record.children().get(position)
    }

    /// Number of subfields coded `code` anywhere below the
    /// `occurrence`-th field tagged `tag`, or 0 when there is no such field.
    #[must_use]
    pub fn subfield_count(&self, tag: i32, occurrence: usize, code: char) -> usize {
        if occurrence == 0 || occurrence > self.field_count(tag) {
            return 0;
        }
        self.field(tag, occurrence)
            .map_or(0, |field| count_descendants(field, &|e| has_code(e, code)))
    }

    /// Text of the `sub_occurrence`-th subfield `code` of the
    /// `occurrence`-th field tagged `tag`.
    ///
    /// Tags 0 through 9 are control fields: the field's own text is returned
    /// and `code` and `sub_occurrence` are ignored.
    #[must_use]
    pub fn data(
        &self,
        tag: i32,
        occurrence: usize,
        code: char,
        sub_occurrence: usize,
    ) -> Option<&'a str> {
        if occurrence == 0 || occurrence > self.field_count(tag) {
            return None;
        }
        let field = self.field(tag, occurrence)?;
        if (0..=9).contains(&tag) {
            return field.text();
        }

        if sub_occurrence == 0 || sub_occurrence > self.subfield_count(tag, occurrence, code) {
            return None;
        }
        let position = nth_child_position(field, sub_occurrence, |e| has_code(e, code))?;
        field.children().get(position)?.text()
    }
}

impl<'a> TryFrom<&'a Element> for RecordView<'a> {
    type Error = MxError;

    fn try_from(record: &'a Element) -> Result<Self> {
        RecordView::new(record)
    }
}
