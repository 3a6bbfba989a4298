//! Interactive record-by-record review.
//!
//! Each record's summary is shown on the prompt sink and one decision line is
//! read from the decision source:
//!
//! | Input           | Effect                                  |
//! |-----------------|-----------------------------------------|
//! | empty line      | keep this record                        |
//! | line starting with a space | skip this record             |
//! | `k`             | keep this and all remaining records     |
//! | `d`             | discard this and all remaining records  |
//!
//! `k` and `d` must be the whole line. Anything else prints a short help text
//! and shows the record again. End of input discards the remaining records.
//! Kept records are written to the output as a MARCXML collection.

use crate::bib_summary::BibSummary;
use crate::element::Element;
use crate::error::{MxError, Result};
use crate::locator::RecordView;
use crate::writer::MarcXmlWriter;
use std::io::{BufRead, Write};
use tracing::debug;

const HELP: &str = "\nInvalid input:\n\
< enter > : keep record\n\
< space > : skip record\n\
< k > : keep remaining records\n\
< d > : discard remaining records\n";

/// A reviewer's answer for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write this record
    Keep,
    /// Leave this record out
    Skip,
    /// Write this and every following record
    KeepRest,
    /// Leave out this and every following record
    DiscardRest,
}

impl Decision {
    /// Interpret one input line, without its line terminator.
    #[must_use]
    pub fn from_line(line: &str) -> Option<Self> {
        match line {
            "" => Some(Decision::Keep),
            "k" => Some(Decision::KeepRest),
            "d" => Some(Decision::DiscardRest),
            _ if line.starts_with(' ') => Some(Decision::Skip),
            _ => None,
        }
    }
}

fn summary_line(position: usize, summary: &BibSummary) -> String {
    let period = if summary.call_number.ends_with('.') { "" } else { "." };
    format!(
        "{position}. {} {} {} {}{period}",
        summary.author, summary.title, summary.publication, summary.call_number
    )
}

/// Show `summary` and read decisions until one is valid; `None` at end of
/// input.
fn next_decision<R: BufRead, P: Write>(
    summary: &str,
    decisions: &mut R,
    prompt: &mut P,
) -> Result<Option<Decision>> {
    let mut line = String::new();
    loop {
        writeln!(prompt, "{summary}")?;
        prompt.flush()?;
        line.clear();
        if decisions.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\n', '\r']);
        if let Some(decision) = Decision::from_line(answer) {
            return Ok(Some(decision));
        }
        prompt.write_all(HELP.as_bytes())?;
    }
}

/// Review the records of `top`, writing the kept ones to `out`.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`MxError::InvalidRoot`] if `top` is not a `collection`, or an IO
/// error if reading a decision or writing fails.
pub fn review<R, P, W>(top: &Element, mut decisions: R, mut prompt: P, out: W) -> Result<usize>
where
    R: BufRead,
    P: Write,
    W: Write,
{
    if !top.is_collection() {
        return Err(MxError::InvalidRoot(top.tag().to_string()));
    }

    let mut writer = MarcXmlWriter::new(out);
    writer.write_header()?;

    let children = top.children();
    let mut i = 0;
    while let Some(child) = children.get(i) {
        let Ok(view) = RecordView::new(child) else {
            i += 1;
            continue;
        };
        let summary = summary_line(i + 1, &BibSummary::from_record(&view));
        match next_decision(&summary, &mut decisions, &mut prompt)? {
            Some(Decision::Keep) => {
                writer.write_element(child, 1)?;
            },
            Some(Decision::Skip) => {},
            Some(Decision::KeepRest) => {
                for rest in children.iter().skip(i).filter(|c| c.is_record()) {
                    writer.write_element(rest, 1)?;
                }
                break;
            },
            Some(Decision::DiscardRest) | None => break,
        }
        i += 1;
    }

    writer.write_footer()?;
    writer.finish()?;
    debug!(kept = writer.records_written(), "review finished");
    Ok(writer.records_written())
}
