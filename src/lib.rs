#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # mxtool: MARCXML collection toolkit
//!
//! Read a MARCXML collection into an owned element tree, query records by
//! field tag and subfield code, and write collections back out after
//! selecting, concatenating, or sorting their records.
//!
//! ## Quick Start
//!
//! ### Reading and querying
//!
//! ```ignore
//! use mxtool::{read_collection, BibSummary, RecordView, Schema};
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let top = read_collection(File::open("records.xml")?, &Schema::marc21_slim()?)?;
//!
//! for record in top.records() {
//!     let view = RecordView::new(record)?;
//!     let summary = BibSummary::from_record(&view);
//!     println!("{} / {}", summary.author, summary.title);
//!     if let Some(isbn) = view.data(20, 1, 'a', 1) {
//!         println!("  ISBN {isbn}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Selecting and sorting
//!
//! ```ignore
//! use mxtool::collection::{select, sort_by_field, SelectMode, Selector};
//! use mxtool::BibField;
//!
//! let selector: Selector = "a=^Knuth".parse()?;
//! select(&top, &selector, SelectMode::Keep, std::io::stdout())?;
//!
//! sort_by_field(&mut top, BibField::CallNumber)?;
//! mxtool::write_collection(&top, std::io::stdout())?;
//! ```
//!
//! ## Modules
//!
//! - [`document`]: Parsed XML documents with resolved namespaces
//! - [`schema`]: Schema handles and document validation
//! - [`element`]: The owned element tree (`Element`)
//! - [`locator`]: Field and subfield lookup within a record (`RecordView`)
//! - [`bib_summary`]: Author, title, publication, and call number summaries
//! - [`writer`]: MARCXML serialization
//! - [`collection`]: Selection, concatenation, and sorting
//! - [`report`]: Library and bibliography listings
//! - [`review`]: Interactive record review
//! - [`reader`]: The read, parse, validate, build pipeline
//! - [`config`]: Runtime configuration
//! - [`error`]: Error types and result type

pub mod bib_summary;
pub mod collection;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod locator;
pub mod reader;
pub mod report;
pub mod review;
pub mod schema;
pub mod writer;

pub use bib_summary::{BibField, BibSummary};
pub use collection::{concat, select, sort_by_field, SelectMode, Selector};
pub use config::MxConfig;
pub use document::Document;
pub use element::Element;
pub use error::{MxError, Result};
pub use locator::RecordView;
pub use reader::{read_collection, read_collection_str};
pub use report::{bibliography_listing, library_listing, Listing, ReportFormat};
pub use review::{review, Decision};
pub use schema::Schema;
pub use writer::{collection_to_string, write_collection, MarcXmlWriter};
