//! recon-ingest: statement text → transactions, year recovery, and debit reconciliation.

pub mod extract;
pub mod normalize;
pub mod parsers;
pub mod processor;
pub mod types;
pub mod validate;
pub mod year;

pub use extract::{ExtractError, TextExtractor, TextFileExtractor};
pub use processor::{
    discover_statements, parse_document, DocumentOutcome, ParsedDocument, ProcessOptions, RunReport,
    StatementProcessor,
};
pub use types::CandidateLine;
pub use year::{resolve_statement_year, ResolvedYear, YearSource};
