//! recon-report: CSV/JSON export and run summaries

pub mod export;
pub mod summary;

pub use export::{save_csv, save_json, write_csv_to, write_json_to};
pub use summary::{
    render_documents, render_transaction_summary, render_validation_summary, RunSummary,
    VerdictTally,
};
