use serde::{Deserialize, Serialize};

/// A provisionally matched transaction row, still in raw text form.
///
/// Produced by the dialect tokenizers and consumed by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLine {
    /// Credit card rows carry a separate posting date (DD/MM)
    pub posting_date: Option<String>,
    /// DD/MM as printed
    pub transaction_date: String,
    /// Cleaned description, meaningful detail lines already appended
    pub description: String,
    /// Amount text without its direction marker, e.g. "1,234.50"
    pub amount: String,
    /// "CR" for credit card credits, "+"/"-" for current account rows
    pub marker: Option<String>,
    /// Running balance printed after a current account amount
    pub balance: Option<String>,
    /// Raw detail lines collected after a current account row
    pub details: Vec<String>,
}
