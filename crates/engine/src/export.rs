use crate::error::{EngineError, Result};
use crate::ledger::Ledger;

/// Clipboard payload built from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportText {
    pub text: String,
    pub line_count: usize,
}

/// Builds the clipboard payload, refusing to produce an empty one.
///
/// # Example
/// ```
/// use stamp_engine::export::build_export_text;
/// use stamp_engine::ledger::Ledger;
///
/// let mut ledger = Ledger::new();
/// assert!(build_export_text(&ledger).is_err());
///
/// ledger.add("0:30", "Hook").expect("valid");
/// assert_eq!(build_export_text(&ledger).expect("payload").text, "0:30 - Hook");
/// ```
pub fn build_export_text(ledger: &Ledger) -> Result<ExportText> {
    let text = ledger.export_text();
    if text.is_empty() {
        return Err(EngineError::NothingToExport);
    }

    Ok(ExportText {
        text,
        line_count: ledger.len(),
    })
}
