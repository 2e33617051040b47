use tracing::warn;

use pulsar_domain::Ledger;

use crate::CoreError;

/// Abstraction over persistence backends capable of storing a ledger.
pub trait LedgerStorage: Send + Sync {
    fn load(&self) -> Result<Ledger, CoreError>;
    fn save(&self, ledger: &Ledger) -> Result<(), CoreError>;
    /// Removes every persisted record.
    fn clear(&self) -> Result<(), CoreError>;

    /// Loads the ledger, substituting an empty one when the stored data is
    /// unreadable.
    fn load_or_empty(&self) -> Ledger {
        match self.load() {
            Ok(ledger) => ledger,
            Err(err) => {
                warn!(error = %err, "stored ledger unreadable, starting empty");
                Ledger::default()
            }
        }
    }
}
