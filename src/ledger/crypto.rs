//! Cryptocurrency engine. Exchanges are created and deleted here; the coin
//! records inside them are opaque passthrough data, and the category's
//! `total_usd` is maintained outside this system and only ever read.

use tracing::debug;

use super::error::{LedgerError, LedgerResult};
use super::model::Ledger;

impl Ledger {
    /// Registers an exchange with an empty coin list.
    pub fn crypto_add_exchange(&mut self, name: &str) -> LedgerResult<()> {
        if self.cryptocurrency.exchanges.contains_key(name) {
            return Err(LedgerError::AlreadyExists(format!("exchange {name}")));
        }
        self.cryptocurrency
            .exchanges
            .insert(name.to_string(), Vec::new());
        debug!(name, "exchange added");
        Ok(())
    }

    /// Removes an exchange and its coin records. `total_usd` is not
    /// adjusted; it is owned by the external maintainer of the coin data.
    pub fn crypto_delete_exchange(&mut self, name: &str) -> LedgerResult<()> {
        self.cryptocurrency
            .exchanges
            .remove(name)
            .ok_or_else(|| LedgerError::NotFound(format!("exchange {name}")))?;
        debug!(name, "exchange deleted");
        Ok(())
    }
}
