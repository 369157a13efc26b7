//! # Lookup Service
//!
//! Composes the client (with its quota tracker) and the history store. A call
//! either ends with the result decoded and, when successful, recorded, or with
//! an error and no history mutation.

use log::info;

use crate::client::{HttpTransport, LookupClient, LookupRequest, UreqTransport};
use crate::error::LookupError;
use crate::history::HistoryStore;
use crate::models::{HistoryEntry, LookupResult};
use crate::quota::QuotaTracker;

pub struct LookupService<T: HttpTransport = UreqTransport> {
    client: LookupClient<T>,
    history: HistoryStore,
}

impl<T: HttpTransport> LookupService<T> {
    pub fn new(client: LookupClient<T>, history: HistoryStore) -> Self {
        LookupService { client, history }
    }

    /// Run one lookup to completion.
    ///
    /// A decoded `fail` status is returned as a result but never recorded.
    pub fn lookup(&mut self, request: &LookupRequest) -> Result<LookupResult, LookupError> {
        let result = self.client.fetch(request)?;
        if result.is_success() {
            self.history.append(&result)?;
        } else {
            info!(
                "lookup of {} failed remotely: {}",
                result.query.as_deref().unwrap_or("?"),
                result.message.as_deref().unwrap_or("no message")
            );
        }
        Ok(result)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        self.history.entries()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn quota(&self) -> &QuotaTracker {
        self.client.quota()
    }

    pub fn client(&self) -> &LookupClient<T> {
        &self.client
    }
}
