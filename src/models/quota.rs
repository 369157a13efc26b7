use chrono::{DateTime, Utc};

/// Server-advertised request allowance, held in memory only.
///
/// `remaining` is signed: zero or below means exhausted until `reset_at`.
#[derive(Clone, Debug, PartialEq)]
pub struct QuotaState {
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
    pub last_request: Option<DateTime<Utc>>,
}

impl QuotaState {
    /// Fresh state with a default allowance and no pending reset.
    pub fn new(remaining: i64) -> Self {
        QuotaState {
            remaining,
            reset_at: DateTime::<Utc>::UNIX_EPOCH,
            last_request: None,
        }
    }

    pub fn is_exhausted_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining <= 0 && now < self.reset_at
    }
}
