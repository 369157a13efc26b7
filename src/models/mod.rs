pub mod history;
pub mod lookup;
pub mod quota;

pub use history::HistoryEntry;
pub use lookup::{LookupResult, LookupStatus};
pub use quota::QuotaState;
