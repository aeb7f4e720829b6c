pub mod ledger;
pub mod money;
pub mod period;
pub mod record;

pub use ledger::{AccountLedger, Applied, IoSummary, LedgerError, NewDebt, NewEntry, Posting};
pub use money::Money;
pub use period::{DateRange, DateSpec, ReportPeriod};
pub use record::{AccountId, RecordHandle, RecordKind, StoredRecord};
