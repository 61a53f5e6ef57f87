// Entity Models - flat source records
//
// Each record keeps its source id verbatim; lookups go through
// `key::canonical_key`.

pub mod category;
pub mod transaction;
pub mod vendor;

pub use category::Category;
pub use transaction::{dedup_by_id, parse_date, RawAmount, TransactionRecord};
pub use vendor::{NameMapping, NameMappingTable, VendorRecord, UNKNOWN_VENDOR};
