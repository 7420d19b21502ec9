//! Temperature History
//!
//! - **types**: `Reading`, `DateRange`, `Snapshot`
//! - **normalize**: raw feed records → history in chart order
//! - **zone**: Display time zone for labels, CSV and user input
//! - **error**: Error types
//!
//! ```text
//! feed (newest first) → parse each record → reverse → sort by time → Snapshot
//!                            │
//!                            └─ malformed → Snapshot::rejected
//! ```

pub mod error;
pub mod normalize;
pub mod types;
pub mod zone;

pub use error::{NormalizeError, NormalizeResult};
pub use normalize::{normalize, parse_record};
pub use types::{DateRange, Reading, Rejected, Snapshot};
pub use zone::DisplayZone;
