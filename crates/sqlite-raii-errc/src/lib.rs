//! Error codes for the `sqlite-raii` wrapper.
//!
//! Two domains share one comparison mechanism:
//!
//! - **`sqlite3`**: result codes reported by the SQLite engine. Codes carry
//!   extended detail in their upper bits; the category reduces any code to a
//!   coarse [`ErrorCondition`] by masking the low byte, so
//!   `code == SqliteErrc::DatabaseBusy` holds for both `SQLITE_BUSY` and
//!   `SQLITE_BUSY_SNAPSHOT`.
//! - **`sqlite-raii`**: misuse detected by the wrapper itself before the engine
//!   is involved ([`WrapperErrc`]).
//!
//! ```
//! use sqlite_raii_errc::{ErrorCode, SqliteErrc, sqlite3_category};
//!
//! // SQLITE_CANTOPEN_ISDIR (extended) still compares equal to the primary code.
//! let ec = ErrorCode::new(14 | (2 << 8), sqlite3_category());
//! assert!(ec.is_err());
//! assert_eq!(ec, SqliteErrc::DatabaseOpenFailed);
//! ```

mod category;
mod code;
mod sqlite;
mod wrapper;

pub use category::{ErrorCategory, same_category};
pub use code::{ErrorCode, ErrorCondition};
pub use sqlite::{Sqlite3Category, SqliteErrc, sqlite3_category};
pub use wrapper::{WrapperCategory, WrapperErrc, wrapper_category};

/// Fallback message for codes a category does not know.
pub const UNKNOWN_ERROR: &str = "Unknown error";
