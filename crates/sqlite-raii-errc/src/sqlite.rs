//! The `sqlite3` category: result codes reported by the engine.

use crate::UNKNOWN_ERROR;
use crate::category::ErrorCategory;
use crate::code::{ErrorCode, ErrorCondition};

/// Mask selecting the primary result code out of an extended one.
const PRIMARY_MASK: i32 = 0xff;

/// `SQLITE_ABORT_ROLLBACK`, the only extended code with its own message.
const ABORT_ROLLBACK: i32 = 4 | (2 << 8);

/// Primary SQLite result codes as comparable conditions.
///
/// Compare an [`ErrorCode`] against a variant to test its coarse condition:
/// extended codes match the variant of their primary code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SqliteErrc {
   /// `SQLITE_AUTH`
   AuthorizationDenied = 23,
   /// `SQLITE_CONSTRAINT`
   ConstraintViolation = 19,
   /// `SQLITE_MISMATCH`
   DataTypeMismatch = 20,
   /// `SQLITE_BUSY`
   DatabaseBusy = 5,
   /// `SQLITE_CORRUPT`
   DatabaseCorrupt = 11,
   /// `SQLITE_CANTOPEN`
   DatabaseOpenFailed = 14,
   /// `SQLITE_SCHEMA`
   DatabaseSchemaChanged = 17,
   /// `SQLITE_ERROR`
   GenericError = 1,
   /// `SQLITE_MISUSE`
   InappropriateUse = 21,
   /// `SQLITE_INTERNAL`
   InternalMalfunction = 2,
   /// `SQLITE_INTERRUPT`
   Interrupted = 9,
   /// `SQLITE_IOERR`
   IoError = 10,
   /// `SQLITE_NOTICE`
   LogNotice = 27,
   /// `SQLITE_WARNING`
   LogWarning = 28,
   /// `SQLITE_NOLFS`
   NoLargeFileSupport = 22,
   /// `SQLITE_FULL`
   NoSpaceOnDevice = 13,
   /// `SQLITE_NOTADB`
   NotADatabase = 26,
   /// `SQLITE_NOMEM`
   NotEnoughMemory = 7,
   /// `SQLITE_ABORT`
   OperationCanceled = 4,
   /// `SQLITE_DONE`. A sentinel, not a failure by itself.
   OperationCompleted = 101,
   /// `SQLITE_LOCKED`
   OperationInProgress = 6,
   /// `SQLITE_NOTFOUND`
   OperationNotSupported = 12,
   /// `SQLITE_PERM`
   PermissionDenied = 3,
   /// `SQLITE_RANGE`
   PositionOutOfRange = 25,
   /// `SQLITE_PROTOCOL`
   ProtocolError = 15,
   /// `SQLITE_READONLY`
   ReadOnlyDatabase = 8,
   /// `SQLITE_TOOBIG`
   StringOrBlobTooLarge = 18,
}

impl SqliteErrc {
   /// Every variant, in declaration order.
   pub const ALL: [SqliteErrc; 27] = [
      SqliteErrc::AuthorizationDenied,
      SqliteErrc::ConstraintViolation,
      SqliteErrc::DataTypeMismatch,
      SqliteErrc::DatabaseBusy,
      SqliteErrc::DatabaseCorrupt,
      SqliteErrc::DatabaseOpenFailed,
      SqliteErrc::DatabaseSchemaChanged,
      SqliteErrc::GenericError,
      SqliteErrc::InappropriateUse,
      SqliteErrc::InternalMalfunction,
      SqliteErrc::Interrupted,
      SqliteErrc::IoError,
      SqliteErrc::LogNotice,
      SqliteErrc::LogWarning,
      SqliteErrc::NoLargeFileSupport,
      SqliteErrc::NoSpaceOnDevice,
      SqliteErrc::NotADatabase,
      SqliteErrc::NotEnoughMemory,
      SqliteErrc::OperationCanceled,
      SqliteErrc::OperationCompleted,
      SqliteErrc::OperationInProgress,
      SqliteErrc::OperationNotSupported,
      SqliteErrc::PermissionDenied,
      SqliteErrc::PositionOutOfRange,
      SqliteErrc::ProtocolError,
      SqliteErrc::ReadOnlyDatabase,
      SqliteErrc::StringOrBlobTooLarge,
   ];

   /// The primary result code.
   pub fn code(self) -> i32 {
      self as i32
   }
}

impl From<SqliteErrc> for ErrorCondition {
   fn from(errc: SqliteErrc) -> Self {
      ErrorCondition::new(errc.code(), sqlite3_category())
   }
}

impl PartialEq<SqliteErrc> for ErrorCode {
   fn eq(&self, other: &SqliteErrc) -> bool {
      self.condition() == ErrorCondition::from(*other)
   }
}

impl PartialEq<ErrorCode> for SqliteErrc {
   fn eq(&self, other: &ErrorCode) -> bool {
      other == self
   }
}

impl PartialEq<SqliteErrc> for ErrorCondition {
   fn eq(&self, other: &SqliteErrc) -> bool {
      *self == ErrorCondition::from(*other)
   }
}

/// Category for engine result codes. Obtain it with [`sqlite3_category`].
#[derive(Debug)]
pub struct Sqlite3Category {
   _private: (),
}

static SQLITE3_CATEGORY: Sqlite3Category = Sqlite3Category { _private: () };

/// The singleton `sqlite3` category.
pub fn sqlite3_category() -> &'static Sqlite3Category {
   &SQLITE3_CATEGORY
}

impl ErrorCategory for Sqlite3Category {
   fn name(&self) -> &'static str {
      "sqlite3"
   }

   fn message(&self, code: i32) -> String {
      primary_message(code).unwrap_or(UNKNOWN_ERROR).to_string()
   }

   fn default_condition(&self, code: i32) -> ErrorCondition {
      ErrorCondition::new(code & PRIMARY_MASK, sqlite3_category())
   }
}

/// Engine message for `code`, keyed by its primary code.
///
/// Texts follow the engine's own `sqlite3_errstr` table so messages read the
/// same whether they come from here or from the linked library.
fn primary_message(code: i32) -> Option<&'static str> {
   match code {
      ABORT_ROLLBACK => return Some("abort due to ROLLBACK"),
      100 => return Some("another row available"),
      101 => return Some("no more rows available"),
      _ => {}
   }
   if code < 0 {
      return None;
   }
   let message = match code & PRIMARY_MASK {
      0 => "not an error",
      1 => "SQL logic error",
      2 => "internal logic error",
      3 => "access permission denied",
      4 => "query aborted",
      5 => "database is locked",
      6 => "database table is locked",
      7 => "out of memory",
      8 => "attempt to write a readonly database",
      9 => "interrupted",
      10 => "disk I/O error",
      11 => "database disk image is malformed",
      12 => "unknown operation",
      13 => "database or disk is full",
      14 => "unable to open database file",
      15 => "locking protocol",
      17 => "database schema has changed",
      18 => "string or blob too big",
      19 => "constraint failed",
      20 => "datatype mismatch",
      21 => "bad parameter or other API misuse",
      22 => "large file support is disabled",
      23 => "authorization denied",
      25 => "column index out of range",
      26 => "file is not a database",
      27 => "notification message",
      28 => "warning message",
      _ => return None,
   };
   Some(message)
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_category_name() {
      assert_eq!(sqlite3_category().name(), "sqlite3");
   }

   #[test]
   fn test_condition_from_enum() {
      let cond = ErrorCondition::from(SqliteErrc::GenericError);
      assert_eq!(cond.category().name(), "sqlite3");
      assert_eq!(cond.message(), "SQL logic error");
   }

   #[test]
   fn test_primary_code_matches_enum() {
      let ec = ErrorCode::new(1, sqlite3_category());
      assert_eq!(ec.value(), 1);
      assert_eq!(ec, SqliteErrc::GenericError);
   }

   #[test]
   fn test_extended_code_matches_primary_enum() {
      // SQLITE_ERROR_RETRY
      let ec = ErrorCode::new(1 | (2 << 8), sqlite3_category());
      assert_eq!(ec.value(), 513);
      assert_eq!(ec, SqliteErrc::GenericError);
      assert_eq!(ec.condition().value(), 1);

      // SQLITE_BUSY_SNAPSHOT
      let ec = ErrorCode::new(5 | (2 << 8), sqlite3_category());
      assert_eq!(ec, SqliteErrc::DatabaseBusy);
      assert_ne!(ec, SqliteErrc::OperationInProgress);
   }

   #[test]
   fn test_every_variant_has_a_message() {
      for errc in SqliteErrc::ALL {
         let message = ErrorCondition::from(errc).message();
         assert!(!message.is_empty(), "{errc:?} has an empty message");
         assert_ne!(message, UNKNOWN_ERROR, "{errc:?} fell back to the unknown message");
      }
   }

   #[test]
   fn test_unknown_codes_fall_back() {
      let category = sqlite3_category();
      assert_eq!(category.message(-1), UNKNOWN_ERROR);
      assert_eq!(category.message(16), UNKNOWN_ERROR);
      assert_eq!(category.message(0xfe), UNKNOWN_ERROR);
   }

   #[test]
   fn test_special_messages() {
      let category = sqlite3_category();
      assert_eq!(category.message(ABORT_ROLLBACK), "abort due to ROLLBACK");
      assert_eq!(category.message(100), "another row available");
      assert_eq!(category.message(101), "no more rows available");
      // SQLITE_CANTOPEN_ISDIR uses the primary text
      assert_eq!(category.message(14 | (2 << 8)), "unable to open database file");
   }
}
