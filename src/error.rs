use serde::{Serialize, Serializer};
use sqlite_raii_errc::{
   ErrorCategory, ErrorCode, ErrorCondition, SqliteErrc, WrapperErrc, same_category, sqlite3_category,
};
use sqlite_raii_handle::Api;
use tracing::debug;

/// Result type alias for raising operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structured error payload for serialized reports.
#[derive(Serialize)]
struct ErrorResponse<'a> {
   category: &'static str,
   code: i32,
   message: &'a str,
}

/// The single error raised by every `Result`-returning operation.
///
/// Callers tell failures apart by comparing against the taxonomy, not by
/// matching on variants:
///
/// ```
/// use sqlite_raii::{Connection, OpenMode, SqliteErrc};
///
/// let err = Connection::new(("/no/such/dir/app.db", OpenMode::ReadOnly)).unwrap_err();
/// assert_eq!(err, SqliteErrc::DatabaseOpenFailed);
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{}: {}", .code.category().name(), .message)]
pub struct Error {
   code: ErrorCode,
   message: String,
}

impl Error {
   /// Error for a non-clear `code`, with the message the engine behind `api`
   /// gives for engine codes.
   pub fn from_code<A: Api>(api: &A, code: ErrorCode) -> Self {
      let message = if same_category(code.category(), sqlite3_category()) {
         api.errstr(code.value())
      } else {
         code.message()
      };
      Self { code, message }
   }

   /// The exact code that was reported.
   pub fn code(&self) -> ErrorCode {
      self.code
   }

   /// The code's coarse condition.
   pub fn condition(&self) -> ErrorCondition {
      self.code.condition()
   }

   pub fn message(&self) -> &str {
      &self.message
   }
}

impl From<Error> for ErrorCode {
   fn from(err: Error) -> Self {
      err.code
   }
}

impl From<WrapperErrc> for Error {
   fn from(errc: WrapperErrc) -> Self {
      let code = ErrorCode::from(errc);
      Self {
         code,
         message: code.message(),
      }
   }
}

impl PartialEq<ErrorCode> for Error {
   fn eq(&self, other: &ErrorCode) -> bool {
      self.code == *other
   }
}

impl PartialEq<SqliteErrc> for Error {
   fn eq(&self, other: &SqliteErrc) -> bool {
      self.code == *other
   }
}

impl PartialEq<WrapperErrc> for Error {
   fn eq(&self, other: &WrapperErrc) -> bool {
      self.code == *other
   }
}

impl Serialize for Error {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: Serializer,
   {
      ErrorResponse {
         category: self.code.category().name(),
         code: self.code.value(),
         message: &self.message,
      }
      .serialize(serializer)
   }
}

/// The rule that derives every raising operation from its `_ec` twin: run
/// the operation against a fresh sink and turn a non-clear result into
/// [`Error`].
pub(crate) trait Raise {
   type Api: Api;

   fn api(&self) -> &Self::Api;

   fn raise<T>(&mut self, op: impl FnOnce(&mut Self, &mut ErrorCode) -> T) -> Result<T> {
      let mut ec = ErrorCode::default();
      let value = op(self, &mut ec);
      if ec.is_err() {
         debug!(category = ec.category().name(), code = ec.value(), "Raising error");
         return Err(Error::from_code(self.api(), ec));
      }
      Ok(value)
   }
}
