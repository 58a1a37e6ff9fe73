//! Category-tagged error codes and conditions.

use std::fmt;

use crate::category::{ErrorCategory, same_category};
use crate::sqlite::sqlite3_category;

/// A fine-grained error value: an integer tagged with its category.
///
/// A value of `0` means "no error" in every category. The default code is
/// clear, so an `ErrorCode` can be used directly as an output sink:
///
/// ```
/// use sqlite_raii_errc::{ErrorCode, WrapperErrc};
///
/// let mut ec = ErrorCode::default();
/// assert!(!ec.is_err());
///
/// ec = WrapperErrc::InvalidHandle.into();
/// assert_eq!(ec, WrapperErrc::InvalidHandle);
/// assert_eq!(ec.message(), "Invalid handle");
///
/// ec.clear();
/// assert!(ec.is_ok());
/// ```
#[derive(Clone, Copy)]
pub struct ErrorCode {
   value: i32,
   category: &'static dyn ErrorCategory,
}

impl ErrorCode {
   /// Creates a code with `value` in `category`.
   pub fn new(value: i32, category: &'static dyn ErrorCategory) -> Self {
      Self { value, category }
   }

   /// Raw integer value.
   pub fn value(&self) -> i32 {
      self.value
   }

   /// Category the value belongs to.
   pub fn category(&self) -> &'static dyn ErrorCategory {
      self.category
   }

   /// Human-readable message from the category.
   pub fn message(&self) -> String {
      self.category.message(self.value)
   }

   /// Coarse condition this code reduces to.
   pub fn condition(&self) -> ErrorCondition {
      self.category.default_condition(self.value)
   }

   /// `true` when the code reports a failure.
   pub fn is_err(&self) -> bool {
      self.value != 0
   }

   /// `true` when the code is clear.
   pub fn is_ok(&self) -> bool {
      self.value == 0
   }

   /// Replaces value and category.
   pub fn assign(&mut self, value: i32, category: &'static dyn ErrorCategory) {
      self.value = value;
      self.category = category;
   }

   /// Resets to the clear state.
   pub fn clear(&mut self) {
      *self = Self::default();
   }
}

impl Default for ErrorCode {
   fn default() -> Self {
      Self::new(0, sqlite3_category())
   }
}

impl PartialEq for ErrorCode {
   fn eq(&self, other: &Self) -> bool {
      self.value == other.value && same_category(self.category, other.category)
   }
}

impl Eq for ErrorCode {}

impl PartialEq<ErrorCondition> for ErrorCode {
   fn eq(&self, other: &ErrorCondition) -> bool {
      self.condition() == *other
   }
}

impl fmt::Debug for ErrorCode {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("ErrorCode")
         .field("category", &self.category.name())
         .field("value", &self.value)
         .finish()
   }
}

impl fmt::Display for ErrorCode {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}: {}", self.category.name(), self.message())
   }
}

/// A coarse error value used for comparisons that ignore extended detail.
#[derive(Clone, Copy)]
pub struct ErrorCondition {
   value: i32,
   category: &'static dyn ErrorCategory,
}

impl ErrorCondition {
   /// Creates a condition with `value` in `category`.
   pub fn new(value: i32, category: &'static dyn ErrorCategory) -> Self {
      Self { value, category }
   }

   /// Raw integer value.
   pub fn value(&self) -> i32 {
      self.value
   }

   /// Category the value belongs to.
   pub fn category(&self) -> &'static dyn ErrorCategory {
      self.category
   }

   /// Human-readable message from the category.
   pub fn message(&self) -> String {
      self.category.message(self.value)
   }
}

impl PartialEq for ErrorCondition {
   fn eq(&self, other: &Self) -> bool {
      self.value == other.value && same_category(self.category, other.category)
   }
}

impl Eq for ErrorCondition {}

impl PartialEq<ErrorCode> for ErrorCondition {
   fn eq(&self, other: &ErrorCode) -> bool {
      other == self
   }
}

impl fmt::Debug for ErrorCondition {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("ErrorCondition")
         .field("category", &self.category.name())
         .field("value", &self.value)
         .finish()
   }
}

impl fmt::Display for ErrorCondition {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}: {}", self.category.name(), self.message())
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::{SqliteErrc, WrapperErrc, wrapper_category};

   #[test]
   fn test_default_is_clear() {
      let ec = ErrorCode::default();
      assert!(ec.is_ok());
      assert!(!ec.is_err());
      assert_eq!(ec.value(), 0);
      assert_eq!(ec.category().name(), "sqlite3");
   }

   #[test]
   fn test_assign_and_clear() {
      let mut ec = ErrorCode::default();
      ec.assign(5, sqlite3_category());
      assert!(ec.is_err());
      assert_eq!(ec, SqliteErrc::DatabaseBusy);

      ec.clear();
      assert_eq!(ec, ErrorCode::default());
   }

   #[test]
   fn test_same_value_different_category_is_not_equal() {
      let engine = ErrorCode::new(1, sqlite3_category());
      let wrapper = ErrorCode::new(1, wrapper_category());
      assert_ne!(engine, wrapper);
      assert_ne!(wrapper, SqliteErrc::GenericError);
      assert_ne!(engine, WrapperErrc::InvalidHandle);
   }

   #[test]
   fn test_code_compares_with_condition() {
      // SQLITE_IOERR_READ
      let ec = ErrorCode::new(10 | (1 << 8), sqlite3_category());
      let cond = ErrorCondition::from(SqliteErrc::IoError);
      assert_eq!(ec, cond);
      assert_eq!(cond, ec);
      assert_ne!(ec, ErrorCode::new(10, sqlite3_category()));
   }

   #[test]
   fn test_display_and_debug() {
      let ec = ErrorCode::from(WrapperErrc::InvalidArgument);
      assert_eq!(ec.to_string(), "sqlite-raii: Invalid argument");
      let debug = format!("{ec:?}");
      assert!(debug.contains("sqlite-raii"));
      assert!(debug.contains('2'));
   }
}
