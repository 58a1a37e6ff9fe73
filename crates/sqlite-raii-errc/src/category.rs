//! Error categories: named domains that give meaning to integer codes.

use crate::code::ErrorCondition;

/// A named error domain.
///
/// Categories are process-wide singletons. Two codes belong to the same domain
/// when their categories report the same [`name`](ErrorCategory::name).
pub trait ErrorCategory: Sync + 'static {
   /// Stable name of the domain.
   fn name(&self) -> &'static str;

   /// Human-readable message for `code`. Unknown codes map to
   /// [`UNKNOWN_ERROR`](crate::UNKNOWN_ERROR).
   fn message(&self, code: i32) -> String;

   /// Coarse condition that `code` reduces to when compared against a
   /// condition enum.
   fn default_condition(&self, code: i32) -> ErrorCondition;
}

/// Returns `true` when both categories denote the same domain.
pub fn same_category(a: &dyn ErrorCategory, b: &dyn ErrorCategory) -> bool {
   a.name() == b.name()
}
