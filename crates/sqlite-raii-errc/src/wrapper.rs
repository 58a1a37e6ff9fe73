//! The `sqlite-raii` category: misuse detected by the wrapper itself.

use crate::UNKNOWN_ERROR;
use crate::category::ErrorCategory;
use crate::code::{ErrorCode, ErrorCondition};

/// Errors raised by the wrapper before the engine is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum WrapperErrc {
   /// An operation needed a native handle that is null.
   InvalidHandle = 1,
   /// An argument cannot be handed to the engine (interior NUL byte, text
   /// longer than the engine's length type).
   InvalidArgument = 2,
}

impl WrapperErrc {
   /// Every variant, in declaration order.
   pub const ALL: [WrapperErrc; 2] = [WrapperErrc::InvalidHandle, WrapperErrc::InvalidArgument];

   fn from_code(code: i32) -> Option<Self> {
      match code {
         1 => Some(WrapperErrc::InvalidHandle),
         2 => Some(WrapperErrc::InvalidArgument),
         _ => None,
      }
   }
}

impl From<WrapperErrc> for ErrorCode {
   fn from(errc: WrapperErrc) -> Self {
      ErrorCode::new(errc as i32, wrapper_category())
   }
}

impl PartialEq<WrapperErrc> for ErrorCode {
   fn eq(&self, other: &WrapperErrc) -> bool {
      *self == ErrorCode::from(*other)
   }
}

impl PartialEq<ErrorCode> for WrapperErrc {
   fn eq(&self, other: &ErrorCode) -> bool {
      other == self
   }
}

/// Category for wrapper misuse. Obtain it with [`wrapper_category`].
#[derive(Debug)]
pub struct WrapperCategory {
   _private: (),
}

static WRAPPER_CATEGORY: WrapperCategory = WrapperCategory { _private: () };

/// The singleton `sqlite-raii` category.
pub fn wrapper_category() -> &'static WrapperCategory {
   &WRAPPER_CATEGORY
}

impl ErrorCategory for WrapperCategory {
   fn name(&self) -> &'static str {
      "sqlite-raii"
   }

   fn message(&self, code: i32) -> String {
      match WrapperErrc::from_code(code) {
         Some(WrapperErrc::InvalidHandle) => "Invalid handle",
         Some(WrapperErrc::InvalidArgument) => "Invalid argument",
         None => UNKNOWN_ERROR,
      }
      .to_string()
   }

   fn default_condition(&self, code: i32) -> ErrorCondition {
      ErrorCondition::new(code, wrapper_category())
   }
}
