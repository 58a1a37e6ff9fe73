//! SQL text arguments for prepare.
//!
//! The engine takes a pointer plus a byte count, where a negative count means
//! "read up to the NUL terminator". [`Sql`] carries both and picks the count
//! from the shape of the argument.

use std::ffi::{CStr, CString, c_char, c_int};
use std::marker::PhantomData;

use sqlite_raii_errc::{ErrorCode, WrapperErrc};

/// Borrowed SQL text with its engine byte count.
///
/// | argument | byte count |
/// |----------|------------|
/// | `&CStr` | `-1` (NUL terminated) |
/// | `&CString` | length including the terminator |
/// | `&[u8; N]` | `N` |
/// | `&str`, `&String`, `&[u8]` | exact length |
#[derive(Debug, Clone, Copy)]
pub struct Sql<'a> {
   ptr: *const c_char,
   n_byte: Option<c_int>,
   len: usize,
   _text: PhantomData<&'a [u8]>,
}

impl<'a> Sql<'a> {
   fn counted(bytes: &'a [u8]) -> Self {
      Self {
         ptr: bytes.as_ptr().cast(),
         n_byte: c_int::try_from(bytes.len()).ok(),
         len: bytes.len(),
         _text: PhantomData,
      }
   }

   /// Text read up to the first NUL byte.
   pub fn nul_terminated(text: &'a CStr) -> Self {
      Self {
         ptr: text.as_ptr(),
         n_byte: Some(-1),
         len: text.to_bytes_with_nul().len(),
         _text: PhantomData,
      }
   }

   /// Pointer to the first byte.
   pub fn as_ptr(&self) -> *const c_char {
      self.ptr
   }

   /// Byte count for the engine.
   ///
   /// Fails with [`WrapperErrc::InvalidArgument`] when the text is longer
   /// than a C `int` can describe.
   pub fn n_byte(&self) -> Result<c_int, ErrorCode> {
      self.n_byte.ok_or_else(|| WrapperErrc::InvalidArgument.into())
   }

   /// Bytes addressed by this argument, terminator included for C strings.
   pub fn len(&self) -> usize {
      self.len
   }

   pub fn is_empty(&self) -> bool {
      self.len == 0
   }

   /// Offset of `tail` from the start of the text, when it points inside
   /// (or one past the end of) it.
   pub(crate) fn offset_of(&self, tail: *const c_char) -> Option<usize> {
      if tail.is_null() {
         return None;
      }
      let offset = (tail as usize).checked_sub(self.ptr as usize)?;
      (offset <= self.len).then_some(offset)
   }
}

impl<'a> From<&'a CStr> for Sql<'a> {
   fn from(text: &'a CStr) -> Self {
      Sql::nul_terminated(text)
   }
}

impl<'a> From<&'a CString> for Sql<'a> {
   fn from(text: &'a CString) -> Self {
      Sql::counted(text.as_bytes_with_nul())
   }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Sql<'a> {
   fn from(text: &'a [u8; N]) -> Self {
      Sql::counted(text.as_slice())
   }
}

impl<'a> From<&'a [u8]> for Sql<'a> {
   fn from(text: &'a [u8]) -> Self {
      Sql::counted(text)
   }
}

impl<'a> From<&'a str> for Sql<'a> {
   fn from(text: &'a str) -> Self {
      Sql::counted(text.as_bytes())
   }
}

impl<'a> From<&'a String> for Sql<'a> {
   fn from(text: &'a String) -> Self {
      Sql::counted(text.as_bytes())
   }
}
