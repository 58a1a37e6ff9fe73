//! The native engine boundary.
//!
//! [`Api`] mirrors the handful of C entry points the owners need. The default
//! implementation, [`Sqlite3`], calls the engine linked through
//! `libsqlite3-sys`. Other implementations route the same calls elsewhere:
//! through a host-provided routine table ([`ExtensionApi`]) or through a
//! scripted engine in tests.
//!
//! [`ExtensionApi`]: crate::extension::ExtensionApi

use std::ffi::{CStr, c_char, c_int, c_uint};
use std::ptr;

use libsqlite3_sys as sys;
use sqlite_raii_errc::{ErrorCategory, ErrorCode, sqlite3_category};

pub use libsqlite3_sys::{sqlite3, sqlite3_stmt};

/// Native connection handle.
pub type RawConnection = *mut sqlite3;

/// Native prepared-statement handle.
pub type RawStatement = *mut sqlite3_stmt;

// The bundled bindings of libsqlite3-sys leave out the deferred close even
// though the amalgamation exports it.
unsafe extern "C" {
   pub(crate) fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;
}

/// `SQLITE_OK`
pub const SQLITE_OK: c_int = 0;
/// `SQLITE_MISUSE`
pub const SQLITE_MISUSE: c_int = 21;

/// `SQLITE_OPEN_READONLY`
pub const OPEN_READONLY: c_int = 0x0000_0001;
/// `SQLITE_OPEN_READWRITE`
pub const OPEN_READWRITE: c_int = 0x0000_0002;
/// `SQLITE_OPEN_CREATE`
pub const OPEN_CREATE: c_int = 0x0000_0004;
/// `SQLITE_OPEN_URI`
pub const OPEN_URI: c_int = 0x0000_0040;
/// `SQLITE_OPEN_MEMORY`
pub const OPEN_MEMORY: c_int = 0x0000_0080;
/// `SQLITE_OPEN_EXRESCODE`, forced on for every open so the engine reports
/// extended result codes.
pub const OPEN_EXRESCODE: c_int = 0x0200_0000;

/// Narrow surface of the native engine used by the handle owners.
///
/// Methods take and return raw pointers exactly like the C functions they
/// mirror. Implementations must not unwind out of `close_v2` or `finalize`
/// since owners call them from `Drop`.
pub trait Api {
   /// `sqlite3_open_v2`
   ///
   /// # Safety
   ///
   /// `filename` must be a valid C string, `vfs` null or a valid C string,
   /// and `db` valid for a single pointer write.
   unsafe fn open_v2(
      &self,
      filename: *const c_char,
      db: *mut RawConnection,
      flags: c_int,
      vfs: *const c_char,
   ) -> c_int;

   /// `sqlite3_close_v2`
   ///
   /// # Safety
   ///
   /// `db` must be null or a handle produced by `open_v2` on the same engine
   /// and not yet closed successfully.
   unsafe fn close_v2(&self, db: RawConnection) -> c_int;

   /// `sqlite3_prepare_v3`
   ///
   /// # Safety
   ///
   /// `db` must be an open handle. `sql` must be readable for `n_byte` bytes,
   /// or up to its NUL terminator when `n_byte` is negative. `stmt` and `tail`
   /// must be valid for a single pointer write.
   unsafe fn prepare_v3(
      &self,
      db: RawConnection,
      sql: *const c_char,
      n_byte: c_int,
      prep_flags: c_uint,
      stmt: *mut RawStatement,
      tail: *mut *const c_char,
   ) -> c_int;

   /// `sqlite3_finalize`
   ///
   /// # Safety
   ///
   /// `stmt` must be null or a handle produced by `prepare_v3` and not yet
   /// finalized.
   unsafe fn finalize(&self, stmt: RawStatement) -> c_int;

   /// `sqlite3_errstr`: English text for a result code.
   fn errstr(&self, rc: c_int) -> String;

   /// `sqlite3_db_filename`. Engines without file names return null.
   ///
   /// # Safety
   ///
   /// `db` must be an open handle and `name` a valid C string.
   unsafe fn db_filename(&self, db: RawConnection, name: *const c_char) -> *const c_char {
      let _ = (db, name);
      ptr::null()
   }
}

/// The engine linked into this binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqlite3;

impl Api for Sqlite3 {
   unsafe fn open_v2(
      &self,
      filename: *const c_char,
      db: *mut RawConnection,
      flags: c_int,
      vfs: *const c_char,
   ) -> c_int {
      // SAFETY: forwarded caller contract.
      unsafe { sys::sqlite3_open_v2(filename, db, flags, vfs) }
   }

   unsafe fn close_v2(&self, db: RawConnection) -> c_int {
      // SAFETY: forwarded caller contract.
      unsafe { sqlite3_close_v2(db) }
   }

   unsafe fn prepare_v3(
      &self,
      db: RawConnection,
      sql: *const c_char,
      n_byte: c_int,
      prep_flags: c_uint,
      stmt: *mut RawStatement,
      tail: *mut *const c_char,
   ) -> c_int {
      // SAFETY: forwarded caller contract.
      unsafe { sys::sqlite3_prepare_v3(db, sql, n_byte, prep_flags, stmt, tail) }
   }

   unsafe fn finalize(&self, stmt: RawStatement) -> c_int {
      // SAFETY: forwarded caller contract.
      unsafe { sys::sqlite3_finalize(stmt) }
   }

   fn errstr(&self, rc: c_int) -> String {
      // SAFETY: sqlite3_errstr accepts any integer and returns a static string.
      let text = unsafe { sys::sqlite3_errstr(rc) };
      if text.is_null() {
         return sqlite3_category().message(rc);
      }
      // SAFETY: non-null pointers from sqlite3_errstr are NUL-terminated statics.
      unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
   }

   unsafe fn db_filename(&self, db: RawConnection, name: *const c_char) -> *const c_char {
      // SAFETY: forwarded caller contract.
      unsafe { sys::sqlite3_db_filename(db, name) }
   }
}

/// Stores an engine result code in `ec`, clearing it for `SQLITE_OK`.
pub(crate) fn report(ec: &mut ErrorCode, rc: c_int) {
   if rc == SQLITE_OK {
      ec.clear();
   } else {
      ec.assign(rc, sqlite3_category());
   }
}

/// Version string of the linked engine, e.g. `"3.46.0"`.
pub fn libversion() -> &'static str {
   // SAFETY: sqlite3_libversion returns a pointer to a static C string.
   unsafe { CStr::from_ptr(sys::sqlite3_libversion()) }
      .to_str()
      .unwrap_or_default()
}
