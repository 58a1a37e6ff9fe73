//! Process-wide routine table for builds loaded as an engine extension.
//!
//! A loadable extension does not link the engine; the host hands it a table
//! of function pointers at load time. [`init`] installs such a table,
//! [`shutdown`] removes it, and [`ExtensionApi`] routes every owner call
//! through whatever table is installed at call time. This is the only global
//! mutable state in the workspace; nothing else reads it.
//!
//! Without an installed table every call reports `SQLITE_MISUSE` and writes
//! null handles.

use std::ffi::{CStr, c_char, c_int, c_uint};
use std::ptr;

use libsqlite3_sys as sys;
use parking_lot::RwLock;
use sqlite_raii_errc::{ErrorCategory, sqlite3_category};
use tracing::debug;

use crate::ffi::{Api, RawConnection, RawStatement, SQLITE_MISUSE};

/// Function pointers for the entry points [`Api`] needs.
#[derive(Debug, Clone, Copy)]
pub struct Routines {
   pub open_v2: unsafe extern "C" fn(*const c_char, *mut RawConnection, c_int, *const c_char) -> c_int,
   pub close_v2: unsafe extern "C" fn(RawConnection) -> c_int,
   pub prepare_v3: unsafe extern "C" fn(
      RawConnection,
      *const c_char,
      c_int,
      c_uint,
      *mut RawStatement,
      *mut *const c_char,
   ) -> c_int,
   pub finalize: unsafe extern "C" fn(RawStatement) -> c_int,
   pub errstr: unsafe extern "C" fn(c_int) -> *const c_char,
   pub db_filename: unsafe extern "C" fn(RawConnection, *const c_char) -> *const c_char,
}

impl Routines {
   /// Table pointing at the engine linked into this binary.
   pub fn linked() -> Self {
      Self {
         open_v2: sys::sqlite3_open_v2,
         close_v2: crate::ffi::sqlite3_close_v2,
         prepare_v3: sys::sqlite3_prepare_v3,
         finalize: sys::sqlite3_finalize,
         errstr: sys::sqlite3_errstr,
         db_filename: sys::sqlite3_db_filename,
      }
   }
}

static ROUTINES: RwLock<Option<Routines>> = RwLock::new(None);

/// Installs `routines` for all [`ExtensionApi`] calls, returning the table it
/// replaces.
pub fn init(routines: Routines) -> Option<Routines> {
   debug!("Installing extension routine table");
   ROUTINES.write().replace(routines)
}

/// Removes the installed table, returning it.
///
/// Owners created through [`ExtensionApi`] that still hold handles will
/// report `SQLITE_MISUSE` when they try to release them afterwards, so tear
/// down after they are gone.
pub fn shutdown() -> Option<Routines> {
   debug!("Removing extension routine table");
   ROUTINES.write().take()
}

/// `true` while a routine table is installed.
pub fn is_initialized() -> bool {
   ROUTINES.read().is_some()
}

fn installed() -> Option<Routines> {
   *ROUTINES.read()
}

/// [`Api`] that dispatches through the table installed by [`init`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtensionApi;

impl Api for ExtensionApi {
   unsafe fn open_v2(
      &self,
      filename: *const c_char,
      db: *mut RawConnection,
      flags: c_int,
      vfs: *const c_char,
   ) -> c_int {
      match installed() {
         // SAFETY: forwarded caller contract.
         Some(routines) => unsafe { (routines.open_v2)(filename, db, flags, vfs) },
         None => {
            // SAFETY: caller guarantees `db` is writable.
            unsafe { db.write(ptr::null_mut()) };
            SQLITE_MISUSE
         }
      }
   }

   unsafe fn close_v2(&self, db: RawConnection) -> c_int {
      match installed() {
         // SAFETY: forwarded caller contract.
         Some(routines) => unsafe { (routines.close_v2)(db) },
         None => SQLITE_MISUSE,
      }
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
      match installed() {
         // SAFETY: forwarded caller contract.
         Some(routines) => unsafe { (routines.prepare_v3)(db, sql, n_byte, prep_flags, stmt, tail) },
         None => {
            // SAFETY: caller guarantees `stmt` and `tail` are writable.
            unsafe {
               stmt.write(ptr::null_mut());
               tail.write(ptr::null());
            }
            SQLITE_MISUSE
         }
      }
   }

   unsafe fn finalize(&self, stmt: RawStatement) -> c_int {
      match installed() {
         // SAFETY: forwarded caller contract.
         Some(routines) => unsafe { (routines.finalize)(stmt) },
         None => SQLITE_MISUSE,
      }
   }

   fn errstr(&self, rc: c_int) -> String {
      let text = match installed() {
         // SAFETY: errstr accepts any integer.
         Some(routines) => unsafe { (routines.errstr)(rc) },
         None => ptr::null(),
      };
      if text.is_null() {
         return sqlite3_category().message(rc);
      }
      // SAFETY: non-null errstr results are NUL-terminated statics.
      unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
   }

   unsafe fn db_filename(&self, db: RawConnection, name: *const c_char) -> *const c_char {
      match installed() {
         // SAFETY: forwarded caller contract.
         Some(routines) => unsafe { (routines.db_filename)(db, name) },
         None => ptr::null(),
      }
   }
}
