//! Exclusive owner of a native connection handle.

use std::ffi::{CStr, c_char};
use std::ptr;

use sqlite_raii_errc::ErrorCode;
use tracing::{debug, trace};

use crate::ffi::{self, Api, RawConnection, SQLITE_OK, Sqlite3};
use crate::options::OpenOptions;

/// Owns at most one native connection and releases it exactly once.
///
/// States: empty (null handle), open, and "close failed" (handle retained,
/// still open). A failed open may also leave a non-null handle that carries
/// the engine's error state; it is kept so that [`close`] can release it.
///
/// Dropping the owner closes the handle. A failure at that point is
/// discarded, and if the engine refuses to release the handle (for example
/// while statements are still outstanding) it stays allocated on the native
/// side.
///
/// [`close`]: ConnectionHandle::close
#[derive(Debug)]
pub struct ConnectionHandle<A: Api = Sqlite3> {
   api: A,
   db: RawConnection,
   open: bool,
}

impl<A: Api + Default> Default for ConnectionHandle<A> {
   fn default() -> Self {
      Self::new(A::default())
   }
}

impl<A: Api> ConnectionHandle<A> {
   /// Empty owner calling the engine through `api`.
   pub fn new(api: A) -> Self {
      Self {
         api,
         db: ptr::null_mut(),
         open: false,
      }
   }

   /// Opens a new connection.
   ///
   /// Meant for an empty owner: a handle already held is overwritten, not
   /// closed. Use [`open`](Self::open) to reopen.
   ///
   /// Whatever handle the engine writes is stored, even when the open fails.
   pub fn construct(&mut self, options: &OpenOptions, ec: &mut ErrorCode) {
      let native = match options.validate() {
         Ok(native) => native,
         Err(err) => {
            debug!(filename = %options.filename, "Rejected open arguments");
            *ec = err;
            return;
         }
      };
      let vfs = native.vfs.as_deref().map_or(ptr::null(), CStr::as_ptr);

      let mut db: RawConnection = ptr::null_mut();
      // SAFETY: both strings are NUL-terminated and outlive the call; `db` is
      // a local slot.
      let rc = unsafe { self.api.open_v2(native.filename.as_ptr(), &mut db, native.flags, vfs) };
      debug!(filename = %options.filename, flags = native.flags, rc, ?db, "open_v2");

      self.db = db;
      self.open = rc == SQLITE_OK;
      ffi::report(ec, rc);
   }

   /// Opens unless already open.
   ///
   /// Returns `true` when a new connection was opened. An already open owner
   /// is left untouched and reports `false` with a clear code. Otherwise any
   /// retained handle is closed first, ignoring that close's result, and
   /// [`construct`](Self::construct) runs.
   pub fn open(&mut self, options: &OpenOptions, ec: &mut ErrorCode) -> bool {
      if self.open {
         trace!(db = ?self.db, "Connection already open");
         ec.clear();
         return false;
      }
      let mut ignored = ErrorCode::default();
      self.close(&mut ignored);
      self.construct(options, ec);
      self.open
   }

   /// Closes the handle.
   ///
   /// On failure the handle and open flag are kept so the close can be
   /// retried. An empty owner succeeds without calling the engine.
   pub fn close(&mut self, ec: &mut ErrorCode) {
      ec.clear();
      if self.db.is_null() {
         trace!("Close on empty connection");
         return;
      }
      // SAFETY: `db` came from `open_v2` on this api and has not been closed.
      let rc = unsafe { self.api.close_v2(self.db) };
      debug!(db = ?self.db, rc, "close_v2");
      if rc == SQLITE_OK {
         self.db = ptr::null_mut();
         self.open = false;
      } else {
         ffi::report(ec, rc);
      }
   }

   /// `true` after a successful open and until a successful close.
   pub fn is_open(&self) -> bool {
      self.open
   }

   /// The owned native handle, possibly null.
   pub fn conn_handle(&self) -> RawConnection {
      self.db
   }

   /// The engine this owner calls.
   pub fn api(&self) -> &A {
      &self.api
   }

   /// File name of database `db_name` (`c"main"` for the primary database).
   ///
   /// `None` when the owner is not open, the database does not exist, or it
   /// is temporary or in-memory (the engine reports an empty name then).
   pub fn filename(&self, db_name: &CStr) -> Option<String> {
      if !self.open {
         return None;
      }
      // SAFETY: `db` is open and `db_name` is NUL-terminated.
      let name: *const c_char = unsafe { self.api.db_filename(self.db, db_name.as_ptr()) };
      if name.is_null() {
         return None;
      }
      // SAFETY: non-null results are NUL-terminated and live until close.
      let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
      (!name.is_empty()).then(|| name.into_owned())
   }

   /// Exchanges handles and open flags with `other`.
   pub fn swap(&mut self, other: &mut Self) {
      std::mem::swap(self, other);
   }

   /// Moves the handle out into a new owner, leaving `self` empty.
   pub fn take(&mut self) -> Self
   where
      A: Clone,
   {
      let empty = Self::new(self.api.clone());
      std::mem::replace(self, empty)
   }
}

impl<A: Api> Drop for ConnectionHandle<A> {
   fn drop(&mut self) {
      let mut ec = ErrorCode::default();
      self.close(&mut ec);
   }
}

#[cfg(test)]
mod tests {
   use sqlite_raii_errc::{SqliteErrc, WrapperErrc};

   use super::*;
   use crate::ffi::{OPEN_CREATE, OPEN_EXRESCODE, OPEN_READONLY, OPEN_READWRITE};
   use crate::options::OpenMode;
   use crate::testing::{Call, MockApi, fake_conn};

   const SQLITE_BUSY: i32 = 5;
   const SQLITE_CANTOPEN: i32 = 14;
   const SQLITE_CANTOPEN_ISDIR: i32 = SQLITE_CANTOPEN | (2 << 8);

   fn open_call(filename: &str, flags: i32, vfs: Option<&str>) -> Call {
      Call::Open {
         filename: filename.to_owned(),
         flags,
         vfs: vfs.map(str::to_owned),
      }
   }

   #[test]
   fn test_construct_and_drop() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_OK);

      let mut ec = ErrorCode::default();
      {
         let mut conn = ConnectionHandle::new(api.clone());
         conn.construct(&OpenOptions::new("test.db"), &mut ec);
         assert!(ec.is_ok());
         assert!(conn.is_open());
         assert_eq!(conn.conn_handle(), fake_conn(1));
      }

      assert_eq!(
         api.calls(),
         vec![
            open_call("test.db", OPEN_READWRITE | OPEN_CREATE | OPEN_EXRESCODE, None),
            Call::Close(1),
         ]
      );
   }

   #[test]
   fn test_flags_and_vfs_forwarded() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_OK).expect_open(2, SQLITE_OK);

      let mut ec = ErrorCode::default();
      let mut first = ConnectionHandle::new(api.clone());
      first.construct(&OpenOptions::from(("a.db", OpenMode::ReadOnly)), &mut ec);
      let mut second = ConnectionHandle::new(api.clone());
      second.construct(&OpenOptions::from(("b.db", OPEN_READWRITE, "unix-dotfile")), &mut ec);

      assert_eq!(
         api.take_calls(),
         vec![
            open_call("a.db", OPEN_READONLY | OPEN_EXRESCODE, None),
            open_call("b.db", OPEN_READWRITE | OPEN_EXRESCODE, Some("unix-dotfile")),
         ]
      );
   }

   #[test]
   fn test_failed_open_keeps_handle_for_close() {
      let api = MockApi::new();
      api.expect_open(7, SQLITE_CANTOPEN_ISDIR);

      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());
      conn.construct(&OpenOptions::new("/"), &mut ec);

      assert_eq!(ec, SqliteErrc::DatabaseOpenFailed);
      assert_eq!(ec.value(), SQLITE_CANTOPEN_ISDIR);
      assert!(!conn.is_open());
      assert_eq!(conn.conn_handle(), fake_conn(7));

      conn.close(&mut ec);
      assert!(ec.is_ok());
      assert!(conn.conn_handle().is_null());
      assert_eq!(api.calls().last(), Some(&Call::Close(7)));
   }

   #[test]
   fn test_open_when_open_is_noop() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_OK);

      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());
      assert!(conn.open(&OpenOptions::new("test.db"), &mut ec));
      assert!(ec.is_ok());

      ec.assign(SQLITE_BUSY, sqlite_raii_errc::sqlite3_category());
      assert!(!conn.open(&OpenOptions::new("other.db"), &mut ec));
      assert!(ec.is_ok());
      assert_eq!(conn.conn_handle(), fake_conn(1));
      assert_eq!(api.calls().len(), 1);
   }

   #[test]
   fn test_open_after_failed_open_closes_first() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_CANTOPEN).expect_open(2, SQLITE_OK);

      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());
      assert!(!conn.open(&OpenOptions::new("missing.db"), &mut ec));
      assert_eq!(ec, SqliteErrc::DatabaseOpenFailed);

      assert!(conn.open(&OpenOptions::new("test.db"), &mut ec));
      assert!(ec.is_ok());
      assert_eq!(conn.conn_handle(), fake_conn(2));

      let calls = api.take_calls();
      assert_eq!(calls[1], Call::Close(1));
      assert_eq!(calls.len(), 3);
   }

   #[test]
   fn test_close_busy_keeps_handle_and_retries() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_OK).expect_close(SQLITE_BUSY).expect_close(SQLITE_OK);

      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());
      conn.construct(&OpenOptions::new("test.db"), &mut ec);

      conn.close(&mut ec);
      assert_eq!(ec, SqliteErrc::DatabaseBusy);
      assert!(conn.is_open());
      assert_eq!(conn.conn_handle(), fake_conn(1));

      conn.close(&mut ec);
      assert!(ec.is_ok());
      assert!(!conn.is_open());
      assert!(conn.conn_handle().is_null());

      drop(conn);
      assert!(api.is_drained());
      assert_eq!(api.calls().len(), 3);
   }

   #[test]
   fn test_drop_swallows_close_failure() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_OK).expect_close(SQLITE_BUSY);

      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());
      conn.construct(&OpenOptions::new("test.db"), &mut ec);
      drop(conn);

      assert!(api.is_drained());
      assert_eq!(api.calls().last(), Some(&Call::Close(1)));
   }

   #[test]
   fn test_close_empty_skips_engine() {
      let api = MockApi::new();
      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());
      conn.close(&mut ec);
      assert!(ec.is_ok());
      drop(conn);
      assert!(api.calls().is_empty());
   }

   #[test]
   fn test_invalid_filename_skips_engine() {
      let api = MockApi::new();
      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::new(api.clone());

      assert!(!conn.open(&OpenOptions::new("nul\0.db"), &mut ec));
      assert_eq!(ec, WrapperErrc::InvalidArgument);
      assert!(api.calls().is_empty());
   }

   #[test]
   fn test_take_leaves_source_empty() {
      let api = MockApi::new();
      api.expect_open(1, SQLITE_OK);

      let mut ec = ErrorCode::default();
      let mut source = ConnectionHandle::new(api.clone());
      source.construct(&OpenOptions::new("test.db"), &mut ec);

      let target = source.take();
      assert!(source.conn_handle().is_null());
      assert!(!source.is_open());
      assert_eq!(target.conn_handle(), fake_conn(1));
      assert!(target.is_open());

      drop(source);
      assert_eq!(api.calls().len(), 1);
      drop(target);
      assert_eq!(api.calls().last(), Some(&Call::Close(1)));
   }

   #[test]
   fn test_linked_engine_round_trip() {
      let mut ec = ErrorCode::default();
      let mut conn = ConnectionHandle::<Sqlite3>::default();
      assert!(conn.open(&OpenOptions::new(":memory:"), &mut ec));
      assert!(ec.is_ok());
      assert!(!conn.conn_handle().is_null());
      assert_eq!(conn.filename(c"main"), None);

      conn.close(&mut ec);
      assert!(ec.is_ok());
      assert!(conn.conn_handle().is_null());
      assert!(!conn.is_open());
   }
}
