//! Scripted in-process engine for exercising the owners without a database.
//!
//! [`MockApi`] hands out fake handles and result codes in the order they were
//! scripted, and records every call so tests can assert the exact native
//! sequence an operation produced. Clones share one script and one log, so a
//! test keeps a clone while the owner under test holds another.
//!
//! ```
//! use sqlite_raii_handle::testing::{Call, MockApi, fake_conn};
//! use sqlite_raii_handle::{ConnectionHandle, OpenOptions};
//! use sqlite_raii_handle::errc::ErrorCode;
//!
//! let api = MockApi::new();
//! api.expect_open(1, 0);
//!
//! let mut ec = ErrorCode::default();
//! let mut conn = ConnectionHandle::new(api.clone());
//! conn.construct(&OpenOptions::new("test.db"), &mut ec);
//! assert_eq!(conn.conn_handle(), fake_conn(1));
//! drop(conn);
//!
//! assert_eq!(api.calls()[1], Call::Close(1));
//! ```
//!
//! Unscripted `close_v2` and `finalize` calls succeed. Unscripted `open_v2`
//! and `prepare_v3` calls panic, since every test states what it opens.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::{CStr, c_char, c_int, c_uint};
use std::ptr;
use std::rc::Rc;

use sqlite_raii_errc::{ErrorCategory, sqlite3_category};

use crate::ffi::{Api, RawConnection, RawStatement, SQLITE_OK};

/// A native call observed by [`MockApi`]. Handles are reported by the id they
/// were scripted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
   Open {
      filename: String,
      flags: c_int,
      vfs: Option<String>,
   },
   Close(usize),
   Prepare {
      db: usize,
      /// Text the engine would read, without a trailing terminator.
      sql: String,
      n_byte: c_int,
      flags: c_uint,
   },
   Finalize(usize),
}

/// Fake connection handle for `id`. Id `0` is the null handle.
pub fn fake_conn(id: usize) -> RawConnection {
   ptr::without_provenance_mut(id)
}

/// Fake statement handle for `id`. Id `0` is the null handle.
pub fn fake_stmt(id: usize) -> RawStatement {
   ptr::without_provenance_mut(id)
}

#[derive(Debug, Default)]
struct Script {
   opens: VecDeque<(usize, c_int)>,
   closes: VecDeque<c_int>,
   prepares: VecDeque<(usize, c_int)>,
   finalizes: VecDeque<c_int>,
   calls: Vec<Call>,
}

/// Scripted [`Api`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
   script: Rc<RefCell<Script>>,
}

impl MockApi {
   pub fn new() -> Self {
      Self::default()
   }

   /// Next `open_v2` writes handle `db` and returns `rc`.
   pub fn expect_open(&self, db: usize, rc: c_int) -> &Self {
      self.script.borrow_mut().opens.push_back((db, rc));
      self
   }

   /// Next `close_v2` returns `rc`.
   pub fn expect_close(&self, rc: c_int) -> &Self {
      self.script.borrow_mut().closes.push_back(rc);
      self
   }

   /// Next `prepare_v3` writes handle `stmt` and returns `rc`.
   pub fn expect_prepare(&self, stmt: usize, rc: c_int) -> &Self {
      self.script.borrow_mut().prepares.push_back((stmt, rc));
      self
   }

   /// Next `finalize` returns `rc`.
   pub fn expect_finalize(&self, rc: c_int) -> &Self {
      self.script.borrow_mut().finalizes.push_back(rc);
      self
   }

   /// Calls observed so far, oldest first.
   pub fn calls(&self) -> Vec<Call> {
      self.script.borrow().calls.clone()
   }

   /// Returns the observed calls and starts a fresh log.
   pub fn take_calls(&self) -> Vec<Call> {
      std::mem::take(&mut self.script.borrow_mut().calls)
   }

   /// `true` once every scripted result has been consumed.
   pub fn is_drained(&self) -> bool {
      let script = self.script.borrow();
      script.opens.is_empty()
         && script.closes.is_empty()
         && script.prepares.is_empty()
         && script.finalizes.is_empty()
   }

   fn record(&self, call: Call) {
      self.script.borrow_mut().calls.push(call);
   }
}

fn lossy(text: *const c_char) -> Option<String> {
   if text.is_null() {
      return None;
   }
   // SAFETY: non-null arguments are NUL-terminated per the `Api` contract.
   Some(unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned())
}

impl Api for MockApi {
   unsafe fn open_v2(
      &self,
      filename: *const c_char,
      db: *mut RawConnection,
      flags: c_int,
      vfs: *const c_char,
   ) -> c_int {
      self.record(Call::Open {
         filename: lossy(filename).unwrap_or_default(),
         flags,
         vfs: lossy(vfs),
      });
      let next = self.script.borrow_mut().opens.pop_front();
      let Some((id, rc)) = next else {
         panic!("unexpected open_v2 call");
      };
      // SAFETY: caller guarantees `db` is writable.
      unsafe { db.write(fake_conn(id)) };
      rc
   }

   unsafe fn close_v2(&self, db: RawConnection) -> c_int {
      self.record(Call::Close(db.addr()));
      self.script.borrow_mut().closes.pop_front().unwrap_or(SQLITE_OK)
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
      let read = match usize::try_from(n_byte) {
         // SAFETY: caller guarantees `sql` is readable for `n_byte` bytes.
         Ok(len) => unsafe { std::slice::from_raw_parts(sql.cast::<u8>(), len) },
         // SAFETY: a negative count means `sql` is NUL-terminated.
         Err(_) => unsafe { CStr::from_ptr(sql) }.to_bytes(),
      };
      let text = String::from_utf8_lossy(read);
      self.record(Call::Prepare {
         db: db.addr(),
         sql: text.trim_end_matches('\0').to_owned(),
         n_byte,
         flags: prep_flags,
      });
      let next = self.script.borrow_mut().prepares.pop_front();
      let Some((id, rc)) = next else {
         panic!("unexpected prepare_v3 call");
      };
      // SAFETY: caller guarantees `stmt` and `tail` are writable; the tail
      // points one past the text that was read.
      unsafe {
         stmt.write(fake_stmt(id));
         tail.write(sql.add(read.len()));
      }
      rc
   }

   unsafe fn finalize(&self, stmt: RawStatement) -> c_int {
      self.record(Call::Finalize(stmt.addr()));
      self.script.borrow_mut().finalizes.pop_front().unwrap_or(SQLITE_OK)
   }

   fn errstr(&self, rc: c_int) -> String {
      sqlite3_category().message(rc)
   }
}
