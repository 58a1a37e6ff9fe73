//! Exclusive owner of a native prepared-statement handle.

use std::marker::PhantomData;
use std::ptr;

use sqlite_raii_errc::{ErrorCode, WrapperErrc};
use tracing::{debug, trace};

use crate::connection::ConnectionHandle;
use crate::ffi::{self, Api, RawConnection, RawStatement, Sqlite3};
use crate::text::Sql;

/// Non-owning copy of a connection handle, valid for `'c`.
///
/// A handle taken from a [`ConnectionHandle`] borrows it, so the owner cannot
/// be closed or dropped while a statement bound through the handle is alive:
///
/// ```compile_fail
/// use sqlite_raii_handle::{ConnHandle, ConnectionHandle, OpenOptions, Sql, StatementHandle, Sqlite3};
/// use sqlite_raii_handle::errc::ErrorCode;
///
/// let mut ec = ErrorCode::default();
/// let mut db = ConnectionHandle::new(Sqlite3);
/// db.construct(&OpenOptions::new(":memory:"), &mut ec);
/// let mut stmt = StatementHandle::new(Sqlite3, ConnHandle::from(&db));
/// db.close(&mut ec);
/// stmt.prepare(Sql::from("SELECT 1"), &mut ec);
/// ```
///
/// Handles from anywhere else go through [`from_raw`](Self::from_raw).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnHandle<'c> {
   db: RawConnection,
   owner: PhantomData<&'c ()>,
}

impl ConnHandle<'_> {
   /// The null handle. Prepare through it reports
   /// [`WrapperErrc::InvalidHandle`].
   pub const NULL: Self = ConnHandle {
      db: ptr::null_mut(),
      owner: PhantomData,
   };
}

impl<'c> ConnHandle<'c> {
   /// Wraps a raw connection handle.
   ///
   /// # Safety
   ///
   /// `db` must be null or an open connection handle of the engine the
   /// statement will call, and must stay open for `'c`.
   pub unsafe fn from_raw(db: RawConnection) -> Self {
      ConnHandle {
         db,
         owner: PhantomData,
      }
   }

   /// The raw handle, possibly null.
   pub fn as_raw(self) -> RawConnection {
      self.db
   }

   /// `true` for the [`NULL`](Self::NULL) handle.
   pub fn is_null(self) -> bool {
      self.db.is_null()
   }
}

impl<'c, A: Api> From<&'c ConnectionHandle<A>> for ConnHandle<'c> {
   fn from(conn: &'c ConnectionHandle<A>) -> Self {
      // SAFETY: the borrow keeps the owner from closing the handle for `'c`.
      unsafe { ConnHandle::from_raw(conn.conn_handle()) }
   }
}

/// Owns at most one prepared statement, bound to a connection it does not
/// own.
///
/// Finalizing returns the owner to the bound-empty state, ready for another
/// prepare. Dropping the owner finalizes.
#[derive(Debug)]
pub struct StatementHandle<'c, A: Api = Sqlite3> {
   api: A,
   conn: ConnHandle<'c>,
   stmt: RawStatement,
   tail: Option<usize>,
}

impl<'c, A: Api> StatementHandle<'c, A> {
   /// Owner bound to `conn` with nothing prepared.
   pub fn new(api: A, conn: ConnHandle<'c>) -> Self {
      Self {
         api,
         conn,
         stmt: ptr::null_mut(),
         tail: None,
      }
   }

   /// Binds to `conn` without preparing. Always succeeds.
   pub fn construct(&mut self, conn: ConnHandle<'c>, ec: &mut ErrorCode) {
      ec.clear();
      self.conn = conn;
   }

   /// Binds to `conn` and prepares `sql` on it.
   ///
   /// The owner stays bound to `conn` when the prepare fails.
   pub fn construct_with_sql(&mut self, conn: ConnHandle<'c>, sql: Sql<'_>, ec: &mut ErrorCode) {
      self.conn = conn;
      self.prepare_native(conn, sql, ec);
   }

   /// Prepares `sql` on the bound connection unless a statement is held.
   ///
   /// Returns `true` when a new statement was prepared. A held statement is
   /// left untouched and reports `false` with a clear code; finalize first
   /// to prepare something else.
   pub fn prepare(&mut self, sql: Sql<'_>, ec: &mut ErrorCode) -> bool {
      self.prepare_on(self.conn, sql, ec)
   }

   /// Like [`prepare`](Self::prepare) but on `conn`, rebinding the owner to
   /// it when the prepare succeeds.
   pub fn prepare_on(&mut self, conn: ConnHandle<'c>, sql: Sql<'_>, ec: &mut ErrorCode) -> bool {
      if !self.stmt.is_null() {
         trace!(stmt = ?self.stmt, "Statement already prepared");
         ec.clear();
         return false;
      }
      if self.prepare_native(conn, sql, ec) {
         self.conn = conn;
      }
      !self.stmt.is_null()
   }

   fn prepare_native(&mut self, conn: ConnHandle<'c>, sql: Sql<'_>, ec: &mut ErrorCode) -> bool {
      if conn.is_null() {
         debug!("Prepare on null connection handle");
         *ec = WrapperErrc::InvalidHandle.into();
         return false;
      }
      let n_byte = match sql.n_byte() {
         Ok(n_byte) => n_byte,
         Err(err) => {
            debug!(len = sql.len(), "SQL text too long");
            *ec = err;
            return false;
         }
      };

      let mut stmt: RawStatement = ptr::null_mut();
      let mut tail = ptr::null();
      // SAFETY: `conn` is non-null and open for `'c` per `ConnHandle`;
      // `sql` is readable for `n_byte` bytes (or to its terminator when
      // negative); `stmt` and `tail` are local slots.
      let rc = unsafe {
         self.api
            .prepare_v3(conn.as_raw(), sql.as_ptr(), n_byte, 0, &mut stmt, &mut tail)
      };
      debug!(db = ?conn.as_raw(), n_byte, rc, ?stmt, "prepare_v3");

      self.stmt = stmt;
      self.tail = if stmt.is_null() { None } else { sql.offset_of(tail) };
      ffi::report(ec, rc);
      ec.is_ok()
   }

   /// Finalizes the held statement.
   ///
   /// The engine's finalize result only repeats the last step error, so it
   /// is not reported; this always clears `ec`.
   pub fn finalize(&mut self, ec: &mut ErrorCode) {
      ec.clear();
      if self.stmt.is_null() {
         trace!("Finalize on empty statement");
         return;
      }
      // SAFETY: `stmt` came from `prepare_v3` on this api and has not been
      // finalized.
      let rc = unsafe { self.api.finalize(self.stmt) };
      debug!(stmt = ?self.stmt, rc, "finalize");
      self.stmt = ptr::null_mut();
      self.tail = None;
   }

   /// The connection this owner prepares on.
   pub fn conn_handle(&self) -> ConnHandle<'c> {
      self.conn
   }

   /// The owned statement handle, possibly null.
   pub fn stmt_handle(&self) -> RawStatement {
      self.stmt
   }

   /// Byte offset of the first SQL byte the last prepare did not consume.
   pub fn tail(&self) -> Option<usize> {
      self.tail
   }

   /// The engine this owner calls.
   pub fn api(&self) -> &A {
      &self.api
   }

   /// Moves the statement out into a new owner. `self` stays bound to the
   /// same connection with nothing prepared.
   pub fn take(&mut self) -> Self
   where
      A: Clone,
   {
      let empty = Self::new(self.api.clone(), self.conn);
      std::mem::replace(self, empty)
   }

   /// Exchanges everything, bindings included, with `other`.
   pub fn swap(&mut self, other: &mut Self) {
      std::mem::swap(self, other);
   }
}

impl<A: Api> Drop for StatementHandle<'_, A> {
   fn drop(&mut self) {
      let mut ec = ErrorCode::default();
      self.finalize(&mut ec);
   }
}
