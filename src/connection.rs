//! Move-only connection facade.

use std::ffi::CStr;

use sqlite_raii_errc::ErrorCode;
use sqlite_raii_handle::{Api, ConnHandle, ConnectionHandle, OpenOptions, RawConnection, Sqlite3};
use tracing::trace;

use crate::error::{Raise, Result};

/// An owned database connection.
///
/// Every operation comes in two forms: `op_ec` reports through a trailing
/// [`ErrorCode`] sink and never fails, `op` returns [`Result`] and raises
/// whatever `op_ec` would have reported.
///
/// ```
/// use sqlite_raii::{Connection, OpenMode};
///
/// # fn main() -> sqlite_raii::Result<()> {
/// let mut conn = Connection::new((":memory:", OpenMode::Memory))?;
/// assert!(conn.is_open());
/// conn.close()?;
/// assert!(conn.conn_handle().is_null());
/// # Ok(())
/// # }
/// ```
///
/// Not `Clone`: a native connection has exactly one owner. Ownership moves
/// with [`take`](Self::take) and [`move_assign`](Self::move_assign), or with
/// a plain Rust move. A connection must not be shared across threads.
#[derive(Debug)]
pub struct Connection<A: Api = Sqlite3> {
   inner: ConnectionHandle<A>,
}

impl Connection {
   /// Opens a connection on the linked engine.
   pub fn new(options: impl Into<OpenOptions>) -> Result<Self> {
      Self::with_api(Sqlite3, options)
   }

   /// Opens a connection on the linked engine, reporting through `ec`.
   pub fn new_ec(options: impl Into<OpenOptions>, ec: &mut ErrorCode) -> Self {
      Self::with_api_ec(Sqlite3, options, ec)
   }

   /// Connection that holds nothing yet; see [`open`](Self::open).
   pub fn empty() -> Self {
      Self::empty_with_api(Sqlite3)
   }
}

impl<A: Api + Default> Default for Connection<A> {
   fn default() -> Self {
      Self::empty_with_api(A::default())
   }
}

impl<A: Api> Raise for Connection<A> {
   type Api = A;

   fn api(&self) -> &A {
      self.inner.api()
   }
}

impl<A: Api> Connection<A> {
   /// Connection that holds nothing and will open through `api`.
   pub fn empty_with_api(api: A) -> Self {
      Self {
         inner: ConnectionHandle::new(api),
      }
   }

   /// Opens a connection through `api`.
   pub fn with_api(api: A, options: impl Into<OpenOptions>) -> Result<Self> {
      let options = options.into();
      let mut conn = Self::empty_with_api(api);
      conn.raise(|conn, ec| conn.inner.construct(&options, ec))?;
      Ok(conn)
   }

   /// Opens a connection through `api`.
   ///
   /// A failed open still returns the connection so the handle the engine
   /// produced can be inspected.
   pub fn with_api_ec(api: A, options: impl Into<OpenOptions>, ec: &mut ErrorCode) -> Self {
      let mut conn = Self::empty_with_api(api);
      conn.inner.construct(&options.into(), ec);
      conn
   }

   /// Opens unless already open; `Ok(false)` means nothing changed.
   pub fn open(&mut self, options: impl Into<OpenOptions>) -> Result<bool> {
      let options = options.into();
      self.raise(|conn, ec| conn.inner.open(&options, ec))
   }

   /// Opens unless already open, reporting through `ec`. Returns `true` when
   /// a new connection was opened.
   pub fn open_ec(&mut self, options: impl Into<OpenOptions>, ec: &mut ErrorCode) -> bool {
      self.inner.open(&options.into(), ec)
   }

   /// Closes the connection. On failure it stays open and may be closed
   /// again.
   pub fn close(&mut self) -> Result<()> {
      self.raise(|conn, ec| conn.inner.close(ec))
   }

   /// Closes the connection, reporting through `ec`.
   pub fn close_ec(&mut self, ec: &mut ErrorCode) {
      self.inner.close(ec);
   }

   pub fn is_open(&self) -> bool {
      self.inner.is_open()
   }

   /// The native handle, possibly null.
   pub fn conn_handle(&self) -> RawConnection {
      self.inner.conn_handle()
   }

   pub fn api(&self) -> &A {
      self.inner.api()
   }

   /// File name of database `db_name`; `None` for in-memory and temporary
   /// databases.
   pub fn filename(&self, db_name: &CStr) -> Option<String> {
      self.inner.filename(db_name)
   }

   /// Moves the connection out, leaving `self` empty.
   pub fn take(&mut self) -> Self
   where
      A: Clone,
   {
      Self {
         inner: self.inner.take(),
      }
   }

   /// Closes `self`, then moves `other`'s connection into it, leaving
   /// `other` empty.
   ///
   /// If the close fails, neither connection changes.
   pub fn move_assign(&mut self, other: &mut Self) -> Result<()> {
      self.raise(|conn, ec| conn.move_assign_ec(other, ec))
   }

   pub fn move_assign_ec(&mut self, other: &mut Self, ec: &mut ErrorCode) {
      self.inner.close(ec);
      if ec.is_err() {
         trace!(db = ?self.conn_handle(), "Close before move failed");
         return;
      }
      self.inner.swap(&mut other.inner);
   }
}

impl<'c, A: Api> From<&'c Connection<A>> for ConnHandle<'c> {
   fn from(conn: &'c Connection<A>) -> Self {
      ConnHandle::from(&conn.inner)
   }
}
