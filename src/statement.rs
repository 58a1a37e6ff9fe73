//! Move-only prepared-statement facade.

use sqlite_raii_errc::ErrorCode;
use sqlite_raii_handle::{Api, ConnHandle, RawStatement, Sql, Sqlite3, StatementHandle};
use tracing::trace;

use crate::connection::Connection;
use crate::error::{Raise, Result};

/// What a statement binds to: a connection handle valid for `'c` plus the
/// engine to call.
///
/// Built from a `&Connection` (borrowing it and sharing its engine), from a
/// bare [`ConnHandle`] (engine from `Default`), or from an explicit
/// `(api, handle)` pair.
#[derive(Debug, Clone, Copy)]
pub struct Target<'c, A: Api = Sqlite3> {
   api: A,
   conn: ConnHandle<'c>,
}

impl<'c, A: Api + Clone> From<&'c Connection<A>> for Target<'c, A> {
   fn from(conn: &'c Connection<A>) -> Self {
      Self {
         api: conn.api().clone(),
         conn: ConnHandle::from(conn),
      }
   }
}

impl<'c, A: Api + Default> From<ConnHandle<'c>> for Target<'c, A> {
   fn from(conn: ConnHandle<'c>) -> Self {
      Self {
         api: A::default(),
         conn,
      }
   }
}

impl<'c, A: Api> From<(A, ConnHandle<'c>)> for Target<'c, A> {
   fn from((api, conn): (A, ConnHandle<'c>)) -> Self {
      Self { api, conn }
   }
}

/// An owned prepared statement bound to a connection it does not own.
///
/// A statement built from a `&Connection` borrows it for `'c`, so the
/// connection stays open at least as long as the statement:
///
/// ```
/// use sqlite_raii::{Connection, Statement};
///
/// # fn main() -> sqlite_raii::Result<()> {
/// let conn = Connection::new(":memory:")?;
/// let mut stmt = Statement::with_sql(&conn, "SELECT 1")?;
/// assert!(!stmt.stmt_handle().is_null());
///
/// stmt.finalize()?;
/// assert!(stmt.prepare("SELECT 2")?);
/// # Ok(())
/// # }
/// ```
///
/// Closing the connection first is rejected at compile time:
///
/// ```compile_fail
/// use sqlite_raii::{Connection, Statement};
///
/// # fn main() -> sqlite_raii::Result<()> {
/// let mut conn = Connection::new(":memory:")?;
/// let mut stmt = Statement::new(&conn)?;
/// conn.close()?;
/// stmt.prepare("SELECT 1")?;
/// # Ok(())
/// # }
/// ```
///
/// Binding through a raw handle instead needs
/// [`ConnHandle::from_raw`], which is `unsafe`.
#[derive(Debug)]
pub struct Statement<'c, A: Api = Sqlite3> {
   inner: StatementHandle<'c, A>,
}

impl<A: Api> Raise for Statement<'_, A> {
   type Api = A;

   fn api(&self) -> &A {
      self.inner.api()
   }
}

impl<'c, A: Api> Statement<'c, A> {
   fn bound(target: Target<'c, A>) -> Self {
      Self {
         inner: StatementHandle::new(target.api, target.conn),
      }
   }

   /// Statement bound to `target` with nothing prepared.
   pub fn new(target: impl Into<Target<'c, A>>) -> Result<Self> {
      let mut stmt = Self::bound(target.into());
      let conn = stmt.inner.conn_handle();
      stmt.raise(|stmt, ec| stmt.inner.construct(conn, ec))?;
      Ok(stmt)
   }

   pub fn new_ec(target: impl Into<Target<'c, A>>, ec: &mut ErrorCode) -> Self {
      let mut stmt = Self::bound(target.into());
      let conn = stmt.inner.conn_handle();
      stmt.inner.construct(conn, ec);
      stmt
   }

   /// Statement bound to `target` with `sql` prepared.
   pub fn with_sql<'s>(target: impl Into<Target<'c, A>>, sql: impl Into<Sql<'s>>) -> Result<Self> {
      let sql = sql.into();
      let mut stmt = Self::bound(target.into());
      let conn = stmt.inner.conn_handle();
      stmt.raise(|stmt, ec| stmt.inner.construct_with_sql(conn, sql, ec))?;
      Ok(stmt)
   }

   /// Like [`with_sql`](Self::with_sql). A failed prepare still returns the
   /// bound statement.
   pub fn with_sql_ec<'s>(
      target: impl Into<Target<'c, A>>,
      sql: impl Into<Sql<'s>>,
      ec: &mut ErrorCode,
   ) -> Self {
      let mut stmt = Self::bound(target.into());
      let conn = stmt.inner.conn_handle();
      stmt.inner.construct_with_sql(conn, sql.into(), ec);
      stmt
   }

   /// Prepares `sql` unless a statement is held; `Ok(false)` means nothing
   /// changed.
   pub fn prepare<'s>(&mut self, sql: impl Into<Sql<'s>>) -> Result<bool> {
      let sql = sql.into();
      self.raise(|stmt, ec| stmt.inner.prepare(sql, ec))
   }

   pub fn prepare_ec<'s>(&mut self, sql: impl Into<Sql<'s>>, ec: &mut ErrorCode) -> bool {
      self.inner.prepare(sql.into(), ec)
   }

   /// Prepares `sql` on `conn`, rebinding to it on success.
   pub fn prepare_on<'s>(&mut self, conn: impl Into<ConnHandle<'c>>, sql: impl Into<Sql<'s>>) -> Result<bool> {
      let (conn, sql) = (conn.into(), sql.into());
      self.raise(|stmt, ec| stmt.inner.prepare_on(conn, sql, ec))
   }

   pub fn prepare_on_ec<'s>(
      &mut self,
      conn: impl Into<ConnHandle<'c>>,
      sql: impl Into<Sql<'s>>,
      ec: &mut ErrorCode,
   ) -> bool {
      self.inner.prepare_on(conn.into(), sql.into(), ec)
   }

   pub fn finalize(&mut self) -> Result<()> {
      self.raise(|stmt, ec| stmt.inner.finalize(ec))
   }

   pub fn finalize_ec(&mut self, ec: &mut ErrorCode) {
      self.inner.finalize(ec);
   }

   /// The connection this statement is bound to.
   pub fn conn_handle(&self) -> ConnHandle<'c> {
      self.inner.conn_handle()
   }

   /// The native statement handle, possibly null.
   pub fn stmt_handle(&self) -> RawStatement {
      self.inner.stmt_handle()
   }

   /// Byte offset of the SQL text left unconsumed by the last prepare.
   pub fn tail(&self) -> Option<usize> {
      self.inner.tail()
   }

   pub fn api(&self) -> &A {
      self.inner.api()
   }

   /// Moves the prepared statement out. `self` stays bound to the same
   /// connection, empty and ready for another prepare.
   pub fn take(&mut self) -> Self
   where
      A: Clone,
   {
      Self {
         inner: self.inner.take(),
      }
   }

   /// Finalizes `self`, then moves `other`'s statement and binding into it.
   /// `other` stays bound to its connection, empty.
   pub fn move_assign(&mut self, other: &mut Self) -> Result<()>
   where
      A: Clone,
   {
      self.raise(|stmt, ec| stmt.move_assign_ec(other, ec))
   }

   pub fn move_assign_ec(&mut self, other: &mut Self, ec: &mut ErrorCode)
   where
      A: Clone,
   {
      self.inner.finalize(ec);
      if ec.is_err() {
         trace!(stmt = ?self.stmt_handle(), "Finalize before move failed");
         return;
      }
      self.inner = other.inner.take();
   }
}
