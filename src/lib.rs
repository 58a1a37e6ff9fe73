//! Move-only SQLite connections and prepared statements.
//!
//! [`Connection`] and [`Statement`] each own one native handle and release it
//! exactly once: on drop, on an explicit close or finalize, or when their
//! ownership is moved into another value. Every operation exists twice:
//!
//! - `op_ec(.., &mut ErrorCode)` never fails and leaves its outcome in the
//!   sink (cleared on success)
//! - `op(..)` returns [`Result`] and raises a non-clear outcome as [`Error`]
//!
//! Both forms run the same code, so they cannot drift apart.
//!
//! ```
//! use sqlite_raii::{ErrorCode, SqliteErrc, connect, connect_ec, prepare_sql};
//!
//! # fn main() -> sqlite_raii::Result<()> {
//! let conn = connect(":memory:")?;
//! let stmt = prepare_sql(&conn, "SELECT 1")?;
//! assert!(!stmt.stmt_handle().is_null());
//!
//! let mut ec = ErrorCode::default();
//! let missing = connect_ec(("/no/such/dir/app.db", sqlite_raii::OpenMode::ReadOnly), &mut ec);
//! assert_eq!(ec, SqliteErrc::DatabaseOpenFailed);
//! assert!(!missing.is_open());
//! # Ok(())
//! # }
//! ```
//!
//! Errors compare against the engine taxonomy ([`SqliteErrc`], which ignores
//! extended result code detail) and the wrapper's own ([`WrapperErrc`]).

mod connection;
mod error;
mod statement;

pub use connection::Connection;
pub use error::{Error, Result};
pub use statement::{Statement, Target};

pub use sqlite_raii_errc::{
   ErrorCategory, ErrorCode, ErrorCondition, SqliteErrc, UNKNOWN_ERROR, WrapperErrc, sqlite3_category,
   wrapper_category,
};
pub use sqlite_raii_handle::{
   Api, ConnHandle, Filename, OpenFlags, OpenMode, OpenOptions, RawConnection, RawStatement, Sql, Sqlite3,
   Vfs, extension, ffi, libversion,
};

/// Crate version, e.g. `"0.1.0"`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");
pub const VERSION_MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");
pub const VERSION_PATCH: &str = env!("CARGO_PKG_VERSION_PATCH");

/// Opens a connection on the linked engine. Same as [`Connection::new`].
pub fn connect(options: impl Into<OpenOptions>) -> Result<Connection> {
   Connection::new(options)
}

/// Same as [`Connection::new_ec`].
pub fn connect_ec(options: impl Into<OpenOptions>, ec: &mut ErrorCode) -> Connection {
   Connection::new_ec(options, ec)
}

/// Binds a statement without preparing. Same as [`Statement::new`].
pub fn prepare<'c, A: Api>(target: impl Into<Target<'c, A>>) -> Result<Statement<'c, A>> {
   Statement::new(target)
}

/// Same as [`Statement::new_ec`].
pub fn prepare_ec<'c, A: Api>(target: impl Into<Target<'c, A>>, ec: &mut ErrorCode) -> Statement<'c, A> {
   Statement::new_ec(target, ec)
}

/// Binds and prepares a statement. Same as [`Statement::with_sql`].
pub fn prepare_sql<'c, 's, A: Api>(
   target: impl Into<Target<'c, A>>,
   sql: impl Into<Sql<'s>>,
) -> Result<Statement<'c, A>> {
   Statement::with_sql(target, sql)
}

/// Same as [`Statement::with_sql_ec`].
pub fn prepare_sql_ec<'c, 's, A: Api>(
   target: impl Into<Target<'c, A>>,
   sql: impl Into<Sql<'s>>,
   ec: &mut ErrorCode,
) -> Statement<'c, A> {
   Statement::with_sql_ec(target, sql, ec)
}
