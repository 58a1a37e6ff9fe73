//! Exclusive owners for SQLite's two native handle types.
//!
//! This crate sits between the error taxonomy (`sqlite-raii-errc`) and the
//! public facades of `sqlite-raii`. It provides:
//!
//! - [`Api`]: the narrow native boundary (open, close, prepare, finalize,
//!   message lookup) with the linked engine ([`Sqlite3`]) as default and a
//!   process-wide routine table for extension builds ([`extension`])
//! - [`ConnectionHandle`] and [`StatementHandle`]: state machines that own
//!   exactly one native handle each and release it exactly once
//! - Argument adapters: [`OpenOptions`], [`OpenFlags`], [`OpenMode`], [`Sql`],
//!   [`ConnHandle`]
//!
//! Every owner operation reports its outcome through a trailing
//! `&mut ErrorCode` sink that is cleared on success. Nothing here panics or
//! returns `Result`; the facade crate layers the raising API on top.
//!
//! Raw FFI calls live in [`ffi`] and [`extension`] only. The owners call
//! through [`Api`] and hold their handles as raw pointers, so they are neither
//! `Send` nor `Sync`.

pub mod connection;
pub mod extension;
pub mod ffi;
pub mod options;
pub mod statement;
pub mod text;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use connection::ConnectionHandle;
pub use ffi::{Api, RawConnection, RawStatement, Sqlite3, libversion};
pub use options::{Filename, OpenFlags, OpenMode, OpenOptions, Vfs};
pub use statement::{ConnHandle, StatementHandle};
pub use text::Sql;

pub use sqlite_raii_errc as errc;
