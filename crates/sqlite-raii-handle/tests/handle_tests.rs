use sqlite_raii_handle::errc::{ErrorCode, SqliteErrc};
use sqlite_raii_handle::{ConnHandle, ConnectionHandle, OpenMode, OpenOptions, Sql, Sqlite3, StatementHandle};
use tempfile::TempDir;

fn init_tracing() {
   let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_open_close_file_database() {
   init_tracing();
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("handle.db");

   let mut ec = ErrorCode::default();
   let mut conn = ConnectionHandle::new(Sqlite3);
   assert!(conn.open(&OpenOptions::from(path.as_path()), &mut ec));
   assert!(ec.is_ok());
   assert!(conn.filename(c"main").is_some_and(|name| name.ends_with("handle.db")));

   conn.close(&mut ec);
   assert!(ec.is_ok());
   assert!(conn.conn_handle().is_null());
   assert!(!conn.is_open());
   assert!(path.exists());
}

#[test]
fn test_read_only_missing_file_fails() {
   init_tracing();
   let dir = TempDir::new().unwrap();
   let options = OpenOptions::new(dir.path().join("missing.db")).mode(OpenMode::ReadOnly);

   let mut ec = ErrorCode::default();
   let mut conn = ConnectionHandle::new(Sqlite3);
   assert!(!conn.open(&options, &mut ec));
   assert_eq!(ec, SqliteErrc::DatabaseOpenFailed);
   assert!(!conn.is_open());

   // The engine hands back a handle even on failure; closing releases it.
   conn.close(&mut ec);
   assert!(ec.is_ok());
   assert!(conn.conn_handle().is_null());
}

#[test]
fn test_close_with_outstanding_statement() {
   init_tracing();
   let mut ec = ErrorCode::default();
   let mut conn = ConnectionHandle::new(Sqlite3);
   conn.construct(&OpenOptions::new(":memory:"), &mut ec);

   // A borrowed handle would keep `conn` from closing here. close_v2 keeps
   // the native connection alive until the statement is finalized below.
   // SAFETY: see above.
   let handle = unsafe { ConnHandle::from_raw(conn.conn_handle()) };
   let mut stmt = StatementHandle::new(Sqlite3, handle);
   assert!(stmt.prepare(Sql::from("SELECT 1"), &mut ec));

   conn.close(&mut ec);
   assert!(ec.is_ok());
   assert!(conn.conn_handle().is_null());

   stmt.finalize(&mut ec);
   assert!(ec.is_ok());
}

#[test]
fn test_prepare_and_reprepare() {
   init_tracing();
   let mut ec = ErrorCode::default();
   let mut conn = ConnectionHandle::new(Sqlite3);
   conn.construct(&OpenOptions::new(":memory:"), &mut ec);

   let mut stmt = StatementHandle::new(Sqlite3, ConnHandle::from(&conn));
   assert!(stmt.prepare(Sql::from(c"CREATE TABLE t (x)"), &mut ec));
   assert!(!stmt.stmt_handle().is_null());

   stmt.finalize(&mut ec);
   assert!(stmt.stmt_handle().is_null());
   assert!(stmt.prepare(Sql::from(b"SELECT 2"), &mut ec));
   assert!(!stmt.stmt_handle().is_null());
   assert_eq!(stmt.tail(), Some(8));
}
