use sqlite_raii::{Connection, ErrorCode, OpenMode, SqliteErrc, Statement, connect, libversion};
use tempfile::TempDir;

fn init_tracing() {
   let _ = tracing_subscriber::fmt()
      .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
      .with_test_writer()
      .try_init();
}

fn assert_open_then_close(mut conn: Connection) {
   assert!(!conn.conn_handle().is_null());
   assert!(conn.is_open());

   conn.close().unwrap();
   assert!(conn.conn_handle().is_null());
   assert!(!conn.is_open());
}

#[test]
fn test_linked_engine_version() {
   assert!(libversion().starts_with("3."));
}

#[test]
fn test_in_memory_from_file_name() {
   init_tracing();
   let conn = connect(":memory:").unwrap();
   assert_eq!(conn.filename(c"main"), None);
   assert_open_then_close(conn);
}

#[test]
fn test_in_memory_from_open_mode() {
   init_tracing();
   let conn = connect(("sample.db", OpenMode::Memory)).unwrap();
   assert_eq!(conn.filename(c"main"), None);
   assert_open_then_close(conn);
}

#[test]
fn test_in_memory_from_vfs_name() {
   init_tracing();
   let conn = connect(("sample.db", OpenMode::ReadWriteCreate, "memdb")).unwrap();
   assert_eq!(conn.filename(c"main"), None);
   assert_open_then_close(conn);
}

#[test]
fn test_in_memory_from_uri() {
   init_tracing();
   let conn = connect(("file:sample.db?mode=memory", OpenMode::Uri)).unwrap();
   assert_eq!(conn.filename(c"main"), None);
   assert_open_then_close(conn);
}

#[test]
fn test_file_database() {
   init_tracing();
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("sample.db");

   let conn = connect(path.to_string_lossy().into_owned()).unwrap();
   let filename = conn.filename(c"main").expect("file database has a name");
   assert!(filename.ends_with("sample.db"), "unexpected file name {filename}");
   assert_open_then_close(conn);

   assert!(path.exists());
}

#[test]
fn test_file_database_by_path() {
   init_tracing();
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("by_path.db");

   let conn = connect(path.as_path()).unwrap();
   assert!(conn.filename(c"main").is_some_and(|name| name.ends_with("by_path.db")));
   assert_open_then_close(conn);
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_database_with_non_utf8_name() {
   use std::ffi::OsStr;
   use std::os::unix::ffi::OsStrExt;

   init_tracing();
   let dir = TempDir::new().unwrap();
   let path = dir.path().join(OsStr::from_bytes(b"caf\xff.db"));

   let conn = connect(path.as_path()).unwrap();
   assert_open_then_close(conn);

   assert!(path.exists());
   assert!(!dir.path().join("caf\u{FFFD}.db").exists());
}

#[test]
fn test_close_after_statement_dropped() {
   init_tracing();
   let mut conn = connect(":memory:").unwrap();

   let stmt = Statement::with_sql(&conn, "SELECT 1").unwrap();
   assert_eq!(stmt.conn_handle().as_raw(), conn.conn_handle());
   drop(stmt);

   conn.close().unwrap();
   assert!(conn.conn_handle().is_null());
}

#[test]
fn test_read_only_missing_file() {
   init_tracing();
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("missing.db");

   let err = connect((path.as_path(), OpenMode::ReadOnly)).unwrap_err();
   assert_eq!(err, SqliteErrc::DatabaseOpenFailed);
   assert_eq!(err.message(), "unable to open database file");

   let mut ec = ErrorCode::default();
   let conn = Connection::new_ec((path.as_path(), OpenMode::ReadOnly), &mut ec);
   assert_eq!(ec, SqliteErrc::DatabaseOpenFailed);
   assert!(!conn.is_open());
   assert!(!path.exists());
}

#[test]
fn test_reopen_after_close() {
   init_tracing();
   let mut conn = Connection::empty();
   assert!(conn.open(":memory:").unwrap());
   assert!(!conn.open(":memory:").unwrap());

   conn.close().unwrap();
   assert!(conn.open((":memory:", OpenMode::Memory)).unwrap());
   assert!(conn.is_open());
}

#[test]
fn test_statement_lifecycle() {
   init_tracing();
   let conn = connect(":memory:").unwrap();

   let mut stmt = Statement::with_sql(&conn, "CREATE TABLE t (id INTEGER PRIMARY KEY)").unwrap();
   let first = stmt.stmt_handle();
   assert!(!first.is_null());
   assert!(!stmt.prepare("SELECT 1").unwrap());
   assert_eq!(stmt.stmt_handle(), first);

   stmt.finalize().unwrap();
   assert!(stmt.stmt_handle().is_null());

   assert!(stmt.prepare("SELECT 1; SELECT 2;").unwrap());
   assert!(!stmt.stmt_handle().is_null());
   assert_eq!(stmt.tail(), Some(9));
}

#[test]
fn test_statement_errors_from_engine() {
   init_tracing();
   let conn = connect(":memory:").unwrap();

   let err = Statement::with_sql(&conn, "SELECT * FROM missing_table").unwrap_err();
   assert_eq!(err, SqliteErrc::GenericError);
   assert_eq!(err.message(), "SQL logic error");

   let mut stmt = Statement::new(&conn).unwrap();
   let mut ec = ErrorCode::default();
   assert!(!stmt.prepare_ec("SELEC 1", &mut ec));
   assert_eq!(ec, SqliteErrc::GenericError);
   assert!(stmt.stmt_handle().is_null());
}

#[test]
fn test_statement_moves_between_owners() {
   init_tracing();
   let conn = connect(":memory:").unwrap();

   let mut first = Statement::with_sql(&conn, "SELECT 1").unwrap();
   let mut second = Statement::with_sql(&conn, "SELECT 2").unwrap();
   let handle = first.stmt_handle();

   second.move_assign(&mut first).unwrap();
   assert_eq!(second.stmt_handle(), handle);
   assert!(first.stmt_handle().is_null());
   assert_eq!(first.conn_handle(), second.conn_handle());

   let third = second.take();
   assert_eq!(third.stmt_handle(), handle);
   assert!(second.stmt_handle().is_null());
}

#[test]
fn test_read_only_open_of_existing_file() {
   init_tracing();
   let dir = TempDir::new().unwrap();
   let path = dir.path().join("ro.db");
   connect(path.as_path()).unwrap();

   let conn = connect((path.as_path(), OpenMode::ReadOnly)).unwrap();
   let stmt = Statement::with_sql(&conn, "SELECT 1").unwrap();
   assert!(!stmt.stmt_handle().is_null());
}
