//! Open options for a connection: file name, flags and VFS.
//!
//! Connections accept several argument shapes. All of them convert into one
//! [`OpenOptions`] value that is validated once, right before the engine is
//! called.
//!
//! ```
//! use sqlite_raii_handle::{OpenMode, OpenOptions};
//!
//! // File name only: read-write-create on the default VFS.
//! let options = OpenOptions::from("app.db");
//! assert_eq!(options.flags, None);
//!
//! // File name and mode, or file name, mode and VFS.
//! let options = OpenOptions::from(("app.db", OpenMode::ReadOnly));
//! let options = OpenOptions::from(("app.db", OpenMode::ReadWriteCreate, "memdb"));
//! assert_eq!(options.vfs.as_deref(), Some("memdb"));
//! ```

use std::borrow::Cow;
use std::ffi::{CStr, CString, c_int};
use std::fmt;
use std::ops::BitOr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlite_raii_errc::{ErrorCode, WrapperErrc};

use crate::ffi::{OPEN_CREATE, OPEN_EXRESCODE, OPEN_MEMORY, OPEN_READONLY, OPEN_READWRITE, OPEN_URI};

/// Typed open modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
   /// Open an existing database for reading.
   ReadOnly,
   /// Open an existing database for reading and writing.
   ReadWrite,
   /// Open for reading and writing, creating the file if missing.
   ReadWriteCreate,
   /// Private in-memory database; the file name is ignored.
   Memory,
   /// Interpret the file name as a `file:` URI.
   Uri,
}

impl OpenMode {
   /// Engine flag bits for this mode.
   pub const fn bits(self) -> c_int {
      match self {
         OpenMode::ReadOnly => OPEN_READONLY,
         OpenMode::ReadWrite => OPEN_READWRITE,
         OpenMode::ReadWriteCreate => OPEN_READWRITE | OPEN_CREATE,
         OpenMode::Memory => OPEN_READWRITE | OPEN_CREATE | OPEN_MEMORY,
         OpenMode::Uri => OPEN_READWRITE | OPEN_CREATE | OPEN_URI,
      }
   }
}

/// Raw engine open flags.
///
/// Flags are handed to the engine unchanged except for the extended result
/// code bit, which every open forces on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpenFlags(pub c_int);

impl OpenFlags {
   /// Flags used when none are given.
   pub const DEFAULT: OpenFlags = OpenFlags(OpenMode::ReadWriteCreate.bits());

   /// Raw bits.
   pub const fn bits(self) -> c_int {
      self.0
   }
}

impl Default for OpenFlags {
   fn default() -> Self {
      Self::DEFAULT
   }
}

impl From<c_int> for OpenFlags {
   fn from(bits: c_int) -> Self {
      OpenFlags(bits)
   }
}

impl From<OpenMode> for OpenFlags {
   fn from(mode: OpenMode) -> Self {
      OpenFlags(mode.bits())
   }
}

impl<T: Into<OpenFlags>> BitOr<T> for OpenFlags {
   type Output = OpenFlags;

   fn bitor(self, rhs: T) -> OpenFlags {
      OpenFlags(self.0 | rhs.into().0)
   }
}

impl<T: Into<OpenFlags>> BitOr<T> for OpenMode {
   type Output = OpenFlags;

   fn bitor(self, rhs: T) -> OpenFlags {
      OpenFlags::from(self) | rhs
   }
}

/// Database file name (or URI, or `:memory:`).
///
/// Built from strings, C strings or paths. There is no null file name. The
/// bytes are kept exactly as given, so a path that is not valid UTF-8 still
/// names the same file; text is produced only for display and serde.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Filename(Vec<u8>);

impl Filename {
   /// The name as handed to the engine, without a terminator.
   pub fn as_bytes(&self) -> &[u8] {
      &self.0
   }

   /// The name as text, or `None` when it is not valid UTF-8.
   pub fn to_str(&self) -> Option<&str> {
      std::str::from_utf8(&self.0).ok()
   }

   /// The name as text, with invalid UTF-8 replaced.
   pub fn to_string_lossy(&self) -> Cow<'_, str> {
      String::from_utf8_lossy(&self.0)
   }
}

impl fmt::Debug for Filename {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "Filename(\"{}\")", self.0.escape_ascii())
   }
}

impl fmt::Display for Filename {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(&self.to_string_lossy())
   }
}

impl PartialEq<str> for Filename {
   fn eq(&self, other: &str) -> bool {
      self.0 == other.as_bytes()
   }
}

impl PartialEq<&str> for Filename {
   fn eq(&self, other: &&str) -> bool {
      self.0 == other.as_bytes()
   }
}

impl From<Filename> for String {
   fn from(name: Filename) -> Self {
      match String::from_utf8(name.0) {
         Ok(text) => text,
         Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
      }
   }
}

impl From<&str> for Filename {
   fn from(name: &str) -> Self {
      Filename(name.as_bytes().to_vec())
   }
}

impl From<String> for Filename {
   fn from(name: String) -> Self {
      Filename(name.into_bytes())
   }
}

impl From<&String> for Filename {
   fn from(name: &String) -> Self {
      Filename::from(name.as_str())
   }
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
   use std::os::unix::ffi::OsStrExt;

   path.as_os_str().as_bytes().to_vec()
}

// The engine expects UTF-8 file names on other platforms.
#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Vec<u8> {
   path.to_string_lossy().into_owned().into_bytes()
}

impl From<&Path> for Filename {
   fn from(path: &Path) -> Self {
      Filename(path_bytes(path))
   }
}

impl From<PathBuf> for Filename {
   fn from(path: PathBuf) -> Self {
      Filename::from(path.as_path())
   }
}

impl From<&PathBuf> for Filename {
   fn from(path: &PathBuf) -> Self {
      Filename::from(path.as_path())
   }
}

impl From<&CStr> for Filename {
   fn from(name: &CStr) -> Self {
      Filename(name.to_bytes().to_vec())
   }
}

impl From<CString> for Filename {
   fn from(name: CString) -> Self {
      Filename(name.into_bytes())
   }
}

/// VFS selection: a name, or `None` for the engine default.
///
/// Deliberately not constructible from a path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Vfs(Option<String>);

impl Vfs {
   /// The engine's default VFS.
   pub const DEFAULT: Vfs = Vfs(None);

   /// The VFS name, or `None` for the engine default.
   pub fn name(&self) -> Option<&str> {
      self.0.as_deref()
   }
}

impl From<&str> for Vfs {
   fn from(name: &str) -> Self {
      Vfs(Some(name.to_owned()))
   }
}

impl From<String> for Vfs {
   fn from(name: String) -> Self {
      Vfs(Some(name))
   }
}

impl From<&String> for Vfs {
   fn from(name: &String) -> Self {
      Vfs(Some(name.clone()))
   }
}

impl From<&CStr> for Vfs {
   fn from(name: &CStr) -> Self {
      Vfs(Some(name.to_string_lossy().into_owned()))
   }
}

impl From<Option<&str>> for Vfs {
   fn from(name: Option<&str>) -> Self {
      Vfs(name.map(str::to_owned))
   }
}

/// Everything needed to open a connection.
///
/// Omitted flags mean read-write-create; an omitted VFS means the engine
/// default. The struct is serde-friendly so it can be read from
/// configuration files:
///
/// ```
/// use sqlite_raii_handle::{OpenMode, OpenOptions};
///
/// let options = OpenOptions::new("cache.db").mode(OpenMode::ReadOnly).vfs("unix-none");
/// assert_eq!(options.filename, "cache.db");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOptions {
   /// File name, URI or `:memory:`.
   pub filename: Filename,

   /// Engine open flags. Default: read-write-create.
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub flags: Option<OpenFlags>,

   /// VFS name. Default: the engine's default VFS.
   #[serde(default, skip_serializing_if = "Option::is_none")]
   pub vfs: Option<String>,
}

impl OpenOptions {
   /// Options for `filename` with default flags and VFS.
   pub fn new(filename: impl Into<Filename>) -> Self {
      Self {
         filename: filename.into(),
         flags: None,
         vfs: None,
      }
   }

   /// Sets flags from a typed mode.
   pub fn mode(self, mode: OpenMode) -> Self {
      self.flags(mode)
   }

   /// Sets raw or typed flags.
   pub fn flags(mut self, flags: impl Into<OpenFlags>) -> Self {
      self.flags = Some(flags.into());
      self
   }

   /// Selects a VFS (or the default with `None`).
   pub fn vfs(mut self, vfs: impl Into<Vfs>) -> Self {
      self.vfs = vfs.into().0;
      self
   }

   /// Selects the engine's default VFS.
   pub fn default_vfs(mut self) -> Self {
      self.vfs = None;
      self
   }

   /// Flags as handed to the engine, including the forced extended result
   /// code bit.
   pub fn effective_flags(&self) -> c_int {
      self.flags.unwrap_or_default().bits() | OPEN_EXRESCODE
   }

   /// Converts to engine arguments.
   ///
   /// Fails with [`WrapperErrc::InvalidArgument`] when the file name or VFS
   /// name contains a NUL byte.
   pub fn validate(&self) -> Result<NativeOpen, ErrorCode> {
      let invalid = |_| ErrorCode::from(WrapperErrc::InvalidArgument);
      let filename = CString::new(self.filename.as_bytes()).map_err(invalid)?;
      let vfs = match &self.vfs {
         Some(name) => Some(CString::new(name.as_str()).map_err(invalid)?),
         None => None,
      };
      Ok(NativeOpen {
         filename,
         flags: self.effective_flags(),
         vfs,
      })
   }
}

/// Validated engine arguments produced by [`OpenOptions::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeOpen {
   /// File name bytes, NUL-terminated.
   pub filename: CString,
   /// Flags with the extended result code bit set.
   pub flags: c_int,
   /// VFS name, or `None` for the engine default.
   pub vfs: Option<CString>,
}

macro_rules! options_from_filename {
   ($($source:ty),* $(,)?) => {
      $(
         impl From<$source> for OpenOptions {
            fn from(source: $source) -> Self {
               OpenOptions::new(source)
            }
         }
      )*
   };
}

options_from_filename!(&str, String, &String, &Path, PathBuf, &PathBuf, &CStr, CString);

impl From<&OpenOptions> for OpenOptions {
   fn from(options: &OpenOptions) -> Self {
      options.clone()
   }
}

impl<S, F> From<(S, F)> for OpenOptions
where
   S: Into<Filename>,
   F: Into<OpenFlags>,
{
   fn from((source, flags): (S, F)) -> Self {
      OpenOptions::new(source).flags(flags)
   }
}

impl<S, F, V> From<(S, F, V)> for OpenOptions
where
   S: Into<Filename>,
   F: Into<OpenFlags>,
   V: Into<Vfs>,
{
   fn from((source, flags, vfs): (S, F, V)) -> Self {
      OpenOptions::new(source).flags(flags).vfs(vfs)
   }
}
