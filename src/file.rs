//! File listener.
use crate::build::Build;
use crate::permissions::restrict_file_permissions;
use crate::types::Severity;
use crate::{Config, ErrorKind, Listener, Result};
use serde::{Deserialize, Serialize};
use slog::{o, warn, Discard, Logger};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The file name used when none is given.
pub const DEFAULT_FILENAME: &str = "log.txt";

/// A listener that writes every message to a file and flushes it.
///
/// The file is opened when the listener is made. If it cannot be opened the
/// listener stays inert: messages are dropped and [`is_created`] returns
/// `false`.
///
/// # Examples
///
/// ```
/// use logcast::Listener;
/// use logcast::file::FileListener;
/// use logcast::types::Severity;
///
/// let dir = tempfile::tempdir().unwrap();
/// let file = FileListener::new("app.log", dir.path());
/// assert!(file.is_created());
///
/// file.notify("hello\n", Severity::Info);
/// let text = std::fs::read_to_string(dir.path().join("app.log")).unwrap();
/// assert_eq!(text, "hello\n");
/// ```
///
/// [`is_created`]: #method.is_created
#[derive(Debug)]
pub struct FileListener {
    target: Mutex<Target>,
    append: bool,
    restrict_permissions: bool,
    diagnostics: Logger,
}
impl FileListener {
    /// Opens (truncating) `file_name` in `directory`.
    ///
    /// An empty `file_name` means [`DEFAULT_FILENAME`]; an empty `directory`
    /// means the current directory.
    ///
    /// [`DEFAULT_FILENAME`]: constant.DEFAULT_FILENAME.html
    pub fn new<P: AsRef<Path>>(file_name: &str, directory: P) -> Self {
        let mut builder = FileListenerBuilder::new();
        builder.directory(directory);
        if !file_name.is_empty() {
            builder.file_name(file_name);
        }
        builder.finish()
    }

    /// Returns `true` if the current target file is open.
    pub fn is_created(&self) -> bool {
        self.lock().file.is_some()
    }

    /// Returns the name of the current target file.
    pub fn file_name(&self) -> String {
        self.lock().file_name.clone()
    }

    /// Returns the full path of the current target file.
    pub fn path(&self) -> PathBuf {
        self.lock().path()
    }

    /// Closes the current file and opens `file_name` in the same directory.
    ///
    /// Returns `true` if the new file could be opened. On failure the
    /// listener becomes inert until the next successful change.
    pub fn change_file(&self, file_name: &str) -> bool {
        let mut target = self.lock();
        target.file = None;
        target.file_name = file_name.to_owned();
        self.open(&mut target)
    }

    fn open(&self, target: &mut Target) -> bool {
        let path = target.path();
        let mut options = OpenOptions::new();
        options.create(true).write(true);
        if self.append {
            options.append(true);
        } else {
            options.truncate(true);
        }

        let result = options.open(&path).and_then(|file| {
            if self.restrict_permissions {
                restrict_file_permissions(file)
            } else {
                Ok(file)
            }
        });
        match result {
            Ok(file) => {
                target.file = Some(file);
                true
            }
            Err(e) => {
                warn!(self.diagnostics, "Cannot open log file";
                      "path" => %path.display(), "error" => %e);
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<Target> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
impl Listener for FileListener {
    fn notify(&self, message: &str, _level: Severity) {
        let mut target = self.lock();
        if let Some(ref mut file) = target.file {
            let _ = write_and_flush(file, message);
        }
    }
}

fn write_and_flush(file: &mut File, message: &str) -> io::Result<()> {
    file.write_all(message.as_bytes())?;
    file.flush()
}

#[derive(Debug)]
struct Target {
    directory: PathBuf,
    file_name: String,
    file: Option<File>,
}
impl Target {
    fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// A builder of `FileListener` instances.
#[derive(Debug)]
pub struct FileListenerBuilder {
    directory: PathBuf,
    file_name: String,
    append: bool,
    restrict_permissions: bool,
    diagnostics: Option<Logger>,
}
impl FileListenerBuilder {
    /// Makes a new `FileListenerBuilder` targeting [`DEFAULT_FILENAME`] in
    /// the current directory.
    ///
    /// [`DEFAULT_FILENAME`]: constant.DEFAULT_FILENAME.html
    pub fn new() -> Self {
        FileListenerBuilder {
            directory: PathBuf::new(),
            file_name: DEFAULT_FILENAME.to_owned(),
            append: false,
            restrict_permissions: false,
            diagnostics: None,
        }
    }

    /// Sets the name of the target file.
    pub fn file_name(&mut self, file_name: impl Into<String>) -> &mut Self {
        self.file_name = file_name.into();
        self
    }

    /// Sets the directory the target file (and every later one) lives in.
    pub fn directory<P: AsRef<Path>>(&mut self, directory: P) -> &mut Self {
        self.directory = directory.as_ref().to_path_buf();
        self
    }

    /// Keeps the existing contents of the file and appends to them.
    pub fn append(&mut self) -> &mut Self {
        self.append = true;
        self
    }

    /// Truncates the file when it is opened. This is the default.
    pub fn truncate(&mut self) -> &mut Self {
        self.append = false;
        self
    }

    /// Whether to restrict the log file to its owner (`600` on unix).
    pub fn restrict_permissions(&mut self, restrict: bool) -> &mut Self {
        self.restrict_permissions = restrict;
        self
    }

    /// Sets the logger told about files that cannot be opened.
    pub fn diagnostics(&mut self, logger: Logger) -> &mut Self {
        self.diagnostics = Some(logger);
        self
    }

    fn finish(&self) -> FileListener {
        let listener = FileListener {
            target: Mutex::new(Target {
                directory: self.directory.clone(),
                file_name: self.file_name.clone(),
                file: None,
            }),
            append: self.append,
            restrict_permissions: self.restrict_permissions,
            diagnostics: self
                .diagnostics
                .clone()
                .unwrap_or_else(|| Logger::root(Discard, o!())),
        };
        {
            let mut target = listener.lock();
            listener.open(&mut target);
        }
        listener
    }
}
impl Default for FileListenerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
impl Build for FileListenerBuilder {
    type Listener = FileListener;
    fn build(&self) -> Result<FileListener> {
        track_assert!(
            !self.file_name.is_empty(),
            ErrorKind::Invalid,
            "Empty log file name"
        );
        Ok(self.finish())
    }
}

/// The configuration of `FileListenerBuilder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct FileListenerConfig {
    /// Name of the target file.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Directory of the target file.
    #[serde(default)]
    pub directory: PathBuf,

    /// Append to an existing file instead of truncating it.
    #[serde(default)]
    pub append: bool,

    /// Restrict the file to its owner.
    #[serde(default)]
    pub restrict_permissions: bool,
}
impl FileListenerConfig {
    /// Creates a new `FileListenerConfig` with default settings.
    pub fn new() -> Self {
        Default::default()
    }
}
impl Default for FileListenerConfig {
    fn default() -> Self {
        FileListenerConfig {
            file_name: default_file_name(),
            directory: PathBuf::new(),
            append: false,
            restrict_permissions: false,
        }
    }
}
impl Config for FileListenerConfig {
    type Builder = FileListenerBuilder;
    fn try_to_builder(&self) -> Result<Self::Builder> {
        let mut builder = FileListenerBuilder::new();
        builder.file_name(self.file_name.clone());
        builder.directory(&self.directory);
        if self.append {
            builder.append();
        }
        builder.restrict_permissions(self.restrict_permissions);
        Ok(builder)
    }
}

fn default_file_name() -> String {
    DEFAULT_FILENAME.to_owned()
}
