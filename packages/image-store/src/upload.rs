use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An uploaded file handed over by the host framework.
///
/// An upload with an empty filename is treated as absent.
pub trait Upload {
    /// Original filename as supplied by the client.
    fn filename(&self) -> &str;

    /// Write the upload's bytes to `path`.
    fn save(&self, path: &Path) -> io::Result<()>;
}

/// Upload held in memory.
#[derive(Debug, Clone)]
pub struct BytesUpload {
    filename: String,
    data: Vec<u8>,
}

impl BytesUpload {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Upload for BytesUpload {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn save(&self, path: &Path) -> io::Result<()> {
        write_new(path, |file| file.write_all(&self.data))
    }
}

/// Upload backed by a file already on local disk, e.g. a framework's spool file.
#[derive(Debug, Clone)]
pub struct FileUpload {
    filename: String,
    source: PathBuf,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
        }
    }

    /// Use the source file's own name as the upload filename.
    pub fn from_path(source: impl Into<PathBuf>) -> Self {
        let source = source.into();
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { filename, source }
    }
}

impl Upload for FileUpload {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn save(&self, path: &Path) -> io::Result<()> {
        let mut reader = fs::File::open(&self.source)?;
        write_new(path, |file| io::copy(&mut reader, file).map(|_| ()))
    }
}

/// Create `path`, which must not exist yet, and fill it with `write`. A
/// partially written file is removed on failure.
fn write_new<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut fs::File) -> io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    if let Err(e) = write(&mut file).and_then(|()| file.flush()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}
