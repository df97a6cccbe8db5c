use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ImageStoreError, Result};
use crate::marker::Marker;

/// Open a directory for listing. A missing directory means nothing has been
/// saved for the owner yet and yields `None`.
pub(crate) fn open_listing(path: &Path) -> Result<Option<ReadDir>> {
    match fs::read_dir(path) {
        Ok(entries) => Ok(Some(entries)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(
                path = %path.display(),
                "Image directory does not exist; no images have been saved for this owner yet"
            );
            Ok(None)
        }
        Err(e) => Err(ImageStoreError::storage(path, e)),
    }
}

/// One scan of an owner's image directory, split by marker state.
///
/// Names keep the order the filesystem returned them in.
#[derive(Debug, Clone)]
pub struct ImageDirectory {
    path: PathBuf,
    marker: Marker,
    marked: Vec<String>,
    supplementary: Vec<String>,
}

impl ImageDirectory {
    /// Read `path`. Returns `None` if the directory does not exist.
    pub fn scan(path: &Path, marker: &Marker) -> Result<Option<Self>> {
        let Some(entries) = open_listing(path)? else {
            return Ok(None);
        };

        let mut dir = Self {
            path: path.to_path_buf(),
            marker: marker.clone(),
            marked: Vec::new(),
            supplementary: Vec::new(),
        };

        for entry in entries {
            let entry = entry.map_err(|e| ImageStoreError::storage(path, e))?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %path.display(), "Skipping non UTF-8 filename");
                continue;
            };
            if marker.is_marked(&name) {
                dir.marked.push(name);
            } else {
                dir.supplementary.push(name);
            }
        }

        Ok(Some(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The default image: the first marked name found.
    pub fn default(&self) -> Option<&str> {
        self.marked.first().map(String::as_str)
    }

    /// Every marked name. More than one means the single-default rule was broken
    /// from outside.
    pub fn marked(&self) -> &[String] {
        &self.marked
    }

    pub fn supplementary(&self) -> &[String] {
        &self.supplementary
    }

    pub fn contains(&self, name: &str) -> bool {
        self.marked.iter().chain(&self.supplementary).any(|n| n == name)
    }

    /// Rename every marked file to its unmarked name.
    ///
    /// Fails with `Storage` rather than replace a file that already has the
    /// unmarked name.
    pub fn unmark_all(&mut self) -> Result<()> {
        while let Some(name) = self.marked.first().cloned() {
            let plain = self.marker.strip(&name).to_string();
            let src = self.path.join(&name);
            let dst = self.path.join(&plain);
            if dst.try_exists().map_err(|e| ImageStoreError::storage(&dst, e))? {
                warn!(from = %name, to = %plain, "Refusing to unmark over an existing image");
                return Err(ImageStoreError::storage(
                    &dst,
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("cannot unmark {name}: {plain} already exists"),
                    ),
                ));
            }
            fs::rename(&src, &dst).map_err(|e| ImageStoreError::storage(&src, e))?;
            debug!(from = %name, to = %plain, "Unmarked previous default image");
            self.marked.remove(0);
            self.supplementary.push(plain);
        }
        Ok(())
    }

    /// Make the unmarked file `name` the only default. Returns its new name.
    ///
    /// Unmarking and marking are separate renames; a crash or a concurrent
    /// writer between them can leave zero or two marked files.
    pub fn promote(&mut self, name: &str) -> Result<String> {
        if !self.supplementary.iter().any(|n| n == name) {
            return Err(ImageStoreError::NotFound(name.to_string()));
        }

        self.unmark_all()?;

        let marked = self.marker.add(name);
        let src = self.path.join(name);
        let dst = self.path.join(&marked);
        fs::rename(&src, &dst).map_err(|e| ImageStoreError::storage(&src, e))?;

        self.supplementary.retain(|n| n != name);
        self.marked.push(marked.clone());
        Ok(marked)
    }
}

/// Lazily yields the unmarked names in a directory.
///
/// Entries that cannot be read are logged and skipped.
#[derive(Debug)]
pub struct SupplementaryNames {
    entries: Option<ReadDir>,
    marker: Marker,
}

impl SupplementaryNames {
    pub(crate) fn open(path: &Path, marker: &Marker) -> Result<Self> {
        Ok(Self {
            entries: open_listing(path)?,
            marker: marker.clone(),
        })
    }
}

impl Iterator for SupplementaryNames {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let entries = self.entries.as_mut()?;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            match entry.file_name().into_string() {
                Ok(name) if !self.marker.is_marked(&name) => return Some(name),
                Ok(_) => {}
                Err(_) => warn!("Skipping non UTF-8 filename"),
            }
        }
        None
    }
}
