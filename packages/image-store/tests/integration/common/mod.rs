use std::fs;
use std::path::PathBuf;
use std::sync::Once;

use image_store::{ImageOwner, ImageStore, ImageStoreConfig};
use tempfile::TempDir;

pub const IMAGES_URL: &str = "/static/images";

static TRACING: Once = Once::new();

/// An owner as a host model would implement it.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Option<i64>,
}

impl Product {
    pub fn new(id: i64) -> Self {
        Self { id: Some(id) }
    }
}

impl ImageOwner for Product {
    fn category(&self) -> &str {
        "product"
    }

    fn id(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

/// Store rooted in a fresh temporary directory.
pub struct TestStore {
    pub store: ImageStore,
    pub root: TempDir,
}

impl TestStore {
    pub fn spawn() -> Self {
        TRACING.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(tracing::Level::DEBUG)
                .try_init();
        });

        let root = tempfile::tempdir().unwrap();
        let config = ImageStoreConfig::new(root.path().join("images"), IMAGES_URL);
        let store = ImageStore::new(config).unwrap();
        Self { store, root }
    }

    pub fn dir(&self, owner: &Product) -> PathBuf {
        self.store.directory_for(owner).unwrap()
    }

    /// Every filename in the owner's directory, sorted.
    pub fn files(&self, owner: &Product) -> Vec<String> {
        let dir = self.dir(owner);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    /// Filenames carrying the marker, sorted.
    pub fn marked(&self, owner: &Product) -> Vec<String> {
        self.files(owner)
            .into_iter()
            .filter(|name| self.store.has_marker(name))
            .collect()
    }

    /// Put a file in place directly, bypassing the store.
    pub fn place(&self, owner: &Product, name: &str) {
        let dir = self.dir(owner);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), name.as_bytes()).unwrap();
    }
}
