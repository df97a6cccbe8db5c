use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::ImageStoreConfig;
use crate::directory::{ImageDirectory, SupplementaryNames};
use crate::error::{ImageStoreError, Result};
use crate::filename;
use crate::marker::Marker;
use crate::owner::{self, ImageOwner};
use crate::upload::Upload;

/// A stored image, addressed both on disk and by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub filename: String,
    pub path: PathBuf,
    pub url: String,
}

/// Snapshot of an owner's images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageSet {
    pub default: Option<ImageRef>,
    /// Sorted by filename.
    pub supplementary: Vec<ImageRef>,
}

/// Per-owner image directories under `{dir}/{category}/{entity_key}/`, with
/// the default image distinguished by a filename marker.
///
/// Operations are blocking and re-read the directory on every call. Callers
/// must serialize writers to the same owner.
#[derive(Debug, Clone)]
pub struct ImageStore {
    config: ImageStoreConfig,
    marker: Marker,
}

impl ImageStore {
    pub fn new(config: ImageStoreConfig) -> Result<Self> {
        let config = config.normalized()?;
        let marker = Marker::new(config.marker.clone());
        Ok(Self { config, marker })
    }

    pub fn config(&self) -> &ImageStoreConfig {
        &self.config
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn entity_key<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<String> {
        owner::entity_key(owner)
    }

    pub fn directory_for<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<PathBuf> {
        let key = self.entity_key(owner)?;
        Ok(self.config.dir.join(owner.category()).join(key))
    }

    pub fn url_for<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<String> {
        let key = self.entity_key(owner)?;
        Ok(join_url(&self.config.url, &[owner.category(), &key]))
    }

    pub fn is_valid_extension(&self, name: &str) -> bool {
        filename::has_allowed_extension(name, &self.config.allowed_extensions)
    }

    pub fn make_unique_filename(&self, name: &str) -> String {
        filename::make_unique_filename(name)
    }

    pub fn has_marker(&self, name: &str) -> bool {
        self.marker.is_marked(name)
    }

    pub fn add_marker(&self, name: &str) -> String {
        self.marker.add(name)
    }

    pub fn strip_marker<'a>(&self, name: &'a str) -> &'a str {
        self.marker.strip(name)
    }

    /// Create the owner's image directory and its parents if needed.
    pub fn ensure_directory<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<PathBuf> {
        let dir = self.directory_for(owner)?;
        fs::create_dir_all(&dir).map_err(|e| ImageStoreError::storage(&dir, e))?;
        Ok(dir)
    }

    /// Scan the owner's directory. `None` if nothing has been saved yet.
    pub fn scan<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<Option<ImageDirectory>> {
        ImageDirectory::scan(&self.directory_for(owner)?, &self.marker)
    }

    fn validate_upload<U: Upload + ?Sized>(&self, upload: &U) -> Result<()> {
        let name = upload.filename();
        if name.trim().is_empty() {
            return Err(ImageStoreError::Validation(
                "no image was provided to save".into(),
            ));
        }
        if !self.is_valid_extension(name) {
            return Err(ImageStoreError::Validation(format!(
                "invalid or missing file type: {name} (allowed: {})",
                self.config.allowed_extensions.join(", ")
            )));
        }
        Ok(())
    }

    /// Save `upload` as the owner's default image, unmarking any previous
    /// default. Returns the stored filename.
    #[instrument(skip(self, owner, upload), fields(category = owner.category(), upload = upload.filename()))]
    pub fn save_default<O, U>(&self, owner: &O, upload: &U) -> Result<String>
    where
        O: ImageOwner + ?Sized,
        U: Upload + ?Sized,
    {
        self.validate_upload(upload)?;
        let name = self.marker.add(&self.make_unique_filename(upload.filename()));

        let dir = self.ensure_directory(owner)?;
        if let Some(mut listing) = ImageDirectory::scan(&dir, &self.marker)? {
            listing.unmark_all()?;
        }

        let path = dir.join(&name);
        upload
            .save(&path)
            .map_err(|e| ImageStoreError::storage(&path, e))?;

        info!(filename = %name, "Saved default image");
        Ok(name)
    }

    /// Default-image mutator; same as [`ImageStore::save_default`].
    pub fn set_default_image<O, U>(&self, owner: &O, upload: &U) -> Result<String>
    where
        O: ImageOwner + ?Sized,
        U: Upload + ?Sized,
    {
        self.save_default(owner, upload)
    }

    /// Save `upload` without touching the default designation. Returns the
    /// stored filename.
    #[instrument(skip(self, owner, upload), fields(category = owner.category(), upload = upload.filename()))]
    pub fn save_supplementary<O, U>(&self, owner: &O, upload: &U) -> Result<String>
    where
        O: ImageOwner + ?Sized,
        U: Upload + ?Sized,
    {
        self.validate_upload(upload)?;
        let name = self.make_unique_filename(upload.filename());

        let dir = self.ensure_directory(owner)?;
        let path = dir.join(&name);
        upload
            .save(&path)
            .map_err(|e| ImageStoreError::storage(&path, e))?;

        info!(filename = %name, "Saved supplementary image");
        Ok(name)
    }

    /// Filename of the default image, if any.
    pub fn default_filename<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<Option<String>> {
        Ok(self
            .scan(owner)?
            .and_then(|listing| listing.default().map(str::to_string)))
    }

    /// Lazily list every unmarked filename. Empty if the directory is missing.
    pub fn supplementary_filenames<O: ImageOwner + ?Sized>(
        &self,
        owner: &O,
    ) -> Result<SupplementaryNames> {
        SupplementaryNames::open(&self.directory_for(owner)?, &self.marker)
    }

    /// Make `target` the default image.
    ///
    /// `target` may be a bare name or one that already carries the marker;
    /// if it is already the default this is a no-op. Returns the marked name.
    #[instrument(skip(self, owner), fields(category = owner.category()))]
    pub fn swap_default<O: ImageOwner + ?Sized>(&self, owner: &O, target: &str) -> Result<String> {
        let not_found = || {
            ImageStoreError::NotFound(format!(
                "{target} does not exist in this owner's image directory"
            ))
        };

        let mut listing = self.scan(owner)?.ok_or_else(not_found)?;

        if listing.supplementary().iter().any(|name| name == target) {
            let marked = listing.promote(target)?;
            info!(filename = %marked, "Swapped default image");
            return Ok(marked);
        }

        let marked = self.marker.add(target);
        if listing.contains(&marked) {
            debug!(filename = %marked, "Image is already the default");
            return Ok(marked);
        }

        Err(not_found())
    }

    /// Remove the image named exactly `target`.
    ///
    /// The name must match the file on disk, marker included. Returns `false`
    /// if no such file exists.
    #[instrument(skip(self, owner), fields(category = owner.category()))]
    pub fn delete<O: ImageOwner + ?Sized>(&self, owner: &O, target: &str) -> Result<bool> {
        let Some(listing) = self.scan(owner)? else {
            return Ok(false);
        };
        if !listing.contains(target) {
            debug!(filename = %target, "Nothing to delete");
            return Ok(false);
        }

        let path = listing.path().join(target);
        fs::remove_file(&path).map_err(|e| ImageStoreError::storage(&path, e))?;
        info!(filename = %target, "Deleted image");
        Ok(true)
    }

    pub fn default_image_path<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<Option<PathBuf>> {
        let dir = self.directory_for(owner)?;
        Ok(self.default_filename(owner)?.map(|name| dir.join(name)))
    }

    pub fn default_image_url<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<Option<String>> {
        let url = self.url_for(owner)?;
        Ok(self
            .default_filename(owner)?
            .map(|name| join_url(&url, &[&name])))
    }

    pub fn supplementary_image_paths<O: ImageOwner + ?Sized>(
        &self,
        owner: &O,
    ) -> Result<impl Iterator<Item = PathBuf>> {
        let dir = self.directory_for(owner)?;
        Ok(self
            .supplementary_filenames(owner)?
            .map(move |name| dir.join(name)))
    }

    pub fn supplementary_image_urls<O: ImageOwner + ?Sized>(
        &self,
        owner: &O,
    ) -> Result<impl Iterator<Item = String>> {
        let url = self.url_for(owner)?;
        Ok(self
            .supplementary_filenames(owner)?
            .map(move |name| join_url(&url, &[&name])))
    }

    /// Snapshot of the owner's default and supplementary images.
    pub fn images<O: ImageOwner + ?Sized>(&self, owner: &O) -> Result<ImageSet> {
        let Some(listing) = self.scan(owner)? else {
            return Ok(ImageSet::default());
        };
        let url = self.url_for(owner)?;
        let image_ref = |name: &str| ImageRef {
            filename: name.to_string(),
            path: listing.path().join(name),
            url: join_url(&url, &[name]),
        };

        let mut supplementary: Vec<ImageRef> = listing
            .supplementary()
            .iter()
            .map(|name| image_ref(name.as_str()))
            .collect();
        supplementary.sort_by(|a, b| a.filename.cmp(&b.filename));

        Ok(ImageSet {
            default: listing.default().map(image_ref),
            supplementary,
        })
    }
}

/// Join URL segments with `/`, without doubling slashes at the base.
fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in segments {
        if !url.is_empty() || base.starts_with('/') {
            url.push('/');
        }
        url.push_str(segment);
    }
    url
}
