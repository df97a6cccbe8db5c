use crate::error::{ImageStoreError, Result};
use crate::filename::sanitize_filename;

/// An entity that owns an image directory.
pub trait ImageOwner {
    /// Stable classification of the entity, e.g. its type name.
    fn category(&self) -> &str;

    /// The entity's identifier, if it has one.
    fn id(&self) -> Option<String>;

    /// Replaces `id` as the source of the directory name when set.
    fn key_override(&self) -> Option<String> {
        None
    }
}

/// Filesystem-safe directory name for `owner`.
pub fn entity_key<O: ImageOwner + ?Sized>(owner: &O) -> Result<String> {
    let raw = owner.key_override().or_else(|| owner.id()).ok_or_else(|| {
        ImageStoreError::Identity(format!(
            "{} has no id; provide one or override key_override to name its image directory",
            owner.category()
        ))
    })?;

    let key = sanitize_filename(&raw);
    if key.is_empty() {
        return Err(ImageStoreError::Identity(format!(
            "{} identifier {raw:?} is not usable as a directory name",
            owner.category()
        )));
    }
    Ok(key)
}
