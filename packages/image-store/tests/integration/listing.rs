use std::path::PathBuf;

use image_store::BytesUpload;

use crate::common::{IMAGES_URL, Product, TestStore};

#[test]
fn paths_follow_category_and_key() {
    let app = TestStore::spawn();
    let owner = Product::new(42);

    assert_eq!(
        app.store.directory_for(&owner).unwrap(),
        app.root.path().join("images").join("product").join("42")
    );
    assert_eq!(
        app.store.url_for(&owner).unwrap(),
        format!("{IMAGES_URL}/product/42")
    );
}

#[test]
fn empty_owner_has_no_images() {
    let app = TestStore::spawn();
    let owner = Product::new(1);

    assert_eq!(app.store.default_filename(&owner).unwrap(), None);
    assert_eq!(app.store.default_image_path(&owner).unwrap(), None);
    assert_eq!(app.store.default_image_url(&owner).unwrap(), None);
    assert_eq!(app.store.supplementary_filenames(&owner).unwrap().count(), 0);
    assert_eq!(app.store.supplementary_image_urls(&owner).unwrap().count(), 0);

    let images = app.store.images(&owner).unwrap();
    assert!(images.default.is_none());
    assert!(images.supplementary.is_empty());
}

#[test]
fn derived_accessors_join_directory_and_url() {
    let app = TestStore::spawn();
    let owner = Product::new(2);
    let cover = app
        .store
        .save_default(&owner, &BytesUpload::new("cover.png", b"C".to_vec()))
        .unwrap();
    let logo = app
        .store
        .save_supplementary(&owner, &BytesUpload::new("logo.gif", b"L".to_vec()))
        .unwrap();

    assert_eq!(
        app.store.default_image_path(&owner).unwrap(),
        Some(app.dir(&owner).join(&cover))
    );
    assert_eq!(
        app.store.default_image_url(&owner).unwrap(),
        Some(format!("{IMAGES_URL}/product/2/{cover}"))
    );

    let paths: Vec<PathBuf> = app
        .store
        .supplementary_image_paths(&owner)
        .unwrap()
        .collect();
    assert_eq!(paths, vec![app.dir(&owner).join(&logo)]);

    let urls: Vec<String> = app
        .store
        .supplementary_image_urls(&owner)
        .unwrap()
        .collect();
    assert_eq!(urls, vec![format!("{IMAGES_URL}/product/2/{logo}")]);
}

#[test]
fn supplementary_filenames_exclude_default() {
    let app = TestStore::spawn();
    let owner = Product::new(3);
    app.place(&owner, "^cover.png");
    app.place(&owner, "b.png");
    app.place(&owner, "a.png");

    let mut names: Vec<String> = app.store.supplementary_filenames(&owner).unwrap().collect();
    names.sort();
    assert_eq!(names, vec!["a.png", "b.png"]);
}

#[test]
fn images_snapshot_serializes() {
    let app = TestStore::spawn();
    let owner = Product::new(4);
    app.place(&owner, "^cover.png");
    app.place(&owner, "b.png");
    app.place(&owner, "a.png");

    let images = app.store.images(&owner).unwrap();
    let names: Vec<&str> = images
        .supplementary
        .iter()
        .map(|image| image.filename.as_str())
        .collect();
    assert_eq!(names, vec!["a.png", "b.png"]);

    let json = serde_json::to_value(&images).unwrap();
    assert_eq!(json["default"]["filename"], "^cover.png");
    assert_eq!(json["default"]["url"], format!("{IMAGES_URL}/product/4/^cover.png"));
    assert_eq!(json["supplementary"][1]["url"], format!("{IMAGES_URL}/product/4/b.png"));
}
