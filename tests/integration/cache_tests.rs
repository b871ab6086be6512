//! Layer cache behavior across files and threads.

use std::sync::Arc;

use super::test_utils::*;

use tiff_layers::{fingerprint, LayerCache, LayerError};

#[test]
fn test_identical_content_shares_an_entry() {
    let cache = LayerCache::new(8);
    let tiff = create_two_layer_tiff();

    // Same bytes arriving from two different places
    let first = cache.get_or_extract(tiff.clone()).unwrap();
    let second = cache.get_or_extract(tiff.clone()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&fingerprint(&tiff)).unwrap().total_layers, 2);
}

#[test]
fn test_changed_content_misses() {
    let cache = LayerCache::new(8);
    let original = create_two_layer_tiff();

    let block = ResourceBlockBuilder::new().resource(1058, &[0; 8]).build();
    let edited = create_layered_tiff(200, 100, block);

    let before = cache.get_or_extract(original).unwrap();
    let after = cache.get_or_extract(edited).unwrap();

    assert_eq!(before.total_layers, 2);
    assert_eq!(after.total_layers, 0);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_failures_are_retried() {
    let cache = LayerCache::new(8);
    let tiff = TiffBuilder::new().add_ifd(IfdBuilder::rgb(4, 4)).build();

    assert_eq!(
        cache.get_or_extract(tiff.clone()).map(|d| d.total_layers),
        Err(LayerError::NoPhotoshopData)
    );
    assert!(cache.is_empty());
    assert!(cache.get_or_extract(tiff).is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_shared_between_threads() {
    let cache = Arc::new(LayerCache::new(4));
    let tiff = create_two_layer_tiff();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let tiff = tiff.clone();
            scope.spawn(move || {
                let data = cache.get_or_extract(tiff).unwrap();
                assert_eq!(data.total_layers, 2);
            });
        }
    });

    assert_eq!(cache.len(), 1);
}
