// SPDX-License-Identifier: GPL-3.0-only

//! Captured photo list
//!
//! Capacity is fixed; capturing into a full store replaces the oldest photo
//! instead of growing the list.

use crate::constants::capture::{PHOTO_CAPACITY, photo_file_name};
use crate::pipelines::photo::CapturedPhoto;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PhotoStore {
    photos: VecDeque<CapturedPhoto>,
    capacity: usize,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::with_capacity(PHOTO_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            photos: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a photo, replacing the oldest one when full
    ///
    /// Returns the photo that was replaced, if any.
    pub fn insert(&mut self, photo: CapturedPhoto) -> Option<CapturedPhoto> {
        let replaced = if self.is_full() {
            self.photos.pop_front()
        } else {
            None
        };
        self.photos.push_back(photo);
        debug!(count = self.photos.len(), replaced = replaced.is_some(), "Photo stored");
        replaced
    }

    pub fn delete(&mut self, index: usize) -> Option<CapturedPhoto> {
        self.photos.remove(index)
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    pub fn get(&self, index: usize) -> Option<&CapturedPhoto> {
        self.photos.get(index)
    }

    /// Most recent photo; this is the one placed on the poster
    pub fn latest(&self) -> Option<&CapturedPhoto> {
        self.photos.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapturedPhoto> {
        self.photos.iter()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.photos.len() >= self.capacity
    }

    /// Download name of the photo at `index`
    pub fn file_name(index: usize) -> String {
        photo_file_name(index + 1)
    }
}

impl Default for PhotoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn photo(shade: u8) -> CapturedPhoto {
        CapturedPhoto::from_image(&RgbaImage::from_pixel(2, 2, Rgba([shade, shade, shade, 255])))
            .unwrap()
    }

    #[test]
    fn test_capacity_one_replaces() {
        let mut store = PhotoStore::new();
        assert!(store.insert(photo(1)).is_none());
        assert!(store.is_full());

        let replaced = store.insert(photo(2)).unwrap();
        assert_eq!(replaced.data_url, photo(1).data_url);
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest().unwrap().data_url, photo(2).data_url);
    }

    #[test]
    fn test_delete_and_clear() {
        let mut store = PhotoStore::new();
        store.insert(photo(1));
        assert!(store.delete(3).is_none());
        assert!(store.delete(0).is_some());
        assert!(store.is_empty());
        assert!(!store.is_full());

        store.insert(photo(1));
        store.clear();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(PhotoStore::file_name(0), "anime-lens-photo-1.png");
        assert_eq!(PhotoStore::file_name(4), "anime-lens-photo-5.png");
    }

    #[test]
    fn test_larger_capacity_appends() {
        let mut store = PhotoStore::with_capacity(2);
        store.insert(photo(1));
        store.insert(photo(2));
        store.insert(photo(3));
        let shades: Vec<_> = store.iter().map(|p| p.data_url.clone()).collect();
        assert_eq!(shades, vec![photo(2).data_url, photo(3).data_url]);
    }
}
