//! Image intake policy: per-listing cap, size ceiling, downsampling bounds,
//! and the ordered selection of hosted image URLs attached to a listing.

use serde::Deserialize;

/// Maximum images attached to one listing.
pub const MAX_IMAGES_PER_LISTING: usize = 10;

/// Files above this size are skipped before upload.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Longest edge, in pixels, an uploaded image may keep.
pub const MAX_IMAGE_DIMENSION: u32 = 1600;

/// JPEG quality used when re-encoding downsampled images.
pub const JPEG_QUALITY: u8 = 82;

/// How a batch of files is split before upload.
///
/// Indices refer to positions in the submitted batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    /// Files to upload, in arrival order.
    pub accepted: Vec<usize>,
    /// Files skipped for exceeding [`MAX_IMAGE_BYTES`].
    pub rejected_oversize: Vec<usize>,
    /// Files never examined because the cap was reached.
    pub truncated: Vec<usize>,
    /// Nothing accepted because the listing already holds the maximum.
    pub cap_reached: bool,
}

/// Remaining capacity for a listing that already has `current_count` images.
#[must_use]
pub const fn remaining_capacity(current_count: usize) -> usize {
    MAX_IMAGES_PER_LISTING.saturating_sub(current_count)
}

/// Split a batch of file sizes into accepted, oversized and truncated files.
///
/// Oversized files do not consume capacity. Once the remaining capacity is
/// filled, every later file is truncated unexamined.
#[must_use]
pub fn plan_batch(current_count: usize, sizes: &[u64]) -> BatchPlan {
    let remaining = remaining_capacity(current_count);
    let mut plan = BatchPlan::default();

    for (index, &size) in sizes.iter().enumerate() {
        if plan.accepted.len() >= remaining {
            plan.truncated.push(index);
            continue;
        }
        if size > MAX_IMAGE_BYTES {
            plan.rejected_oversize.push(index);
            continue;
        }
        plan.accepted.push(index);
    }

    plan.cap_reached = plan.accepted.is_empty() && remaining == 0;
    plan
}

/// Target dimensions for an image, or `None` when it already fits.
///
/// The long edge becomes [`MAX_IMAGE_DIMENSION`] and the short edge keeps the
/// aspect ratio, rounded and never below 1.
#[must_use]
pub fn scaled_dimensions(width: u32, height: u32) -> Option<(u32, u32)> {
    if width <= MAX_IMAGE_DIMENSION && height <= MAX_IMAGE_DIMENSION {
        return None;
    }

    let max = f64::from(MAX_IMAGE_DIMENSION);
    let ratio = f64::from(width) / f64::from(height.max(1));

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = if width > height {
        (MAX_IMAGE_DIMENSION, ((max / ratio).round() as u32).max(1))
    } else {
        (((max * ratio).round() as u32).max(1), MAX_IMAGE_DIMENSION)
    };
    Some(scaled)
}

/// Direction for [`ImageSelection::swap_adjacent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Earlier,
    Later,
}

/// One edit of a listing's image order, as sent by the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ImageEdit {
    /// Append uploaded URLs, truncated at the cap.
    Append { urls: Vec<String> },
    /// Swap with the previous or next image.
    Swap { index: usize, direction: Direction },
    /// Drag to a position.
    Move { from: usize, to: usize },
    /// Drop on the trash target.
    RemoveAt { index: usize },
    /// Delete key on a selected image.
    Remove { url: String },
}

/// Ordered image URLs for a listing, capped at [`MAX_IMAGES_PER_LISTING`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSelection {
    urls: Vec<String>,
}

impl ImageSelection {
    #[must_use]
    pub const fn new() -> Self {
        Self { urls: Vec::new() }
    }

    #[must_use]
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Append URLs up to the cap. Returns how many were added.
    pub fn extend<I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let room = remaining_capacity(self.urls.len());
        let before = self.urls.len();
        self.urls.extend(urls.into_iter().take(room));
        self.urls.len() - before
    }

    /// Swap the image at `index` with its neighbour. Out-of-range moves are
    /// ignored. Returns whether the order changed.
    pub fn swap_adjacent(&mut self, index: usize, direction: Direction) -> bool {
        let other = match direction {
            Direction::Earlier => index.checked_sub(1),
            Direction::Later => index.checked_add(1),
        };
        match other {
            Some(other) if index < self.urls.len() && other < self.urls.len() => {
                self.urls.swap(index, other);
                true
            }
            _ => false,
        }
    }

    /// Move the image at `from` so it ends up at `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from >= self.urls.len() || to >= self.urls.len() || from == to {
            return false;
        }
        let url = self.urls.remove(from);
        self.urls.insert(to, url);
        true
    }

    /// Remove the image at `index`, returning it.
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        (index < self.urls.len()).then(|| self.urls.remove(index))
    }

    /// Remove an image by URL.
    pub fn remove(&mut self, url: &str) -> bool {
        let before = self.urls.len();
        self.urls.retain(|u| u != url);
        self.urls.len() != before
    }

    /// Apply an admin edit. Returns whether the selection changed.
    pub fn apply(&mut self, edit: ImageEdit) -> bool {
        match edit {
            ImageEdit::Append { urls } => self.extend(urls) > 0,
            ImageEdit::Swap { index, direction } => self.swap_adjacent(index, direction),
            ImageEdit::Move { from, to } => self.move_to(from, to),
            ImageEdit::RemoveAt { index } => self.remove_at(index).is_some(),
            ImageEdit::Remove { url } => self.remove(&url),
        }
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

impl From<Vec<String>> for ImageSelection {
    /// Existing listing images; anything past the cap is dropped.
    fn from(mut urls: Vec<String>) -> Self {
        urls.truncate(MAX_IMAGES_PER_LISTING);
        Self { urls }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("/uploads/{n}.jpg")).collect()
    }

    #[test]
    fn test_plan_truncates_to_remaining_capacity() {
        let plan = plan_batch(7, &[MB; 5]);
        assert_eq!(plan.accepted, vec![0, 1, 2]);
        assert_eq!(plan.truncated, vec![3, 4]);
        assert!(plan.rejected_oversize.is_empty());
        assert!(!plan.cap_reached);
    }

    #[test]
    fn test_oversize_does_not_consume_capacity() {
        let plan = plan_batch(8, &[6 * MB, MB, 6 * MB, MB, MB]);
        assert_eq!(plan.accepted, vec![1, 3]);
        assert_eq!(plan.rejected_oversize, vec![0, 2]);
        assert_eq!(plan.truncated, vec![4]);
    }

    #[test]
    fn test_exactly_five_mib_is_accepted() {
        let plan = plan_batch(0, &[MAX_IMAGE_BYTES, MAX_IMAGE_BYTES + 1]);
        assert_eq!(plan.accepted, vec![0]);
        assert_eq!(plan.rejected_oversize, vec![1]);
    }

    #[test]
    fn test_cap_reached() {
        let plan = plan_batch(10, &[MB]);
        assert!(plan.cap_reached);
        assert!(plan.accepted.is_empty());
        assert_eq!(plan.truncated, vec![0]);

        let plan = plan_batch(12, &[]);
        assert!(plan.cap_reached);

        let all_oversize = plan_batch(3, &[6 * MB]);
        assert!(!all_oversize.cap_reached);
    }

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(1600, 1200), None);
        assert_eq!(scaled_dimensions(1600, 1600), None);
        assert_eq!(scaled_dimensions(4000, 3000), Some((1600, 1200)));
        assert_eq!(scaled_dimensions(3000, 4000), Some((1200, 1600)));
        assert_eq!(scaled_dimensions(2000, 2000), Some((1600, 1600)));
        assert_eq!(scaled_dimensions(3333, 1000), Some((1600, 480)));
        assert_eq!(scaled_dimensions(100_000, 10), Some((1600, 1)));
    }

    #[test]
    fn test_selection_extend_caps() {
        let mut selection = ImageSelection::new();
        assert_eq!(selection.extend(urls(&["a", "b", "c", "d", "e", "f", "g", "h"])), 8);
        assert_eq!(selection.extend(urls(&["i", "j", "k"])), 2);
        assert_eq!(selection.len(), MAX_IMAGES_PER_LISTING);
        assert_eq!(selection.urls().last().map(String::as_str), Some("/uploads/j.jpg"));
    }

    #[test]
    fn test_selection_reordering() {
        let mut selection = ImageSelection::new();
        selection.extend(urls(&["a", "b", "c", "d"]));

        assert!(selection.swap_adjacent(0, Direction::Later));
        assert_eq!(selection.thumbnail(), Some("/uploads/b.jpg"));
        assert!(!selection.swap_adjacent(0, Direction::Earlier));
        assert!(!selection.swap_adjacent(3, Direction::Later));

        assert!(selection.move_to(3, 0));
        assert_eq!(selection.urls(), &urls(&["d", "b", "a", "c"])[..]);

        assert_eq!(selection.remove_at(1), Some("/uploads/b.jpg".to_string()));
        assert_eq!(selection.remove_at(9), None);
        assert!(selection.remove("/uploads/c.jpg"));
        assert!(!selection.remove("/uploads/zzz.jpg"));
        assert_eq!(selection.into_vec(), urls(&["d", "a"]));
    }

    #[test]
    fn test_selection_applies_admin_edits() {
        let mut selection = ImageSelection::from(urls(&["a", "b", "c"]));

        let edit: ImageEdit =
            serde_json::from_str(r#"{"op":"swap","index":2,"direction":"earlier"}"#).unwrap();
        assert!(selection.apply(edit));
        assert_eq!(selection.urls(), &urls(&["a", "c", "b"])[..]);

        let edit: ImageEdit = serde_json::from_str(r#"{"op":"move","from":2,"to":0}"#).unwrap();
        assert!(selection.apply(edit));
        assert_eq!(selection.thumbnail(), Some("/uploads/b.jpg"));

        let edit: ImageEdit = serde_json::from_str(r#"{"op":"remove_at","index":1}"#).unwrap();
        assert!(selection.apply(edit));
        assert!(!selection.apply(ImageEdit::RemoveAt { index: 5 }));
        assert!(selection.apply(ImageEdit::Remove {
            url: "/uploads/b.jpg".to_string()
        }));
        assert!(selection.apply(ImageEdit::Append { urls: urls(&["z"]) }));
        assert_eq!(selection.into_vec(), urls(&["c", "z"]));

        assert!(serde_json::from_str::<ImageEdit>(r#"{"op":"shuffle"}"#).is_err());
    }

    #[test]
    fn test_selection_from_existing_is_capped() {
        let names: Vec<String> = (0..12).map(|i| format!("/uploads/{i}.jpg")).collect();
        assert_eq!(ImageSelection::from(names).len(), MAX_IMAGES_PER_LISTING);
    }
}
