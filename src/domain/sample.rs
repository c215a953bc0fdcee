// ============================================================
// Layer 3 — Sample and Batch Domain Types
// ============================================================
// A Sample is one (image, ground-truth text) pair from the corpus.
// A Batch is the ephemeral unit handed to the preprocessor and the
// model: images, the parallel ground-truth texts (absent during
// inference) and the number of images.
//
// Reference: Rust Book §5 (Structs and Methods)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which partition a cursor is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorMode {
    Train,
    Validation,
}

impl fmt::Display for CursorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorMode::Train      => write!(f, "train"),
            CursorMode::Validation => write!(f, "validation"),
        }
    }
}

/// An 8-bit grayscale image stored row-major.
/// 0 is black ink, 255 is white paper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrayImage {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl GrayImage {
    /// Build an image from raw pixels.
    /// Returns None when `pixels.len() != width * height` or the
    /// product overflows.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        (width.checked_mul(height) == Some(pixels.len())).then_some(Self { width, height, pixels })
    }

    /// An image of the given size filled with one value
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self { width, height, pixels: vec![value; width * height] }
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.pixels[y * self.width + x] = value;
    }

    /// True when the pixel buffer matches the declared dimensions.
    /// Dimensions whose product overflows are never consistent.
    pub fn is_consistent(&self) -> bool {
        self.width.checked_mul(self.height) == Some(self.pixels.len())
    }
}

/// One labelled corpus entry. Immutable once constructed:
/// fields are private and only exposed through borrows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    image: GrayImage,
    text:  String,
}

impl Sample {
    pub fn new(image: GrayImage, text: impl Into<String>) -> Self {
        Self { image, text: text.into() }
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A batch of images on their way to the model.
///
/// `gt_texts` is parallel to `images` when present; inference
/// batches carry no ground truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub images:   Vec<GrayImage>,
    pub gt_texts: Option<Vec<String>>,
    pub size:     usize,
}

impl Batch {
    /// A labelled batch (training or validation)
    pub fn labelled(images: Vec<GrayImage>, gt_texts: Vec<String>) -> Self {
        let size = images.len();
        Self { images, gt_texts: Some(gt_texts), size }
    }

    /// An unlabelled batch (inference)
    pub fn unlabelled(images: Vec<GrayImage>) -> Self {
        let size = images.len();
        Self { images, gt_texts: None, size }
    }

    /// Ground-truth texts, or an empty slice for inference batches
    pub fn texts(&self) -> &[String] {
        self.gt_texts.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_pixel_count() {
        assert!(GrayImage::new(2, 2, vec![0; 3]).is_none());
        assert!(GrayImage::new(2, 2, vec![0; 4]).is_some());
    }

    #[test]
    fn test_overflowing_dimensions_are_inconsistent() {
        let huge = 1usize << (usize::BITS / 2 + 1);
        assert!(GrayImage::new(huge, huge, vec![0]).is_none());

        let img = GrayImage { width: huge, height: huge, pixels: vec![0] };
        assert!(!img.is_consistent());
    }

    #[test]
    fn test_get_and_set_are_row_major() {
        let mut img = GrayImage::filled(3, 2, 255);
        img.set(2, 1, 7);
        assert_eq!(img.pixels[5], 7);
        assert_eq!(img.get(2, 1), 7);
    }

    #[test]
    fn test_batch_constructors_track_size() {
        let imgs = vec![GrayImage::filled(1, 1, 0); 3];
        let b = Batch::labelled(imgs.clone(), vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(b.size, 3);
        assert_eq!(b.texts().len(), 3);

        let u = Batch::unlabelled(imgs);
        assert_eq!(u.size, 3);
        assert!(u.texts().is_empty());
    }
}
