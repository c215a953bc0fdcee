// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Brings every handwriting image to the shape the recognizer
// expects before it reaches the model.
//
// Steps (applied in order):
//   1. Augmentation (training only, off by default):
//        - surround the image with a 4 px white frame
//        - apply a sinusoidal warp: each row is shifted
//          horizontally by ax·sin(2πi/px) and each column
//          vertically by ay·cos(2πj/py), with (ax, px) and
//          (ay, py) drawn from small fixed tables
//   2. Fit into the target canvas with nearest-neighbour scaling,
//      keeping the aspect ratio, centred on a white background.
//      With dynamic width only the height is fixed and the canvas
//      width follows the scaled image (plus padding, rounded up
//      to a multiple of 4).
//
// Canvas sizes: 128x32 for single words, 256x32 for text lines.

use std::f64::consts::PI;

use anyhow::Result;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::sample::{Batch, GrayImage};
use crate::domain::traits::BatchProcessor;

/// Fixed input height of the recognizer
pub const IMG_HEIGHT: usize = 32;

const WHITE: u8 = 255;
const FRAME: usize = 4;

// (amplitude, period) pairs for the horizontal and vertical warp
const X_WARP: [(f64, f64); 4] = [(2.0, 30.0), (2.0, 50.0), (4.0, 80.0), (2.0, 80.0)];
const Y_WARP: [(f64, f64); 3] = [(2.0, 30.0), (4.0, 80.0), (2.0, 70.0)];

/// Canvas size `(width, height)` for word or line mode
pub fn img_size(line_mode: bool) -> (usize, usize) {
    if line_mode {
        (256, IMG_HEIGHT)
    } else {
        (128, IMG_HEIGHT)
    }
}

pub struct Preprocessor {
    img_size:          (usize, usize),
    data_augmentation: bool,
    dynamic_width:     bool,
    padding:           usize,
    rng:               StdRng,
}

impl Preprocessor {
    /// Fixed-canvas preprocessor with augmentation disabled
    pub fn new(img_size: (usize, usize)) -> Self {
        Self {
            img_size,
            data_augmentation: false,
            dynamic_width: false,
            padding: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Let the canvas width follow the image; used for inference
    pub fn with_dynamic_width(mut self, padding: usize) -> Self {
        self.dynamic_width = true;
        self.padding = padding;
        self
    }

    /// Make augmentation reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn augmentation(&self) -> bool {
        self.data_augmentation
    }

    fn warp(&mut self, img: &GrayImage) -> GrayImage {
        let framed = add_frame(img, FRAME);
        let (ax, px) = *X_WARP.choose(&mut self.rng).unwrap_or(&X_WARP[0]);
        let (ay, py) = *Y_WARP.choose(&mut self.rng).unwrap_or(&Y_WARP[0]);

        let rows = framed.height as i64;
        let cols = framed.width as i64;
        let mut out = GrayImage::filled(framed.width, framed.height, WHITE);

        for i in 0..rows {
            let dx = (ax * (2.0 * PI * i as f64 / px).sin()) as i64;
            for j in 0..cols {
                let dy = (ay * (2.0 * PI * j as f64 / py).cos()) as i64;
                if i + dy < rows && j + dx < cols {
                    let src_y = (i + dy).rem_euclid(rows) as usize;
                    let src_x = (j + dx).rem_euclid(cols) as usize;
                    out.set(j as usize, i as usize, framed.get(src_x, src_y));
                }
            }
        }
        out
    }

    fn fit(&self, img: &GrayImage) -> GrayImage {
        let (wt, ht) = self.img_size;

        if self.dynamic_width {
            let f = ht as f64 / img.height as f64;
            let scaled_w = ((img.width as f64 * f) as usize).max(1);
            let canvas_w = round_up_to_4(scaled_w + self.padding);
            let scaled = resize_nearest(img, scaled_w, ht);
            return paste_centered(&scaled, canvas_w, ht);
        }

        let f = (wt as f64 / img.width as f64).min(ht as f64 / img.height as f64);
        let w = ((img.width  as f64 * f) as usize).clamp(1, wt);
        let h = ((img.height as f64 * f) as usize).clamp(1, ht);
        let scaled = resize_nearest(img, w, h);
        paste_centered(&scaled, wt, ht)
    }
}

impl BatchProcessor for Preprocessor {
    fn set_augmentation(&mut self, enabled: bool) {
        self.data_augmentation = enabled;
    }

    fn process_batch(&mut self, batch: Batch) -> Result<Batch> {
        let images = batch
            .images
            .iter()
            .map(|img| self.process_img(img))
            .collect::<Result<Vec<_>>>()?;
        Ok(Batch { images, gt_texts: batch.gt_texts, size: batch.size })
    }

    fn process_img(&mut self, img: &GrayImage) -> Result<GrayImage> {
        // damaged scans come through as empty images
        if img.width == 0 || img.height == 0 {
            let (wt, ht) = self.img_size;
            return Ok(GrayImage::filled(wt, ht, WHITE));
        }

        if self.data_augmentation {
            let warped = self.warp(img);
            Ok(self.fit(&warped))
        } else {
            Ok(self.fit(img))
        }
    }
}

fn round_up_to_4(n: usize) -> usize {
    n.div_ceil(4) * 4
}

fn add_frame(img: &GrayImage, size: usize) -> GrayImage {
    let mut out = GrayImage::filled(img.width + 2 * size, img.height + 2 * size, WHITE);
    for y in 0..img.height {
        for x in 0..img.width {
            out.set(x + size, y + size, img.get(x, y));
        }
    }
    out
}

fn resize_nearest(img: &GrayImage, w: usize, h: usize) -> GrayImage {
    let mut out = GrayImage::filled(w, h, WHITE);
    for y in 0..h {
        let sy = (y * img.height / h).min(img.height - 1);
        for x in 0..w {
            let sx = (x * img.width / w).min(img.width - 1);
            out.set(x, y, img.get(sx, sy));
        }
    }
    out
}

fn paste_centered(img: &GrayImage, w: usize, h: usize) -> GrayImage {
    let mut out = GrayImage::filled(w, h, WHITE);
    let tx = w.saturating_sub(img.width) / 2;
    let ty = h.saturating_sub(img.height) / 2;
    for y in 0..img.height.min(h) {
        for x in 0..img.width.min(w) {
            out.set(x + tx, y + ty, img.get(x, y));
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn ink(w: usize, h: usize) -> GrayImage {
        GrayImage::filled(w, h, 0)
    }

    #[test]
    fn test_img_size_per_mode() {
        assert_eq!(img_size(false), (128, 32));
        assert_eq!(img_size(true), (256, 32));
    }

    #[test]
    fn test_output_has_canvas_size() {
        let mut p = Preprocessor::new((128, 32));
        for (w, h) in [(10, 10), (500, 40), (30, 300), (1, 1)] {
            let out = p.process_img(&ink(w, h)).unwrap();
            assert_eq!((out.width, out.height), (128, 32), "input {w}x{h}");
        }
    }

    #[test]
    fn test_fit_keeps_aspect_and_centres() {
        let mut p = Preprocessor::new((128, 32));
        // 64x16 scales by 2 to 128x32: the whole canvas is ink
        let out = p.process_img(&ink(64, 16)).unwrap();
        assert!(out.pixels.iter().all(|&v| v == 0));

        // 16x16 scales to 32x32, centred with 48 px of white each side
        let out = p.process_img(&ink(16, 16)).unwrap();
        assert_eq!(out.get(0, 16), WHITE);
        assert_eq!(out.get(64, 16), 0);
        assert_eq!(out.get(127, 16), WHITE);
    }

    #[test]
    fn test_dynamic_width_rounds_to_multiple_of_four() {
        let mut p = Preprocessor::new((128, 32)).with_dynamic_width(16);
        let out = p.process_img(&ink(50, 16)).unwrap();
        // 50 * 2 = 100, + 16 padding = 116
        assert_eq!(out.height, 32);
        assert_eq!(out.width, 116);

        let out = p.process_img(&ink(51, 16)).unwrap();
        assert_eq!(out.width % 4, 0);
    }

    #[test]
    fn test_empty_image_becomes_blank_canvas() {
        let mut p = Preprocessor::new((128, 32));
        let out = p.process_img(&GrayImage::filled(0, 0, 0)).unwrap();
        assert_eq!((out.width, out.height), (128, 32));
        assert!(out.pixels.iter().all(|&v| v == WHITE));
    }

    #[test]
    fn test_augmentation_is_seeded_and_keeps_canvas() {
        let img = GrayImage::new(8, 4, (0..32).map(|v| v as u8 * 7).collect()).unwrap();

        let mut a = Preprocessor::new((64, 32)).with_seed(7);
        let mut b = Preprocessor::new((64, 32)).with_seed(7);
        a.set_augmentation(true);
        b.set_augmentation(true);

        let out_a = a.process_img(&img).unwrap();
        let out_b = b.process_img(&img).unwrap();
        assert_eq!(out_a, out_b);
        assert_eq!((out_a.width, out_a.height), (64, 32));
    }

    #[test]
    fn test_frame_is_white() {
        let framed = add_frame(&ink(2, 2), FRAME);
        assert_eq!((framed.width, framed.height), (10, 10));
        assert_eq!(framed.get(0, 0), WHITE);
        assert_eq!(framed.get(4, 4), 0);
    }

    #[test]
    fn test_process_batch_keeps_texts_and_order() {
        let mut p = Preprocessor::new((16, 8));
        let batch = Batch::labelled(vec![ink(4, 2), ink(2, 4)], vec!["x".into(), "y".into()]);
        let out = p.process_batch(batch).unwrap();
        assert_eq!(out.size, 2);
        assert_eq!(out.texts(), ["x".to_string(), "y".to_string()]);
        assert!(out.images.iter().all(|i| (i.width, i.height) == (16, 8)));
    }
}
