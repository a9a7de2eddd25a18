//! Letterbox resize and tensor encoding for square-input detectors.

use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use crate::common::BayamImage;
use crate::detection_runners::ort_detector::input_wrapper::X;
use crate::error::DetectError;
use crate::Result;

/// Neutral gray used for the letterbox border.
pub const PAD_VALUE: u8 = 114;

/// Geometry needed to undo a letterbox.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageTransformInfo {
    pub width_src: u32,
    pub height_src: u32,
    pub width_resized: u32,
    pub height_resized: u32,
    pub target_size: u32,
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
}

impl ImageTransformInfo {
    /// Computes the letterbox geometry of a `width_src x height_src` image
    /// placed on a `target_size` square.
    pub fn new(width_src: u32, height_src: u32, target_size: u32) -> Result<Self> {
        if target_size == 0 {
            return Err(DetectError::invalid("target size must be positive"));
        }
        if width_src == 0 || height_src == 0 {
            return Err(DetectError::invalid(format!(
                "image has zero size ({width_src}x{height_src})"
            )));
        }
        let target = target_size as f64;
        let scale = (target / width_src as f64).min(target / height_src as f64);
        let width_resized = ((width_src as f64 * scale).round() as u32).clamp(1, target_size);
        let height_resized = ((height_src as f64 * scale).round() as u32).clamp(1, target_size);

        Ok(Self {
            width_src,
            height_src,
            width_resized,
            height_resized,
            target_size,
            scale: scale as f32,
            pad_x: (target_size - width_resized) / 2,
            pad_y: (target_size - height_resized) / 2,
        })
    }

    /// Maps a source image point onto the canvas.
    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.pad_x as f32, y * self.scale + self.pad_y as f32)
    }

    /// Maps a canvas point back onto the source image.
    pub fn to_source(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x as f32) / self.scale, (y - self.pad_y as f32) / self.scale)
    }
}

/// Letterboxed canvas and the transform that produced it.
#[derive(Debug, Clone)]
pub struct Letterbox {
    pub canvas: RgbImage,
    pub transform: ImageTransformInfo,
}

/// Fits `img` into a `target_size` square, keeping the aspect ratio and
/// centering it on a gray background.
pub fn letterbox(img: &BayamImage, target_size: u32) -> Result<Letterbox> {
    let (w0, h0) = img.dimensions();
    let transform = ImageTransformInfo::new(w0, h0, target_size)?;
    let (new_w, new_h) = (transform.width_resized, transform.height_resized);

    let resized = if (new_w, new_h) == (w0, h0) {
        img.as_raw().clone()
    } else {
        resize_bilinear(img, new_w, new_h)?
    };

    let ts = target_size as usize;
    let mut padded = vec![PAD_VALUE; ts * ts * 3];
    let row_bytes = new_w as usize * 3;
    for y in 0..new_h as usize {
        let src_offset = y * row_bytes;
        let dst_offset = ((y + transform.pad_y as usize) * ts + transform.pad_x as usize) * 3;
        padded[dst_offset..dst_offset + row_bytes]
            .copy_from_slice(&resized[src_offset..src_offset + row_bytes]);
    }

    let canvas = RgbImage::from_raw(target_size, target_size, padded)
        .ok_or_else(|| DetectError::Resize("canvas buffer size mismatch".to_string()))?;

    Ok(Letterbox { canvas, transform })
}

fn resize_bilinear(img: &RgbImage, dst_w: u32, dst_h: u32) -> Result<Vec<u8>> {
    let src_image = FirImage::from_vec_u8(
        img.width(),
        img.height(),
        img.as_raw().clone(),
        PixelType::U8x3,
    )?;
    let mut dst_image = FirImage::new(dst_w, dst_h, PixelType::U8x3);

    let options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    let mut resizer = Resizer::new();
    resizer.resize(&src_image, &mut dst_image, &options)?;

    Ok(dst_image.into_vec())
}

/// Normalizes an RGB canvas to `[0, 1]` and lays it out as `(1, 3, H, W)`.
pub fn encode(canvas: &RgbImage) -> Result<X> {
    let (w, h) = (canvas.width() as usize, canvas.height() as usize);
    let buf = canvas.as_raw();
    let hw = w * h;

    let mut out = vec![0.0f32; buf.len()];
    for (i, px) in buf.chunks_exact(3).enumerate() {
        out[i] = px[0] as f32 / 255.0;          // R
        out[i + hw] = px[1] as f32 / 255.0;     // G
        out[i + 2 * hw] = px[2] as f32 / 255.0; // B
    }

    X::from_shape_vec(&[1, 3, h, w], out)
}
