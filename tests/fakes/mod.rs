#![allow(dead_code)]

use std::io::Cursor;
use anyhow::{anyhow, bail};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use ndarray::{Array, Axis, IxDyn};
use bayam_detect::common::PredsLayout;
use bayam_detect::data::X;
use bayam_detect::detection_runners::Inference;

pub const SOIL: Rgb<u8> = Rgb([92, 64, 51]);
pub const LEAF: Rgb<u8> = Rgb([34, 177, 76]);

/// Soil-coloured image with one leaf-green rectangle on it.
pub fn field_with_leaf(width: u32, height: u32, leaf: Option<Rect>) -> RgbImage {
    let mut img = RgbImage::from_pixel(width, height, SOIL);
    if let Some(rect) = leaf {
        draw_filled_rect_mut(&mut img, rect, LEAF);
    }
    img
}

pub fn png_bytes(img: &RgbImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Always answers with the same head, whatever the input.
pub struct FixedHead(pub X);

impl FixedHead {
    pub fn rows(rows: &[[f32; 6]]) -> Self {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Self(X::from_shape_vec(&[1, rows.len(), 6], flat).unwrap())
    }

    /// Rows of any width, all the same length.
    pub fn wide(rows: &[&[f32]]) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let flat: Vec<f32> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self(X::from_shape_vec(&[1, rows.len(), cols], flat).unwrap())
    }
}

impl Inference for FixedHead {
    fn infer(&self, _xs: &X) -> anyhow::Result<X> {
        Ok(self.0.clone())
    }
}

/// Stand-in for a trained model: finds the green blob in the input tensor
/// and reports its bounding box in canvas pixels.
pub struct LeafFinder {
    pub layout: PredsLayout,
    pub score: f32,
}

impl LeafFinder {
    pub fn new(layout: PredsLayout) -> Self {
        Self { layout, score: 0.95 }
    }
}

impl Inference for LeafFinder {
    fn infer(&self, xs: &X) -> anyhow::Result<X> {
        let shape = xs.shape().to_vec();
        if shape.len() != 4 || shape[0] != 1 || shape[1] != 3 {
            bail!("unexpected input shape {:?}", shape);
        }
        let (h, w) = (shape[2], shape[3]);

        let (mut x_min, mut y_min, mut x_max, mut y_max) = (usize::MAX, usize::MAX, 0, 0);
        for y in 0..h {
            for x in 0..w {
                let (r, g, b) = (xs[[0, 0, y, x]], xs[[0, 1, y, x]], xs[[0, 2, y, x]]);
                if g > 0.55 && r < 0.3 && b < 0.45 {
                    x_min = x_min.min(x);
                    y_min = y_min.min(y);
                    x_max = x_max.max(x + 1);
                    y_max = y_max.max(y + 1);
                }
            }
        }

        let rows: Vec<f32> = if x_min == usize::MAX {
            Vec::new()
        } else {
            let (bw, bh) = ((x_max - x_min) as f32, (y_max - y_min) as f32);
            let (cx, cy) = (x_min as f32 + bw / 2., y_min as f32 + bh / 2.);
            match self.layout {
                PredsLayout::AnchorsFirst => vec![cx, cy, bw, bh, self.score, 1.0],
                PredsLayout::AnchorsLast => vec![cx, cy, bw, bh, self.score],
            }
        };
        let n_boxes = if rows.is_empty() { 0 } else { 1 };
        let n_vals = self.layout.class_offset() + 1;

        let head = Array::from_shape_vec(IxDyn(&[1, n_boxes, n_vals]), rows)?;
        let head = match self.layout {
            PredsLayout::AnchorsFirst => head,
            PredsLayout::AnchorsLast => {
                let mut t = head.index_axis(Axis(0), 0).reversed_axes().to_owned();
                t.insert_axis_inplace(Axis(0));
                t
            }
        };
        Ok(X::from(head))
    }

    fn names(&self) -> Option<&[String]> {
        None
    }
}

pub struct Broken;

impl Inference for Broken {
    fn infer(&self, _xs: &X) -> anyhow::Result<X> {
        Err(anyhow!("device lost"))
    }
}
