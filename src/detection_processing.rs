use ndarray::{s, ArrayView1, ArrayView2};
use crate::common::{BayamBox, BayamDetection, Candidate, NormalizedBox, PredsLayout};
use crate::data::{ImageTransformInfo, PipelineConfig, X};
use crate::detection_runners::ort_detector::nms::nms;
use crate::error::DetectError;
use crate::Result;

/// Lazily turns prediction rows into [`Candidate`]s, in row order.
///
/// Yields an error (and then stops) on the first row carrying a score
/// outside `[0, 1]`, a non-finite box or a negative box size.
pub struct Decoder<'a> {
    preds: ArrayView2<'a, f32>,
    layout: PredsLayout,
    conf_threshold: f32,
    target_class: Option<usize>,
    row: usize,
}

/// Prepares decoding of a single detection head.
///
/// `preds` is the batch-free head output as the model lays it out: one row
/// per box for [`PredsLayout::AnchorsFirst`], one column per box for
/// [`PredsLayout::AnchorsLast`].
pub fn decode(
    preds: ArrayView2<'_, f32>,
    layout: PredsLayout,
    conf_threshold: f32,
    target_class: Option<usize>,
) -> Result<Decoder<'_>> {
    let preds = match layout {
        PredsLayout::AnchorsFirst => preds,
        PredsLayout::AnchorsLast => preds.reversed_axes(),
    };

    let (boxes, cols) = preds.dim();
    let min_cols = layout.class_offset() + 1;
    if boxes > 0 && cols < min_cols {
        return Err(DetectError::invalid(format!(
            "prediction rows have {cols} values, need at least {min_cols} for {layout:?}"
        )));
    }

    Ok(Decoder {
        preds,
        layout,
        conf_threshold,
        target_class,
        row: 0,
    })
}

fn check_score(value: f32, what: &str) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DetectError::invalid(format!("{what} {value} is outside [0, 1]")))
    }
}

impl Decoder<'_> {
    fn decode_row(&self, p: ArrayView1<'_, f32>) -> Result<Option<Candidate>> {
        let row = self.row - 1;
        let (w, h) = (p[2], p[3]);
        let bbox = BayamBox::from_cxcy_wh(p[0], p[1], w, h);
        if !bbox.is_finite() {
            return Err(DetectError::invalid(format!("non-finite box in row {row}")));
        }
        if w < 0. || h < 0. {
            return Err(DetectError::invalid(format!("negative box size {w}x{h} in row {row}")));
        }

        let objectness = if self.layout.has_objectness() { p[4] } else { 1.0 };
        check_score(objectness, "objectness")?;

        // argmax, first index wins ties
        let mut class_id = 0;
        let mut best = f32::NEG_INFINITY;
        for (i, &score) in p.slice(s![self.layout.class_offset()..]).iter().enumerate() {
            check_score(score, "class score")?;
            if score > best {
                best = score;
                class_id = i;
            }
        }

        let confidence = objectness * best;
        if confidence < self.conf_threshold {
            return Ok(None);
        }
        if self.target_class.is_some_and(|t| t != class_id) {
            return Ok(None);
        }

        Ok(Some(Candidate::new(bbox, confidence, class_id)))
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Candidate>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.row < self.preds.nrows() {
            let p = self.preds.row(self.row);
            self.row += 1;
            match self.decode_row(p) {
                Ok(Some(candidate)) => return Some(Ok(candidate)),
                Ok(None) => continue,
                Err(err) => {
                    self.row = self.preds.nrows();
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

/// Maps a canvas-space box back to the source image, normalized and
/// clamped to `[0, 1]`.
pub fn remap(bbox: &BayamBox, transform: &ImageTransformInfo) -> NormalizedBox {
    let src = bbox.unletterbox(transform.scale, transform.pad_x as f32, transform.pad_y as f32);
    let (w, h) = (transform.width_src as f32, transform.height_src as f32);

    let x1 = (src.x1 / w).clamp(0., 1.);
    let y1 = (src.y1 / h).clamp(0., 1.);
    let x2 = (src.x2 / w).clamp(0., 1.);
    let y2 = (src.y2 / h).clamp(0., 1.);

    NormalizedBox {
        x: x1,
        y: y1,
        width: (x2 - x1).max(0.),
        height: (y2 - y1).max(0.),
    }
}

pub(crate) fn label_for(names: &[String], class_id: usize) -> String {
    names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("# {}", class_id))
}

/// Decode, suppress and remap one raw model output.
///
/// Detections come back in descending confidence order.
pub fn process_predictions(
    output: &X,
    layout: PredsLayout,
    transform: &ImageTransformInfo,
    config: &PipelineConfig,
    names: &[String],
) -> Result<Vec<BayamDetection>> {
    let preds = output.squeeze_batch()?;
    let candidates = decode(preds, layout, config.conf_threshold, config.target_class)?
        .collect::<Result<Vec<_>>>()?;
    log::trace!("{} candidates above {}", candidates.len(), config.conf_threshold);

    let detections = nms(&candidates, config.iou_threshold)
        .into_iter()
        .map(|i| {
            let c = &candidates[i];
            let det = BayamDetection::new(
                &label_for(names, c.class_id),
                c.class_id,
                c.confidence,
                remap(&c.bbox, transform),
            );
            if config.emit_pixels {
                det.with_pixels(transform.width_src, transform.height_src)
            } else {
                det
            }
        })
        .collect();

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn identity_640() -> ImageTransformInfo {
        ImageTransformInfo::new(640, 640, 640).unwrap()
    }

    fn decode_all(preds: &Array2<f32>, conf: f32, target: Option<usize>) -> Result<Vec<Candidate>> {
        decode(preds.view(), PredsLayout::AnchorsFirst, conf, target)?.collect()
    }

    #[test]
    fn decodes_reference_row() {
        let preds = array![[320., 320., 100., 50., 0.9, 0.9]];
        let cands = decode_all(&preds, 0.25, Some(0)).unwrap();
        assert_eq!(cands.len(), 1);
        assert!((cands[0].confidence - 0.81).abs() < 1e-6);
        assert_eq!(cands[0].bbox.xy1_xy2(), (270., 295., 370., 345.));

        let nb = remap(&cands[0].bbox, &identity_640());
        assert_eq!(nb, NormalizedBox { x: 0.421875, y: 0.4609375, width: 0.15625, height: 0.078125 });
    }

    #[test]
    fn threshold_is_inclusive() {
        let preds = array![[10., 10., 4., 4., 1.0, 0.5], [10., 10., 4., 4., 1.0, 0.4999]];
        let cands = decode_all(&preds, 0.5, None).unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].confidence, 0.5);
    }

    #[test]
    fn argmax_then_target_filter() {
        // best class is 1, so a class-0 filter drops the row even though class 0 clears the threshold
        let preds = array![
            [10., 10., 4., 4., 1.0, 0.6, 0.9],
            [50., 50., 4., 4., 1.0, 0.7, 0.2],
        ];
        let cands = decode_all(&preds, 0.25, Some(0)).unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].class_id, 0);
        assert_eq!(cands[0].bbox.x1, 48.);

        let all = decode_all(&preds, 0.25, None).unwrap();
        assert_eq!(all.iter().map(|c| c.class_id).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn keeps_row_order() {
        let preds = array![
            [10., 10., 4., 4., 0.5, 0.8],
            [90., 90., 4., 4., 1.0, 0.95],
            [30., 30., 4., 4., 0.1, 0.1],
        ];
        let cands = decode_all(&preds, 0.25, None).unwrap();
        assert_eq!(cands.len(), 2);
        assert_eq!(cands[0].bbox.x1, 8.);
        assert_eq!(cands[1].bbox.x1, 88.);
    }

    #[test]
    fn empty_head_decodes_to_nothing() {
        let preds = Array2::<f32>::zeros((0, 6));
        assert!(decode_all(&preds, 0.25, Some(0)).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_scores_fail() {
        let preds = array![[10., 10., 4., 4., 1.2, 0.9]];
        assert!(matches!(decode_all(&preds, 0.25, None), Err(DetectError::InvalidInput(_))));

        let preds = array![[10., 10., 4., 4., 0.9, f32::NAN]];
        assert!(decode_all(&preds, 0.25, None).is_err());

        // even a row that would be filtered out must be well formed
        let preds = array![[10., 10., 4., 4., 0.0, -0.5]];
        assert!(decode_all(&preds, 0.25, None).is_err());
    }

    #[test]
    fn non_finite_box_fails() {
        let preds = array![[f32::INFINITY, 10., 4., 4., 1.0, 0.9]];
        assert!(decode_all(&preds, 0.25, None).is_err());

        // rejected even when the class filter would drop the row
        let preds = array![[f32::NAN, 1., 1., 1., 0.9, 0.1, 0.9]];
        assert!(matches!(decode_all(&preds, 0.25, Some(0)), Err(DetectError::InvalidInput(_))));
        let preds = array![[f32::NAN, 1., 1., 1., 0.1, 0.9]];
        assert!(decode_all(&preds, 0.25, None).is_err());
    }

    #[test]
    fn negative_box_size_fails() {
        let preds = array![[320., 320., -100., -50., 0.9, 0.9]];
        assert!(matches!(decode_all(&preds, 0.25, Some(0)), Err(DetectError::InvalidInput(_))));

        let preds = array![[320., 320., 100., -0.5, 0.9, 0.9]];
        assert!(decode_all(&preds, 0.25, None).is_err());

        // zero size is degenerate but well formed
        let preds = array![[320., 320., 0., 0., 0.9, 0.9]];
        assert_eq!(decode_all(&preds, 0.25, None).unwrap().len(), 1);
    }

    #[test]
    fn short_rows_are_rejected() {
        let preds = array![[10., 10., 4., 4., 1.0]];
        assert!(decode(preds.view(), PredsLayout::AnchorsFirst, 0.25, None).is_err());
        // fine without objectness
        assert!(decode(preds.view().reversed_axes(), PredsLayout::AnchorsLast, 0.25, None).is_ok());
    }

    #[test]
    fn anchors_last_layout_is_transposed() {
        // (4 + nc, boxes) with two boxes and one class, no objectness
        let preds = array![
            [320., 100.],
            [320., 100.],
            [100., 20.],
            [50., 20.],
            [0.81, 0.1],
        ];
        let cands: Vec<_> = decode(preds.view(), PredsLayout::AnchorsLast, 0.25, Some(0))
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].confidence, 0.81);
        assert_eq!(cands[0].bbox.xy1_xy2(), (270., 295., 370., 345.));
    }

    #[test]
    fn remap_undoes_padding_and_scale() {
        // 1280x720 source: scale 0.5, pad_y 140
        let t = ImageTransformInfo::new(1280, 720, 640).unwrap();
        let canvas_box = BayamBox::new(64., 140. + 36., 320., 140. + 216.);
        let nb = remap(&canvas_box, &t);
        assert!((nb.x - 0.1).abs() < 1e-6);
        assert!((nb.y - 0.1).abs() < 1e-6);
        assert!((nb.width - 0.4).abs() < 1e-6);
        assert!((nb.height - 0.5).abs() < 1e-6);
    }

    #[test]
    fn remap_clamps_both_bounds() {
        let t = ImageTransformInfo::new(1280, 720, 640).unwrap();
        // box starting inside the top padding and running past the right edge
        let nb = remap(&BayamBox::new(600., 100., 700., 200.), &t);
        assert_eq!(nb.y, 0.);
        assert!((nb.x - 0.9375).abs() < 1e-6);
        assert!((nb.x + nb.width - 1.0).abs() < 1e-6);
        assert!(nb.height > 0. && nb.y + nb.height <= 1.0);

        let outside = remap(&BayamBox::new(-50., 0., -10., 20.), &identity_640());
        assert_eq!((outside.x, outside.width), (0., 0.));
    }

    #[test]
    fn pipeline_suppresses_and_labels() {
        let output = X::from_shape_vec(
            &[1, 3, 6],
            vec![
                320., 320., 100., 100., 1.0, 0.5,
                320., 320., 100., 90., 1.0, 0.9,
                100., 100., 20., 20., 0.9, 0.9,
            ],
        )
        .unwrap();
        let config = PipelineConfig::default().with_pixels(true);
        let names = vec!["bayam".to_string()];
        let dets = process_predictions(&output, PredsLayout::AnchorsFirst, &identity_640(), &config, &names).unwrap();

        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].confidence, 90.0);
        assert_eq!(dets[0].class_label, "bayam");
        assert_eq!(dets[1].confidence, 81.0);
        assert_eq!(dets[1].bbox_pixels.unwrap().width, 20);
    }

    #[test]
    fn pipeline_rejects_bad_tensor_shape() {
        let output = X::from_shape_vec(&[2, 6], vec![0.; 12]).unwrap();
        let err = process_predictions(&output, PredsLayout::AnchorsFirst, &identity_640(), &PipelineConfig::default(), &[])
            .unwrap_err();
        assert!(matches!(err, DetectError::InvalidInput(_)));
    }

    #[test]
    fn unnamed_classes_get_placeholder() {
        assert_eq!(label_for(&[], 3), "# 3");
        assert_eq!(label_for(&["bayam".to_string()], 0), "bayam");
    }
}
