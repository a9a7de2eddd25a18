use std::cmp::Ordering;

pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
}

/// Greedy single-class non-max suppression.
///
/// Returns the indices of the kept boxes in descending confidence order.
/// Equal confidences keep their input order. A box is dropped when its IoU
/// with an already kept box is strictly greater than `iou_threshold`.
pub fn nms<T: Nms>(boxes: &[T], iou_threshold: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[b]
            .confidence()
            .partial_cmp(&boxes[a].confidence())
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut keep: Vec<usize> = Vec::new();
    let mut suppressed = vec![false; boxes.len()];
    for (pos, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for &j in &order[pos + 1..] {
            if !suppressed[j] && boxes[i].iou(&boxes[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    keep
}

/// Runs [`nms`] and returns the surviving boxes themselves.
pub fn apply_nms<T: Nms + Clone>(boxes: &[T], iou_threshold: f32) -> Vec<T> {
    nms(boxes, iou_threshold)
        .into_iter()
        .map(|i| boxes[i].clone())
        .collect()
}
