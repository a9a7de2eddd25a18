use std::sync::Arc;
use std::thread::JoinHandle;
use crossbeam_channel::{bounded, Receiver, Sender};
use crate::common::{BayamImage, DetectionReport};
use crate::detectors::Detector;
use crate::error::DetectError;
use crate::Result;

/// Queued jobs allowed per worker before `submit` blocks.
pub const QUEUE_DEPTH: usize = 4;

struct DetectionJob {
    image: BayamImage,
    model: Option<String>,
    det_tx: Sender<Result<DetectionReport>>,
}

/// Fixed set of worker threads draining a shared job queue.
///
/// The queue holds at most `QUEUE_DEPTH` jobs per worker; once it is full
/// [`DetectionPool::submit`] blocks until a worker frees a slot.
///
/// Dropping the pool closes the queue and joins the workers once the jobs
/// already queued are done.
pub struct DetectionPool {
    opt_tx: Option<Sender<DetectionJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for DetectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionPool")
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl DetectionPool {
    pub fn new(detector: Arc<Detector>, n_workers: usize) -> Result<Self> {
        if n_workers == 0 {
            return Err(DetectError::Config("detection pool needs at least one worker".to_string()));
        }

        let (opt_tx, opt_rx) = bounded::<DetectionJob>(n_workers * QUEUE_DEPTH);
        let mut workers = Vec::with_capacity(n_workers);
        for i in 0..n_workers {
            let opt_rx = opt_rx.clone();
            let detector = Arc::clone(&detector);
            let handle = std::thread::Builder::new()
                .name(format!("bayam-detect-{i}"))
                .spawn(move || Self::worker_loop(i, &detector, opt_rx))
                .map_err(|e| DetectError::Config(format!("failed to spawn worker {i}: {e}")))?;
            workers.push(handle);
        }
        log::info!("Detection pool started with {} worker(s)", n_workers);

        Ok(Self {
            opt_tx: Some(opt_tx),
            workers,
        })
    }

    fn worker_loop(id: usize, detector: &Detector, opt_rx: Receiver<DetectionJob>) {
        for job in opt_rx.iter() {
            let result = detector.detect_image(&job.image, job.model.as_deref());
            if let Err(err) = &result {
                log::warn!("worker {id}: detection failed: {err}");
            }
            // caller may have stopped waiting
            let _ = job.det_tx.send(result);
        }
        log::debug!("worker {id}: queue closed, exiting");
    }

    /// Queues an image and returns the channel its report will arrive on.
    pub fn submit(&self, image: BayamImage, model: Option<&str>) -> Result<Receiver<Result<DetectionReport>>> {
        let opt_tx = self
            .opt_tx
            .as_ref()
            .ok_or_else(|| DetectError::Config("detection pool is shut down".to_string()))?;
        let (det_tx, det_rx) = bounded(1);
        opt_tx
            .send(DetectionJob {
                image,
                model: model.map(str::to_string),
                det_tx,
            })
            .map_err(|_| DetectError::Config("detection pool queue closed".to_string()))?;
        Ok(det_rx)
    }

    /// Submits and waits for the report.
    pub fn detect(&self, image: BayamImage, model: Option<&str>) -> Result<DetectionReport> {
        self.submit(image, model)?
            .recv()
            .map_err(|_| DetectError::Inference(anyhow::anyhow!("detection worker exited without replying")))?
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.opt_tx.as_ref().and_then(|tx| tx.capacity()).unwrap_or(0)
    }
}

impl Drop for DetectionPool {
    fn drop(&mut self) {
        self.opt_tx.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("detection worker panicked");
            }
        }
    }
}
