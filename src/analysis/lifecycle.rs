//! Segmenter resource lifecycle / 分词器资源生命周期
//!
//! A [`SegmenterHandle`] is the single owner of one segmenter's loaded data.
//! Release is explicit and idempotent; once released, every use fails with
//! [`Error::UseAfterFree`]. `Drop` only reports handles that were never
//! released.

use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::segmenter::Segmenter;

/// Owned segmenter handle / 分词器句柄
pub struct SegmenterHandle {
    label: String,
    /// `None` once released
    slot: RwLock<Option<Box<dyn Segmenter>>>,
    /// Serializes `cut` for engines that are not reentrant
    serial: Option<Mutex<()>>,
}

impl SegmenterHandle {
    pub fn new(label: impl Into<String>, segmenter: Box<dyn Segmenter>) -> Self {
        let serial = if segmenter.is_reentrant() {
            None
        } else {
            Some(Mutex::new(()))
        };
        Self {
            label: label.into(),
            slot: RwLock::new(Some(segmenter)),
            serial,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run `f` against the live segmenter / 在存活的分词器上执行
    ///
    /// Release waits for `f` to return. Keep `f` to a single `cut`.
    pub fn with_segmenter<R>(&self, f: impl FnOnce(&dyn Segmenter) -> R) -> Result<R> {
        let slot = self.slot.read();
        let segmenter = slot
            .as_deref()
            .ok_or_else(|| Error::UseAfterFree(self.label.clone()))?;
        let _serial = self.serial.as_ref().map(|lock| lock.lock());
        Ok(f(segmenter))
    }

    /// Release the segmenter's resources / 释放分词器资源
    ///
    /// Returns `true` only for the call that actually released them.
    pub fn release(&self) -> bool {
        let mut slot = self.slot.write();
        match slot.take() {
            Some(mut segmenter) => {
                segmenter.release();
                drop(segmenter);
                tracing::info!("Segmenter released: {}", self.label);
                true
            }
            None => {
                tracing::debug!("Segmenter already released: {}", self.label);
                false
            }
        }
    }

    pub fn is_released(&self) -> bool {
        self.slot.read().is_none()
    }

    pub fn is_reentrant(&self) -> bool {
        self.serial.is_none()
    }
}

impl Drop for SegmenterHandle {
    fn drop(&mut self) {
        if let Some(mut segmenter) = self.slot.get_mut().take() {
            tracing::warn!(
                "Segmenter {} dropped without an explicit release; releasing now",
                self.label
            );
            segmenter.release();
        }
    }
}

impl std::fmt::Debug for SegmenterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmenterHandle")
            .field("label", &self.label)
            .field("released", &self.is_released())
            .field("reentrant", &self.is_reentrant())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmenter::Segment;
    use crate::testing::ScriptedSegmenter;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_release_is_idempotent() {
        let segmenter = ScriptedSegmenter::whole_input();
        let releases = segmenter.release_counter();
        let handle = SegmenterHandle::new("t", Box::new(segmenter));

        assert!(!handle.is_released());
        assert!(handle.release());
        assert!(!handle.release());
        assert!(!handle.release());
        assert!(handle.is_released());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_use_after_release() {
        let handle = SegmenterHandle::new("t", Box::new(ScriptedSegmenter::whole_input()));
        handle.release();

        let result = handle.with_segmenter(|s| s.cut("abc").len());
        assert!(matches!(result, Err(Error::UseAfterFree(label)) if label == "t"));
    }

    #[test]
    fn test_drop_releases_unreleased_handle() {
        let segmenter = ScriptedSegmenter::whole_input();
        let releases = segmenter.release_counter();
        drop(SegmenterHandle::new("leaky", Box::new(segmenter)));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_after_release_does_not_release_twice() {
        let segmenter = ScriptedSegmenter::whole_input();
        let releases = segmenter.release_counter();
        let handle = SegmenterHandle::new("t", Box::new(segmenter));
        handle.release();
        drop(handle);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    /// Fails the test if two cuts ever overlap in time
    struct ExclusiveSegmenter {
        busy: AtomicBool,
        cuts: AtomicUsize,
    }

    impl Segmenter for ExclusiveSegmenter {
        fn cut<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
            assert!(!self.busy.swap(true, Ordering::SeqCst), "concurrent cut");
            thread::sleep(Duration::from_millis(2));
            self.cuts.fetch_add(1, Ordering::SeqCst);
            self.busy.store(false, Ordering::SeqCst);
            vec![Segment::new(text, 0, text.len())]
        }
    }

    #[test]
    fn test_non_reentrant_cuts_are_serialized() {
        let handle = Arc::new(SegmenterHandle::new(
            "serial",
            Box::new(ExclusiveSegmenter {
                busy: AtomicBool::new(false),
                cuts: AtomicUsize::new(0),
            }),
        ));
        assert!(!handle.is_reentrant());

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                thread::spawn(move || {
                    for _ in 0..5 {
                        handle.with_segmenter(|s| s.cut("长江").len()).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(handle.release());
    }

    /// Holds `busy` for the whole cut and refuses to be released while it is set
    struct GatedSegmenter {
        busy: Arc<AtomicBool>,
        started: Arc<Barrier>,
    }

    impl Segmenter for GatedSegmenter {
        fn cut<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
            self.busy.store(true, Ordering::SeqCst);
            self.started.wait();
            thread::sleep(Duration::from_millis(30));
            self.busy.store(false, Ordering::SeqCst);
            vec![Segment::new(text, 0, text.len())]
        }

        fn is_reentrant(&self) -> bool {
            true
        }

        fn release(&mut self) {
            assert!(!self.busy.load(Ordering::SeqCst), "released during a cut");
        }
    }

    #[test]
    fn test_release_waits_for_in_flight_cut() {
        let busy = Arc::new(AtomicBool::new(false));
        let started = Arc::new(Barrier::new(2));
        let handle = Arc::new(SegmenterHandle::new(
            "gated",
            Box::new(GatedSegmenter {
                busy: Arc::clone(&busy),
                started: Arc::clone(&started),
            }),
        ));

        let worker = {
            let handle = Arc::clone(&handle);
            thread::spawn(move || handle.with_segmenter(|s| s.cut("长江大桥").len()))
        };

        // The cut is running once the barrier opens
        started.wait();
        assert!(handle.release());
        assert!(!busy.load(Ordering::SeqCst));

        assert_eq!(worker.join().unwrap().unwrap(), 1);
        assert!(handle.is_released());
    }
}
