use crate::dataset::Dataset;
use std::cell::Cell;
use std::rc::Rc;

/// A view computed for request `generation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub generation: u64,
    pub value: T,
}

/// Serves views of one loaded [`Dataset`] on a single-threaded event loop.
///
/// Every recompute request gets the next generation number. When results
/// land out of order, [`Dashboard::accept`] drops any result that is not
/// newer than the last one it let through, so a superseded view never
/// replaces a fresher one. Reloading means building a new `Dashboard`.
#[derive(Debug)]
pub struct Dashboard {
    dataset: Rc<Dataset>,
    issued: Cell<u64>,
    accepted: Cell<u64>,
}

impl Dashboard {
    pub fn new(dataset: Dataset) -> Dashboard {
        Dashboard {
            dataset: Rc::new(dataset),
            issued: Cell::new(0),
            accepted: Cell::new(0),
        }
    }

    pub fn dataset(&self) -> Rc<Dataset> {
        Rc::clone(&self.dataset)
    }

    /// Reserve the generation for a new request.
    pub fn next_generation(&self) -> u64 {
        let generation = self.issued.get() + 1;
        self.issued.set(generation);
        generation
    }

    /// Compute a view against the dataset, stamped with a fresh generation.
    pub fn compute<T>(&self, view: impl FnOnce(&Dataset) -> T) -> Stamped<T> {
        let generation = self.next_generation();
        Stamped {
            generation,
            value: view(&self.dataset),
        }
    }

    /// Hand a finished result to the renderer, or drop it if a newer result
    /// was already accepted.
    pub fn accept<T>(&self, result: Stamped<T>) -> Option<T> {
        if result.generation <= self.accepted.get() {
            log::debug!(
                "Discarding stale result {} (latest accepted {})",
                result.generation,
                self.accepted.get()
            );
            return None;
        }
        self.accepted.set(result.generation);
        Some(result.value)
    }

    pub fn latest_accepted(&self) -> u64 {
        self.accepted.get()
    }
}
