// Shared lives counter
//
// One handle is held by the control core (spends a life per release) and one
// by the remote surface (adds lives on request). Clones share the same count.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Lives {
    count: Arc<AtomicI32>,
}

impl Lives {
    pub fn new(initial: i32) -> Self {
        Self {
            count: Arc::new(AtomicI32::new(initial)),
        }
    }

    pub fn get(&self) -> i32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Add (or remove, if negative) lives; returns the new total.
    /// `None` if the total would leave the i32 range, the count is then unchanged.
    pub fn add(&self, delta: i32) -> Option<i32> {
        self.count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(delta))
            .ok()
            .map(|prev| prev + delta)
    }

    /// Spend the life of a completed release; returns the new total
    pub fn spend_one(&self) -> i32 {
        let prev = self
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or_else(|n| n);
        prev.saturating_sub(1)
    }

    /// No lives left: the cabinet ignores the joystick and trigger
    pub fn is_game_over(&self) -> bool {
        self.get() <= 0
    }
}
