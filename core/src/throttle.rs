//! Pause between consecutive pages of an auto-paginated query.

use std::rc::Rc;
use std::time::Duration;

pub trait Throttle {
    fn pause(&self, delay: Duration);
}

/// Blocks the calling thread for the full delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Throttle for ThreadSleep {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl<T: Throttle + ?Sized> Throttle for Rc<T> {
    fn pause(&self, delay: Duration) {
        (**self).pause(delay)
    }
}
