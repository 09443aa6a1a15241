use std::sync::atomic::{AtomicI64, Ordering};

/// Layering band an overlay class draws from.
///
/// The allocator only guarantees monotonic values; the band offset keeps
/// overlays of different classes created around the same time in a
/// predictable order (drawer < alert < notice < toast).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Drawer,
    Alert,
    Notice,
    Toast,
}

impl Band {
    pub fn offset(self) -> i64 {
        match self {
            Band::Drawer => 0,
            Band::Alert => 500,
            Band::Notice => 1000,
            Band::Toast => 2000,
        }
    }
}

/// Process-wide z-order counter, shared by everything that paints a layer
#[derive(Debug, Default)]
pub struct ZOrder {
    counter: AtomicI64,
}

impl ZOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting after `base` (the first value handed out is `base + 1`)
    pub fn with_base(base: i64) -> Self {
        Self {
            counter: AtomicI64::new(base),
        }
    }

    /// Next raw value, strictly greater than every value returned before
    pub fn next(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Next value shifted into the given band
    pub fn next_in(&self, band: Band) -> i64 {
        self.next() + band.offset()
    }

    /// Last raw value handed out
    pub fn current(&self) -> i64 {
        self.counter.load(Ordering::SeqCst)
    }
}
