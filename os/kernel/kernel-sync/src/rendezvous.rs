use core::hint::spin_loop;
use core::sync::atomic::{AtomicUsize, Ordering};

/// One-shot barrier for a fixed number of parties.
///
/// Every party calls [`arrive_and_wait`](Self::arrive_and_wait) once. The
/// countdown starts at `parties`; each arrival decrements it and the call
/// spins until it hits zero. There is no timeout: a party that never
/// arrives blocks the others forever.
///
/// ```rust
/// # use kernel_sync::Rendezvous;
/// let barrier = Rendezvous::new(1);
/// assert_eq!(barrier.arrive_and_wait(), 0);
/// assert!(barrier.is_complete());
/// ```
pub struct Rendezvous {
    parties: usize,
    remaining: AtomicUsize,
}

impl Rendezvous {
    #[must_use]
    pub const fn new(parties: usize) -> Self {
        Self {
            parties,
            remaining: AtomicUsize::new(parties),
        }
    }

    #[must_use]
    pub const fn parties(&self) -> usize {
        self.parties
    }

    /// Register an arrival without waiting.
    ///
    /// Returns the 0-based arrival order. Arrivals past `parties` do not
    /// wrap the countdown and report `parties`.
    pub fn arrive(&self) -> usize {
        match self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(before) => self.parties - before,
            Err(_) => self.parties,
        }
    }

    /// Spin until every party has arrived.
    pub fn wait(&self) {
        while self.remaining.load(Ordering::Acquire) != 0 {
            spin_loop();
        }
    }

    /// [`arrive`](Self::arrive), then [`wait`](Self::wait).
    pub fn arrive_and_wait(&self) -> usize {
        let order = self.arrive();
        self.wait();
        order
    }

    /// Number of parties that have arrived so far.
    #[must_use]
    pub fn arrived(&self) -> usize {
        self.parties - self.remaining.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }
}
