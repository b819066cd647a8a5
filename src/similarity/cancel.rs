use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Polled by long-running searches to find out whether their result is still wanted.
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

/// Token for callers that never abandon a search.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl Cancellation for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: Cancellation + ?Sized> Cancellation for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Invocation counter shared between whoever triggers searches and the
/// searches themselves. Issuing a new ticket supersedes every older one, so a
/// drag gesture that fires many searches only pays for the latest.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let id = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        Ticket {
            id,
            current: Arc::clone(&self.current),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ticket {
    id: u64,
    current: Arc<AtomicU64>,
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id
    }
}

impl Cancellation for Ticket {
    fn is_cancelled(&self) -> bool {
        !self.is_current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let generation = Generation::new();
        let first = generation.issue();
        assert!(first.is_current());
        assert!(!first.is_cancelled());

        let second = generation.issue();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        let third = generation.issue();
        assert!(second.is_cancelled() && first.is_cancelled());
        assert!(third.is_current());
    }

    #[test]
    fn tickets_cross_threads() {
        let generation = Generation::new();
        let ticket = generation.issue();
        let handle = {
            let generation = generation.clone();
            std::thread::spawn(move || generation.issue())
        };
        let newer = handle.join().unwrap();
        assert!(ticket.is_cancelled());
        assert!(newer.is_current());
    }

    #[test]
    fn flag_and_never() {
        let flag = Arc::new(AtomicBool::new(false));
        assert!(!flag.is_cancelled());
        flag.store(true, Ordering::Release);
        assert!(flag.is_cancelled());
        assert!(!NeverCancel.is_cancelled());
    }
}
