use std::collections::VecDeque;

/// Most recent breadcrumbs retained; the oldest entry is evicted beyond this.
pub const BREADCRUMB_CAPACITY: usize = 100;

/// Bounded FIFO trail of host-supplied debug strings, snapshotted into every
/// issue report. Lives for the session lifetime and is never persisted.
#[derive(Debug, Default)]
pub struct BreadcrumbTrail {
    entries: VecDeque<String>,
}

impl BreadcrumbTrail {
    pub fn new() -> Self {
        Self { entries: VecDeque::with_capacity(BREADCRUMB_CAPACITY) }
    }

    pub fn leave(&mut self, crumb: impl Into<String>) {
        if self.entries.len() == BREADCRUMB_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(crumb.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}
