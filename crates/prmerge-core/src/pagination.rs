//! Page cursor for paged listings.

/// Hands out page numbers `1..=max`, stopping early once the listing is
/// known to be exhausted.
#[derive(Debug, Clone)]
pub struct PageCursor {
    next: u32,
    max: u32,
    done: bool,
}

impl PageCursor {
    /// Cursor over pages `1..=max`.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self {
            next: 1,
            max,
            done: false,
        }
    }

    /// Next page to request, or `None` once the cap or the end is reached.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.done || self.next > self.max {
            return None;
        }
        let page = self.next;
        self.next += 1;
        Some(page)
    }

    /// Mark the listing as exhausted (an empty page came back).
    pub fn finish(&mut self) {
        self.done = true;
    }

    /// Number of pages handed out so far.
    #[must_use]
    pub const fn requested(&self) -> u32 {
        self.next - 1
    }
}
