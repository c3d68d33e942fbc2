/// Offset/limit pair driving the listings pagination. Offsets are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub start: u32,
    pub limit: u32,
}

impl PageCursor {
    pub fn new(limit: u32) -> Self {
        PageCursor { start: 1, limit }
    }

    pub fn advance(&mut self) {
        self.start = self.start.saturating_add(self.limit);
    }
}
