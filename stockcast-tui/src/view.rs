//! Visible window over the loaded history, driven by the range slider.

use std::ops::Range;

/// Zoom never narrows the window below this many bars.
pub const MIN_VISIBLE: usize = 5;

/// Half-open `[start, end)` range of bar indices out of `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewWindow {
    total: usize,
    start: usize,
    end: usize,
}

impl ViewWindow {
    /// Whole history visible.
    pub fn full(total: usize) -> Self {
        Self {
            total,
            start: 0,
            end: total,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.start == 0 && self.end == self.total
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The visible part of `items`, empty if `items` is shorter than the window.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items.get(self.range()).unwrap_or(&[])
    }

    pub fn reset(&mut self) {
        *self = Self::full(self.total);
    }

    /// Narrow to three quarters of the current width, around the centre.
    pub fn zoom_in(&mut self) {
        let len = (self.len() * 3 / 4).max(MIN_VISIBLE);
        if len < self.len() {
            self.place(self.center(), len);
        }
    }

    /// Widen by a third, around the centre.
    pub fn zoom_out(&mut self) {
        let len = (self.len() * 4 / 3 + 1).min(self.total);
        if len > self.len() {
            self.place(self.center(), len);
        }
    }

    /// Shift by a tenth of the window per step; negative pans towards older bars.
    pub fn pan(&mut self, steps: isize) {
        let step = (self.len() / 10).max(1);
        let len = self.len();
        let max_start = self.total - len;
        let start = if steps < 0 {
            self.start.saturating_sub(step * steps.unsigned_abs())
        } else {
            (self.start + step * steps.unsigned_abs()).min(max_start)
        };
        self.start = start;
        self.end = start + len;
    }

    fn center(&self) -> usize {
        self.start + self.len() / 2
    }

    fn place(&mut self, center: usize, len: usize) {
        let len = len.min(self.total);
        let start = center.saturating_sub(len / 2).min(self.total - len);
        self.start = start;
        self.end = start + len;
    }
}
