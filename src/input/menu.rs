//! File menu selection model
//!
//! Tracks the highlighted entry and the first visible row of a scrolling list.
//! Up moves to the next entry and Down to the previous one, matching the
//! encoder's clockwise/anticlockwise mapping. Drawing is left to the caller.

use super::{EventQueue, KeyEvent};

/// Selection and scroll position in a list of `count` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCursor {
    selected: usize,
    top: usize,
    visible: usize,
    count: usize,
}

impl MenuCursor {
    /// Cursor over `count` entries with `visible` rows on screen
    pub fn new(count: usize, visible: usize) -> Self {
        MenuCursor {
            selected: 0,
            top: 0,
            visible: visible.max(1),
            count,
        }
    }

    /// Index of the highlighted entry
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Index of the first visible row
    pub fn top(&self) -> usize {
        self.top
    }

    /// Range of entries currently on screen
    pub fn visible_range(&self) -> std::ops::Range<usize> {
        self.top..(self.top + self.visible).min(self.count)
    }

    /// Apply one key event; returns the chosen index on Enter
    pub fn apply(&mut self, event: KeyEvent) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        match event {
            KeyEvent::Up => {
                if self.selected + 1 < self.count {
                    self.selected += 1;
                    if self.selected >= self.top + self.visible {
                        self.top = self.selected + 1 - self.visible;
                    }
                }
                None
            }
            KeyEvent::Down => {
                if self.selected > 0 {
                    self.selected -= 1;
                    if self.selected < self.top {
                        self.top = self.selected;
                    }
                }
                None
            }
            KeyEvent::Enter => Some(self.selected),
        }
    }

    /// Apply every queued event; returns the first selection made, if any
    ///
    /// Events after a selection stay in the queue.
    pub fn drain(&mut self, queue: &EventQueue) -> Option<usize> {
        while let Some(event) = queue.poll() {
            if let Some(choice) = self.apply(event) {
                return Some(choice);
            }
        }
        None
    }
}
