use std::ops::Range;

/// A contiguous run of entries sent in one request.
///
/// `start..cursor` is backtracked context that an earlier window already
/// committed; `cursor..end` is what this window commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub cursor: usize,
    pub end: usize,
}

impl Window {
    /// Positions included in the request
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Positions this window writes back
    pub fn commit_range(&self) -> Range<usize> {
        self.cursor..self.end
    }

    /// Number of leading context entries that are not committed again
    pub fn context_len(&self) -> usize {
        self.cursor - self.start
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lazily yields windows over a document of `len` entries.
///
/// Cloning the planner restarts it from the same position.
#[derive(Debug, Clone)]
pub struct WindowPlanner {
    len: usize,
    step: usize,
    backtrack: usize,
    cursor: usize,
}

impl WindowPlanner {
    pub fn new(len: usize, step: usize, backtrack: usize) -> Self {
        Self {
            len,
            step: step.max(1),
            backtrack,
            cursor: 0,
        }
    }

    pub fn window_count(&self) -> usize {
        self.len.div_ceil(self.step)
    }
}

impl Iterator for WindowPlanner {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.cursor >= self.len {
            return None;
        }

        let cursor = self.cursor;
        let window = Window {
            start: cursor.saturating_sub(self.backtrack),
            cursor,
            end: (cursor + self.step).min(self.len),
        };
        self.cursor += self.step;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_tile_document_without_backtrack() {
        for len in 0..40 {
            for step in 1..8 {
                let mut covered = 0;
                for window in WindowPlanner::new(len, step, 0) {
                    assert_eq!(window.start, covered);
                    assert_eq!(window.cursor, window.start);
                    assert!(window.len() <= step);
                    assert!(!window.is_empty());
                    covered = window.end;
                }
                assert_eq!(covered, len, "len={} step={}", len, step);
            }
        }
    }

    #[test]
    fn test_backtrack_prepends_context() {
        let windows: Vec<Window> = WindowPlanner::new(10, 4, 2).collect();
        assert_eq!(
            windows,
            vec![
                Window { start: 0, cursor: 0, end: 4 },
                Window { start: 2, cursor: 4, end: 8 },
                Window { start: 6, cursor: 8, end: 10 },
            ]
        );
        assert_eq!(windows[1].context_len(), 2);
        assert_eq!(windows[1].commit_range(), 4..8);
    }

    #[test]
    fn test_backtrack_larger_than_step_clamps_at_zero() {
        let windows: Vec<Window> = WindowPlanner::new(6, 2, 5).collect();
        assert_eq!(windows[1], Window { start: 0, cursor: 2, end: 4 });
        assert_eq!(windows[2], Window { start: 0, cursor: 4, end: 6 });
    }

    #[test]
    fn test_planner_restarts_when_cloned() {
        let planner = WindowPlanner::new(31, 15, 0);
        assert_eq!(planner.window_count(), 3);
        let first: Vec<Window> = planner.clone().collect();
        let second: Vec<Window> = planner.collect();
        assert_eq!(first, second);
        assert_eq!(first.last().map(|w| w.range()), Some(30..31));
    }

    #[test]
    fn test_zero_step_is_treated_as_one() {
        assert_eq!(WindowPlanner::new(3, 0, 0).count(), 3);
    }
}
