//! Bounded append-only buffers

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

/// Lines kept in the terminal transcript
pub const TRANSCRIPT_CAPACITY: usize = 200;

/// Entries kept in the session error log
pub const ERROR_LOG_CAPACITY: usize = 100;

/// Append-only log that evicts its oldest entry once full
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedLog<T> {
    /// Create an empty log; a zero capacity is treated as one
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, evicting the oldest entry if at capacity
    pub fn push(&mut self, entry: T) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The newest `n` entries, oldest first
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &T> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.entries.back()
    }
}

impl<T: Serialize> Serialize for BoundedLog<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

/// Display lines of the terminal
///
/// Besides the bounded lines it counts every line ever appended and every
/// clear, so a renderer can print only what is new.
#[derive(Debug, Clone)]
pub struct Transcript {
    lines: BoundedLog<String>,
    appended: u64,
    clears: u64,
}

/// Renderer position in a transcript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptCursor {
    appended: u64,
    clears: u64,
}

/// Lines appended since a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptDelta<'a> {
    /// The transcript was cleared since the cursor was taken
    pub cleared: bool,
    pub lines: Vec<&'a str>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: BoundedLog::new(TRANSCRIPT_CAPACITY),
            appended: 0,
            clears: 0,
        }
    }

    pub fn push(&mut self, line: String) {
        self.lines.push(line);
        self.appended += 1;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.clears += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Position after the newest line
    #[must_use]
    pub const fn cursor(&self) -> TranscriptCursor {
        TranscriptCursor {
            appended: self.appended,
            clears: self.clears,
        }
    }

    /// Lines a renderer at `cursor` has not shown yet
    ///
    /// After a clear every retained line is new. Lines evicted before the
    /// renderer caught up are skipped.
    #[must_use]
    pub fn since(&self, cursor: TranscriptCursor) -> TranscriptDelta<'_> {
        let cleared = cursor.clears != self.clears;
        let lines: Vec<&str> = if cleared {
            self.lines().collect()
        } else {
            let unseen = usize::try_from(self.appended.saturating_sub(cursor.appended))
                .unwrap_or(usize::MAX);
            self.lines
                .last_n(unseen)
                .map(String::as_str)
                .collect()
        };
        TranscriptDelta { cleared, lines }
    }
}
