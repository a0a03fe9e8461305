use std::collections::VecDeque;
use std::fmt::Display;

/// Maximum number of conversions kept in a session's history.
pub const HISTORY_CAPACITY: usize = 100;

/// One completed conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionHistoryEntry {
    pub from: String,
    pub amount: f64,
    pub to: String,
    pub converted: f64,
}

impl Display for ConversionHistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.2} - {}: {:.2}",
            self.from, self.amount, self.to, self.converted
        )
    }
}

/// Bounded, insertion-ordered conversion log. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct ConversionHistory {
    entries: VecDeque<ConversionHistoryEntry>,
    capacity: usize,
}

impl ConversionHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: ConversionHistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ConversionHistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ConversionHistory {
    fn default() -> Self {
        Self::new()
    }
}
