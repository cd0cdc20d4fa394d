/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// Zero-based index of the question being asked; equals `total` once complete.
    pub current: usize,
    pub total: usize,
    /// Whole percent of questions already moved past.
    pub percent_complete: u32,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn new(current: usize, total: usize, is_complete: bool) -> Self {
        let percent_complete = if total == 0 {
            0
        } else {
            u32::try_from(current.min(total) * 100 / total).unwrap_or(100)
        };
        Self {
            current,
            total,
            percent_complete,
            is_complete,
        }
    }

    /// Questions not yet moved past.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.current)
    }
}
