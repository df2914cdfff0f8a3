//! Visibility-triggered reveal state.

pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// 可見比例。 / Fraction of `[offset, offset + length)` visible in the viewport along one axis.
pub fn visible_ratio(offset: f64, length: f64, scroll_offset: f64, viewport_length: f64) -> f64 {
    if length <= 0.0 {
        return 0.0;
    }
    let start = offset.max(scroll_offset);
    let end = (offset + length).min(scroll_offset + viewport_length);
    ((end - start) / length).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealTrigger {
    threshold: f64,
    once: bool,
    revealed: bool,
}

impl Default for RevealTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, true)
    }
}

impl RevealTrigger {
    /// 建立觸發器。 / Creates a trigger firing at `threshold`, optionally only once.
    pub fn new(threshold: f64, once: bool) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            once,
            revealed: false,
        }
    }

    /// 是否已顯示。 / Whether the element is currently shown.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// 處理交集比例。 / Feeds an intersection ratio; returns whether the element is shown.
    pub fn observe(&mut self, ratio: f64) -> bool {
        if self.once && self.revealed {
            return true;
        }
        self.revealed = ratio > 0.0 && ratio >= self.threshold;
        self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_covers_partial_overlap() {
        assert_eq!(visible_ratio(0.0, 100.0, 0.0, 800.0), 1.0);
        assert_eq!(visible_ratio(750.0, 100.0, 0.0, 800.0), 0.5);
        assert_eq!(visible_ratio(900.0, 100.0, 0.0, 800.0), 0.0);
        assert_eq!(visible_ratio(0.0, 0.0, 0.0, 800.0), 0.0);
    }

    #[test]
    fn once_trigger_stays_revealed() {
        let mut trigger = RevealTrigger::default();
        assert!(!trigger.observe(0.05));
        assert!(trigger.observe(0.1));
        assert!(trigger.observe(0.0));
    }

    #[test]
    fn repeating_trigger_follows_visibility() {
        let mut trigger = RevealTrigger::new(0.5, false);
        assert!(trigger.observe(0.6));
        assert!(!trigger.observe(0.2));
        assert!(!trigger.is_revealed());
    }
}
