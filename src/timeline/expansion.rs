use std::collections::BTreeSet;

use super::aggregate::default_collapsed_periods;
use super::PeriodGroup;

/// Which period cards are collapsed
///
/// Owned by the screen state. Defaults are applied exactly once per session so
/// a later re-aggregation never re-expands a period the user collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodExpansion {
    collapsed: BTreeSet<u32>,
    initialized: bool,
}

impl PeriodExpansion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the default collapse policy if it has not run yet
    ///
    /// Nothing happens while there are no groups, so a timeline that arrives
    /// empty first and fills in later still gets its defaults.
    /// Returns true when the defaults were applied by this call.
    pub fn apply_defaults_once(&mut self, groups: &[PeriodGroup]) -> bool {
        if self.initialized || groups.is_empty() {
            return false;
        }
        self.collapsed = default_collapsed_periods(groups);
        self.initialized = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_collapsed(&self, period: u32) -> bool {
        self.collapsed.contains(&period)
    }

    /// Flip a period; returns true if it is now collapsed
    pub fn toggle(&mut self, period: u32) -> bool {
        if self.collapsed.remove(&period) {
            false
        } else {
            self.collapsed.insert(period);
            true
        }
    }

    pub fn expand(&mut self, period: u32) {
        self.collapsed.remove(&period);
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    pub fn collapsed(&self) -> &BTreeSet<u32> {
        &self.collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groups(periods: &[u32]) -> Vec<PeriodGroup> {
        periods
            .iter()
            .map(|p| PeriodGroup {
                period: *p,
                events: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_defaults_collapse_all_but_first() {
        let mut expansion = PeriodExpansion::new();
        assert!(expansion.apply_defaults_once(&groups(&[1, 2, 3])));
        assert!(!expansion.is_collapsed(1));
        assert!(expansion.is_collapsed(2));
        assert!(expansion.is_collapsed(3));
    }

    #[test]
    fn test_defaults_apply_only_once() {
        let mut expansion = PeriodExpansion::new();
        expansion.apply_defaults_once(&groups(&[1, 2, 3]));

        // User collapses the first period, then the timeline re-aggregates
        assert!(expansion.toggle(1));
        assert!(!expansion.apply_defaults_once(&groups(&[1, 2, 3, 4])));

        assert!(expansion.is_collapsed(1));
        assert!(!expansion.is_collapsed(4));
    }

    #[test]
    fn test_defaults_wait_for_non_empty_groups() {
        let mut expansion = PeriodExpansion::new();
        assert!(!expansion.apply_defaults_once(&[]));
        assert!(!expansion.is_initialized());
        assert!(expansion.apply_defaults_once(&groups(&[1, 2])));
        assert!(expansion.is_collapsed(2));
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut expansion = PeriodExpansion::new();
        assert!(expansion.toggle(2));
        assert!(!expansion.toggle(2));
        assert!(expansion.collapsed().is_empty());
    }
}
