//! Ordered, named setting cycles.
//!
//! Each device setting that can be cycled (color palette, AGC mode, shutter
//! mode) is modeled as an explicit ordered list of `(name, value)` entries
//! plus a current index. Advancing wraps past the last entry back to the
//! first, so cycling is deterministic regardless of how the entries were
//! sourced.

/// An ordered selection over named setting values.
#[derive(Debug, Clone)]
pub struct SettingCycle<T: Copy> {
    entries: Vec<(&'static str, T)>,
    index: usize,
}

impl<T: Copy> SettingCycle<T> {
    /// Create a cycle from a non-empty ordered entry list.
    ///
    /// The initial selection is the first entry.
    pub fn new(entries: Vec<(&'static str, T)>) -> Self {
        assert!(!entries.is_empty(), "setting cycle requires entries");
        Self { entries, index: 0 }
    }

    /// Select an entry by name. Returns false and leaves the selection
    /// unchanged if the name is unknown.
    pub fn select(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|(n, _)| *n == name) {
            Some(index) => {
                self.index = index;
                true
            }
            None => false,
        }
    }

    /// Advance to the next entry, wrapping at the end.
    pub fn advance(&mut self) -> (&'static str, T) {
        self.index = (self.index + 1) % self.entries.len();
        self.entries[self.index]
    }

    /// The currently selected entry.
    pub fn current(&self) -> (&'static str, T) {
        self.entries[self.index]
    }

    /// The name of the currently selected entry.
    pub fn current_name(&self) -> &'static str {
        self.entries[self.index].0
    }

    /// The value of the currently selected entry.
    pub fn current_value(&self) -> T {
        self.entries[self.index].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> SettingCycle<u32> {
        SettingCycle::new(vec![("alpha", 1), ("beta", 2), ("gamma", 3)])
    }

    #[test]
    fn test_initial_selection_is_first_entry() {
        let c = cycle();
        assert_eq!(c.current(), ("alpha", 1));
    }

    #[test]
    fn test_select_by_name() {
        let mut c = cycle();
        assert!(c.select("beta"));
        assert_eq!(c.current(), ("beta", 2));
    }

    #[test]
    fn test_select_unknown_name_keeps_selection() {
        let mut c = cycle();
        assert!(c.select("gamma"));
        assert!(!c.select("delta"));
        assert_eq!(c.current(), ("gamma", 3));
    }

    #[test]
    fn test_advance_wraps() {
        let mut c = cycle();
        assert_eq!(c.advance(), ("beta", 2));
        assert_eq!(c.advance(), ("gamma", 3));
        assert_eq!(c.advance(), ("alpha", 1));
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut c = cycle();
        c.select("beta");
        for _ in 0..c.len() {
            c.advance();
        }
        assert_eq!(c.current_name(), "beta");
    }
}
