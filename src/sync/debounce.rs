//! Save debouncing for auto-compile

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Schedules one compile per source, `delay` after its latest save
#[derive(Debug)]
pub struct SaveDebouncer {
    delay: Duration,
    deadlines: HashMap<PathBuf, Instant>,
}

impl SaveDebouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    /// Record a save; a later save of the same file pushes the deadline back
    pub fn note_saved(&mut self, path: &Path, now: Instant) {
        self.deadlines.insert(path.to_path_buf(), now + self.delay);
    }

    /// Sources whose deadline has passed, removed from the schedule
    pub fn take_due(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut due: Vec<PathBuf> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due.sort();
        for path in &due {
            self.deadlines.remove(path);
        }
        due
    }

    #[must_use]
    pub fn is_scheduled(&self, path: &Path) -> bool {
        self.deadlines.contains_key(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_delay() {
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        debouncer.note_saved(Path::new("a.tex"), t0);

        assert!(debouncer.take_due(t0 + Duration::from_millis(999)).is_empty());
        assert_eq!(
            debouncer.take_due(t0 + Duration::from_millis(1000)),
            vec![PathBuf::from("a.tex")]
        );
        assert!(!debouncer.is_scheduled(Path::new("a.tex")));
    }

    #[test]
    fn repeated_saves_push_deadline_back() {
        let mut debouncer = SaveDebouncer::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        debouncer.note_saved(Path::new("a.tex"), t0);
        debouncer.note_saved(Path::new("a.tex"), t0 + Duration::from_millis(800));

        assert!(debouncer.take_due(t0 + Duration::from_millis(1200)).is_empty());
        assert_eq!(debouncer.take_due(t0 + Duration::from_millis(1800)).len(), 1);
    }
}
