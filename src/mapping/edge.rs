//! Edge detector for discrete inputs
//!
//! Turns pressed/released levels into press and release events, emitted only
//! on the tick where the state changes.

use std::collections::HashMap;

/// A state transition of a discrete input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Went from released to pressed
    Press,
    /// Went from pressed to released
    Release,
}

/// Tracks the last committed state of each discrete input.
///
/// Unknown inputs count as released, so a button already held on the first
/// tick yields a press.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    states: HashMap<u32, bool>,
}

impl EdgeDetector {
    /// Create a detector with every input released
    pub fn new() -> Self {
        Self::default()
    }

    /// Last committed state of `id`
    pub fn state(&self, id: u32) -> bool {
        self.states.get(&id).copied().unwrap_or(false)
    }

    /// Compare `pressed` against the committed state without changing it
    pub fn detect(&self, id: u32, pressed: bool) -> Option<Edge> {
        match (self.state(id), pressed) {
            (false, true) => Some(Edge::Press),
            (true, false) => Some(Edge::Release),
            _ => None,
        }
    }

    /// Record `pressed` as the committed state of `id`
    pub fn commit(&mut self, id: u32, pressed: bool) {
        self.states.insert(id, pressed);
    }

    /// Detect and commit in one step
    pub fn process(&mut self, id: u32, pressed: bool) -> Option<Edge> {
        let edge = self.detect(id, pressed);
        if edge.is_some() {
            self.commit(id, pressed);
        }
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_then_release() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.process(0, false), None);
        assert_eq!(detector.process(0, true), Some(Edge::Press));
        assert_eq!(detector.process(0, false), Some(Edge::Release));
    }

    #[test]
    fn test_held_button_emits_once() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.process(3, true), Some(Edge::Press));
        for _ in 0..50 {
            assert_eq!(detector.process(3, true), None);
        }
        assert!(detector.state(3));
    }

    #[test]
    fn test_pressed_at_startup_counts() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.process(1, true), Some(Edge::Press));
    }

    #[test]
    fn test_detect_does_not_commit() {
        let mut detector = EdgeDetector::new();
        assert_eq!(detector.detect(2, true), Some(Edge::Press));
        assert_eq!(detector.detect(2, true), Some(Edge::Press));
        detector.commit(2, true);
        assert_eq!(detector.detect(2, true), None);
    }

    #[test]
    fn test_edge_counts_match_transitions() {
        let sequence = [
            false, true, true, false, true, false, false, true, true, true, false,
        ];
        let mut detector = EdgeDetector::new();
        let mut presses = 0;
        let mut releases = 0;
        for &pressed in &sequence {
            match detector.process(0, pressed) {
                Some(Edge::Press) => presses += 1,
                Some(Edge::Release) => releases += 1,
                None => {}
            }
        }

        let mut previous = false;
        let mut rising = 0;
        let mut falling = 0;
        for &pressed in &sequence {
            if !previous && pressed {
                rising += 1;
            }
            if previous && !pressed {
                falling += 1;
            }
            previous = pressed;
        }

        assert_eq!(presses, rising);
        assert_eq!(releases, falling);
        assert_eq!(presses, 3);
    }
}
