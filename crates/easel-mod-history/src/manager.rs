/// Core undo/redo manager over full state snapshots.
///
/// Every accepted change pushes the previous value onto the undo stack.
/// Values equal to the present one are ignored, so re-applying the same
/// settings never creates an undo step.
use std::collections::VecDeque;

use serde::Serialize;

use crate::config::HistoryConfig;

/// Borrowed view of the three history stacks.
///
/// `past` is ordered oldest first, `future` nearest-redo first.
#[derive(Debug, Serialize)]
pub struct HistoryState<'a, T> {
    pub past: &'a VecDeque<T>,
    pub present: &'a T,
    pub future: &'a VecDeque<T>,
}

/// Manages undo/redo history for a single editing session.
///
/// Each tool view gets its own `HistoryManager` parameterized by its
/// settings type. The undo stack is bounded by `max_history_size`.
pub struct HistoryManager<T> {
    /// Snapshots preceding `present`, oldest first.
    past: VecDeque<T>,
    /// The current value.
    present: T,
    /// Snapshots superseded by undo, nearest redo first.
    future: VecDeque<T>,
    /// Value the session started with, restored by `reset`.
    initial: T,
    config: HistoryConfig,
}

impl<T> std::fmt::Debug for HistoryManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_depth", &self.past.len())
            .field("redo_depth", &self.future.len())
            .field("max_history_size", &self.config.max_history_size)
            .finish()
    }
}

impl<T: Clone + PartialEq> HistoryManager<T> {
    /// Creates a manager whose present value is `initial`.
    pub fn new(initial: T, config: HistoryConfig) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial.clone(),
            future: VecDeque::new(),
            initial,
            config,
        }
    }

    /// Creates a manager with the default capacity.
    pub fn with_defaults(initial: T) -> Self {
        Self::new(initial, HistoryConfig::default())
    }

    /// Replaces the present value.
    ///
    /// Returns `false` without touching history when `next` equals the
    /// present value. Otherwise the old value moves to the undo stack and
    /// the redo stack is discarded.
    pub fn set_state(&mut self, next: T) -> bool {
        if next == self.present {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        self.enforce_capacity();
        self.future.clear();
        true
    }

    /// Computes the next value from the present one and applies it with
    /// the same rules as `set_state`.
    pub fn set_state_with<F>(&mut self, update: F) -> bool
    where
        F: FnOnce(&T) -> T,
    {
        let next = update(&self.present);
        self.set_state(next)
    }

    /// Steps back one snapshot. Returns `false` if there's nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    /// Steps forward one snapshot. Returns `false` if there's nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.enforce_capacity();
        true
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Drops both stacks and keeps the present value.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Drops both stacks and restores the initial value.
    pub fn reset(&mut self) {
        self.clear();
        self.present = self.initial.clone();
    }

    /// Makes `past[index]` the present value.
    ///
    /// Snapshots newer than the target, followed by the old present value,
    /// are moved to the front of the redo stack. Out-of-range indices are
    /// ignored and return `false`.
    pub fn jump_to_past(&mut self, index: usize) -> bool {
        if index >= self.past.len() {
            return false;
        }

        let mut newer = self.past.split_off(index + 1);
        let Some(target) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, target);
        newer.push_back(current);
        newer.append(&mut self.future);
        self.future = newer;
        true
    }

    /// Makes `future[index]` the present value.
    ///
    /// The old present value and every redo snapshot nearer than the target
    /// move onto the undo stack in chronological order. Out-of-range indices
    /// are ignored and return `false`.
    pub fn jump_to_future(&mut self, index: usize) -> bool {
        if index >= self.future.len() {
            return false;
        }

        let remaining = self.future.split_off(index + 1);
        let Some(target) = self.future.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, target);
        self.past.push_back(current);
        self.past.append(&mut self.future);
        self.future = remaining;
        self.enforce_capacity();
        true
    }

    /// The current value.
    pub fn present(&self) -> &T {
        &self.present
    }

    /// Undo stack, oldest first.
    pub fn past(&self) -> &VecDeque<T> {
        &self.past
    }

    /// Redo stack, nearest redo first.
    pub fn future(&self) -> &VecDeque<T> {
        &self.future
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Borrowed view of all three stacks, serializable for debugging or
    /// snapshot export.
    pub fn state(&self) -> HistoryState<'_, T> {
        HistoryState {
            past: &self.past,
            present: &self.present,
            future: &self.future,
        }
    }

    /// Evicts the oldest undo snapshots beyond `max_history_size`.
    fn enforce_capacity(&mut self) {
        let max = self.config.max_history_size;
        if self.past.len() > max {
            let excess = self.past.len() - max;
            self.past.drain(..excess);
            tracing::debug!("Evicted {excess} oldest history snapshot(s)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mgr(initial: i32) -> HistoryManager<i32> {
        HistoryManager::new(initial, HistoryConfig::with_max_history_size(100))
    }

    #[test]
    fn test_new_manager_is_empty() {
        let m = mgr(0);
        assert_eq!(*m.present(), 0);
        assert!(!m.can_undo());
        assert!(!m.can_redo());
    }

    #[test]
    fn test_set_state_pushes_previous() {
        let mut m = mgr(0);
        assert!(m.set_state(1));
        assert!(m.set_state(2));
        assert_eq!(*m.present(), 2);
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert!(m.can_undo());
    }

    #[test]
    fn test_set_state_equal_value_is_noop() {
        let mut m = mgr(5);
        assert!(!m.set_state(5));
        assert_eq!(m.undo_depth(), 0);

        m.set_state(6);
        assert!(!m.set_state(6));
        assert_eq!(m.undo_depth(), 1);
    }

    #[test]
    fn test_set_state_with_updater() {
        let mut m = mgr(10);
        m.set_state_with(|prev| prev + 5);
        assert_eq!(*m.present(), 15);
        assert_eq!(m.undo_depth(), 1);
    }

    #[test]
    fn test_set_state_with_identity_is_noop() {
        let mut m = mgr(10);
        assert!(!m.set_state_with(|prev| *prev));
        assert!(!m.can_undo());
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut m = mgr(1);
        assert!(!m.undo());
        assert_eq!(*m.present(), 1);
        assert!(!m.can_redo());
    }

    #[test]
    fn test_redo_on_empty_is_noop() {
        let mut m = mgr(1);
        m.set_state(2);
        assert!(!m.redo());
        assert_eq!(*m.present(), 2);
    }

    #[test]
    fn test_undo_moves_present_to_front_of_future() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        m.set_state(3);
        m.undo();
        m.undo();
        assert_eq!(*m.present(), 1);
        assert_eq!(m.future().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_redo_moves_present_to_end_of_past() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        m.undo();
        m.undo();
        assert!(m.redo());
        assert_eq!(*m.present(), 1);
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(m.future().iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_new_edit_after_undo_discards_future() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        m.undo();
        assert!(m.can_redo());
        m.set_state(3);
        assert!(!m.can_redo());
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_noop_edit_after_undo_keeps_future() {
        let mut m = mgr(0);
        m.set_state(1);
        m.undo();
        m.set_state(0);
        assert!(m.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut m = HistoryManager::new(0, HistoryConfig::with_max_history_size(3));
        for i in 1..=10 {
            m.set_state(i);
        }
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![7, 8, 9]);
        assert_eq!(*m.present(), 10);
    }

    #[test]
    fn test_zero_capacity_never_keeps_history() {
        let mut m = HistoryManager::new(0, HistoryConfig::with_max_history_size(0));
        m.set_state(1);
        m.set_state(2);
        assert!(!m.can_undo());
        assert_eq!(*m.present(), 2);
    }

    #[test]
    fn test_clear_keeps_present() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        m.undo();
        m.clear();
        assert_eq!(*m.present(), 1);
        assert!(!m.can_undo());
        assert!(!m.can_redo());
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        m.undo();
        m.reset();
        assert_eq!(*m.present(), 0);
        assert!(!m.can_undo());
        assert!(!m.can_redo());
    }

    #[test]
    fn test_reset_after_clear_still_uses_original_initial() {
        let mut m = mgr(0);
        m.set_state(7);
        m.clear();
        m.reset();
        assert_eq!(*m.present(), 0);
    }

    #[test]
    fn test_jump_to_past_splits_history() {
        let mut m = mgr(0);
        for i in 1..=4 {
            m.set_state(i);
        }
        // past = [0, 1, 2, 3], present = 4
        m.undo();
        // past = [0, 1, 2], present = 3, future = [4]
        assert!(m.jump_to_past(1));
        assert_eq!(*m.present(), 1);
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert_eq!(
            m.future().iter().copied().collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_jump_to_past_first_entry() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        assert!(m.jump_to_past(0));
        assert_eq!(*m.present(), 0);
        assert!(!m.can_undo());
        assert_eq!(m.future().iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_jump_to_past_out_of_range_is_noop() {
        let mut m = mgr(0);
        m.set_state(1);
        assert!(!m.jump_to_past(1));
        assert!(!m.jump_to_past(99));
        assert_eq!(*m.present(), 1);
        assert_eq!(m.undo_depth(), 1);
        assert_eq!(m.redo_depth(), 0);
    }

    #[test]
    fn test_jump_to_future() {
        let mut m = mgr(0);
        for i in 1..=4 {
            m.set_state(i);
        }
        m.jump_to_past(0);
        // past = [], present = 0, future = [1, 2, 3, 4]
        assert!(m.jump_to_future(2));
        assert_eq!(*m.present(), 3);
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(m.future().iter().copied().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_jump_to_future_out_of_range_is_noop() {
        let mut m = mgr(0);
        m.set_state(1);
        m.undo();
        assert!(!m.jump_to_future(1));
        assert_eq!(*m.present(), 0);
        assert_eq!(m.redo_depth(), 1);
    }

    #[test]
    fn test_jump_to_future_respects_capacity() {
        let mut m = HistoryManager::new(0, HistoryConfig::with_max_history_size(2));
        m.set_state(1);
        m.set_state(2);
        m.undo();
        m.undo();
        // past = [], present = 0, future = [1, 2]
        m.jump_to_future(1);
        assert_eq!(*m.present(), 2);
        assert_eq!(m.past().iter().copied().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_state_view_serializes() {
        let mut m = mgr(0);
        m.set_state(1);
        m.set_state(2);
        m.undo();
        let json = serde_json::to_string(&m.state()).expect("serialize");
        assert_eq!(json, r#"{"past":[0],"present":1,"future":[2]}"#);
    }

    #[test]
    fn test_debug_reports_depths() {
        let mut m = mgr(0);
        m.set_state(1);
        let dbg = format!("{m:?}");
        assert!(dbg.contains("undo_depth: 1"));
        assert!(dbg.contains("redo_depth: 0"));
    }
}
