/// Counts nested drag-enter/leave pairs.
///
/// Toolkits report enter and leave for every child widget the pointer crosses, so a plain
/// boolean flickers. The drop zone is highlighted while the count is above zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragTracker {
    depth: u32,
}

impl DragTracker {
    pub fn enter(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Unbalanced leaves are clamped at zero.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Drop and reset both end the drag regardless of depth.
    pub fn clear(&mut self) {
        self.depth = 0;
    }

    pub fn is_dragging(&self) -> bool {
        self.depth > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_pairs_do_not_flicker() {
        let mut drag = DragTracker::default();
        drag.enter(); // zone
        drag.enter(); // icon inside zone
        drag.leave(); // left the zone, now over the icon
        assert!(drag.is_dragging());
        drag.enter(); // label
        drag.leave();
        drag.leave();
        assert!(!drag.is_dragging());
    }

    #[test]
    fn equal_counts_always_end_idle() {
        for n in 0..16 {
            let mut drag = DragTracker::default();
            for _ in 0..n {
                drag.enter();
            }
            assert_eq!(drag.is_dragging(), n > 0);
            for _ in 0..n {
                drag.leave();
            }
            assert!(!drag.is_dragging());
        }
    }

    #[test]
    fn stray_leave_and_clear() {
        let mut drag = DragTracker::default();
        drag.leave();
        assert!(!drag.is_dragging());
        drag.enter();
        drag.enter();
        drag.clear();
        assert!(!drag.is_dragging());
        drag.enter();
        drag.leave();
        assert!(!drag.is_dragging());
    }
}
