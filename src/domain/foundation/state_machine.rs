//! State machine trait for lifecycle status enums.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their outgoing edges once; membership checks and
/// validated transitions come for free.
///
/// ```ignore
/// let next = SessionStatus::Pending.transition_to(SessionStatus::Upcoming)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// Returns all valid target states from the current state.
    fn valid_transitions(&self) -> &'static [Self];

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Door {
        Open,
        Closed,
        Welded,
    }

    impl StateMachine for Door {
        fn valid_transitions(&self) -> &'static [Self] {
            match self {
                Door::Open => &[Door::Closed],
                Door::Closed => &[Door::Open, Door::Welded],
                Door::Welded => &[],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_listed_edge() {
        assert_eq!(Door::Closed.transition_to(Door::Welded), Ok(Door::Welded));
    }

    #[test]
    fn transition_to_fails_for_missing_edge() {
        let err = Door::Open.transition_to(Door::Welded).unwrap_err();
        assert_eq!(err.field(), "status");
    }

    #[test]
    fn is_terminal_only_without_edges() {
        assert!(Door::Welded.is_terminal());
        assert!(!Door::Open.is_terminal());
    }
}
