//! # Phases
//!
//! A level is grown in ordered phases. Each phase has a placement budget
//! and a pool of prototypes it may draw from; connectors it cannot resolve
//! carry over to the next phase.

use crate::connector::ConnectorRef;
use crate::library::PrototypeId;

/// Static description of one phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseConfig {
    /// Display name.
    pub name: String,
    /// Maximum number of parts this phase may place.
    pub part_budget: u32,
    /// Prototypes this phase draws from.
    pub part_pool: Vec<PrototypeId>,
}

impl PhaseConfig {
    /// Creates a phase.
    #[must_use]
    pub fn new(name: impl Into<String>, part_budget: u32, part_pool: Vec<PrototypeId>) -> Self {
        Self {
            name: name.into(),
            part_budget,
            part_pool,
        }
    }
}

/// Runtime state of the current phase.
///
/// Every unresolved outbound connector lives in exactly one of the two
/// queues. `open` is worked on; `failed` waits for the next phase.
#[derive(Clone, Debug, Default)]
pub struct PhaseStatus {
    pub(crate) index: usize,
    pub(crate) remaining_budget: u32,
    pub(crate) placed: u32,
    /// Private copy, reshuffled per attempt.
    pub(crate) pool: Vec<PrototypeId>,
    pub(crate) open: Vec<ConnectorRef>,
    pub(crate) failed: Vec<ConnectorRef>,
}

impl PhaseStatus {
    /// Enters phase `index` with the connectors carried into it.
    #[must_use]
    pub(crate) fn enter(index: usize, config: &PhaseConfig, carried: Vec<ConnectorRef>) -> Self {
        Self {
            index,
            remaining_budget: config.part_budget,
            placed: 0,
            pool: config.part_pool.clone(),
            open: carried,
            failed: Vec::new(),
        }
    }

    /// Whether the phase can still attempt a placement.
    #[must_use]
    pub fn has_work(&self) -> bool {
        self.remaining_budget > 0 && !self.open.is_empty()
    }

    /// Hands every unresolved connector to the next phase, open ones first.
    #[must_use]
    pub(crate) fn into_carried(self) -> Vec<ConnectorRef> {
        let mut carried = self.open;
        carried.extend(self.failed);
        carried
    }

    /// Position in the phase list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Placements left.
    #[must_use]
    pub fn remaining_budget(&self) -> u32 {
        self.remaining_budget
    }

    /// Placements made so far in this phase.
    #[must_use]
    pub fn placed(&self) -> u32 {
        self.placed
    }

    /// Connectors still to be attempted in this phase.
    #[must_use]
    pub fn open(&self) -> &[ConnectorRef] {
        &self.open
    }

    /// Connectors this phase gave up on.
    #[must_use]
    pub fn failed(&self) -> &[ConnectorRef] {
        &self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_carry() {
        let config = PhaseConfig::new("halls", 3, vec![PrototypeId(0), PrototypeId(1)]);
        let mut status = PhaseStatus::enter(0, &config, vec![ConnectorRef::new(0, 1)]);
        assert!(status.has_work());
        assert_eq!(status.remaining_budget(), 3);
        assert_eq!(status.pool, config.part_pool);

        let a = status.open.remove(0);
        status.failed.push(a);
        status.open.push(ConnectorRef::new(1, 2));
        assert_eq!(
            status.into_carried(),
            vec![ConnectorRef::new(1, 2), ConnectorRef::new(0, 1)]
        );
    }

    #[test]
    fn test_no_work_without_budget_or_connectors() {
        let empty_budget = PhaseStatus::enter(0, &PhaseConfig::new("a", 0, vec![]), vec![ConnectorRef::new(0, 0)]);
        assert!(!empty_budget.has_work());

        let nothing_open = PhaseStatus::enter(0, &PhaseConfig::new("b", 5, vec![]), Vec::new());
        assert!(!nothing_open.has_work());
    }
}
