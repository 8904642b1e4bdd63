//! Identity-keyed data join.
//!
//! Reconciles an incoming ordered row sequence against the currently
//! rendered mark set, producing enter/update/exit transition plans. The
//! join always computes against the committed mark state, never against
//! pending transitions, so a newer data set simply supersedes in-flight
//! animation targets.

pub mod transition;

use indexmap::IndexMap;

pub use transition::{
    HOVER_TRANSITION_MS, MARK_TRANSITION_MS, MarkAttrs, POSITION_TRANSITION_MS,
    SteppedScheduler, Transition, TransitionHandle, TransitionScheduler,
};

use crate::core::{DataPoint, Identity};
use crate::error::{ChartError, ChartResult};

/// The three partitions of one join pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinPlan {
    /// Marks appearing this pass: start collapsed at their final position.
    pub enter: Vec<Transition>,
    /// Marks present in both passes: animate previous attrs to new ones.
    pub update: Vec<Transition>,
    /// Marks gone this pass: animate to a collapsed state, then remove.
    pub exit: Vec<Transition>,
}

impl JoinPlan {
    /// True when the pass changed nothing: no enter/exit and every update
    /// carries identical attrs.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        self.enter.is_empty()
            && self.exit.is_empty()
            && self.update.iter().all(Transition::is_noop)
    }
}

/// Sorts rows ascending by primary dimension value.
///
/// Stable: rows sharing a dimension value keep their input order, so
/// path-based marks render without self-intersection.
pub fn sort_rows(rows: &mut [DataPoint]) {
    rows.sort_by(|a, b| match (a.primary_dimension(), b.primary_dimension()) {
        (Some(left), Some(right)) => left.sort_cmp(right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Transition lengths for the three join partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinTimings {
    pub enter_ms: u64,
    pub update_ms: u64,
    pub exit_ms: u64,
}

impl Default for JoinTimings {
    fn default() -> Self {
        Self {
            enter_ms: MARK_TRANSITION_MS,
            update_ms: POSITION_TRANSITION_MS,
            exit_ms: MARK_TRANSITION_MS,
        }
    }
}

/// Per-surface join state; one per mark surface (main plot, overview strip).
#[derive(Debug, Default)]
pub struct DataJoin {
    marks: IndexMap<Identity, MarkAttrs>,
}

impl DataJoin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently committed mark attrs, in render order.
    #[must_use]
    pub fn marks(&self) -> &IndexMap<Identity, MarkAttrs> {
        &self.marks
    }

    #[must_use]
    pub fn contains(&self, identity: Identity) -> bool {
        self.marks.contains_key(&identity)
    }

    /// Joins `rows` (already sorted) against the committed mark set.
    ///
    /// `target` projects a row to its final visual state; `exit_target`
    /// derives the collapse state for leaving marks from their last attrs.
    /// Commits the new mark set before returning, so a repeated join with
    /// the same rows yields a no-op plan.
    pub fn join(
        &mut self,
        rows: &[DataPoint],
        target: impl FnMut(&DataPoint) -> MarkAttrs,
        exit_target: impl Fn(MarkAttrs) -> MarkAttrs,
        update_duration_ms: u64,
    ) -> ChartResult<JoinPlan> {
        self.join_with(
            rows,
            target,
            MarkAttrs::collapsed,
            exit_target,
            JoinTimings {
                update_ms: update_duration_ms,
                ..JoinTimings::default()
            },
        )
    }

    /// Full-control join variant: `enter_from` derives the enter start
    /// state from the final attrs, and each partition carries its own
    /// duration (the scatter chart grows marks from the baseline).
    pub fn join_with(
        &mut self,
        rows: &[DataPoint],
        mut target: impl FnMut(&DataPoint) -> MarkAttrs,
        enter_from: impl Fn(MarkAttrs) -> MarkAttrs,
        exit_target: impl Fn(MarkAttrs) -> MarkAttrs,
        timings: JoinTimings,
    ) -> ChartResult<JoinPlan> {
        let mut next: IndexMap<Identity, MarkAttrs> = IndexMap::with_capacity(rows.len());
        for row in rows {
            let attrs = target(row);
            if next.insert(row.identity, attrs).is_some() {
                return Err(ChartError::InvalidData(format!(
                    "duplicate identity {} within one render pass",
                    row.identity
                )));
            }
        }

        let mut plan = JoinPlan::default();

        for (identity, attrs) in &next {
            match self.marks.get(identity) {
                Some(previous) => plan.update.push(Transition {
                    identity: *identity,
                    from: *previous,
                    to: *attrs,
                    duration_ms: timings.update_ms,
                }),
                None => plan.enter.push(Transition {
                    identity: *identity,
                    from: enter_from(*attrs),
                    to: *attrs,
                    duration_ms: timings.enter_ms,
                }),
            }
        }

        for (identity, previous) in &self.marks {
            if !next.contains_key(identity) {
                plan.exit.push(Transition {
                    identity: *identity,
                    from: *previous,
                    to: exit_target(*previous),
                    duration_ms: timings.exit_ms,
                });
            }
        }

        self.marks = next;
        Ok(plan)
    }

    /// Feeds a plan into a scheduler, one transition per touched mark.
    pub fn animate(plan: &JoinPlan, scheduler: &mut dyn TransitionScheduler) {
        for transition in plan
            .enter
            .iter()
            .chain(&plan.update)
            .chain(&plan.exit)
        {
            if !transition.is_noop() {
                scheduler.schedule(*transition);
            }
        }
    }
}
