use indexmap::IndexMap;
use tracing::debug;

use crate::core::Identity;
use crate::render::Color;

/// Transition length for positional/path attribute changes.
pub const POSITION_TRANSITION_MS: u64 = 500;
/// Transition length for mark enter/exit and color changes.
pub const MARK_TRANSITION_MS: u64 = 250;
/// Transition length for hover-driven opacity restoration.
pub const HOVER_TRANSITION_MS: u64 = 150;

/// Visual state of one rendered mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkAttrs {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
    pub fill: Color,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl MarkAttrs {
    /// Linear interpolation toward `to` at progress `t` in `[0, 1]`.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            x: mix(self.x, to.x),
            y: mix(self.y, to.y),
            radius: mix(self.radius, to.radius),
            opacity: mix(self.opacity, to.opacity),
            fill: self.fill.lerp(to.fill, t),
            // Stroke flips at the midpoint rather than blending with nothing.
            stroke: if t < 0.5 { self.stroke } else { to.stroke },
            stroke_width: mix(self.stroke_width, to.stroke_width),
        }
    }

    /// Zero-presence variant used as the enter start and exit end state.
    #[must_use]
    pub fn collapsed(self) -> Self {
        Self {
            radius: 0.0,
            opacity: 0.0,
            ..self
        }
    }
}

/// One animated attribute change for one mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub identity: Identity,
    pub from: MarkAttrs,
    pub to: MarkAttrs,
    pub duration_ms: u64,
}

impl Transition {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// Cancellable reference to a scheduled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle(u64);

/// Scheduling seam between the join engine and the host's frame loop.
///
/// Implementations choose frame-callback or timer-based stepping; the engine
/// only relies on "latest write wins" per mark identity.
pub trait TransitionScheduler {
    fn schedule(&mut self, transition: Transition) -> TransitionHandle;
    fn cancel(&mut self, handle: TransitionHandle);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct InFlight {
    handle: TransitionHandle,
    transition: Transition,
    elapsed_ms: u64,
}

/// Deterministic scheduler driven by an explicit clock.
///
/// Scheduling a new transition for an identity supersedes any in-flight one
/// for the same mark; overlapping transitions on distinct identities run
/// independently.
#[derive(Debug, Default)]
pub struct SteppedScheduler {
    next_handle: u64,
    in_flight: IndexMap<Identity, InFlight>,
    completed: usize,
}

impl SteppedScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock, returning the current attrs of every live mark.
    pub fn advance(&mut self, delta_ms: u64) -> IndexMap<Identity, MarkAttrs> {
        let mut snapshot = IndexMap::new();
        let mut finished = Vec::new();

        for (identity, entry) in &mut self.in_flight {
            entry.elapsed_ms += delta_ms;
            let t = if entry.transition.duration_ms == 0 {
                1.0
            } else {
                entry.elapsed_ms as f64 / entry.transition.duration_ms as f64
            };
            snapshot.insert(*identity, entry.transition.from.lerp(entry.transition.to, t));
            if entry.elapsed_ms >= entry.transition.duration_ms {
                finished.push(*identity);
            }
        }

        for identity in finished {
            self.in_flight.shift_remove(&identity);
            self.completed += 1;
        }
        snapshot
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed
    }
}

impl TransitionScheduler for SteppedScheduler {
    fn schedule(&mut self, transition: Transition) -> TransitionHandle {
        self.next_handle += 1;
        let handle = TransitionHandle(self.next_handle);

        if self.in_flight.contains_key(&transition.identity) {
            debug!(identity = %transition.identity, "superseding in-flight transition");
        }
        self.in_flight.insert(
            transition.identity,
            InFlight {
                handle,
                transition,
                elapsed_ms: 0,
            },
        );
        handle
    }

    fn cancel(&mut self, handle: TransitionHandle) {
        self.in_flight
            .retain(|_, entry| entry.handle != handle);
    }
}
