use indexmap::IndexSet;

use crate::core::Identity;

/// Outbound notifications from one engine instance.
///
/// The engine never mutates the application selection itself; it emits
/// candidate identity sets and the host decides what to commit. Events are
/// queued in order and drained by the host after each interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// A gesture produced a candidate selection.
    SelectRequested(IndexSet<Identity>),
    /// A mark was clicked.
    DimensionClicked(Identity),
    /// A lasso gesture finished with these identities inside its polygon.
    LassoCompleted(IndexSet<Identity>),
}
