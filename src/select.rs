//! External-selection view and highlight reconciliation.
//!
//! The application-wide selection model lives outside the engine; charts
//! receive a read-only snapshot of it on every render pass and only ever
//! emit candidate identities back through outbound events.

use indexmap::IndexSet;

use crate::core::Identity;
use crate::render::Color;
use crate::theme::ThemeConfig;

/// Read-only snapshot of the application-wide selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionState {
    values: IndexSet<Identity>,
    /// Chart instance owning the in-progress interactive selection, if any.
    owner: Option<u64>,
}

impl SelectionState {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = Identity>, owner: Option<u64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            owner,
        }
    }

    #[must_use]
    pub fn contains(&self, identity: Identity) -> bool {
        self.values.contains(&identity)
    }

    #[must_use]
    pub fn values(&self) -> &IndexSet<Identity> {
        &self.values
    }

    #[must_use]
    pub fn owner(&self) -> Option<u64> {
        self.owner
    }

    /// The selection visible to one chart.
    ///
    /// A committed selection (no owner) is visible everywhere; an
    /// in-progress interactive one only highlights in the chart that owns
    /// it.
    #[must_use]
    pub fn visible_to(&self, chart_instance: u64) -> Self {
        match self.owner {
            None => self.clone(),
            Some(owner) if owner == chart_instance => self.clone(),
            Some(_) => Self::default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Visual state the external selection imposes on one mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkHighlight {
    pub opacity: f64,
    pub stroke: Option<Color>,
}

/// Pure function of `(identity, selected set, theme)`.
///
/// Recomputed on every render pass and never cached: the external set can
/// change without any local data change.
#[must_use]
pub fn resolve_highlight(
    identity: Identity,
    selection: &SelectionState,
    theme: &ThemeConfig,
) -> MarkHighlight {
    if selection.contains(identity) {
        MarkHighlight {
            opacity: 1.0,
            stroke: Some(theme.selection_highlight),
        }
    } else {
        MarkHighlight {
            opacity: theme.base_mark_opacity,
            stroke: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_marks_get_full_opacity_and_theme_stroke() {
        let theme = ThemeConfig::default();
        let selection = SelectionState::new([Identity(7)], Some(1));

        let selected = resolve_highlight(Identity(7), &selection, &theme);
        assert_eq!(selected.opacity, 1.0);
        assert_eq!(selected.stroke, Some(theme.selection_highlight));

        let unselected = resolve_highlight(Identity(8), &selection, &theme);
        assert_eq!(unselected.opacity, theme.base_mark_opacity);
        assert_eq!(unselected.stroke, None);
    }

    #[test]
    fn selection_is_only_visible_to_its_owner() {
        let selection = SelectionState::new([Identity(1)], Some(42));
        assert!(selection.visible_to(42).contains(Identity(1)));
        assert!(selection.visible_to(7).is_empty());
    }
}
