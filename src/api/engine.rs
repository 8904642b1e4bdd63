use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexSet;
use tracing::debug;

use crate::chart::{ChartKind, FrameContext, LineChart, PieChart, ScatterChart};
use crate::core::layout::{PlotLayout, ScaleSet, fit_zoom_level};
use crate::core::margin::{Margin, MarginResolver, MonospaceMeasurer, TextMeasurer};
use crate::core::{DataPoint, Identity, Point, Viewport};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{
    GestureSource, LassoSelector, SyncOutcome, TooltipController, TooltipState, ViewportSync,
};
use crate::join::{
    DataJoin, HOVER_TRANSITION_MS, MarkAttrs, SteppedScheduler, Transition, TransitionScheduler,
};
use crate::join::sort_rows;
use crate::render::{RenderFrame, Renderer, TextHAlign, TextPrimitive};
use crate::select::SelectionState;
use crate::theme::ThemeConfig;

use super::{ChartEngineConfig, ChartEvent};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

enum Variant {
    Line(LineChart),
    Scatter(ScatterChart),
    Pie(PieChart),
}

/// One chart instance: data binding, gesture state, and frame production.
///
/// Every externally triggered change funnels into the invalidation flag;
/// `render` recomputes layout, scales, and marks at most once per flag set,
/// so a gesture never causes more than one domain recompute and one draw.
pub struct ChartEngine<R: Renderer> {
    renderer: R,
    config: ChartEngineConfig,
    theme: ThemeConfig,
    instance: u64,
    rows: Vec<DataPoint>,
    margin_resolver: MarginResolver,
    measurer: Box<dyn TextMeasurer>,
    variant: Variant,
    sync: Option<ViewportSync>,
    lasso: LassoSelector,
    tooltip: TooltipController,
    scheduler: SteppedScheduler,
    selection: SelectionState,
    events: Vec<ChartEvent>,
    pending_invalidation: bool,
    needs_fit: bool,
}

impl<R: Renderer> ChartEngine<R> {
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        Self::with_text_measurer(renderer, config, Box::new(MonospaceMeasurer::default()))
    }

    /// Like [`ChartEngine::new`], with host-supplied text metrics driving
    /// margin resolution instead of the monospace estimate.
    pub fn with_text_measurer(
        renderer: R,
        config: ChartEngineConfig,
        measurer: Box<dyn TextMeasurer>,
    ) -> ChartResult<Self> {
        config.validate()?;

        let theme = ThemeConfig::resolve(&config.theme);
        let variant = match config.kind {
            ChartKind::Line => Variant::Line(LineChart::new()),
            ChartKind::Scatter => Variant::Scatter(ScatterChart::new()),
            ChartKind::Pie => Variant::Pie(PieChart::new()),
        };
        let lasso = LassoSelector::new(config.lasso);

        Ok(Self {
            renderer,
            theme,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            rows: Vec::new(),
            margin_resolver: MarginResolver::new(),
            measurer,
            variant,
            sync: None,
            lasso,
            tooltip: TooltipController::new(),
            scheduler: SteppedScheduler::new(),
            selection: SelectionState::default(),
            events: Vec::new(),
            pending_invalidation: true,
            needs_fit: true,
            config,
        })
    }

    /// Binds a new row set, validating its column shape for this variant.
    pub fn set_data(&mut self, mut rows: Vec<DataPoint>) -> ChartResult<()> {
        self.config.kind.validate_rows(&rows)?;
        sort_rows(&mut rows);
        self.rows = rows;
        self.needs_fit = true;
        self.pending_invalidation = true;
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.config.viewport = viewport;
        self.needs_fit = true;
        self.pending_invalidation = true;
        Ok(())
    }

    /// Replaces the external selection snapshot for the next render pass.
    pub fn set_selection(&mut self, selection: SelectionState) {
        self.selection = selection;
        self.pending_invalidation = true;
    }

    /// Toggles lasso mode. While set, zoom gestures on this chart are
    /// ignored; the two gestures share the pointer.
    pub fn set_lasso_enabled(&mut self, enabled: bool) {
        self.lasso.set_enabled(enabled);
    }

    #[must_use]
    pub fn rows(&self) -> &[DataPoint] {
        &self.rows
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    #[must_use]
    pub fn config(&self) -> &ChartEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn tooltip(&self) -> &TooltipState {
        self.tooltip.state()
    }

    #[must_use]
    pub fn instance_id(&self) -> u64 {
        self.instance
    }

    #[must_use]
    pub fn has_pending_invalidation(&self) -> bool {
        self.pending_invalidation
    }

    pub fn clear_pending_invalidation(&mut self) {
        self.pending_invalidation = false;
    }

    /// Drains queued outbound events in emission order.
    pub fn drain_events(&mut self) -> Vec<ChartEvent> {
        std::mem::take(&mut self.events)
    }

    /// Zoom gesture over the main plot.
    ///
    /// Returns true when the gesture changed the window (and was rendered).
    pub fn zoom(
        &mut self,
        source: GestureSource,
        scale: f64,
        translate_x: f64,
    ) -> ChartResult<bool> {
        if self.lasso.is_enabled() {
            debug!("zoom gesture ignored while lasso mode is active");
            return Ok(false);
        }
        let Some(sync) = self.sync.as_mut() else {
            return Ok(false);
        };
        match sync.on_zoom(source, scale, translate_x)? {
            SyncOutcome::Applied(_) => {
                self.pending_invalidation = true;
                self.render()?;
                Ok(true)
            }
            SyncOutcome::Ignored => Ok(false),
        }
    }

    /// Brush gesture over the overview strip.
    pub fn brush(&mut self, source: GestureSource, lo: f64, hi: f64) -> ChartResult<bool> {
        let Some(sync) = self.sync.as_mut() else {
            return Ok(false);
        };
        match sync.on_brush(source, lo, hi)? {
            SyncOutcome::Applied(_) => {
                self.pending_invalidation = true;
                self.render()?;
                Ok(true)
            }
            SyncOutcome::Ignored => Ok(false),
        }
    }

    /// Wheel over the pie: rotates the donut one notch and hides the
    /// tooltip, since every slice moves under the pointer.
    pub fn wheel(&mut self, delta: f64) -> ChartResult<bool> {
        match &mut self.variant {
            Variant::Pie(pie) => {
                pie.rotate(delta);
                self.tooltip.hide();
                self.pending_invalidation = true;
                self.render()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn lasso_begin(&mut self, origin: Point) -> ChartResult<()> {
        self.lasso.start(origin)?;
        Ok(())
    }

    pub fn lasso_move(&mut self, point: Point) -> ChartResult<IndexSet<Identity>> {
        let marks = self.mark_positions();
        Ok(self.lasso.extend(point, marks)?.possible)
    }

    /// Ends the lasso, emitting the finalized set as both a lasso
    /// completion and a selection request.
    pub fn lasso_finish(&mut self) -> ChartResult<IndexSet<Identity>> {
        let marks = self.mark_positions();
        let selected = self.lasso.finish(marks)?;
        self.events.push(ChartEvent::LassoCompleted(selected.clone()));
        if !selected.is_empty() {
            self.events.push(ChartEvent::SelectRequested(selected.clone()));
        }
        Ok(selected)
    }

    /// Pointer entered a mark: show the tooltip and brighten the mark.
    pub fn mark_over(&mut self, identity: Identity) -> ChartResult<()> {
        let Some(position) = self.mark_position(identity) else {
            return Err(ChartError::Gesture(format!(
                "hover over unknown mark {identity}"
            )));
        };
        let Some(row) = self.rows.iter().find(|row| row.identity == identity) else {
            return Err(ChartError::Gesture(format!(
                "hover over mark {identity} with no backing row"
            )));
        };
        self.tooltip.on_mark_over(row, position);

        if let Some(attrs) = self.mark_attrs(identity) {
            self.scheduler.schedule(Transition {
                identity,
                from: attrs,
                to: MarkAttrs {
                    opacity: 1.0,
                    ..attrs
                },
                duration_ms: HOVER_TRANSITION_MS,
            });
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.tooltip.on_pointer_move(position);
    }

    /// Pointer left a mark: the tooltip hides instantly while the mark's
    /// opacity animates back to its committed, selection-driven value.
    pub fn mark_out(&mut self) {
        if let Some(identity) = self.tooltip.on_mark_out()
            && let Some(attrs) = self.mark_attrs(identity)
        {
            self.scheduler.schedule(Transition {
                identity,
                from: MarkAttrs {
                    opacity: 1.0,
                    ..attrs
                },
                to: attrs,
                duration_ms: HOVER_TRANSITION_MS,
            });
        }
    }

    /// Mark clicked: emits the identity as a click and a single-candidate
    /// selection request.
    pub fn mark_click(&mut self, identity: Identity) {
        self.events.push(ChartEvent::DimensionClicked(identity));
        self.events
            .push(ChartEvent::SelectRequested(IndexSet::from([identity])));
    }

    /// Steps the animation clock, returning current attrs of live marks.
    pub fn advance_animations(
        &mut self,
        delta_ms: u64,
    ) -> indexmap::IndexMap<Identity, MarkAttrs> {
        self.scheduler.advance(delta_ms)
    }

    /// Renders the current state if anything invalidated it.
    pub fn render(&mut self) -> ChartResult<bool> {
        if !self.pending_invalidation {
            return Ok(false);
        }
        let frame = self.build_frame()?;
        self.renderer.render(&frame)?;
        self.pending_invalidation = false;
        Ok(true)
    }

    /// Builds the scene for the current state without rendering it.
    pub fn build_frame(&mut self) -> ChartResult<RenderFrame> {
        let viewport = self.config.viewport;
        if self.rows.is_empty() {
            return Ok(RenderFrame::placeholder(
                viewport,
                self.config.placeholder_text.clone(),
            ));
        }

        let margin = self.resolve_margin();
        let inner_width = f64::from(viewport.width) - margin.horizontal();
        let fit = fit_zoom_level(inner_width, self.rows.len(), self.overview_capable());
        let zoomed = fit > 1.0;
        let layout = PlotLayout::compute(viewport, margin, zoomed)?;

        if self.overview_capable() {
            match self.sync.as_mut() {
                Some(sync) => sync.set_width(layout.inner_width)?,
                None => {
                    self.sync = Some(ViewportSync::new(
                        layout.inner_width,
                        self.config.zoom_limits,
                    )?);
                }
            }
            if self.needs_fit
                && let Some(sync) = self.sync.as_mut()
            {
                sync.auto_fit(fit)?;
                self.needs_fit = false;
            }
        }

        let visible = self.visible_selection();
        let ctx = FrameContext {
            viewport,
            margin,
            layout,
            theme: &self.theme,
            selection: &visible,
            x_tick_count: self.config.x_tick_count.unwrap_or(self.config.tick_count),
            y_tick_count: self.config.y_tick_count.unwrap_or(self.config.tick_count),
        };

        let mut frame = match &mut self.variant {
            Variant::Line(line) => {
                let mut scales =
                    ScaleSet::from_rows(&self.rows, layout, self.config.tick_count, zoomed)?
                    .ok_or_else(|| {
                        ChartError::InvalidData("no scales for a non-empty row set".to_owned())
                    })?;
                let brush = self.sync.as_ref().map(|sync| sync.brush_extent());
                if let Some(sync) = &self.sync {
                    sync.apply_to_scale(&mut scales.x)?;
                }
                let (main_plan, overview_plan) = line.join(&self.rows, &scales, &ctx, brush)?;
                DataJoin::animate(&main_plan, &mut self.scheduler);
                if let Some(plan) = &overview_plan {
                    DataJoin::animate(plan, &mut self.scheduler);
                }
                line.frame(&ctx, &scales, if zoomed { brush } else { None })?
            }
            Variant::Scatter(scatter) => {
                let (x, y) = ScatterChart::scales(&self.rows, &ctx)?.ok_or_else(|| {
                    ChartError::InvalidData("no scales for a non-empty row set".to_owned())
                })?;
                let plan = scatter.join(&self.rows, x, y, &ctx)?;
                DataJoin::animate(&plan, &mut self.scheduler);
                scatter.frame(&ctx, x, y)?
            }
            Variant::Pie(pie) => {
                pie.layout(&self.rows, &ctx)?;
                pie.frame(&ctx)?
            }
        };

        self.push_labels(&mut frame, margin, layout.inner_width);
        frame.validate()?;
        Ok(frame)
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn overview_capable(&self) -> bool {
        matches!(self.config.kind, ChartKind::Line) && self.config.viewbox
    }

    fn visible_selection(&self) -> SelectionState {
        self.selection.visible_to(self.instance)
    }

    fn resolve_margin(&mut self) -> Margin {
        self.margin_resolver.resolve(
            &self.rows,
            self.config.viewport,
            self.theme.axis_text.font_size_px,
            &self.theme.axis_text_font_family,
            self.config.x_axis_label.is_some(),
            self.config.y_axis_label.is_some(),
            self.measurer.as_ref(),
        )
    }

    fn mark_positions(&self) -> Vec<(Identity, Point)> {
        match &self.variant {
            Variant::Line(line) => line.mark_positions(),
            Variant::Scatter(scatter) => scatter.mark_positions(),
            Variant::Pie(pie) => pie.mark_positions(),
        }
    }

    fn mark_position(&self, identity: Identity) -> Option<Point> {
        self.mark_positions()
            .into_iter()
            .find(|(id, _)| *id == identity)
            .map(|(_, position)| position)
    }

    fn mark_attrs(&self, identity: Identity) -> Option<MarkAttrs> {
        match &self.variant {
            Variant::Line(line) => line.mark_attrs(identity),
            Variant::Scatter(scatter) => scatter.mark_attrs(identity),
            Variant::Pie(pie) => pie.mark_attrs(identity),
        }
    }

    fn push_labels(&self, frame: &mut RenderFrame, margin: Margin, inner_width: f64) {
        let center_x = margin.left + inner_width / 2.0;
        if let Some(title) = &self.config.title {
            frame.texts.push(TextPrimitive::new(
                title.clone(),
                center_x,
                margin.top / 2.0,
                self.theme.title_label.font_size_px,
                self.theme.title_label.color,
                TextHAlign::Center,
            ));
        }
        if let Some(label) = &self.config.x_axis_label {
            frame.texts.push(TextPrimitive::new(
                label.clone(),
                center_x,
                f64::from(self.config.viewport.height) - 4.0,
                self.theme.x_axis_label.font_size_px,
                self.theme.x_axis_label.color,
                TextHAlign::Center,
            ));
        }
        if let Some(label) = &self.config.y_axis_label {
            frame.texts.push(TextPrimitive::new(
                label.clone(),
                12.0,
                f64::from(self.config.viewport.height) / 2.0,
                self.theme.y_axis_label.font_size_px,
                self.theme.y_axis_label.color,
                TextHAlign::Left,
            ));
        }
    }
}
