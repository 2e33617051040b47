//! One-call refresh: projection, summary, window and trend.

use chrono::NaiveDateTime;
use tracing::debug;

use pulsar_domain::{HorizonChoice, Ledger, ZoomChoice};

use crate::{
    projection_service::{ProjectionService, ProjectionTable},
    summary_service::{ForecastSummary, SummaryService},
    trend_service::{TrendLine, TrendService, DEFAULT_TREND_DAYS},
    window_service::{ProjectionWindow, ScrollCommand, WindowService},
    CoreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForecastSettings {
    pub horizon: HorizonChoice,
    pub zoom: ZoomChoice,
}

#[derive(Debug, Clone)]
/// Everything the presentation layer needs after a rebuild.
pub struct Forecast {
    pub settings: ForecastSettings,
    pub table: ProjectionTable,
    pub summary: ForecastSummary,
    pub window: Option<ProjectionWindow>,
    pub trend: Option<TrendLine>,
}

impl Forecast {
    /// Applies scrollbar input and recomputes only the window.
    pub fn scroll(&mut self, command: ScrollCommand, now: NaiveDateTime) {
        if let Some(window) = self.window {
            let offset = WindowService::scroll(&window, command);
            self.window = WindowService::compute(
                &self.table,
                self.settings.zoom.span(),
                offset,
                true,
                now,
            );
        }
    }

    /// Switches zoom, keeping the current scroll offset where possible.
    pub fn set_zoom(&mut self, zoom: ZoomChoice, now: NaiveDateTime) {
        self.settings.zoom = zoom;
        let offset = self.scroll_offset().unwrap_or(0.0);
        self.window = WindowService::compute(&self.table, zoom.span(), offset, true, now);
    }

    pub fn scroll_offset(&self) -> Option<f64> {
        self.window.map(|window| window.scroll_offset)
    }
}

pub struct ForecastService;

impl ForecastService {
    /// Rebuilds the projection wholesale and derives summary, window and trend.
    ///
    /// `scroll` of `None` is a fresh rebuild that re-anchors the window on now;
    /// `Some(offset)` keeps the caller's scroll position.
    pub fn refresh(
        ledger: &Ledger,
        settings: ForecastSettings,
        scroll: Option<f64>,
        now: NaiveDateTime,
    ) -> Result<Forecast, CoreError> {
        let years = settings.horizon.years();
        let table = ProjectionService::build(ledger, years, now)?;
        let summary = SummaryService::summarize(&table, years, now)?;
        let window = WindowService::compute(
            &table,
            settings.zoom.span(),
            scroll.unwrap_or(0.0),
            scroll.is_some(),
            now,
        );
        let trend = TrendService::extrapolate(&table, DEFAULT_TREND_DAYS);
        debug!(
            horizon = %settings.horizon,
            zoom = %settings.zoom,
            delta = summary.delta,
            "forecast refreshed"
        );
        Ok(Forecast {
            settings,
            table,
            summary,
            window,
            trend,
        })
    }
}
