//! Maps a zoom span and scroll offset onto a visible slice of the projection.

use chrono::{Duration, NaiveDateTime};

use pulsar_domain::{days_between, ZoomSpan};

use crate::projection_service::ProjectionTable;

/// Fraction of the visible width moved by one scroll unit.
pub const UNIT_STEP: f64 = 0.1;
/// Fraction of the visible width moved by one scroll page.
pub const PAGE_STEP: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionWindow {
    pub visible_start: NaiveDateTime,
    pub visible_end: NaiveDateTime,
    /// Left edge of the window as a fraction of the whole projection.
    pub scroll_offset: f64,
    /// Width of the window as a fraction of the whole projection.
    pub visible_ratio: f64,
    pub total_days: f64,
    pub view_days: f64,
}

impl ProjectionWindow {
    /// Scrollbar thumb as `(low, high)` fractions.
    pub fn thumb(&self) -> (f64, f64) {
        (self.scroll_offset, self.scroll_offset + self.visible_ratio)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.visible_start && at <= self.visible_end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Scrollbar input, translated into a new offset before the window is recomputed.
pub enum ScrollCommand {
    Units(f64),
    Pages(f64),
    MoveTo(f64),
}

impl ScrollCommand {
    pub fn apply(self, offset: f64, visible_ratio: f64) -> f64 {
        let target = match self {
            ScrollCommand::Units(units) => offset + units * UNIT_STEP * visible_ratio,
            ScrollCommand::Pages(pages) => offset + pages * PAGE_STEP * visible_ratio,
            ScrollCommand::MoveTo(fraction) => fraction,
        };
        clamp_offset(target, visible_ratio)
    }
}

pub struct WindowService;

impl WindowService {
    /// Computes the visible window, or `None` when the table has no rows.
    ///
    /// Without `preserve_scroll` the window opens with "now" at its left edge
    /// when now lies inside the data, otherwise at the start of the data.
    pub fn compute(
        table: &ProjectionTable,
        zoom: ZoomSpan,
        scroll_offset: f64,
        preserve_scroll: bool,
        now: NaiveDateTime,
    ) -> Option<ProjectionWindow> {
        let first = table.first_timestamp()?;
        let last = table.last_timestamp()?;
        let total_days = days_between(first, last).max(1.0);
        let view_days = match zoom {
            ZoomSpan::Days(days) if days > 0.0 => days,
            _ => total_days,
        };
        let visible_ratio = (view_days / total_days).min(1.0);

        let requested = if preserve_scroll {
            scroll_offset
        } else if now >= first && now <= last {
            days_between(first, now) / total_days
        } else {
            0.0
        };
        let offset = clamp_offset(requested, visible_ratio);

        let visible_start = shift_days(first, offset * total_days)?;
        let visible_end = shift_days(visible_start, view_days)?;
        Some(ProjectionWindow {
            visible_start,
            visible_end,
            scroll_offset: offset,
            visible_ratio,
            total_days,
            view_days,
        })
    }

    /// Offset resulting from applying `command` to `window`.
    pub fn scroll(window: &ProjectionWindow, command: ScrollCommand) -> f64 {
        command.apply(window.scroll_offset, window.visible_ratio)
    }
}

fn clamp_offset(offset: f64, visible_ratio: f64) -> f64 {
    if !offset.is_finite() {
        return 0.0;
    }
    let max_offset = (1.0 - visible_ratio).max(0.0);
    offset.max(0.0).min(max_offset)
}

fn shift_days(from: NaiveDateTime, days: f64) -> Option<NaiveDateTime> {
    let millis = (days * 86_400_000.0).round();
    from.checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}
