//! Serial-console display adapter.
//!
//! Implements [`DisplayPort`] by building the view models from
//! [`crate::view`] and printing them, one line per widget group.  Used as
//! the headless screen until a panel driver is wired in, and by host tests
//! to inspect what would have been drawn.

use log::info;

use crate::app::ports::DisplayPort;
use crate::station::StationState;
use crate::view::{DashboardView, HistoryChart};

#[derive(Default)]
pub struct LogDisplay {
    last_view: Option<DashboardView>,
    last_chart: Option<HistoryChart>,
    frames_drawn: u32,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_view(&self) -> Option<&DashboardView> {
        self.last_view.as_ref()
    }

    pub fn last_chart(&self) -> Option<&HistoryChart> {
        self.last_chart.as_ref()
    }

    /// Dashboard redraws since boot.
    pub fn frames_drawn(&self) -> u32 {
        self.frames_drawn
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, state: &StationState) {
        let view = DashboardView::build(state, state.units(), state.clock());
        self.frames_drawn += 1;

        info!("VIEW  | {} signal={:?}", view.clock, view.signal);
        info!(
            "VIEW  | out {} [{}] in {} [{}]",
            view.outdoor,
            view.outdoor_range.replace('\n', "/"),
            view.indoor,
            view.indoor_range.replace('\n', "/")
        );
        info!(
            "VIEW  | {} [{}] rain {} / {}",
            view.pressure,
            view.pressure_range.replace('\n', "/"),
            view.rain_day,
            view.rain_hour
        );
        info!(
            "VIEW  | wind {} gust {} arrow={:?} batt {} ({:?})",
            view.wind_speed, view.wind_gust, view.wind_arrow_deg, view.battery, view.battery_level
        );

        self.last_view = Some(view);
    }

    fn render_history_chart(&mut self, state: &StationState) {
        let chart = HistoryChart::build(state.stats().outdoor(), state.units(), state.clock().date());
        for i in 0..chart.labels.len() {
            info!(
                "CHART | {} {:>6.1} {:>6.1}",
                chart.labels[i], chart.max[i], chart.min[i]
            );
        }
        info!("CHART | axis {:.1}..{:.1}", chart.axis_min, chart.axis_max);
        self.last_chart = Some(chart);
    }
}
