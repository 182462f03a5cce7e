/// Display targets for the refresh cycle.
///
/// `DisplayBoard` is the seam between the orchestrator and whatever shows
/// the readings. `Dashboard` is the in-memory board used by the service:
/// one panel per configured district, each remembering the last value
/// pushed to it. A value is never blanked by a failed read; it simply
/// stops being refreshed, which is what the staleness check surfaces.
///
/// # Clock injection
/// Staleness and rendering take `now` as a parameter so they stay
/// deterministic in tests.

use crate::widgets::{AqiCardView, TempCardView, gauge_bar};
use chrono::{DateTime, Local, Utc};

/// Receiver of per-district display updates. Last write wins.
pub trait DisplayBoard {
    fn set_pm25(&mut self, district: &str, value: f64);
    fn set_temp(&mut self, district: &str, value: f64);
    /// Called once after every refresh cycle, successful or not.
    fn cycle_finished(&mut self) {}
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DistrictPanel {
    pub district: String,
    pub pm25: Option<f64>,
    pub temp: Option<f64>,
    pub pm25_updated_at: Option<DateTime<Utc>>,
    pub temp_updated_at: Option<DateTime<Utc>>,
}

impl DistrictPanel {
    pub fn new(district: &str) -> Self {
        DistrictPanel {
            district: district.to_string(),
            pm25: None,
            temp: None,
            pm25_updated_at: None,
            temp_updated_at: None,
        }
    }

    pub fn aqi_card(&self) -> AqiCardView {
        AqiCardView::new(&self.district, self.pm25)
    }

    pub fn temp_card(&self) -> TempCardView {
        TempCardView::new(&self.district, self.temp)
    }

    /// Returns `true` if the panel has shown data before and its most recent
    /// update is older than `max_age` relative to `now`.
    ///
    /// Staleness is strictly greater than the threshold. A panel that has
    /// never received a value is not stale; it has no data.
    pub fn is_stale_at(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        match self.pm25_updated_at.max(self.temp_updated_at) {
            Some(latest) => now - latest > max_age,
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    panels: Vec<DistrictPanel>,
    revision: u64,
    cycles: u64,
}

impl Dashboard {
    /// One empty panel per district, in the given order.
    pub fn new<I, S>(districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Dashboard {
            panels: districts
                .into_iter()
                .map(|d| DistrictPanel::new(d.as_ref()))
                .collect(),
            revision: 0,
            cycles: 0,
        }
    }

    pub fn panel(&self, district: &str) -> Option<&DistrictPanel> {
        self.panels.iter().find(|p| p.district == district)
    }

    pub fn panels(&self) -> &[DistrictPanel] {
        &self.panels
    }

    /// Bumped on every change; renderers redraw when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of refresh cycles finished so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// True until the first refresh cycle has finished.
    pub fn is_loading(&self) -> bool {
        self.cycles == 0
    }

    fn panel_mut(&mut self, district: &str) -> Option<&mut DistrictPanel> {
        self.panels.iter_mut().find(|p| p.district == district)
    }

    /// Plain-text rendering: a clock header and two lines per district.
    pub fn render(&self, now: DateTime<Local>, stale_after: chrono::Duration) -> String {
        let mut out = format!("District air quality  {}\n", now.format("%H:%M:%S"));
        if self.is_loading() {
            out.push_str("  loading...\n");
        }

        let now_utc = now.with_timezone(&Utc);
        for panel in &self.panels {
            let aqi = panel.aqi_card();
            let temp = panel.temp_card();
            let stale = if panel.is_stale_at(stale_after, now_utc) { "  (stale)" } else { "" };

            out.push_str(&format!(
                "  {:<8} PM2.5 {:>6} µg/m³  AQI {:>3} {} {} / {}{}\n",
                panel.district,
                aqi.pm25_text,
                aqi.aqi_text,
                gauge_bar(aqi.gauge_percent(), 10),
                aqi.category.status,
                aqi.category.status_localized,
                stale,
            ));
            out.push_str(&format!(
                "  {:<8} Temp  {:>6} °C              {} {}\n",
                "",
                temp.temp_text,
                gauge_bar(temp.fill_percent(), 10),
                temp.category.status_localized,
            ));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Redraw rule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    revision: u64,
    second: i64,
    stale: Vec<bool>,
}

/// Decides when a terminal view of a `Dashboard` must be drawn again.
///
/// A redraw is due when the board changed, when the clock header moved to
/// a new second, or when a panel crossed the staleness threshold. The last
/// two happen with no writes at all, which is the case during an outage.
#[derive(Debug, Default)]
pub struct RedrawGate {
    shown: Option<Frame>,
}

impl RedrawGate {
    /// Returns `true` if the frame for `now` differs from the last one
    /// shown, and records it as shown.
    pub fn should_redraw(
        &mut self,
        board: &Dashboard,
        now: DateTime<Local>,
        stale_after: chrono::Duration,
    ) -> bool {
        let now_utc = now.with_timezone(&Utc);
        let frame = Frame {
            revision: board.revision(),
            second: now.timestamp(),
            stale: board
                .panels()
                .iter()
                .map(|p| p.is_stale_at(stale_after, now_utc))
                .collect(),
        };
        if self.shown.as_ref() == Some(&frame) {
            false
        } else {
            self.shown = Some(frame);
            true
        }
    }
}

impl DisplayBoard for Dashboard {
    fn set_pm25(&mut self, district: &str, value: f64) {
        if let Some(panel) = self.panel_mut(district) {
            panel.pm25 = Some(value);
            panel.pm25_updated_at = Some(Utc::now());
            self.revision += 1;
        }
    }

    fn set_temp(&mut self, district: &str, value: f64) {
        if let Some(panel) = self.panel_mut(district) {
            panel.temp = Some(value);
            panel.temp_updated_at = Some(Utc::now());
            self.revision += 1;
        }
    }

    fn cycle_finished(&mut self) {
        if self.cycles == 0 {
            self.revision += 1;
        }
        self.cycles += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
