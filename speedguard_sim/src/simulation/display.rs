// speedguard_sim/src/simulation/display.rs

use speedguard_core::display::{SpeedHistory, SpeedZone};
use speedguard_core::messages::DisplayFrame;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Text speedometer: the current reading in its zone colour plus a sparkline
/// of the recent history.
#[derive(Debug, Clone)]
pub struct SpeedometerRenderer {
    history: SpeedHistory,
    color: bool,
}

impl SpeedometerRenderer {
    pub fn new(history_len: usize, color: bool) -> Self {
        Self {
            history: SpeedHistory::with_capacity(history_len),
            color,
        }
    }

    pub fn history(&self) -> &SpeedHistory {
        &self.history
    }

    /// Records the frame and returns the line to print for it.
    pub fn render(&mut self, frame: &DisplayFrame) -> String {
        self.history.push(frame.state);

        let reading = format!("{:>6.1} km/h", frame.state.current_speed);
        let reading = if self.color {
            format!("{}{}\x1b[0m", zone_color(frame.zone), reading)
        } else {
            reading
        };

        format!(
            "{} | limit {:<9} | {:<11} | ±{:.0} m | {}",
            reading,
            frame.limit.to_string(),
            frame.zone.label(),
            frame.state.accuracy,
            self.sparkline()
        )
    }

    /// One character per history point, scaled to the largest point shown.
    pub fn sparkline(&self) -> String {
        let peak = self
            .history
            .iter()
            .map(|p| p.current_speed)
            .fold(0.0_f64, f64::max);
        if peak <= 0.0 {
            return std::iter::repeat(SPARK_LEVELS[0])
                .take(self.history.len())
                .collect();
        }
        let top = (SPARK_LEVELS.len() - 1) as f64;
        self.history
            .iter()
            .map(|p| SPARK_LEVELS[((p.current_speed / peak) * top).round() as usize])
            .collect()
    }
}

fn zone_color(zone: SpeedZone) -> &'static str {
    match zone {
        SpeedZone::Normal => "\x1b[32m",
        SpeedZone::Approaching => "\x1b[33m",
        SpeedZone::Exceeded => "\x1b[31m",
    }
}
