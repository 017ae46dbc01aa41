// speedguard_sim/src/runner.rs

//! Wires a scenario into a tracking session: sensor in, speedometer and
//! alert player out.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::simulation::alerting::{AlertSink, ConsoleAlertSink, SilentAlertSink};
use crate::simulation::config::ScenarioConfig;
use crate::simulation::core::error::SessionError;
use crate::simulation::core::session::{SessionSettings, SessionSummary, TrackingSession};
use crate::simulation::display::SpeedometerRenderer;
use crate::simulation::sensors::build_source;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Count alerts instead of ringing the bell.
    pub quiet: bool,
    /// Print a speedometer line for every frame.
    pub render: bool,
    /// Colour the speedometer by zone.
    pub color: bool,
}

/// Runs one scenario to the end of its sensor stream.
pub async fn run_scenario(
    config: &ScenarioConfig,
    options: RunOptions,
) -> Result<SessionSummary, SessionError> {
    let settings = SessionSettings::from_scenario(config)?;
    let alert_sink: Arc<dyn AlertSink> = if options.quiet {
        Arc::new(SilentAlertSink::default())
    } else {
        Arc::new(ConsoleAlertSink)
    };

    let mut session = TrackingSession::new(settings, alert_sink);
    let renderer = options
        .render
        .then(|| spawn_renderer(&session, config.session.history_len, options.color));

    let mut source = build_source(config);
    session.start(source.as_mut())?;
    let summary = session.finish().await?;

    if let Some(renderer) = renderer {
        // The display channel closes with the session; the renderer drains and exits.
        drop(session);
        let _ = renderer.await;
    }

    info!(
        processed = summary.samples_processed,
        rejected = summary.samples_rejected,
        alerts = summary.alerts_fired,
        "Scenario complete"
    );
    Ok(summary)
}

/// Prints every display frame the session publishes. When samples arrive
/// faster than the terminal keeps up, intermediate frames are coalesced.
fn spawn_renderer(session: &TrackingSession, history_len: usize, color: bool) -> JoinHandle<()> {
    let mut display = session.subscribe_display();
    let mut renderer = SpeedometerRenderer::new(history_len, color);
    tokio::spawn(async move {
        while display.changed().await.is_ok() {
            let frame = *display.borrow_and_update();
            println!("{}", renderer.render(&frame));
        }
    })
}
