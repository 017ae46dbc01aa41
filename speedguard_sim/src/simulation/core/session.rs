// speedguard_sim/src/simulation/core/session.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use speedguard_core::clock::{Clock, SystemClock};
use speedguard_core::estimation::filters::ScalarKalmanFilter;
use speedguard_core::estimation::SpeedFilter;
use speedguard_core::limit::SpeedLimit;
use speedguard_core::messages::{DisplayFrame, Sample};
use speedguard_core::types::Millis;
use speedguard_core::pipeline::{PipelineConfig, SamplePipeline};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::simulation::alerting::{dispatch_alert, AlertSink};
use crate::simulation::config::{CooldownClock, ScenarioConfig};
use crate::simulation::core::error::SessionError;
use crate::simulation::sensors::SampleSource;

/// Everything needed to build a fresh pipeline on each `start()`.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub pipeline: PipelineConfig,
    /// Prototype; each run gets its own clone.
    pub filter: Box<dyn SpeedFilter>,
    pub cooldown_clock: CooldownClock,
    pub initial_limit: SpeedLimit,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            filter: Box::new(ScalarKalmanFilter::<f64>::new()),
            cooldown_clock: CooldownClock::Wall,
            initial_limit: SpeedLimit::Disabled,
        }
    }
}

impl SessionSettings {
    pub fn from_scenario(config: &ScenarioConfig) -> Result<Self, SessionError> {
        Ok(Self {
            pipeline: config.session.pipeline_config(),
            filter: Box::new(config.filter.build()?),
            cooldown_clock: config.session.cooldown_clock,
            initial_limit: config.session.limit,
        })
    }
}

/// Counters reported when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub samples_processed: u64,
    pub samples_rejected: u64,
    pub alerts_fired: u64,
}

struct RunningSession {
    active: Arc<AtomicBool>,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<SessionSummary>,
}

/// A tracking session: owns the sensor subscription and the single worker
/// that is allowed to touch the filter.
pub struct TrackingSession {
    settings: SessionSettings,
    clock: Arc<dyn Clock>,
    alert_sink: Arc<dyn AlertSink>,
    limit_tx: watch::Sender<SpeedLimit>,
    display_tx: Arc<watch::Sender<DisplayFrame>>,
    running: Option<RunningSession>,
}

impl TrackingSession {
    pub fn new(settings: SessionSettings, alert_sink: Arc<dyn AlertSink>) -> Self {
        Self::with_clock(settings, alert_sink, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(
        settings: SessionSettings,
        alert_sink: Arc<dyn AlertSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (limit_tx, _) = watch::channel(settings.initial_limit);
        let (display_tx, _) = watch::channel(DisplayFrame {
            limit: settings.initial_limit,
            ..Default::default()
        });
        Self {
            settings,
            clock,
            alert_sink,
            limit_tx,
            display_tx: Arc::new(display_tx),
            running: None,
        }
    }

    pub fn limit(&self) -> SpeedLimit {
        *self.limit_tx.borrow()
    }

    /// Changes the limit. Takes effect from the next sample on.
    pub fn set_limit(&self, limit: SpeedLimit) {
        info!(%limit, "Speed limit changed");
        self.limit_tx.send_replace(limit);
    }

    /// Latest display frame, updated on every accepted sample.
    pub fn subscribe_display(&self) -> watch::Receiver<DisplayFrame> {
        self.display_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// Opens the sensor and spawns the worker. Must be called from within a
    /// tokio runtime. If the sensor cannot be opened nothing is started.
    /// A run whose stream already ended is replaced.
    pub fn start(&mut self, source: &mut dyn SampleSource) -> Result<(), SessionError> {
        if let Some(previous) = self.running.take() {
            if !previous.task.is_finished() {
                self.running = Some(previous);
                return Err(SessionError::AlreadyRunning);
            }
            // The last stream ended by itself and nobody called finish().
            debug!("Discarding finished run before restart");
        }

        let samples = source.open()?;
        let pipeline = SamplePipeline::new(self.settings.pipeline, self.settings.filter.clone())?;

        let active = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = SessionWorker {
            pipeline,
            samples,
            shutdown_rx,
            active: Arc::clone(&active),
            limit_rx: self.limit_tx.subscribe(),
            display_tx: Arc::clone(&self.display_tx),
            clock: Arc::clone(&self.clock),
            alert_sink: Arc::clone(&self.alert_sink),
            cooldown_clock: self.settings.cooldown_clock,
            last_stamp: None,
            summary: SessionSummary::default(),
        };

        info!(
            sensor = source.name(),
            limit = %self.limit(),
            "Tracking started"
        );
        self.running = Some(RunningSession {
            active,
            shutdown_tx,
            task: tokio::spawn(worker.run()),
        });
        Ok(())
    }

    /// Stops tracking, releases the sensor and discards the filter.
    pub async fn stop(&mut self) -> Result<SessionSummary, SessionError> {
        let running = self.running.take().ok_or(SessionError::NotRunning)?;
        running.active.store(false, Ordering::Release);
        // The worker may already have exited on its own; that is fine.
        let _ = running.shutdown_tx.send(());
        let summary = running.task.await?;
        info!(?summary, "Tracking stopped");
        Ok(summary)
    }

    /// Waits for the sensor stream to end by itself.
    pub async fn finish(&mut self) -> Result<SessionSummary, SessionError> {
        let running = self.running.take().ok_or(SessionError::NotRunning)?;
        let summary = running.task.await?;
        running.active.store(false, Ordering::Release);
        info!(?summary, "Tracking finished");
        Ok(summary)
    }
}

// =========================================================================
// == Worker ==
// =========================================================================

/// The only writer of the filter state. Lives for exactly one run.
struct SessionWorker {
    pipeline: SamplePipeline,
    samples: mpsc::Receiver<Sample>,
    shutdown_rx: oneshot::Receiver<()>,
    active: Arc<AtomicBool>,
    limit_rx: watch::Receiver<SpeedLimit>,
    display_tx: Arc<watch::Sender<DisplayFrame>>,
    clock: Arc<dyn Clock>,
    alert_sink: Arc<dyn AlertSink>,
    cooldown_clock: CooldownClock,
    /// Last sample timestamp and the clock reading when it arrived.
    last_stamp: Option<(Millis, Millis)>,
    summary: SessionSummary,
}

impl SessionWorker {
    async fn run(mut self) -> SessionSummary {
        loop {
            tokio::select! {
                biased;
                _ = &mut self.shutdown_rx => {
                    debug!("Stop requested, worker exiting");
                    break;
                }
                next = self.samples.recv() => match next {
                    Some(sample) => self.handle(sample),
                    None => {
                        info!("Location stream ended");
                        break;
                    }
                },
            }
        }
        // Dropping `self` here closes the receiver and releases the sensor.
        self.summary
    }

    fn handle(&mut self, sample: Sample) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }

        let limit = *self.limit_rx.borrow();
        let now_ms = self.cooldown_now(&sample);

        match self.pipeline.process(&sample, limit, now_ms) {
            Ok(output) => {
                self.summary.samples_processed += 1;
                self.display_tx.send_replace(DisplayFrame {
                    state: output.display,
                    zone: output.zone,
                    limit,
                });
                if let Some(event) = output.alert {
                    self.summary.alerts_fired += 1;
                    dispatch_alert(Arc::clone(&self.alert_sink), event);
                }
            }
            Err(e) => {
                self.summary.samples_rejected += 1;
                debug!(error = %e, "Dropping sample");
            }
        }
    }

    /// Time the cool-down is measured against. A sample without a timestamp
    /// carries the last one forward by the clock time elapsed since.
    fn cooldown_now(&mut self, sample: &Sample) -> Millis {
        let clock_ms = self.clock.now_ms();
        match (self.cooldown_clock, sample.timestamp) {
            (CooldownClock::Wall, _) => clock_ms,
            (CooldownClock::Sample, Some(ts)) => {
                self.last_stamp = Some((ts, clock_ms));
                ts
            }
            (CooldownClock::Sample, None) => match self.last_stamp {
                Some((ts, seen)) => ts.saturating_add(clock_ms.saturating_sub(seen)),
                None => clock_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::alerting::tests::FailingAlertSink;
    use crate::simulation::alerting::SilentAlertSink;
    use crate::simulation::core::error::SensorError;
    use crate::simulation::sensors::ChannelSensor;
    use speedguard_core::clock::ManualClock;
    use speedguard_core::display::SpeedZone;
    use std::time::Duration;

    fn settings(limit: SpeedLimit) -> SessionSettings {
        SessionSettings {
            initial_limit: limit,
            cooldown_clock: CooldownClock::Sample,
            ..Default::default()
        }
    }

    async fn send_all(tx: &mpsc::Sender<Sample>, speeds: &[f64], step_ms: u64) {
        for (i, &speed) in speeds.iter().enumerate() {
            tx.send(Sample::new(speed, 5.0, i as u64 * step_ms)).await.unwrap();
        }
    }

    struct DeniedSensor;

    impl SampleSource for DeniedSensor {
        fn name(&self) -> &str {
            "denied"
        }

        fn open(&mut self) -> Result<mpsc::Receiver<Sample>, SensorError> {
            Err(SensorError::PermissionDenied)
        }
    }

    #[tokio::test]
    async fn runs_until_the_stream_ends() {
        let sink = Arc::new(SilentAlertSink::default());
        let mut session = TrackingSession::new(settings(SpeedLimit::Kmh(60)), sink.clone());
        let (mut sensor, tx) = ChannelSensor::new();

        session.start(&mut sensor).unwrap();
        assert!(session.is_running());
        send_all(&tx, &[30.0, 30.0, f64::NAN, 30.0], 1_000).await;
        drop(tx);

        let summary = session.finish().await.unwrap();
        assert_eq!(
            summary,
            SessionSummary {
                samples_processed: 3,
                samples_rejected: 1,
                alerts_fired: 1,
            }
        );
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn publishes_display_frames() {
        let mut session = TrackingSession::new(
            settings(SpeedLimit::Kmh(60)),
            Arc::new(SilentAlertSink::default()),
        );
        let mut display = session.subscribe_display();
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();

        tx.send(Sample::new(30.0, 4.0, 1_000)).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), display.changed())
            .await
            .unwrap()
            .unwrap();
        let frame = *display.borrow_and_update();
        assert!(frame.state.current_speed > 60.0);
        assert_eq!(frame.state.accuracy, 4.0);
        assert_eq!(frame.state.timestamp, 1_000);
        assert_eq!(frame.zone, SpeedZone::Exceeded);
        assert_eq!(frame.limit, SpeedLimit::Kmh(60));

        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn second_start_is_rejected_while_running() {
        let mut session = TrackingSession::new(SessionSettings::default(), Arc::new(SilentAlertSink::default()));
        let (mut first, _tx1) = ChannelSensor::new();
        let (mut second, _tx2) = ChannelSensor::new();

        session.start(&mut first).unwrap();
        assert!(matches!(session.start(&mut second), Err(SessionError::AlreadyRunning)));
        session.stop().await.unwrap();
    }

    #[tokio::test]
    async fn denied_permission_does_not_start() {
        let mut session = TrackingSession::new(SessionSettings::default(), Arc::new(SilentAlertSink::default()));
        let err = session.start(&mut DeniedSensor).unwrap_err();
        assert!(matches!(err, SessionError::Sensor(SensorError::PermissionDenied)));
        assert!(!session.is_running());
        assert!(matches!(session.stop().await, Err(SessionError::NotRunning)));
    }

    #[tokio::test]
    async fn stop_releases_the_sensor() {
        let mut session = TrackingSession::new(SessionSettings::default(), Arc::new(SilentAlertSink::default()));
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();
        session.stop().await.unwrap();

        // The worker is gone, so nothing can reach the filter any more.
        assert!(tx.send(Sample::speed_only(10.0)).await.is_err());
    }

    #[tokio::test]
    async fn failing_alert_sink_does_not_interrupt_processing() {
        let sink = Arc::new(FailingAlertSink::default());
        let mut session = TrackingSession::new(settings(SpeedLimit::Kmh(60)), sink.clone());
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();

        send_all(&tx, &[30.0; 12], 1_000).await;
        drop(tx);

        let summary = session.finish().await.unwrap();
        assert_eq!(summary.samples_processed, 12);
        // Fires at 0 s, 5 s and 10 s.
        assert_eq!(summary.alerts_fired, 3);
    }

    #[tokio::test]
    async fn disabling_the_limit_mid_run_silences_alerts() {
        let mut session = TrackingSession::new(
            settings(SpeedLimit::Kmh(60)),
            Arc::new(SilentAlertSink::default()),
        );
        let mut display = session.subscribe_display();
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();

        tx.send(Sample::new(30.0, 5.0, 0)).await.unwrap();
        display.changed().await.unwrap();

        session.set_limit(SpeedLimit::Disabled);
        send_all(&tx, &[30.0; 4], 10_000).await;
        drop(tx);

        let summary = session.finish().await.unwrap();
        assert_eq!(summary.samples_processed, 5);
        assert_eq!(summary.alerts_fired, 1);
        assert_eq!(display.borrow().limit, SpeedLimit::Disabled);
    }

    #[tokio::test]
    async fn restart_uses_a_fresh_filter() {
        let mut session = TrackingSession::new(SessionSettings::default(), Arc::new(SilentAlertSink::default()));
        let mut display = session.subscribe_display();

        let (mut fast, tx) = ChannelSensor::new();
        session.start(&mut fast).unwrap();
        send_all(&tx, &[30.0; 5], 1_000).await;
        drop(tx);
        session.finish().await.unwrap();
        assert!(display.borrow_and_update().state.current_speed > 100.0);

        let (mut parked, tx) = ChannelSensor::new();
        session.start(&mut parked).unwrap();
        tx.send(Sample::new(0.0, 5.0, 0)).await.unwrap();
        drop(tx);
        session.finish().await.unwrap();
        // A reused filter would still read well above the display floor.
        assert_eq!(display.borrow().state.current_speed, 0.0);
    }

    #[tokio::test]
    async fn restarts_after_the_stream_ends_on_its_own() {
        let mut session = TrackingSession::new(SessionSettings::default(), Arc::new(SilentAlertSink::default()));
        let (mut first, tx) = ChannelSensor::new();
        session.start(&mut first).unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(1), async {
            while session.is_running() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        let (mut second, tx) = ChannelSensor::new();
        session.start(&mut second).unwrap();
        assert!(session.is_running());
        tx.send(Sample::speed_only(10.0)).await.unwrap();
        drop(tx);
        let summary = session.finish().await.unwrap();
        assert_eq!(summary.samples_processed, 1);
    }

    #[tokio::test]
    async fn sample_clock_without_timestamps_still_rearms() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = TrackingSession::with_clock(
            settings(SpeedLimit::Kmh(60)),
            Arc::new(SilentAlertSink::default()),
            clock.clone(),
        );
        let mut display = session.subscribe_display();
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();

        // One stamped fix, then a minute of partial ones a second apart.
        tx.send(Sample::new(30.0, 5.0, 50_000)).await.unwrap();
        display.changed().await.unwrap();
        for _ in 0..60 {
            clock.advance(1_000);
            tx.send(Sample::speed_only(30.0)).await.unwrap();
            display.changed().await.unwrap();
        }
        drop(tx);

        let summary = session.finish().await.unwrap();
        assert_eq!(summary.samples_processed, 61);
        // 0 s, 5 s, ... 60 s after the stamped fix.
        assert_eq!(summary.alerts_fired, 13);
    }

    #[tokio::test]
    async fn sample_clock_falls_back_to_the_clock_before_any_stamp() {
        let clock = Arc::new(ManualClock::new(0));
        let mut session = TrackingSession::with_clock(
            settings(SpeedLimit::Kmh(60)),
            Arc::new(SilentAlertSink::default()),
            clock.clone(),
        );
        let mut display = session.subscribe_display();
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();

        for _ in 0..11 {
            tx.send(Sample::speed_only(30.0)).await.unwrap();
            display.changed().await.unwrap();
            clock.advance(1_000);
        }
        drop(tx);

        let summary = session.finish().await.unwrap();
        assert_eq!(summary.alerts_fired, 3);
    }

    #[tokio::test]
    async fn wall_clock_cooldown_uses_the_injected_clock() {
        let clock = Arc::new(ManualClock::new(0));
        let settings = SessionSettings {
            initial_limit: SpeedLimit::Kmh(60),
            ..Default::default()
        };
        let mut session =
            TrackingSession::with_clock(settings, Arc::new(SilentAlertSink::default()), clock.clone());
        let mut display = session.subscribe_display();
        let (mut sensor, tx) = ChannelSensor::new();
        session.start(&mut sensor).unwrap();

        // Sample timestamps are far apart, but the wall clock has not moved.
        for t in [0_u64, 60_000, 120_000] {
            tx.send(Sample::new(30.0, 5.0, t)).await.unwrap();
            display.changed().await.unwrap();
        }
        clock.advance(5_000);
        tx.send(Sample::new(30.0, 5.0, 180_000)).await.unwrap();
        drop(tx);

        let summary = session.finish().await.unwrap();
        assert_eq!(summary.alerts_fired, 2);
    }
}
