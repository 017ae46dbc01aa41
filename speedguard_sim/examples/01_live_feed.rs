// speedguard_sim/examples/01_live_feed.rs

//! Drives a tracking session from a host-side feed.
//!
//! A platform location callback would push fixes into the `ChannelSensor`
//! sender; here a short loop plays that role. The limit is switched while
//! the session runs to show that the worker picks it up on the next sample.
//!
//! To run this example:
//! `cargo run --example 01_live_feed`

use std::sync::Arc;

use speedguard_sim::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(speedguard_sim::DEFAULT_LOG_FILTER))
        .init();

    let settings = SessionSettings {
        initial_limit: SpeedLimit::Kmh(50),
        cooldown_clock: CooldownClock::Sample,
        ..Default::default()
    };
    let mut session = TrackingSession::new(settings, Arc::new(ConsoleAlertSink));
    let mut display = session.subscribe_display();

    let (mut sensor, feed) = ChannelSensor::new();
    session.start(&mut sensor)?;

    for i in 0..20u64 {
        // 0 to 19 m/s in one-second steps.
        feed.send(Sample::new(i as f64, 4.0, i * 1_000)).await?;
        if i == 10 {
            session.set_limit(SpeedLimit::Kmh(60));
        }
        display.changed().await?;
        let frame = *display.borrow_and_update();
        println!(
            "{:>5.1} km/h  {:<11} limit {}",
            frame.state.current_speed,
            frame.zone.label(),
            frame.limit
        );
    }
    drop(feed);

    let summary = session.finish().await?;
    println!("{:?}", summary);
    Ok(())
}
