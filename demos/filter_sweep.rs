//! Sweep a one-pole filter's cutoff over white noise and print the level.
//!
//! Run with: cargo run --example filter_sweep [lowpass|highpass|allpass]
//!
//! Renders offline through a `NodeHost`: noise -> prewarp -> mm1p -> meter.
//! Host activity is logged at debug level.

use knoten::{HostConfig, NodeHost, NodeId, Value};

const BLOCK: usize = 256;
const BLOCKS: usize = 64;

fn main() -> knoten::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mode = std::env::args().nth(1).unwrap_or_else(|| "lowpass".to_owned());

    let mut host = NodeHost::<f32>::new(HostConfig::new(48000.0, BLOCK));
    let (noise, prewarp, filter, meter) = (NodeId(1), NodeId(2), NodeId(3), NodeId(4));

    host.create_node(noise, "rand")?;
    host.create_node(prewarp, "prewarp")?;
    host.create_node(filter, "mm1p")?;
    host.create_node(meter, "meter")?;

    host.set_property(noise, "seed", &Value::from(12345))?;
    host.set_property(filter, "mode", &Value::from(mode.as_str()))?;
    host.set_property(meter, "name", &Value::from(mode.as_str()))?;

    let mut signal = vec![0.0f32; BLOCK];
    let mut cutoff = vec![0.0f32; BLOCK];
    let mut g = vec![0.0f32; BLOCK];
    let mut filtered = vec![0.0f32; BLOCK];
    let mut metered = vec![0.0f32; BLOCK];

    // noise is in [0, 1]; center it so the filter sees a bipolar signal
    let mut centered = vec![0.0f32; BLOCK];

    for block in 0..BLOCKS {
        // exponential sweep from 50 Hz to ~20 kHz
        let start = 50.0 * 400f32.powf(block as f32 / BLOCKS as f32);
        let end = 50.0 * 400f32.powf((block + 1) as f32 / BLOCKS as f32);
        for (i, fc) in cutoff.iter_mut().enumerate() {
            *fc = start + (end - start) * i as f32 / BLOCK as f32;
        }

        host.render(noise, &[], &mut signal)?;
        for (c, &s) in centered.iter_mut().zip(signal.iter()) {
            *c = 2.0 * s - 1.0;
        }

        host.render(prewarp, &[&cutoff[..]], &mut g)?;
        host.render(filter, &[&g[..], &centered[..]], &mut filtered)?;
        host.render(meter, &[&filtered[..]], &mut metered)?;

        if block % 8 == 7 {
            let mut lines = Vec::new();
            host.process_queued_events(&mut |_id: NodeId, _name: &str, value: Value| {
                if let Some(reading) = value.as_object() {
                    let min = reading.get("min").and_then(Value::as_f64).unwrap_or(0.0);
                    let max = reading.get("max").and_then(Value::as_f64).unwrap_or(0.0);
                    lines.push(max.max(-min));
                }
            });

            let peak = lines.iter().cloned().fold(0.0, f64::max);
            println!(
                "{:>8.1} Hz  peak {:.3}  {}",
                end,
                peak,
                "#".repeat((peak * 40.0) as usize)
            );
        }
    }

    println!(
        "rendered {} samples through {}",
        host.sample_time(meter).unwrap_or(0),
        mode
    );

    Ok(())
}
