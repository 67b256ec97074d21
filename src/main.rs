//! Headless orb field driver.
//!
//! Usage: `orbfield [CONFIG.json] [FRAMES]`
//!
//! Runs the simulation at 1280x720 with a statistics sink. Set
//! `RUST_LOG=debug` for per-frame grid and graph counters.

use orbfield::prelude::*;

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;
const DEFAULT_FRAMES: u64 = 600;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = OrbConfig::default();
    let mut frames = DEFAULT_FRAMES;
    for arg in std::env::args().skip(1) {
        match arg.parse::<u64>() {
            Ok(n) => frames = n,
            Err(_) => config = OrbConfig::load(&arg)?,
        }
    }

    let mut sim = Simulation::new(config, WIDTH, HEIGHT)?;
    let mut stats = FrameStats::default();
    let mut clock = FrameClock::new();

    for _ in 0..frames {
        sim.render(&mut stats)?;
        clock.tick();
        if clock.frame() % 120 == 0 {
            log::info!(
                "frame {}: {} edges, {} connected orbs, {:.0} fps",
                clock.frame(),
                stats.last_edges,
                stats.last_connected,
                clock.fps()
            );
        }
    }

    println!("=== orbfield ===");
    println!("Orbs: {}", sim.orbs().len());
    println!("Frames: {}", stats.frames);
    println!("Edges per frame: {:.1} mean, {} max", stats.mean_edges(), stats.max_edges);
    println!("Wall time: {:.2}s", clock.elapsed());
    Ok(())
}
