use anyhow::Context;
use clap::Parser;

use bookbugs::{BugConfig, DemoBook, Engine};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated duration in seconds
    #[arg(long, default_value = "30.0")]
    duration: f32,

    /// Tick rate in Hz
    #[arg(long, default_value = "60.0")]
    fps: f32,

    /// Seconds between scripted page turns (0 disables turning)
    #[arg(long, default_value = "8.0")]
    turn_every: f32,

    /// Page width in pixels
    #[arg(long, default_value = "480.0")]
    page_width: f32,

    /// Page height in pixels
    #[arg(long, default_value = "640.0")]
    page_height: f32,

    /// Simulate a host with the reduced-motion preference active
    #[arg(long)]
    reduced_motion: bool,

    /// Simulate a host without turn-event hooks (exercises the polling
    /// fallback)
    #[arg(long)]
    no_turn_events: bool,

    /// Pace ticks to wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Write the default configuration to config.ron and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.write_default_config {
        let text =
            ron::ser::to_string_pretty(&BugConfig::default(), ron::ser::PrettyConfig::default())
                .context("Failed to serialize default configuration")?;
        std::fs::write("config.ron", text).context("Failed to write config.ron")?;
        log::info!("Wrote default configuration to config.ron");
        return Ok(());
    }

    let config = BugConfig::load()?;

    log::info!("Starting bookbugs demo");

    let mut book = DemoBook::spread(args.page_width, args.page_height);
    book.set_reduced_motion(args.reduced_motion);
    book.set_turn_events(!args.no_turn_events);

    let mut engine = match args.seed {
        Some(seed) => Engine::with_seed(config, seed),
        None => Engine::new(config),
    };
    engine.start(&mut book);

    let dt = 1.0 / args.fps.max(1.0);
    let ticks = (args.duration / dt).ceil() as u64;
    let turn_duration = 0.9_f32;

    let started = web_time::Instant::now();
    let mut until_turn = args.turn_every;
    let mut peak_alive = 0usize;

    for _ in 0..ticks {
        // Scripted page turns, like a reader flipping through
        if args.turn_every > 0.0 && !book.turning() {
            until_turn -= dt;
            if until_turn <= 0.0 {
                until_turn = args.turn_every;
                let event = book.begin_turn(0, turn_duration);
                if !args.no_turn_events {
                    engine.notify(event);
                }
            }
        }

        if let Some(event) = book.update(dt) {
            if !args.no_turn_events {
                engine.notify(event);
            }
        }

        engine.tick(&mut book, dt);
        peak_alive = peak_alive.max(engine.alive_count());

        if args.realtime {
            std::thread::sleep(std::time::Duration::from_secs_f32(dt));
        }
    }

    log::info!(
        "Simulated {:.1}s in {:.2?}: spawned {}, removed {}, peak alive {}, sprites still hosted {}",
        args.duration,
        started.elapsed(),
        engine.spawned_total(),
        engine.removed_total(),
        peak_alive,
        book.sprite_count()
    );

    Ok(())
}
