//! Platform Hop entry point
//!
//! Native: runs a headless autopilot game at 60 Hz and logs what happens.
//! Web builds use the library's `WebGame` bindings instead.
//!
//! Usage: `platform-hop [seed] [frames]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use platform_hop::Tuning;
    use platform_hop::sim::{GameEvent, Session, TickInput, tick};
    use platform_hop::stage::LogStage;

    env_logger::init();
    log::info!("Platform Hop (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60usize);

    let mut session = match Session::with_stage(Tuning::load(), seed, LogStage) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Cannot start session: {}", e);
            std::process::exit(1);
        }
    };

    let games = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&games);
    session.subscribe(move |event| match event {
        GameEvent::Advanced { score } => log::info!("Advanced, score {}", score),
        GameEvent::GameOver { score, best_score } => {
            *counter.borrow_mut() += 1;
            log::info!("Game over at {} (best {})", score, best_score);
        }
        _ => {}
    });

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let dt = 1000.0 / 60.0;
    for _ in 0..frames {
        tick(&mut session, &input, dt);
    }

    log::info!(
        "Ran {} frames: {} jumps, score {}, best {}, {} games lost",
        frames,
        session.jumps(),
        session.score(),
        session.best_score(),
        games.borrow()
    );
    match session.snapshot_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("Snapshot failed: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's start function
}
