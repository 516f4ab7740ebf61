//! Cosmic Pong - headless tournament runner
//!
//! Usage: `cosmic-pong [quick|standard|championship] [seed]`
//!
//! Plays a whole tournament with the human paddle on autopilot and logs every
//! match. Set `COSMIC_PONG_SAVE_DIR` to persist the profile between runs.

#[cfg(not(target_arch = "wasm32"))]
use cosmic_pong::{
    consts::MAX_DT,
    persistence::{DirStore, MemoryStore, Store},
    platform::AutopilotInput,
    session::{Collaborators, FrameStatus, GameSession},
    sim::Side,
    tournament::TournamentKind,
    MatchSettings,
};

/// Frames allowed per match before giving up (about 3 hours of play)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES_PER_MATCH: usize = 30 * 60 * 60 * 3;

#[cfg(not(target_arch = "wasm32"))]
fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next() {
        Some(key) => match TournamentKind::from_str(&key) {
            Ok(kind) => kind,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(2);
            }
        },
        None => TournamentKind::Quick,
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(time_seed);
    log::info!("Cosmic Pong (headless) starting, seed {}", seed);

    let store: Box<dyn Store> = match std::env::var("COSMIC_PONG_SAVE_DIR") {
        Ok(dir) => Box::new(DirStore::new(dir)),
        Err(_) => Box::new(MemoryStore::new()),
    };
    let collaborators = Collaborators {
        input: Box::new(AutopilotInput::for_side(Side::Left)),
        store,
        ..Collaborators::headless()
    };
    let mut session = GameSession::new(MatchSettings::default(), collaborators, seed);

    if let Err(e) = session.start_tournament(kind, "Autopilot") {
        log::error!("Could not start tournament: {}", e);
        std::process::exit(1);
    }

    while session.tournament().is_active() {
        if let Err(e) = session.start_next_tournament_match() {
            log::error!("Could not start match: {}", e);
            std::process::exit(1);
        }

        let mut finished = false;
        for _ in 0..MAX_FRAMES_PER_MATCH {
            if let FrameStatus::Finished(result) = session.frame(MAX_DT) {
                log::info!(
                    "Match finished {}-{} in {:.1}s",
                    result.scores.left,
                    result.scores.right,
                    result.elapsed
                );
                finished = true;
                break;
            }
        }
        if !finished {
            log::error!("Match did not finish, giving up");
            session.return_to_menu();
            std::process::exit(1);
        }
    }

    match session.tournament().placement() {
        Some(1) => log::info!("Autopilot won the {}!", kind.config().name),
        Some(place) => log::info!("Autopilot placed {} of {}", place, kind.config().participants),
        None => log::warn!("Tournament ended without a placement"),
    }
    match serde_json::to_string_pretty(&session.tournament().stats()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Could not print stats: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the page's frame callback; nothing to run here
}
