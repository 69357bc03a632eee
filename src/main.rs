//! Cup Toss entry point
//!
//! The browser build is a library (`cup_toss::web`); natively this runs a headless
//! session where the autoplayer throws until the rack is cleared.
//!
//! Usage: `cup-toss [--seed N] [--max-throws N] [--tuning FILE]` (see `--help`)

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use clap::Parser;
    use cup_toss::autoplay::{Autoplayer, ThrowOutcome};
    use cup_toss::scheduler::FixedStepRunner;
    use cup_toss::sim::GamePhase;
    use cup_toss::{Game, Tuning, TuningError};

    /// Headless cup toss session driven by the seeded autoplayer
    #[derive(Parser, Debug, Clone)]
    #[command(name = "cup-toss", version, about)]
    pub struct Options {
        /// Seed for the autoplayer; the same seed replays the same session
        #[arg(long, short = 's', default_value_t = 1, env = "CUP_TOSS_SEED")]
        pub seed: u64,

        /// Give up after this many throws
        #[arg(long, default_value_t = 100)]
        pub max_throws: u32,

        /// JSON file overriding physics and gameplay tuning
        #[arg(long, env = "CUP_TOSS_TUNING")]
        pub tuning: Option<PathBuf>,
    }

    pub fn run(options: &Options) -> Result<(), TuningError> {
        let tuning = match &options.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };

        let mut game = Game::new(tuning);
        let won = Rc::new(Cell::new(false));
        let flag = won.clone();
        game.set_on_win(move || flag.set(true));

        let mut player = Autoplayer::new(options.seed);
        let runner = FixedStepRunner::default();
        log::info!("Session seed {} ({} throws max)", options.seed, options.max_throws);

        let mut throws = 0;
        while throws < options.max_throws && game.phase() != GamePhase::Won {
            let aim = player.next_aim(game.world(), game.tuning());
            game.set_aim(aim);
            if !game.throw_ball() {
                log::warn!("Throw refused in {:?}", game.phase());
                break;
            }
            throws += 1;

            let outcome = runner
                .run_throw(&mut game)
                .iter()
                .find_map(ThrowOutcome::from_event)
                .unwrap_or(ThrowOutcome::Unfinished);
            log::info!(
                "Throw {}: {:.2}° / {:.2} -> {:?}, {} cups left",
                throws,
                aim.angle_deg,
                aim.power,
                outcome,
                game.remaining()
            );
        }

        if won.get() {
            log::info!("Rack cleared in {} throws", throws);
        } else {
            log::info!("Gave up after {} throws, {} cups left", throws, game.remaining());
        }

        match serde_json::to_string_pretty(&game.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to encode snapshot: {}", e),
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> Result<Options, clap::Error> {
            Options::try_parse_from(std::iter::once("cup-toss").chain(args.iter().copied()))
        }

        #[test]
        fn test_parse_defaults() {
            let options = parse(&[]).unwrap();
            assert_eq!(options.seed, 1);
            assert_eq!(options.max_throws, 100);
            assert!(options.tuning.is_none());
        }

        #[test]
        fn test_parse_all_flags() {
            let options =
                parse(&["--seed", "42", "--max-throws", "5", "--tuning", "t.json"]).unwrap();
            assert_eq!(options.seed, 42);
            assert_eq!(options.max_throws, 5);
            assert_eq!(options.tuning, Some(PathBuf::from("t.json")));

            assert_eq!(parse(&["--seed=7"]).unwrap().seed, 7);
            assert_eq!(parse(&["-s", "9"]).unwrap().seed, 9);
        }

        #[test]
        fn test_parse_rejects_bad_input() {
            assert!(parse(&["--seed"]).is_err());
            assert!(parse(&["--seed", "abc"]).is_err());
            assert!(parse(&["--fast"]).is_err());
        }

        #[test]
        fn test_help_is_generated() {
            let err = parse(&["--help"]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
            assert!(err.to_string().contains("--max-throws"));
        }

        #[test]
        fn test_missing_tuning_file_is_an_error() {
            let options = parse(&["--tuning", "/nonexistent/cup-toss-tuning.json"]).unwrap();
            assert!(matches!(run(&options), Err(TuningError::Io(_))));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = <native::Options as clap::Parser>::parse();

    if let Err(e) = native::run(&options) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is cup_toss::web::wasm_start, this is just to satisfy the compiler
}
