//! `cinesync` command line tool.
//!
//! Inspects the video association of one level, migrating a legacy config
//! file to the current format when asked to.
//!
//! ```text
//! cinesync <levels-root> <level-id> [--save]
//! ```

use std::process::ExitCode;

use cinesync::core::time;
use cinesync::video::{loader, CustomLevelsResolver, LevelRef};
use cinesync::{logging, AppContext, Settings};
use tracing::{error, info};

const USAGE: &str = "usage: cinesync <levels-root> <level-id> [--save]";

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init("cinesync=info");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let save = args.iter().any(|arg| arg == "--save");
    let positional: Vec<&String> = args.iter().filter(|arg| !arg.starts_with("--")).collect();
    let [root, level_id] = positional.as_slice() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            error!(%err, "Invalid settings");
            return ExitCode::FAILURE;
        }
    };
    let context = AppContext::new(settings);
    if !context.is_enabled() {
        info!("Video playback is disabled in settings");
    }

    let resolver = CustomLevelsResolver::new(root.as_str());
    let level = LevelRef::new(level_id.as_str());

    let mut association = match loader::load(&level, &resolver) {
        Ok(Some(association)) => association,
        Ok(None) => {
            info!(level = %level.level_id, "Level has no video");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            error!(level = %level.level_id, %err, "Could not load video association");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", association);
    println!("  duration: {}", time::format_clock(association.duration.max(0) as u64));
    println!("  offset:   {} ms", association.offset);
    println!("  loop:     {}", association.looping);
    println!("  state:    {:?}", association.download_state);
    if let Some(source) = association.video_path() {
        println!("  source:   {}", source.to_url());
    }
    if association.back_compat {
        println!("  migrated from legacy format");
    }

    if association.needs_to_save {
        if !save {
            println!("  needs saving (run with --save)");
            return ExitCode::SUCCESS;
        }
        if let Err(err) = loader::save(&mut association) {
            error!(%err, "Could not save video association");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
