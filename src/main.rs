use std::process::ExitCode;

use armview::ViewerConfig;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => match ViewerConfig::load(&path) {
            Ok(config) => config,
            Err(error) => {
                log::error!("cannot load {path}: {error}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::info!("no config file given, using defaults");
            ViewerConfig::default()
        }
    };

    match armview::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
