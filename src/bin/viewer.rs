//! Viewer application.
//!
//! Wires the coordinator to the simulated driver and backend: real SDK and
//! windowing bindings plug in through the same `CameraManager` and
//! `PresentationBackend` traits.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use thermview::driver::CameraManager;
use thermview::present::print_user_controls;
use thermview::testing::{SimBackend, SimManager};
use thermview::types::DiscoveryMode;
use thermview::{LifecycleHandler, PresentationLoop, ViewerContext};

fn print_usage() {
    println!(
        "Allowed options:\n\
         \t-m,--mode              : Discovery mode. Valid options: usb, spi, all (default: usb)\n\
         \t                       : Required - No\n\
         \t-d,--disable-auto-pair : Disables auto pairing\n\
         \t                       : Required - No (default: not specified)\n\
         \t-h,--help              : Displays this message\n\
         \t                       : Required - No"
    );
}

struct Options {
    mode: DiscoveryMode,
    auto_pair: bool,
}

enum ParseOutcome {
    Run(Options),
    Help,
    Invalid,
}

fn parse_args(args: &[String]) -> ParseOutcome {
    let mut options = Options {
        mode: DiscoveryMode::default(),
        auto_pair: true,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-m" | "--mode" => {
                i += 1;
                let Some(mode) = args.get(i) else {
                    return ParseOutcome::Invalid;
                };
                match mode.parse() {
                    Ok(mode) => options.mode = mode,
                    Err(()) => return ParseOutcome::Invalid,
                }
            }
            "-d" | "--disable-auto-pair" => options.auto_pair = false,
            "-h" | "--help" => return ParseOutcome::Help,
            _ => return ParseOutcome::Invalid,
        }
        i += 1;
    }

    ParseOutcome::Run(options)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        ParseOutcome::Run(options) => options,
        ParseOutcome::Help => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        ParseOutcome::Invalid => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    thermview::init_logging();

    println!(
        "thermview starting\nsettings:\n\t1) mode:      {}\n\t2) auto pair: {}",
        options.mode.as_str(),
        if options.auto_pair { "on" } else { "off" }
    );
    print_user_controls();

    let ctx = Arc::new(ViewerContext::new(options.auto_pair));

    let signal_ctx = ctx.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        println!("\ncaught interrupt");
        signal_ctx.request_shutdown();
    }) {
        log::warn!("failed to install signal handler: {error}");
    }

    let manager = match SimManager::new(options.mode) {
        Ok(manager) => manager,
        Err(error) => {
            log::error!("failed to create camera manager: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handler = LifecycleHandler::new(ctx.clone());
    if let Err(error) = manager.register_event_callback(handler.into_event_callback()) {
        log::error!("failed to register camera event callback: {error}");
        return ExitCode::FAILURE;
    }

    // One simulated camera streams synthetic frames so the full pipeline is
    // exercised end to end.
    let _camera = manager.simulate_camera("SIM000", 320, 240);

    let mut backend = SimBackend::new();
    let mut looper = PresentationLoop::new(ctx);
    looper.run(&mut backend);

    // Tear down the driver first, then release every record's resources.
    drop(manager);
    looper.teardown_all(&mut backend);

    println!("done");
    ExitCode::SUCCESS
}
