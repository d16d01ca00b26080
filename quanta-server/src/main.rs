//! Quanta Server
//!
//! Line-delimited JSON-RPC 2.0 over stdin/stdout.
//!
//! Methods:
//! - ping
//! - calculators/list, calculators/describe
//! - calculators/execute, calculators/preset
//! - units/list, units/convert
//! - locales/reload
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

mod rpc;
mod settings;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use quanta::Quanta;

use crate::rpc::Server;
use crate::settings::ServerSettings;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let settings = ServerSettings::from_env();
    let quanta = Quanta::with_standard_calculators().with_settings(settings.engine.clone());

    // Bad calculator configs are fatal
    if let Err(e) = quanta.validate() {
        error!(code = %e.code, "{}", e.message);
        return ExitCode::FAILURE;
    }

    if let Some(dir) = &settings.locale_dir {
        match quanta.reload_locales_from(dir) {
            Ok(codes) => info!(dir = %dir.display(), locales = ?codes, "locale tables loaded"),
            Err(e) => warn!(dir = %dir.display(), "{}, using builtin locales", e.message),
        }
    }

    info!(
        version = SERVER_VERSION,
        calculators = quanta.calculators().len(),
        default_locale = %settings.engine.default_locale,
        "Quanta server started"
    );

    let server = Server::new(quanta, settings.locale_dir);
    let stdin = io::stdin();
    let mut reader = io::BufReader::new(stdin.lock());

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                info!("client disconnected");
                break;
            }
            Ok(_) => {
                let Some(response) = server.handle_line(&line) else {
                    continue;
                };
                let mut stdout = io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", response).and_then(|_| stdout.flush()) {
                    error!(error = %e, "writing response failed");
                    break;
                }
            }
            Err(e) => {
                error!(error = %e, "reading input failed");
                break;
            }
        }
    }

    info!("server shutting down");
    ExitCode::SUCCESS
}
