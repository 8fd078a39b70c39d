//! capsesc entry point.
//!
//! Wires together discovery, the virtual keyboard, the multiplexer and the
//! remap use case, then runs the event loop until SIGINT or SIGTERM.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ parse_args()                  -- exit 0 on -h/-V, exit 1 on bad args
//!  └─ discover_keyboards()          -- /dev/input/event*, fatal on failure
//!  └─ UinputKeyboard::create()      -- Caps Lock + Escape, fatal on failure
//!  └─ EventMultiplexer::start()     -- one reader task per keyboard
//!  └─ run_event_loop()
//!       ├─ Record  -> RemapCapsUseCase::handle_record
//!       └─ Closed  -> retire; when none left keep waiting for a signal
//! ```
//!
//! Fatal setup errors propagate out of `main` as `anyhow::Error`, which prints
//! the chain to stderr and exits 1.

use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::EnvFilter;

use capsesc::cli::{parse_args, CliOutcome};
use capsesc::domain::config::DaemonConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = match parse_args(std::env::args_os()) {
        CliOutcome::Run(cli) => cli,
        CliOutcome::Exit { code, message } => {
            let _ = message.print();
            return Ok(ExitCode::from(code));
        }
    };

    // Initialise structured logging.  stdout stays free for --help output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.into_config();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout = ?config.timeout,
        clock = ?config.clock,
        "capsesc starting"
    );

    run(config).await?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(target_os = "linux")]
async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    use std::path::Path;

    use anyhow::Context;

    use capsesc::application::remap_caps::RemapCapsUseCase;
    use capsesc::daemon::{run_event_loop, shutdown_signal, LoopExit};
    use capsesc::infrastructure::discovery::{discover_keyboards, evdev::EvdevOpener, INPUT_DIR};
    use capsesc::infrastructure::input_source::{evdev::EvdevSource, EventSource};
    use capsesc::infrastructure::multiplexer::{EventMultiplexer, DEFAULT_CAPACITY};
    use capsesc::infrastructure::virtual_keyboard::uinput::UinputKeyboard;

    // ── Keyboards ─────────────────────────────────────────────────────────────
    let keyboards = discover_keyboards(
        &EvdevOpener,
        Path::new(INPUT_DIR),
        &config.virtual_device.name,
        config.max_keyboards,
    )
    .context("keyboard discovery failed")?;

    // ── Virtual keyboard ──────────────────────────────────────────────────────
    let output = UinputKeyboard::create(&config.virtual_device, &DaemonConfig::CAPABILITY_KEYS)
        .context("cannot create the virtual keyboard")?;

    // ── Readers ───────────────────────────────────────────────────────────────
    let mut sources: Vec<Box<dyn EventSource>> = Vec::with_capacity(keyboards.len());
    for keyboard in keyboards {
        let path = keyboard.path.clone();
        let source = EvdevSource::new(keyboard)
            .with_context(|| format!("cannot watch {}", path.display()))?;
        sources.push(Box::new(source));
    }
    info!(keyboards = sources.len(), "capsesc ready");

    let mut mux = EventMultiplexer::start(sources, DEFAULT_CAPACITY);
    let mut use_case = RemapCapsUseCase::new(config.timeout, config.clock.build(), Box::new(output));

    // ── Main loop ─────────────────────────────────────────────────────────────
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    if run_event_loop(&mut mux, &mut use_case, &mut shutdown).await == LoopExit::SourcesExhausted {
        info!("waiting for SIGINT or SIGTERM");
        shutdown.await;
    }
    mux.shutdown();

    let stats = use_case.stats();
    info!(
        taps = stats.taps,
        holds = stats.holds,
        disqualified = stats.disqualified,
        failures = stats.failures,
        "capsesc stopped"
    );
    Ok(())
}

#[cfg(not(target_os = "linux"))]
async fn run(_config: DaemonConfig) -> anyhow::Result<()> {
    anyhow::bail!("capsesc needs Linux evdev and uinput")
}
