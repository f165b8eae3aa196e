use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use seqlocate::cli::Cli;
use seqlocate::platform::{CancelToken, ExitCode, Output, SignalHandler};
use seqlocate::{run_locate, LocateConfig, LocateError};

fn init_logging(cli: &Cli) {
    env_logger::Builder::from_env(Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();
}

/// Map a failed run to the exit code it should produce
fn exit_code_for(error: &anyhow::Error, signals: &SignalHandler) -> ExitCode {
    match error.downcast_ref::<LocateError>() {
        Some(LocateError::Cancelled) => signals.received().unwrap_or(ExitCode::SignalInt),
        Some(e) => e.exit_code(),
        None => ExitCode::GeneralError,
    }
}

fn run(config: &LocateConfig, cancel: CancelToken) -> Result<()> {
    let output = Output::open(config.output.out_file.as_deref())?;

    let (output, stats) =
        run_locate(config, output, cancel).context("locating patterns failed")?;
    output.finish().map_err(LocateError::from)?;

    if config.output.stats {
        let rendered = stats
            .render(config.output.stats_format)
            .context("failed to render statistics")?;
        eprintln!("{}", rendered);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        Cli::print_completions(shell);
        ExitCode::Success.exit();
    }

    init_logging(&cli);

    let config = LocateConfig::from_cli(&cli);
    if let Err(e) = config.validate() {
        log::error!("{}", e);
        e.exit_code().exit();
    }

    let cancel = CancelToken::new();

    // Initialize signal handling early
    let signals = match SignalHandler::new(cancel.clone()) {
        Ok(handler) => handler,
        Err(e) => {
            log::error!("failed to initialize signal handling: {}", e);
            ExitCode::GeneralError.exit();
        }
    };

    if let Err(e) = run(&config, cancel) {
        let code = exit_code_for(&e, &signals);
        match code {
            // Downstream closed the pipe, nothing useful to report
            ExitCode::SignalPipe => {}
            ExitCode::SignalInt | ExitCode::SignalTerm => log::warn!("processing interrupted"),
            _ => log::error!("{:#}", e),
        }
        code.exit();
    }

    ExitCode::Success.exit();
}
