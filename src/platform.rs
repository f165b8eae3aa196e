use anyhow::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;

// Cross-platform signal handling
#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGPIPE, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalPipe = 141, // 128 + SIGPIPE (13)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }
}

/// Cooperative cancellation flag shared by every thread of one run.
///
/// Set by the signal handler or by the first fatal error; once set the
/// producer stops admitting batches, workers stop taking new ones and the
/// sink stops writing.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Signal handler for graceful shutdown
pub struct SignalHandler {
    received: Arc<AtomicI32>,
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    /// Start a thread translating SIGINT/SIGTERM into cancellation of `token`.
    /// A second signal exits immediately; SIGPIPE exits quietly.
    pub fn new(token: CancelToken) -> Result<Self> {
        let received = Arc::new(AtomicI32::new(0));

        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGPIPE, SIGTERM])?;

            let received_by_thread = Arc::clone(&received);
            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                for sig in signals.forever() {
                    let code = match sig {
                        SIGPIPE => ExitCode::SignalPipe.exit(),
                        SIGTERM => ExitCode::SignalTerm,
                        _ => ExitCode::SignalInt,
                    };
                    received_by_thread.store(code as i32, Ordering::Relaxed);
                    shutdown_count += 1;
                    if shutdown_count > 1 {
                        code.exit();
                    }
                    log::warn!("received signal {}, shutting down", sig);
                    token.cancel();
                }
            });

            Ok(SignalHandler {
                received,
                _handle: handle,
            })
        }

        #[cfg(windows)]
        {
            // Windows signal handling using flag-based approach
            let term_flag = Arc::new(AtomicBool::new(false));
            flag::register(SIGINT, Arc::clone(&term_flag))?;

            let received_by_thread = Arc::clone(&received);
            let handle = thread::spawn(move || loop {
                thread::sleep(std::time::Duration::from_millis(100));
                if term_flag.swap(false, Ordering::Relaxed) {
                    if token.is_cancelled() {
                        ExitCode::SignalInt.exit();
                    }
                    received_by_thread.store(ExitCode::SignalInt as i32, Ordering::Relaxed);
                    token.cancel();
                }
            });

            Ok(SignalHandler {
                received,
                _handle: handle,
            })
        }
    }

    /// Exit code matching the signal that cancelled the run, if any
    pub fn received(&self) -> Option<ExitCode> {
        match self.received.load(Ordering::Relaxed) {
            143 => Some(ExitCode::SignalTerm),
            130 => Some(ExitCode::SignalInt),
            _ => None,
        }
    }
}

/// Cross-platform broken pipe detection
pub fn is_broken_pipe(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.kind() == io::ErrorKind::BrokenPipe
    }
    #[cfg(windows)]
    {
        // On Windows, broken pipe manifests as different error codes
        e.kind() == io::ErrorKind::BrokenPipe
            || e.raw_os_error() == Some(232) // ERROR_NO_DATA "The pipe is being closed"
            || e.raw_os_error() == Some(109) // ERROR_BROKEN_PIPE "The pipe has been ended"
    }
}

/// Create a helpful error message for file creation failures
fn create_helpful_error_message(path: &Path, error: &io::Error) -> String {
    let base_msg = format!("Cannot create output file '{}': {}", path.display(), error);

    let suggestion = match error.kind() {
        io::ErrorKind::PermissionDenied => {
            if path.parent().is_some_and(|p| !p.exists()) {
                "Suggestion: Parent directory does not exist, create it first"
            } else {
                "Suggestion: Check file permissions or choose a writable location"
            }
        }
        io::ErrorKind::NotFound => "Suggestion: Parent directory does not exist, create it first",
        io::ErrorKind::AlreadyExists if path.is_dir() => {
            "Suggestion: Path points to a directory, specify a filename instead"
        }
        io::ErrorKind::InvalidInput => "Suggestion: Check for invalid characters in filename",
        _ => return base_msg, // No suggestion for other errors
    };

    format!("{}\n{}", base_msg, suggestion)
}

/// Destination of the result table
pub enum Output {
    Stdout(BufWriter<io::Stdout>),
    File(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Output {
    /// Open `path` for writing; `None` or `-` means stdout, a `.gz` suffix
    /// selects gzip compression.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            None => return Ok(Self::stdout()),
            Some(p) if p.as_os_str() == "-" => return Ok(Self::stdout()),
            Some(p) => p,
        };

        let file = File::create(path)
            .map_err(|e| anyhow::anyhow!("{}", create_helpful_error_message(path, &e)))?;
        let writer = BufWriter::new(file);

        if path.extension().is_some_and(|ext| ext == "gz") {
            log::debug!("writing gzip-compressed output to {}", path.display());
            Ok(Self::Gzip(GzEncoder::new(writer, Compression::default())))
        } else {
            Ok(Self::File(writer))
        }
    }

    pub fn stdout() -> Self {
        Self::Stdout(BufWriter::new(io::stdout()))
    }

    /// Flush buffered data and write the gzip trailer if any
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Stdout(mut w) => w.flush(),
            Self::File(mut w) => w.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(w) => w.write(buf),
            Self::File(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}
