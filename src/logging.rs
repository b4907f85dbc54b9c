//! Console + optional file logging.
//!
//! Every line is stamped with local wall-clock time. When a log file is given,
//! lines are written to stderr and appended to the file.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Env, Target};

/// Writes every buffer to the console and to the log file.
///
/// A failing log file does not stop console output. The first file error is
/// reported on the console, later ones are dropped.
struct Tee<C, F> {
    console: C,
    file: F,
    file_failed: bool,
}

impl<C: Write, F: Write> Tee<C, F> {
    fn new(console: C, file: F) -> Self {
        Self {
            console,
            file,
            file_failed: false,
        }
    }

    fn file_error(&mut self, e: io::Error) {
        if !self.file_failed {
            self.file_failed = true;
            let _ = writeln!(self.console, "Log file write failed, continuing on console only: {}", e);
        }
    }
}

impl<C: Write, F: Write> Write for Tee<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        if let Err(e) = self.file.write_all(buf) {
            self.file_error(e);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        if let Err(e) = self.file.flush() {
            self.file_error(e);
        }
        Ok(())
    }
}

/// Installs the global logger. `RUST_LOG` overrides the default level.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {:<5} {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log dir {}", parent.display()))?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(Tee::new(io::stderr(), file))));
    }

    builder.try_init().context("Logger already initialized")?;
    Ok(())
}
