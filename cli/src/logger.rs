//! A custom logger that writes colored, leveled lines via `termcolor`.
//! Only installed when the user passes `--pedantic`; by default the CLI
//! runs quietly and prints only the per-file status lines from
//! [`crate::pipeline`].

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

static LOGGER: PedanticLogger = PedanticLogger;

pub struct PedanticLogger;

impl PedanticLogger {
    pub fn setup() {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Info);
    }
}

impl Log for PedanticLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        let md = record.metadata();

        if !self.enabled(md) {
            return;
        }

        let module = record.module_path().unwrap_or_default();

        let mut out = match md.level() {
            Level::Info => {
                let mut stdout = StandardStream::stdout(ColorChoice::Auto);
                stdout.set_color(ColorSpec::new().set_dimmed(true)).unwrap();
                stdout
            }

            Level::Warn => {
                let mut stderr = StandardStream::stderr(ColorChoice::Auto);
                stderr
                    .set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_intense(true))
                    .unwrap();
                stderr
            }

            Level::Error => {
                let mut stderr = StandardStream::stderr(ColorChoice::Auto);
                stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red))).unwrap();
                stderr
            }

            _ => StandardStream::stdout(ColorChoice::Auto),
        };

        writeln![out, "{}: {}", module, record.args()].unwrap();
        out.reset().unwrap();
    }

    fn flush(&self) {}
}

/// A bold blue banner line, used before each directory's file listing.
#[macro_export]
macro_rules! print_header {
    ($($arg:tt)+) => {{
        use std::io::Write;
        use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        stdout
            .set_color(ColorSpec::new().set_bold(true).set_intense(true).set_fg(Some(Color::Blue)))
            .unwrap();
        writeln![&mut stdout, $($arg)+].unwrap();
        stdout.reset().unwrap();
    }};
}

/// A green per-file status line.
#[macro_export]
macro_rules! print_entry {
    ($($arg:tt)+) => {{
        use std::io::Write;
        use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green))).unwrap();
        writeln![&mut stdout, $($arg)+].unwrap();
        stdout.reset().unwrap();
    }};
}

/// A bold red error line, used for fatal/top-level failures.
#[macro_export]
macro_rules! errorln {
    ($($arg:tt)+) => {{
        use std::io::Write;
        use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

        let mut stderr = StandardStream::stderr(ColorChoice::Auto);
        stderr
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))
            .unwrap();
        write![&mut stderr, "error"].unwrap();
        stderr.reset().unwrap();
        write![&mut stderr, ": "].unwrap();
        writeln![&mut stderr, $($arg)+].unwrap();
    }};
}
