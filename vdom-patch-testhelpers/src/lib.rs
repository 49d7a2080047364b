//! Test setup shared by the vdom-patch test suites.
//!
//! Use [`test`] in place of `#[test]`: it installs a tracing subscriber and a
//! colored panic printer once per process, then runs the test body. Log output
//! is filtered through the `VDOM_LOG` environment variable, using
//! [`Targets`] syntax (`VDOM_LOG=vdom_patch=debug`). Without it, everything is
//! shown at `TRACE`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use vdom_patch_testhelpers_macros::test;

use std::sync::LazyLock;
use std::time::Instant;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Seconds since the first test in this process started.
struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> core::fmt::Result {
        let elapsed = START_TIME.elapsed();
        write!(w, "{:4}.{:03}s", elapsed.as_secs(), elapsed.subsec_millis())
    }
}

fn is_harness_frame(name: &str) -> bool {
    name.starts_with("test::run_test")
        || name.starts_with("test::__rust_begin_short_backtrace")
        || name.starts_with("std::panicking::")
        || name.starts_with("std::panic::")
        || name.starts_with("core::panicking::")
        || name.starts_with("core::ops::function::FnOnce::call_once")
        || name.starts_with("std::sys::")
        || name.starts_with("std::thread::Builder::spawn_unchecked_")
        || name.starts_with("__pthread")
}

static SUBSCRIBER_INIT: LazyLock<()> = LazyLock::new(|| {
    let _ = *START_TIME;

    color_backtrace::BacktracePrinter::new()
        .verbosity(color_backtrace::Verbosity::Full)
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| match &frame.name {
                Some(name) => !is_harness_frame(name),
                None => true,
            })
        }))
        .install(Box::new(termcolor::StandardStream::stderr(
            termcolor::ColorChoice::AlwaysAnsi,
        )));

    let filter = std::env::var("VDOM_LOG")
        .ok()
        .and_then(|s| s.parse::<Targets>().ok())
        .unwrap_or_else(|| Targets::new().with_default(tracing::Level::TRACE));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_timer(Uptime)
                .with_target(false)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_test_writer()
                .compact(),
        )
        .with(filter)
        .try_init()
        .ok();
});

/// Install the tracing subscriber and panic printer.
///
/// Safe to call from every test: initialization happens exactly once per
/// process, whether tests run under `cargo test` or `cargo nextest run`.
pub fn setup() {
    #[allow(clippy::let_unit_value)]
    let _ = *SUBSCRIBER_INIT;
}
