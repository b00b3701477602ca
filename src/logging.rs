use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset: the rig's own events at info, dependencies at warn
pub const DEFAULT_FILTER: &str = "warn,slipper_rig=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());
            if tracing_subscriber::registry().with(env_filter()).with(wasm_layer).try_init().is_err() {
                return;
            }

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use std::env;
        use std::ffi::{OsStr, OsString};
        use std::io;
        use std::path::{Path, PathBuf};

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        pub const DEFAULT_LOG_FILE: &str = "logs/rig.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Directory the daily roller writes into and the file name prefix it uses
        fn log_file_target(path: &str) -> (PathBuf, OsString) {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            let file = path.file_name().map(OsStr::to_os_string).unwrap_or_else(|| OsString::from("rig.log"));
            (dir, file)
        }

        /// Install stderr + rolling file logging. Calling it again is a no-op.
        pub fn init() {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            // RUST_LOG_FILE overrides the file location
            let log_path = env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let (dir, file) = log_file_target(&log_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file));

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let installed = tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init();
            if installed.is_err() {
                return;
            }
            let _ = FILE_GUARD.set(guard);

            // Hook panics to log with backtrace
            std::panic::set_hook(Box::new(|info| {
                let location = info
                    .location()
                    .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
                    .unwrap_or_else(|| "<unknown>".to_string());
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "<non-string panic>".to_string());
                let backtrace = std::backtrace::Backtrace::force_capture();
                tracing::error!(%location, "rig panicked: {message}\nBacktrace:\n{backtrace}");
            }));
        }
    }
}


#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("logs/rig.log", "logs", "rig.log")]
    #[case("rig.log", ".", "rig.log")]
    #[case("/var/log/slipper/session.log", "/var/log/slipper", "session.log")]
    fn test_log_file_target(#[case] path: &str, #[case] dir: &str, #[case] file: &str) {
        let (got_dir, got_file) = log_file_target(path);
        assert_eq!(got_dir, PathBuf::from(dir));
        assert_eq!(got_file, OsString::from(file));
    }

    #[test]
    fn test_error_events_are_counted() {
        let count = capture::count_errors(|| {
            tracing::error!("one");
            tracing::warn!("not counted");
            tracing::error!("two");
        });
        assert_eq!(count, 2);
    }
}
