use std::io::Write;
use std::process::ExitCode;

use atticus::BuildConfig;

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Render a templated static site from a page manifest.
        cmd scout {
            /// Site directory holding `config.json`, `templates/`, and
            /// optionally `static/` and `site.toml`.
            required input: PathBuf
            /// Output directory. Must not exist. Defaults to `generated_html`.
            optional -o, --output output: PathBuf
            /// Print every rendered page and the static asset copy.
            optional -v, --verbose
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        true => tracing::Level::INFO,
        false => tracing::Level::WARN,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Builds the site described by `flags`, reporting failure on `stderr`.
/// Returns the process exit status.
fn run(flags: flags::Scout, stderr: &mut dyn Write) -> u8 {
    let config = BuildConfig::new(flags.input, flags.output, flags.verbose);
    match atticus::build(&config) {
        Ok(report) => {
            tracing::info!(pages = report.pages, assets = report.assets, "done");
            0
        }
        Err(e) => {
            let _ = writeln!(stderr, "error: {e}");
            1
        }
    }
}

pub fn main() -> ExitCode {
    let flags = match flags::Scout::from_env() {
        Ok(flags) => flags,
        Err(e) if e.is_help() => {
            println!("{e}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    init_tracing(flags.verbose);
    ExitCode::from(run(flags, &mut std::io::stderr()))
}
