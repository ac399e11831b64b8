use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
use env_logger::Builder;
use log::{Level, debug, info};
use std::io::{self, Write};

pub const LOG_LEVEL_ENV: &str = "BUILD_REPO_PROMPT_LOG_LEVEL";

pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    }
}

pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level_for_verbosity(verbosity));

    Builder::from_env(env)
        .format(|buf, record| {
            let level_color = match record.level() {
                Level::Error => "31", // Red
                Level::Warn => "33",  // Yellow
                Level::Info => "32",  // Green
                Level::Debug => "36", // Cyan
                Level::Trace => "35", // Magenta
            };

            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()
}

pub fn print_welcome_message(out: &mut impl Write) -> io::Result<()> {
    out.execute(SetForegroundColor(Color::Cyan))?;
    writeln!(out, "Interactive Repository XML Builder")?;
    out.execute(ResetColor)?;
    writeln!(out, "====================================")?;

    debug!("Debug logging enabled");
    info!("Starting build-repo-prompt v{}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
