use argh::FromArgs;

#[derive(Debug, FromArgs, Clone)]
/// cli app args
pub struct CliArgs {
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
    /// job file path
    #[argh(option)]
    pub config: Option<String>,
    /// log verbosity (error, warn, info, debug, trace)
    #[argh(option, default = "String::from(\"info\")")]
    pub log_level: String,
}

/// Route library log output to stderr with timestamps.
pub fn setup_logger(level: log::LevelFilter) -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}
