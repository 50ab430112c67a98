use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        BoolishValueParser, ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const CMD_HASH_PASSWORD: &str = "hash-password";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

fn validator_ttl() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<i64, String> {
        match value.parse::<i64>() {
            Ok(seconds) if seconds > 0 => Ok(seconds),
            _ => Err("session ttl must be a positive number of seconds".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("dbviewer")
        .about("Database viewer with a single signed-session admin")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8000")
                .env("DBVIEWER_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("dsn")
                .short('d')
                .long("dsn")
                .help("SQLite connection string")
                .default_value("sqlite://data.db")
                .env("DBVIEWER_DSN"),
        )
        .arg(
            Arg::new("admin-username")
                .long("admin-username")
                .help("Admin username")
                .default_value("admin")
                .env("DBVIEWER_ADMIN_USERNAME"),
        )
        .arg(
            Arg::new("admin-password-hash")
                .long("admin-password-hash")
                .help("Admin password as an Argon2 PHC string, see the hash-password command")
                .env("DBVIEWER_ADMIN_PASSWORD_HASH")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("admin-password")
                .long("admin-password")
                .help("Admin password in plaintext, hashed at startup")
                .env("DBVIEWER_ADMIN_PASSWORD")
                .hide_env_values(true)
                .conflicts_with("admin-password-hash"),
        )
        .arg(
            Arg::new("session-secret")
                .long("session-secret")
                .help("Secret used to sign session tokens, at least 32 bytes (random if unset)")
                .env("DBVIEWER_SESSION_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session lifetime in seconds")
                .default_value("1800")
                .env("DBVIEWER_SESSION_TTL_SECONDS")
                .value_parser(validator_ttl()),
        )
        .arg(
            Arg::new("secure-cookie")
                .long("secure-cookie")
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("DBVIEWER_SECURE_COOKIE")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("DBVIEWER_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new(CMD_HASH_PASSWORD)
                .about("Print an Argon2 hash for DBVIEWER_ADMIN_PASSWORD_HASH")
                .arg(Arg::new("password").help("Password to hash").required(true)),
        )
}
