use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

use crate::auth::token::MAX_TTL_SECONDS;

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_COOKIE_SECURE: &str = "cookie-secure";
pub const ARG_BLACKLIST_PURGE_SECONDS: &str = "blacklist-purge-seconds";

#[derive(Debug)]
pub struct Options {
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub blacklist_purge_seconds: u64,
}

impl Options {
    /// # Errors
    /// Returns an error if the signing secret is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let jwt_secret = matches
            .get_one::<String>(ARG_JWT_SECRET)
            .cloned()
            .context("missing required argument: --jwt-secret")?;

        Ok(Self {
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl_seconds: matches
                .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            cookie_secure: matches
                .get_one::<bool>(ARG_COOKIE_SECURE)
                .copied()
                .unwrap_or(true),
            blacklist_purge_seconds: matches
                .get_one::<u64>(ARG_BLACKLIST_PURGE_SECONDS)
                .copied()
                .unwrap_or(3_600),
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("HMAC secret used to sign session tokens (at least 32 bytes)")
                .env("RYDE_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("RYDE_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(u64).range(1..=MAX_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_COOKIE_SECURE)
                .long(ARG_COOKIE_SECURE)
                .help("Mark the token cookie Secure (disable for plain-HTTP development)")
                .env("RYDE_COOKIE_SECURE")
                .default_value("true")
                .num_args(0..=1)
                .default_missing_value("true")
                .action(ArgAction::Set)
                .value_parser(BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_BLACKLIST_PURGE_SECONDS)
                .long(ARG_BLACKLIST_PURGE_SECONDS)
                .help("Interval between purges of expired blacklisted tokens, 0 disables")
                .env("RYDE_BLACKLIST_PURGE_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
        )
}
