//! Map validated CLI matches to the action the binary should run.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, database, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(5524);

    let database_opts = database::Options::parse(matches)?;
    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn: database_opts.dsn,
        db_max_connections: database_opts.max_connections,
        jwt_secret: auth_opts.jwt_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        cookie_secure: auth_opts.cookie_secure,
        blacklist_purge_seconds: auth_opts.blacklist_purge_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn in_memory_server_has_no_dsn() {
        temp_env::with_vars(
            [
                ("RYDE_IN_MEMORY", Some("true")),
                ("RYDE_JWT_SECRET", Some(SECRET)),
                ("RYDE_DSN", Some("postgres://ignored@localhost/ryde")),
                ("RYDE_PORT", None),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["ryde"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.port, 5524);
                    assert!(args.dsn.is_none());
                    assert_eq!(args.jwt_secret.expose_secret(), SECRET);
                }
            },
        );
    }

    #[test]
    fn postgres_server_keeps_dsn() {
        temp_env::with_vars(
            [
                ("RYDE_IN_MEMORY", None::<&str>),
                ("RYDE_JWT_SECRET", Some(SECRET)),
                ("RYDE_DSN", Some("postgres://ryde@localhost:5432/ryde")),
                ("RYDE_TOKEN_TTL_SECONDS", Some("120")),
            ],
            || {
                let matches = crate::cli::commands::new().get_matches_from(vec!["ryde"]);
                let result = handler(&matches);
                assert!(result.is_ok());
                if let Ok(Action::Server(args)) = result {
                    assert_eq!(args.dsn.as_deref(), Some("postgres://ryde@localhost:5432/ryde"));
                    assert_eq!(args.token_ttl_seconds, 120);
                    assert!(args.cookie_secure);
                }
            },
        );
    }
}
