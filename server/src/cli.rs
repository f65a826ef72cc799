//! Command-line interface for the `openhouse` binary.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use openhouse_auth::Claims;
use std::path::PathBuf;

/// Open House registration backend.
#[derive(Debug, Parser)]
#[command(name = "openhouse", version, about)]
pub struct Cli {
    /// Load environment variables from this file before reading configuration
    #[arg(long, global = true, env = "OPENHOUSE_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The selected command, `serve` when none was given.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run migrations, then serve the HTTP API
    Serve,
    /// Apply, revert or reset database migrations and exit
    Migrate(MigrateArgs),
    /// Sign a bearer token with the configured secret (development aid)
    IssueToken(IssueTokenArgs),
}

/// Arguments for `migrate`.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct MigrateArgs {
    /// `up` applies pending migrations, `down` reverts the latest one,
    /// `reset` reverts all of them
    #[arg(value_enum, default_value_t = MigrateDirection::Up)]
    pub direction: MigrateDirection,
}

/// Which way `migrate` moves the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MigrateDirection {
    /// Apply every pending migration
    Up,
    /// Revert the most recently applied migration
    Down,
    /// Revert every applied migration
    Reset,
}

/// Arguments for `issue-token`.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct IssueTokenArgs {
    /// Email the token is bound to
    #[arg(long)]
    pub email: String,

    /// Subject claim (defaults to the email)
    #[arg(long)]
    pub subject: Option<String>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = 3600)]
    pub ttl: i64,
}

impl IssueTokenArgs {
    /// Claims for the requested token, issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns an error when `ttl` puts the expiry out of range.
    pub fn claims(&self, issued_at: DateTime<Utc>, issuer: Option<&str>) -> anyhow::Result<Claims> {
        let ttl = Duration::try_seconds(self.ttl)
            .with_context(|| format!("--ttl {} is out of range", self.ttl))?;
        let subject = self.subject.as_deref().unwrap_or(&self.email);
        let claims = Claims::new(subject, self.email.as_str(), issued_at, ttl)
            .with_context(|| format!("--ttl {} is out of range", self.ttl))?;
        Ok(match issuer {
            Some(issuer) => claims.with_issuer(issuer),
            None => claims,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::try_parse_from(["openhouse"]).unwrap();
        assert_eq!(cli.command(), Command::Serve);
        assert!(cli.env_file.is_none());
    }

    #[test]
    fn test_env_file_is_global() {
        let cli = Cli::try_parse_from(["openhouse", "migrate", "--env-file", "local.env"]).unwrap();
        assert_eq!(
            cli.command(),
            Command::Migrate(MigrateArgs {
                direction: MigrateDirection::Up
            })
        );
        assert_eq!(cli.env_file, Some(PathBuf::from("local.env")));
    }

    #[test]
    fn test_migrate_directions() {
        for (arg, direction) in [
            ("up", MigrateDirection::Up),
            ("down", MigrateDirection::Down),
            ("reset", MigrateDirection::Reset),
        ] {
            let cli = Cli::try_parse_from(["openhouse", "migrate", arg]).unwrap();
            assert_eq!(cli.command(), Command::Migrate(MigrateArgs { direction }), "{arg}");
        }
        assert!(Cli::try_parse_from(["openhouse", "migrate", "sideways"]).is_err());
    }

    #[test]
    fn test_issue_token_args() {
        let cli = Cli::try_parse_from([
            "openhouse",
            "issue-token",
            "--email",
            "ada@example.com",
            "--ttl",
            "60",
        ])
        .unwrap();
        let Command::IssueToken(args) = cli.command() else {
            panic!("expected issue-token");
        };
        assert_eq!(args.email, "ada@example.com");
        assert_eq!(args.subject, None);
        assert_eq!(args.ttl, 60);
    }

    #[test]
    fn test_issue_token_claims() {
        let now: DateTime<Utc> = "2026-03-14T03:00:00Z".parse().unwrap();
        let args = IssueTokenArgs {
            email: "ada@example.com".to_string(),
            subject: None,
            ttl: 60,
        };
        let claims = args.claims(now, Some("openhouse")).unwrap();
        assert_eq!(claims.subject(), Some("ada@example.com"));
        assert_eq!(claims.exp, now.timestamp() + 60);
        assert_eq!(claims.iss.as_deref(), Some("openhouse"));
    }

    #[test]
    fn test_issue_token_rejects_extreme_ttl() {
        let now: DateTime<Utc> = "2026-03-14T03:00:00Z".parse().unwrap();
        for ttl in [i64::MAX, i64::MIN, 10_000_000_000_000] {
            let args = IssueTokenArgs {
                email: "ada@example.com".to_string(),
                subject: None,
                ttl,
            };
            assert!(args.claims(now, None).is_err(), "{ttl}");
        }
    }

    #[test]
    fn test_issue_token_requires_email() {
        assert!(Cli::try_parse_from(["openhouse", "issue-token"]).is_err());
    }
}
