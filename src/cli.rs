//! Command-line interface definitions for the daily news digest.
//!
//! Every option can also come from the environment (or a `.env` file, which
//! `main` loads before parsing).

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;

/// Command-line arguments for the daily news digest.
///
/// # Examples
///
/// ```sh
/// # Build today's digest and mail it to every subscriber
/// daily_news_digest run --google-api-key KEY
///
/// # Serve the subscribe / unsubscribe / latest-digest API
/// daily_news_digest serve --bind 127.0.0.1:8080
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SQLite connection string for subscribers and digests
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://news_digest.db?mode=rwc",
        global = true
    )]
    pub database_url: String,

    #[command(flatten)]
    pub smtp: SmtpArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// SMTP sender settings. Missing credentials disable email, they never fail startup.
#[derive(Args, Debug, Clone)]
pub struct SmtpArgs {
    /// Sender address, also used as the SMTP username
    #[arg(long, env = "SENDER_EMAIL", global = true)]
    pub sender_email: Option<String>,

    /// SMTP password or app token for the sender
    #[arg(long, env = "SENDER_PASSWORD", global = true, hide_env_values = true)]
    pub sender_password: Option<String>,

    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com", global = true)]
    pub smtp_host: String,

    /// Implicit-TLS port
    #[arg(long, env = "SMTP_PORT", default_value_t = 465, global = true)]
    pub smtp_port: u16,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape, summarize, store and mail today's digest once
    Run(RunArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// News homepage to pull top stories from
    #[arg(long, env = "NEWS_HOMEPAGE_URL", default_value = "https://www.bbc.com/news")]
    pub news_url: String,

    /// Maximum number of top stories per digest
    #[arg(long, env = "NEWS_LIMIT", default_value_t = 5)]
    pub news_limit: usize,

    /// Also write the digest to `{dir}/{date}.json`
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Store the digest without emailing subscribers
    #[arg(long)]
    pub no_email: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_run() {
        let cli = Cli::parse_from([
            "daily_news_digest",
            "run",
            "--google-api-key",
            "k",
            "--news-limit",
            "3",
            "-j",
            "./json",
        ]);

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.google_api_key.as_deref(), Some("k"));
                assert_eq!(args.news_limit, 3);
                assert_eq!(args.json_output_dir.as_deref(), Some("./json"));
                assert!(!args.no_email);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parsing_serve_with_global_flags() {
        let cli = Cli::parse_from([
            "daily_news_digest",
            "serve",
            "--bind",
            "127.0.0.1:3000",
            "--database-url",
            "sqlite::memory:",
            "--smtp-port",
            "587",
        ]);

        assert_eq!(cli.database_url, "sqlite::memory:");
        assert_eq!(cli.smtp.smtp_port, 587);
        match cli.command {
            Command::Serve(args) => assert_eq!(args.bind.port(), 3000),
            other => panic!("expected serve, got {other:?}"),
        }
    }
}
