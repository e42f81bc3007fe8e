use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing_appender::non_blocking::WorkerGuard;

use easygen::app::App;
use easygen::cli::Repl;
use easygen::config::ClientConfig;
use easygen::notify::ConsoleNotifier;
use easygen::session::SessionEvent;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env().context("Invalid configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _log_guard = init_tracing(&config);

    eprintln!("✍️  EasyGen v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_url);
    eprintln!("   Session: {}", config.session_path.display());
    match &config.log_dir {
        Some(dir) => eprintln!("   Logs: {}", dir.display()),
        None => eprintln!("   Logs: stderr"),
    }

    let app = App::new(config, Arc::new(ConsoleNotifier))
        .await
        .context("Failed to start EasyGen")?;

    match app.session().current_user().await {
        Some(user) => eprintln!("   Logged in as {} <{}>", user.full_name, user.email),
        None => eprintln!("   Not logged in"),
    }
    eprintln!("   Type 'help' for commands, 'quit' to exit.\n");

    let mut events = app.session().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::LoggedIn { email } => tracing::info!(%email, "Session event: logged in"),
                SessionEvent::LoggedOut => tracing::info!("Session event: logged out"),
                SessionEvent::UserUpdated => tracing::debug!("Session event: user updated"),
            }
        }
    });

    let mut repl = Repl::new(app, BufReader::new(tokio::io::stdin()))
        .with_hidden_passwords(std::io::stdin().is_terminal());
    repl.run().await
}

/// Log to a daily file when a log directory is configured, to stderr
/// otherwise.
fn init_tracing(config: &ClientConfig) -> Option<WorkerGuard> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "easygen.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}
