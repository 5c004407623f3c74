use std::sync::Arc;

use purrpass::api::ApiClient;
use purrpass::cli::Portal;
use purrpass::config::PortalConfig;
use purrpass::session::{CookieBackend, FileBackend, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PortalConfig::from_env()?;

    // Initialize tracing. With a log dir the prompt keeps stderr to itself.
    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };
    let _log_guard = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "purrpass.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .init();
            None
        }
    };

    eprintln!("🐾 PurrPass v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);
    eprintln!("   Session: {}", config.session_file.display());
    if let Some(dir) = &config.log_dir {
        eprintln!("   Logs: {}", dir.display());
    }

    // ── Session ─────────────────────────────────────────────────────────
    let cookies = Arc::new(CookieBackend::new(config.cookie_max_age));
    let session = Arc::new(
        SessionStore::new(Arc::new(FileBackend::new(&config.session_file)))
            .with_mirror(cookies.clone()),
    );
    let snapshot = session.hydrate().await;
    match &snapshot.user {
        Some(user) if snapshot.is_authenticated() => {
            eprintln!("   Signed in as {} ({})", user.email, user.role)
        }
        _ => eprintln!("   Not signed in"),
    }
    eprintln!("   Type 'help' for commands, 'quit' to exit.\n");

    let api = Arc::new(ApiClient::new(&config, session)?);
    let mut portal = Portal::new(api, cookies);
    portal.run().await?;

    tracing::info!("Shutting down");
    Ok(())
}
