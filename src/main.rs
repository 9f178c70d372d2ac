use std::sync::Arc;

use talent_scout::channels::CliChannel;
use talent_scout::config::ScoutConfig;
use talent_scout::intake::{
    ConversationEngine, GenerationGateway, IntakeRouteState, SessionManager, intake_routes,
    spawn_prune_task,
};
use talent_scout::llm::create_provider;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = ScoutConfig::from_env().unwrap_or_else(|e| {
        eprintln!("❌ {e}");
        eprintln!("   export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    let serve = std::env::args().nth(1).is_some_and(|arg| arg == "serve");

    eprintln!("🤖 TalentScout Hiring Assistant v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);

    let llm = create_provider(&config.llm_config())?;
    let gateway = Arc::new(GenerationGateway::new(llm, config.generation.clone()));

    if serve {
        let manager = Arc::new(SessionManager::new(gateway).with_ttl(config.session_ttl));
        spawn_prune_task(Arc::clone(&manager));
        let app = intake_routes(IntakeRouteState { manager }).layer(CorsLayer::permissive());

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
        eprintln!("   Intake API: http://0.0.0.0:{}/api/sessions\n", config.port);
        tracing::info!(port = config.port, "Intake server started");
        axum::serve(listener, app).await?;
        return Ok(());
    }

    eprintln!("   Smart AI screening and assignment generation. Type 'quit' to leave.");
    let mut engine = ConversationEngine::new(gateway);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let phase = CliChannel::stdio().run(&mut engine, stdin).await?;
    tracing::debug!(phase = %phase, "Conversation closed");

    Ok(())
}
