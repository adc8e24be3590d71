mod backend;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");
    let admin_signup_code = std::env::var("ADMIN_SIGNUP_CODE")
        .ok()
        .filter(|v| !v.trim().is_empty());
    if admin_signup_code.is_none() {
        tracing::warn!("ADMIN_SIGNUP_CODE not set — admin sign-up disabled");
    }

    let config = backend::BackendConfig::from_env().expect("backend configuration");
    let client = backend::HttpBackend::new(&config).expect("backend client init failed");
    let state = state::AppState::new(Arc::new(client), admin_signup_code);

    let app = routes::app(state.clone());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "roleboard listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");

    // Teardown: stop session publishing and gate evaluation before exit.
    state.sessions.shutdown();
    state.gate.shutdown();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
