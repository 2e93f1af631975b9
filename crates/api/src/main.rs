#[tokio::main]
async fn main() {
    taskhive_observability::init();

    let config = taskhive_api::config::ApiConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let app = taskhive_api::app::build_app(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind_addr}: {e}"));

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {addr}"),
        Err(_) => tracing::info!("listening on {bind_addr}"),
    }

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
