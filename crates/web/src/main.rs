use anyhow::Context;

use costs_web::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    costs_observability::init();

    let settings = Settings::from_env();
    let app = costs_web::app::build_app(&settings)?;

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
