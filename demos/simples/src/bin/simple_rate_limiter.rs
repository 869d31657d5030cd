use iplicit_client::application::client::Client;
use iplicit_client::application::config::Config;
use iplicit_client::application::interfaces::reference::ReferenceService;
use iplicit_client::utils::setup_logger;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();

    let config = Config::from_env()?;
    info!(
        "Request budget: pausing at {} of {} requests per {}s",
        config.rate_limiter.threshold,
        config.rate_limiter.max_requests,
        config.rate_limiter.period_seconds
    );
    let client = Arc::new(Client::from_config(&config)?);

    // Concurrent callers share one session and one budget
    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let entity = client.get_default_legal_entity().await;
            (i, entity)
        }));
    }

    for handle in handles {
        let (i, entity) = handle.await?;
        info!("Task {}: {:?}", i, entity.map_err(|e| e.to_string()));
    }

    let used = client.http_client().budget().count();
    info!("Successful requests in the current window: {}", used);
    Ok(())
}
