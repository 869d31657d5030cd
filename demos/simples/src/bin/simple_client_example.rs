use iplicit_client::application::client::Client;
use iplicit_client::application::config::Config;
use iplicit_client::application::interfaces::document::DocumentService;
use iplicit_client::application::interfaces::reference::ReferenceService;
use iplicit_client::utils::setup_logger;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();

    // Credentials come from IPLICIT_API_KEY, IPLICIT_USERNAME and IPLICIT_DOMAIN
    let config = Config::from_env()?;
    info!("Starting simple client example against {}", config.rest_api.base_url);

    // The session is created on the first request
    let client = Client::from_config(&config)?;

    let code = std::env::args().nth(1).unwrap_or_else(|| "ACME".to_string());
    match client.lookup_contact_by_code(&code).await? {
        Some(id) => info!("Contact {} has id {}", code, id),
        None => warn!("No contact with code {}", code),
    }

    if let Some(legal_entity) = client.get_default_legal_entity().await? {
        info!("Default legal entity: {}", legal_entity);
    }

    if let Some(document_id) = std::env::args().nth(2) {
        let document = client.get_document(&document_id).await?;
        info!("Document: {}", serde_json::to_string_pretty(&document)?);
    }

    Ok(())
}
