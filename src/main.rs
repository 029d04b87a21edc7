use comdoctor_backend::app::app::App;
use comdoctor_backend::util::logger::Logger;
use dotenv::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    // Console + rolling file layers; guards must stay alive for the process lifetime
    let _logger = match Logger::new() {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    info!("🚀 Starting Comdoctor Backend Application");

    match dotenv() {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await;
    app.start().await;
}
