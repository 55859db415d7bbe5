use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use polyvoice_api::config::{defaults, log_filter};
use polyvoice_api::config_loader::{self, CONFIG_FILE_PATH};
use polyvoice_api::config_validator::ConfigValidator;
use polyvoice_api::handlers::{configure, cors};
use polyvoice_api::{OpenAiTranscriber, Transcriber};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if std::env::args().any(|arg| arg == "--sample-config") {
        print!("{}", ConfigValidator::generate_sample_config());
        return Ok(());
    }

    // File values fill in variables missing from the environment
    let config_file_loaded = config_loader::load_config();

    let log_level =
        std::env::var("LOG_LEVEL").unwrap_or_else(|_| defaults::LOG_LEVEL.to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(log_filter(&log_level))).init();

    if config_file_loaded {
        info!("Configuration file {} loaded", CONFIG_FILE_PATH);
    }

    let config = ConfigValidator::validate_and_load()
        .map_err(|results| io::Error::new(io::ErrorKind::InvalidInput, results.to_string()))?;

    info!("Starting PolyVoice Transcription API");
    if config.openai_configured() {
        info!("OpenAI API key loaded successfully");
    } else {
        warn!("OPENAI_API_KEY not found in environment");
    }

    if let Err(e) = config.ensure_temp_dir() {
        warn!(
            "Failed to create temp directory {}: {}",
            config.temp_dir.display(),
            e
        );
    }

    let transcriber: Arc<dyn Transcriber> = Arc::new(
        OpenAiTranscriber::from_config(&config).map_err(|e| io::Error::other(e.to_string()))?,
    );
    let transcriber = web::Data::from(transcriber);

    let bind_address = config.bind_address();
    let workers = config.worker_count();
    let keep_alive = config.keep_alive;

    info!("Host: {}", bind_address);
    info!("Workers: {}", workers);
    info!("Reload: {}", config.reload);
    info!("Log Level: {}", config.log_level);
    info!("Environment: {}", config.environment.as_str());
    info!("Using temp directory: {}", config.temp_dir.display());
    info!(
        "Transcription timeout: {}s",
        config.transcription_timeout.as_secs()
    );

    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(cors())
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(transcriber.clone())
            .configure(configure)
    })
    .workers(workers)
    .keep_alive(keep_alive)
    .bind(bind_address)?
    .run()
    .await
}
