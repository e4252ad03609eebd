//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into services, run the bot.
//! No business logic here.

use dotenv::dotenv;
use flowbridge::adapters::console::ConsoleMessenger;
use flowbridge::adapters::persistence::{FileMessageLog, TempAttachmentStore};
use flowbridge::adapters::workflow::{
    ApiClient, HttpMediaUploader, HttpSpeechTranscriber, HttpWorkflowDispatcher,
    MockWorkflowAdapter,
};
use flowbridge::domain::UserId;
use flowbridge::ports::{
    AttachmentStorePort, MediaUploadPort, MessageLogPort, MessengerPort, TranscriptionPort,
    WorkflowPort,
};
use flowbridge::shared::config::AppConfig;
use flowbridge::usecases::{BotService, RelayService, RequestNormalizer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Sender id used for messages typed on the console.
const CONSOLE_SENDER: &str = "console";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    flowbridge::adapters::console::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    // --- Attachment store (shared temp dir; names are unique per cycle) ---
    let tmp_dir = cfg.tmp_dir_or_default();
    let temp_store = TempAttachmentStore::new(&tmp_dir);
    temp_store
        .prepare()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(path = %tmp_dir.display(), "temp attachment directory ready");
    let store: Arc<dyn AttachmentStorePort> = Arc::new(temp_store);

    // --- Workflow API: real HTTP adapters when a key is configured, mock otherwise ---
    let (uploader, transcriber, workflow): (
        Arc<dyn MediaUploadPort>,
        Arc<dyn TranscriptionPort>,
        Arc<dyn WorkflowPort>,
    ) = match cfg.api_settings() {
        Some(settings) => {
            info!(
                url = %settings.base_url,
                timeout_secs = settings.timeout.as_secs(),
                "workflow API enabled"
            );
            let api = ApiClient::new(settings).map_err(|e| anyhow::anyhow!("{}", e))?;
            let uploader: Arc<dyn MediaUploadPort> = Arc::new(HttpMediaUploader::new(api.clone()));
            let transcriber: Arc<dyn TranscriptionPort> =
                Arc::new(HttpSpeechTranscriber::new(api.clone()));
            let workflow: Arc<dyn WorkflowPort> = Arc::new(HttpWorkflowDispatcher::new(api));
            (uploader, transcriber, workflow)
        }
        None => {
            warn!("WORKFLOW_API_KEY not set, using mock workflow adapter");
            let mock = Arc::new(MockWorkflowAdapter::new());
            let uploader: Arc<dyn MediaUploadPort> = mock.clone();
            let transcriber: Arc<dyn TranscriptionPort> = mock.clone();
            let workflow: Arc<dyn WorkflowPort> = mock;
            (uploader, transcriber, workflow)
        }
    };

    // --- Optional inbound message log ---
    let message_log: Option<Arc<dyn MessageLogPort>> = if cfg.log_messages_or_default() {
        let log = FileMessageLog::new(cfg.log_dir_or_default());
        info!(path = %log.path().display(), "message logging enabled");
        let log: Arc<dyn MessageLogPort> = Arc::new(log);
        Some(log)
    } else {
        None
    };

    // --- Services ---
    let normalizer = RequestNormalizer::new(store, uploader, transcriber);
    let relay = Arc::new(RelayService::new(normalizer, workflow, message_log));
    let messenger: Arc<dyn MessengerPort> =
        Arc::new(ConsoleMessenger::new(UserId::new(CONSOLE_SENDER)));
    let bot = BotService::new(messenger, relay);

    // --- Run until the transport closes ---
    let handled = bot.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(handled, "bot stopped");

    Ok(())
}
