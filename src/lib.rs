pub mod cli;
pub mod config;
pub mod format;
pub mod llm;
pub mod models;
pub mod server;
pub mod store;

use cli::Args;
use config::prompt;
use llm::chat::new_client as new_chat_client;
use llm::generator::Generator;
use llm::LlmConfig;
use log::info;
use models::ids::IdGenerator;
use server::api::AppState;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn build_state(args: &Args) -> Result<AppState, Box<dyn Error + Send + Sync>> {
    let chat_config = LlmConfig {
        llm_type: args.chat_llm_type
            .parse()
            .map_err(|e| format!("Invalid chat LLM type: {}", e))?,
        base_url: args.chat_base_url.clone(),
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
        max_output_tokens: args.max_output_tokens,
    };
    let chat_client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={:?}",
        args.chat_llm_type,
        chat_client.get_model(),
        chat_config.base_url.as_deref().unwrap_or("adapter default")
    );

    let store = store::create_user_store(args).await?;
    let prompts = prompt::init_prompts(args.prompts_path.as_deref())?;

    Ok(AppState {
        store,
        generator: Generator::new(chat_client),
        prompts,
        ids: Arc::new(IdGenerator::new()),
    })
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("User Store Type: {}", args.store_type);
    info!("Data Directory: {}", args.data_dir);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat API Key Set: {}", !args.chat_api_key.is_empty());
    info!("Max Output Tokens: {}", args.max_output_tokens);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let state = build_state(&args).await?;
    let addr = args.server_addr();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, state, args);
    server.run().await?;

    Ok(())
}
