use std::sync::Arc;
use axum::{
    body::Bytes,
    routing::{ delete, get, post },
    Router,
    Json,
    extract::{ rejection::JsonRejection, State, Path },
};
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, debug };

use super::error::{ ApiError, ApiResult };
use crate::config::prompt::{ get_action_prompt, Action, ParseActionError, PromptConfig };
use crate::llm::generator::{ Generator, HistoryEntry };
use crate::models::api::{
    ActionRequest,
    CreateChatRequest,
    DeleteChatResponse,
    HealthResponse,
    LoginRequest,
    SendMessageRequest,
    SendMessageResponse,
    SuccessResponse,
};
use crate::models::chat::{ derive_title, Chat, Message, Sender, UserRecord };
use crate::models::ids::IdGenerator;
use crate::store::{ validate_username, UserStore };

/// Everything a handler needs, built once at startup and shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub generator: Generator,
    pub prompts: Arc<PromptConfig>,
    pub ids: Arc<IdGenerator>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/login", post(login_handler))
        .route(
            "/api/chats/{username}",
            get(list_chats_handler).post(create_chat_handler).delete(delete_all_chats_handler)
        )
        .route("/api/chats/{username}/{chat_id}", delete(delete_chat_handler))
        .route("/api/chats/{username}/{chat_id}/messages", post(send_message_handler))
        .route("/api/chats/{username}/{chat_id}/action", post(action_handler))
        .layer(cors)
        .with_state(state)
}

fn required(value: Option<String>, what: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation(format!("{} is required", what)))
}

fn chat_not_found(chat_id: &str) -> ApiError {
    ApiError::NotFound(format!("Chat '{}' not found", chat_id))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>
) -> ApiResult<Json<UserRecord>> {
    let Json(req) = payload?;
    let username = required(req.username, "Username")?;
    let username = validate_username(&username)?;

    let record = state.store.load(username).await?;
    if !state.store.exists(username).await? {
        state.store.save(username, &record).await?;
        info!("Created user record for '{}'", username);
    }
    Ok(Json(record))
}

async fn list_chats_handler(
    State(state): State<AppState>,
    Path(username): Path<String>
) -> ApiResult<Json<Vec<Chat>>> {
    let record = state.store.load(&username).await?;
    Ok(Json(record.chats))
}

async fn create_chat_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Bytes
) -> ApiResult<Json<Chat>> {
    let req: CreateChatRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateChatRequest::default()
    } else {
        serde_json
            ::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?
    };

    let mut record = state.store.load(&username).await?;
    let chat = Chat::new(state.ids.next_id(), req.title);
    record.chats.insert(0, chat.clone());
    state.store.save(&username, &record).await?;

    info!("Created chat {} for '{}'", chat.id, username);
    Ok(Json(chat))
}

async fn send_message_handler(
    State(state): State<AppState>,
    Path((username, chat_id)): Path<(String, String)>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>
) -> ApiResult<Json<SendMessageResponse>> {
    let Json(req) = payload?;
    let content = required(req.content, "Message content")?;

    let mut record = state.store.load(&username).await?;
    let idx = record.chat_position(&chat_id).ok_or_else(|| chat_not_found(&chat_id))?;

    let user_message = Message::new(state.ids.next_id(), content, Sender::User);
    {
        let chat = &mut record.chats[idx];
        chat.messages.push(user_message.clone());
        if chat.messages.len() == 1 {
            chat.title = derive_title(&user_message.content);
        }
    }
    // The user's message stays committed even if generation fails below.
    state.store.save(&username, &record).await?;

    let reply = {
        let history: Vec<HistoryEntry<'_>> = record.chats[idx].messages
            .iter()
            .map(|m| HistoryEntry { sender: m.sender, content: &m.content })
            .collect();
        debug!("Sending {} message(s) of chat {} to {}", history.len(), chat_id, state.generator.model());
        state.generator.generate_chat(&history).await?
    };

    let ai_message = Message::new(state.ids.next_id(), reply, Sender::Ai);
    let title = {
        let chat = &mut record.chats[idx];
        chat.messages.push(ai_message.clone());
        chat.title.clone()
    };
    state.store.save(&username, &record).await?;

    Ok(
        Json(SendMessageResponse {
            user_message,
            ai_message,
            title,
        })
    )
}

async fn delete_chat_handler(
    State(state): State<AppState>,
    Path((username, chat_id)): Path<(String, String)>
) -> ApiResult<Json<DeleteChatResponse>> {
    let mut record = state.store.load(&username).await?;
    let before = record.chats.len();
    record.chats.retain(|c| c.id != chat_id);

    if record.chats.len() != before {
        state.store.save(&username, &record).await?;
        info!("Deleted chat {} for '{}'", chat_id, username);
    } else {
        debug!("Chat {} for '{}' already absent", chat_id, username);
    }

    Ok(Json(DeleteChatResponse { success: true, chats: record.chats }))
}

async fn delete_all_chats_handler(
    State(state): State<AppState>,
    Path(username): Path<String>
) -> ApiResult<Json<SuccessResponse>> {
    let mut record = state.store.load(&username).await?;
    let removed = record.chats.len();
    record.chats.clear();
    state.store.save(&username, &record).await?;

    info!("Deleted all {} chat(s) for '{}'", removed, username);
    Ok(Json(SuccessResponse { success: true }))
}

async fn action_handler(
    State(state): State<AppState>,
    Path((username, chat_id)): Path<(String, String)>,
    payload: Result<Json<ActionRequest>, JsonRejection>
) -> ApiResult<Json<Message>> {
    let Json(req) = payload?;
    let message_id = required(req.message_id, "messageId")?;
    let action: Action = required(req.action, "action")?
        .parse()
        .map_err(|e: ParseActionError| ApiError::Validation(e.to_string()))?;

    let mut record = state.store.load(&username).await?;
    let chat_idx = record.chat_position(&chat_id).ok_or_else(|| chat_not_found(&chat_id))?;
    let msg_idx = record.chats[chat_idx]
        .message_position(&message_id, Sender::Ai)
        .ok_or_else(|| ApiError::NotFound(format!("AI message '{}' not found", message_id)))?;

    let prompt = get_action_prompt(
        &state.prompts,
        action,
        &record.chats[chat_idx].messages[msg_idx].content
    )?;
    let rewritten = state.generator.generate(&prompt).await?;

    let updated = {
        let message = &mut record.chats[chat_idx].messages[msg_idx];
        message.content = rewritten;
        message.timestamp = chrono::Utc::now();
        message.clone()
    };
    state.store.save(&username, &record).await?;

    info!("Applied '{}' to message {} in chat {} for '{}'", action, message_id, chat_id, username);
    Ok(Json(updated))
}
