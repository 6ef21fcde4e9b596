use serde::{ Serialize, Deserialize };

use super::chat::{ Chat, Message };

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub username: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateChatRequest {
    pub title: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SendMessageRequest {
    pub content: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub message_id: Option<String>,
    pub action: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: Message,
    pub ai_message: Message,
    pub title: String,
}

#[derive(Serialize, Debug)]
pub struct DeleteChatResponse {
    pub success: bool,
    pub chats: Vec<Chat>,
}

#[derive(Serialize, Debug)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
