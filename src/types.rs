use serde::{Serialize, Deserialize};

use crate::history::ChatHistory;

pub const STATUS_MESSAGE: &str = "Chat API POST response OK with data";

/// Body of `POST /api/chat`. Every field may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Base64 payload or a full `data:` URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_history: Option<ChatHistory>,
    pub use_tavily: bool,
}

impl ChatRequest {
    /// Incoming history, or a fresh one holding the persona when absent or empty.
    pub fn history_or_seed(&self, system_prompt: &str) -> ChatHistory {
        match &self.chat_history {
            Some(history) if !history.is_empty() => history.clone(),
            _ => ChatHistory::seeded(system_prompt),
        }
    }

    /// Query text with the image marker appended when an image is attached.
    pub fn user_message_text(&self) -> String {
        let mut text = self.query.clone().unwrap_or_default();
        if let Some(image) = self.attached_image() {
            text.push_str(&format!(" [Image: {}]", image_data_uri(image)));
        }
        text
    }

    /// The attached image, if any. An empty string counts as no image.
    pub fn attached_image(&self) -> Option<&str> {
        self.image.as_deref().filter(|image| !image.is_empty())
    }

    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }
}

/// The image as given when it already is a data URI, otherwise a JPEG data URI around it.
pub fn image_data_uri(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/jpeg;base64,{image}")
    }
}

/// Base64 payload of an image, with any data URI header removed.
pub fn image_payload(image: &str) -> &str {
    match image.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or_default(),
        None => image,
    }
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub chat_history: ChatHistory,
}


#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{Role, Turn};

    #[test]
    fn test_request_with_all_fields_omitted() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_none());
        assert!(req.image.is_none());
        assert!(req.chat_history.is_none());
        assert!(!req.use_tavily);
    }

    #[test]
    fn test_request_wire_names() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"query":"hi","chatHistory":[{"role":"user","content":"x"}],"useTavily":true,"extra":1}"#,
        )
        .unwrap();
        assert_eq!(req.query.as_deref(), Some("hi"));
        assert_eq!(req.chat_history.unwrap().len(), 1);
        assert!(req.use_tavily);
    }

    #[test]
    fn test_history_seeded_when_absent_or_empty() {
        let absent = ChatRequest::default();
        let seeded = absent.history_or_seed("persona");
        assert_eq!(seeded.turns(), &[Turn::system("persona")]);

        let empty = ChatRequest {
            chat_history: Some(ChatHistory::default()),
            ..Default::default()
        };
        assert_eq!(empty.history_or_seed("persona").len(), 1);
    }

    #[test]
    fn test_history_kept_when_present() {
        let req = ChatRequest {
            chat_history: Some(vec![Turn::user("earlier")].into()),
            ..Default::default()
        };
        let history = req.history_or_seed("persona");
        assert_eq!(history.len(), 1);
        assert_eq!(history.turns()[0].role, Role::User);
    }

    #[test]
    fn test_user_message_text_without_image() {
        let req = ChatRequest {
            query: Some("What are symptoms of flu?".to_string()),
            ..Default::default()
        };
        assert_eq!(req.user_message_text(), "What are symptoms of flu?");
    }

    #[test]
    fn test_user_message_text_with_raw_base64_image() {
        let req = ChatRequest {
            query: Some(String::new()),
            image: Some("abc123".to_string()),
            ..Default::default()
        };
        let text = req.user_message_text();
        assert!(text.ends_with("[Image: data:image/jpeg;base64,abc123]"));
        assert_eq!(text, " [Image: data:image/jpeg;base64,abc123]");
    }

    #[test]
    fn test_user_message_text_keeps_existing_data_uri() {
        let req = ChatRequest {
            query: Some("rash?".to_string()),
            image: Some("data:image/png;base64,iVBOR".to_string()),
            ..Default::default()
        };
        assert_eq!(req.user_message_text(), "rash? [Image: data:image/png;base64,iVBOR]");
    }

    #[test]
    fn test_user_message_text_empty() {
        assert_eq!(ChatRequest::default().user_message_text(), "");
    }

    #[test]
    fn test_empty_image_string_counts_as_absent() {
        let req: ChatRequest = serde_json::from_str(r#"{"query":"","image":""}"#).unwrap();
        assert!(req.attached_image().is_none());
        assert_eq!(req.user_message_text(), "");
    }

    #[test]
    fn test_image_payload() {
        assert_eq!(image_payload("abc123"), "abc123");
        assert_eq!(image_payload("data:image/png;base64,iVBOR"), "iVBOR");
        assert_eq!(image_payload("data:image/png;base64"), "");
    }

    #[test]
    fn test_response_wire_names() {
        let resp = ChatResponse {
            reply: "ok".to_string(),
            chat_history: vec![Turn::assistant("ok")].into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["reply"], "ok");
        assert_eq!(json["chatHistory"][0]["role"], "assistant");
    }
}
