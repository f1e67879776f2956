//! Google Gemini adapter
//!
//! Uses `streamGenerateContent` with `alt=sse`. Assistant turns are sent
//! with the `model` role and system text goes in `systemInstruction`.

use serde_json::{json, Value};

use super::core::{AuthHeader, HttpTransport};
use super::ChatProvider;
use crate::ai::providers::ProviderId;
use crate::ai::stream::ChunkStream;
use crate::ai::types::{split_system, CallOptions, ChatMessage, Role};
use crate::config::ProviderSettings;
use crate::error::ChatError;

pub struct GoogleProvider {
    transport: HttpTransport,
}

impl GoogleProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ChatError> {
        Ok(Self {
            transport: HttpTransport::new(ProviderId::Google, settings, AuthHeader::GoogApiKey)?,
        })
    }

    fn endpoint(model: &str) -> String {
        format!("models/{}:streamGenerateContent?alt=sse", model)
    }

    pub(crate) fn request_body(&self, messages: &[ChatMessage], options: &CallOptions) -> Value {
        let (system, turns) = split_system(messages);
        let contents: Vec<Value> = turns
            .iter()
            .map(|m| {
                let role = match m.role() {
                    Role::Assistant => "model",
                    _ => "user",
                };
                json!({"role": role, "parts": [{"text": m.content()}]})
            })
            .collect();

        let mut body = json!({ "contents": contents });

        if let Some(system) = system {
            body["systemInstruction"] = json!({"parts": [{"text": system}]});
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(max_tokens) = options.max_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(max_tokens));
        }
        if let Some(temp) = options.temperature {
            generation_config.insert("temperature".into(), json!(temp));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        body
    }
}

impl ChatProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Google
    }

    fn stream_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &CallOptions,
    ) -> ChunkStream {
        let body = self.request_body(messages, options);
        self.transport
            .stream_json(self.transport.url(&Self::endpoint(model)), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::core::test_server::serve;
    use futures::StreamExt;

    fn provider(base_url: Option<String>) -> GoogleProvider {
        GoogleProvider::new(&ProviderSettings {
            api_key: Some("g-key".into()),
            base_url,
        })
        .unwrap()
    }

    #[test]
    fn test_request_body_roles_and_system() {
        let messages = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
        ];
        let body = provider(None).request_body(
            &messages,
            &CallOptions::default().with_max_tokens(64),
        );
        assert_eq!(body["systemInstruction"], json!({"parts": [{"text": "be brief"}]}));
        assert_eq!(
            body["contents"],
            json!([
                {"role": "user", "parts": [{"text": "hi"}]},
                {"role": "model", "parts": [{"text": "hello"}]}
            ])
        );
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 64);
        assert!(body["generationConfig"].get("temperature").is_none());
    }

    #[test]
    fn test_request_body_without_options() {
        let body = provider(None).request_body(&[ChatMessage::user("hi")], &CallOptions::default());
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[tokio::test]
    async fn test_streams_candidate_parts() {
        let events = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Bon\"}],\"role\":\"model\"}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"jour\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"totalTokenCount\":9}}\r\n\r\n",
        );
        let server = serve("200 OK", "text/event-stream", events.into()).await;
        let p = provider(Some(server.base_url.clone()));
        let messages = [ChatMessage::user("salut")];

        let deltas: Vec<String> = p
            .stream_text("gemini-2.5-flash", &messages, &CallOptions::default())
            .map(|d| d.unwrap())
            .collect()
            .await;
        assert_eq!(deltas, vec!["Bon", "jour"]);

        let request = server.last_request();
        assert!(request.starts_with("POST /models/gemini-2.5-flash:streamGenerateContent?alt=sse"));
        assert!(request.to_lowercase().contains("x-goog-api-key: g-key"));
    }
}
