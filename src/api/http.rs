// HTTP implementation of the ChatApi trait.
//
// Endpoint layout:
//   GET    {base}/conversations
//   POST   {base}/conversations
//   DELETE {base}/conversations/{id}
//   GET    {base}/conversations/{id}/messages?page={n}
//
// Failed requests carry an optional `{"message": "..."}` body; the message is
// surfaced verbatim so the stores can show it to the user.

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde::Deserialize;

use super::{ChatApi, ChatApiError, ConversationEnvelope, ConversationList, MessagePage, NewConversation};
use crate::models::Conversation;

pub struct HttpChatApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpChatApi {
    pub fn new(base_url: &str) -> Self {
        HttpChatApi {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Turn a non-success response into an error, preferring the server's own
    /// message when the body carries one.
    async fn fail(resp: reqwest::Response) -> ChatApiError {
        let status = resp.status();
        match resp.json::<ErrorBody>().await {
            Ok(body) if !body.message.is_empty() => ChatApiError::Api(body.message),
            _ => ChatApiError::Api(format!("request failed with status {}", status)),
        }
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn get_conversations(&self) -> Result<ConversationList, ChatApiError> {
        debug!("GET /conversations");
        let resp = self.request(Method::GET, "/conversations").send().await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json::<ConversationList>().await?)
    }

    async fn create_conversation(
        &self,
        req: &NewConversation,
    ) -> Result<Conversation, ChatApiError> {
        debug!("POST /conversations ({} participants)", req.participant_ids.len());
        let resp = self
            .request(Method::POST, "/conversations")
            .json(req)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        let envelope = resp.json::<ConversationEnvelope>().await?;
        Ok(envelope.conversation)
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), ChatApiError> {
        debug!("DELETE /conversations/{}", id);
        let resp = self
            .request(Method::DELETE, &format!("/conversations/{}", id))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(())
    }

    async fn get_messages(
        &self,
        conversation_id: &str,
        page: u32,
    ) -> Result<MessagePage, ChatApiError> {
        debug!("GET /conversations/{}/messages?page={}", conversation_id, page);
        let resp = self
            .request(
                Method::GET,
                &format!("/conversations/{}/messages", conversation_id),
            )
            .query(&[("page", page)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::fail(resp).await);
        }
        Ok(resp.json::<MessagePage>().await?)
    }
}
