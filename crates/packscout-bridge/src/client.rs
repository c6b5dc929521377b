//! HTTP client for the transport bridge.
//!
//! Endpoints:
//!
//! - `GET /v1/sources/{source}/messages?after_id=&limit=` history page, oldest first
//! - `GET /v1/updates?sources=&offset=&timeout=` long-poll for new messages
//! - `GET /v1/packs/by-name/{name}` and `GET /v1/packs/{id}` sticker sets
//! - `GET /v1/documents/{id}` emoji document metadata

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use packscout_common::BridgeConfig;
use packscout_core::{
    ChatTransport, DomainError, EmojiDocument, EmojiId, EmojiPack, Message, MessageId,
    MessageStream, PackId, RepoResult,
};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{BridgeError, BridgeResult};
use crate::wire::{
    decode_message, Document, MalformedMessage, MessagesPage, StickerSet, Update, UpdatesResponse,
};

/// Transport bridge client
#[derive(Clone)]
pub struct BridgeClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    page_size: u32,
    poll_timeout: Duration,
    request_timeout: Duration,
    reconnect_delay: Duration,
}

impl BridgeClient {
    /// Create a new client from configuration
    pub fn new(config: &BridgeConfig) -> BridgeResult<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| BridgeError::InvalidUrl(format!("{}: {e}", config.url)))?;
        if base_url.cannot_be_a_base() {
            return Err(BridgeError::InvalidUrl(config.url.clone()));
        }

        let request_timeout = Duration::from_secs(config.timeout_secs);
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BridgeError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            page_size: config.page_size.max(1),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
            request_timeout,
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
        })
    }

    /// URL of an endpoint below the base URL; every segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> BridgeResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BridgeError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, url: Url) -> RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a JSON resource; `None` when the bridge answers 404
    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> BridgeResult<Option<T>> {
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(BridgeError::Status {
                status: status.as_u16(),
                endpoint: response.url().path().to_string(),
            });
        }

        Ok(Some(response.json::<T>().await?))
    }

    /// Fetch one page of history strictly after `after_id`
    async fn fetch_page(
        &self,
        source: &str,
        after_id: MessageId,
    ) -> BridgeResult<Vec<Result<Message, MalformedMessage>>> {
        let url = self.endpoint(&["v1", "sources", source, "messages"])?;
        let request = self.request(url).query(&[
            ("after_id", after_id.to_string()),
            ("limit", self.page_size.to_string()),
        ]);

        let page: Vec<_> = self
            .get_json::<MessagesPage>(request)
            .await?
            .map(|page| page.messages)
            .unwrap_or_default()
            .into_iter()
            .map(decode_message)
            .collect();

        tracing::debug!(
            source = %source,
            after_id = %after_id,
            count = page.len(),
            "Fetched history page"
        );

        Ok(page)
    }

    /// Long-poll the update feed once
    ///
    /// Updates without a readable `update_id` are dropped here.
    async fn poll_updates(&self, sources: &str, offset: Option<i64>) -> BridgeResult<Vec<Update>> {
        let url = self.endpoint(&["v1", "updates"])?;
        let mut query = vec![
            ("sources", sources.to_string()),
            ("timeout", self.poll_timeout.as_secs().to_string()),
        ];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let request = self
            .request(url)
            .query(&query)
            .timeout(self.poll_timeout + self.request_timeout);

        let updates = self
            .get_json::<UpdatesResponse>(request)
            .await?
            .map(|response| response.updates)
            .unwrap_or_default();

        Ok(updates
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<Update>(raw) {
                Ok(update) => Some(update),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping update without a readable id");
                    None
                }
            })
            .collect())
    }
}

/// Cursor over the pages of one source
struct PageState {
    client: BridgeClient,
    source: String,
    after_id: MessageId,
    buffer: VecDeque<Message>,
    exhausted: bool,
}

/// Position in the update feed
struct PollState {
    client: BridgeClient,
    sources: String,
    offset: Option<i64>,
    buffer: VecDeque<Message>,
}

#[async_trait]
impl ChatTransport for BridgeClient {
    fn subscribe(&self, sources: &[String]) -> MessageStream {
        let state = PollState {
            client: self.clone(),
            sources: sources.join(","),
            offset: None,
            buffer: VecDeque::new(),
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(message) = state.buffer.pop_front() {
                    return Some((Ok(message), state));
                }

                match state.client.poll_updates(&state.sources, state.offset).await {
                    Ok(updates) => {
                        for update in updates {
                            let next = update.update_id + 1;
                            state.offset = Some(state.offset.map_or(next, |o| o.max(next)));

                            match decode_message(update.message) {
                                Ok(message) => state.buffer.push_back(message),
                                Err(bad) => tracing::warn!(
                                    update_id = update.update_id,
                                    message_id = ?bad.id,
                                    error = %bad.error,
                                    "Skipping malformed update message"
                                ),
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Update poll failed, reconnecting...");
                        tokio::time::sleep(state.client.reconnect_delay).await;
                    }
                }
            }
        })
        .boxed()
    }

    fn paginate(&self, source: &str, after_id: MessageId) -> MessageStream {
        let state = PageState {
            client: self.clone(),
            source: source.to_string(),
            after_id,
            buffer: VecDeque::new(),
            exhausted: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(message) = state.buffer.pop_front() {
                    return Some((Ok(message), state));
                }
                if state.exhausted {
                    return None;
                }

                match state.client.fetch_page(&state.source, state.after_id).await {
                    Ok(page) if page.is_empty() => state.exhausted = true,
                    Ok(page) => {
                        let previous = state.after_id;
                        let mut last = previous;
                        for item in page {
                            match item {
                                Ok(message) if message.id > last => {
                                    last = message.id;
                                    state.buffer.push_back(message);
                                }
                                Ok(message) => tracing::warn!(
                                    source = %state.source,
                                    message_id = %message.id,
                                    "Dropping out-of-order history message"
                                ),
                                Err(bad) => {
                                    tracing::warn!(
                                        source = %state.source,
                                        message_id = ?bad.id,
                                        error = %bad.error,
                                        "Skipping malformed history message"
                                    );
                                    if let Some(id) = bad.id.filter(|id| *id > last) {
                                        last = id;
                                    }
                                }
                            }
                        }

                        // Next page starts after everything seen here, skipped items included
                        state.after_id = last;
                        if last == previous {
                            state.exhausted = true;
                        }
                    }
                    Err(e) => {
                        state.exhausted = true;
                        return Some((Err(e.into()), state));
                    }
                }
            }
        })
        .boxed()
    }

    async fn fetch_pack_by_name(&self, short_name: &str) -> RepoResult<EmojiPack> {
        let url = self.endpoint(&["v1", "packs", "by-name", short_name])?;
        let set = self
            .get_json::<StickerSet>(self.request(url))
            .await?
            .ok_or_else(|| DomainError::pack_name_not_found(short_name))?;

        tracing::debug!(short_name = %short_name, pack_id = %set.id, "Fetched emoji pack");
        Ok(set.into())
    }

    async fn fetch_pack_by_id(&self, pack_id: PackId) -> RepoResult<EmojiPack> {
        let url = self.endpoint(&["v1", "packs", &pack_id.to_string()])?;
        let set = self
            .get_json::<StickerSet>(self.request(url))
            .await?
            .ok_or_else(|| DomainError::pack_id_not_found(pack_id))?;

        tracing::debug!(pack_id = %pack_id, "Fetched emoji pack");
        Ok(set.into())
    }

    async fn fetch_document(&self, emoji_id: EmojiId) -> RepoResult<EmojiDocument> {
        let url = self.endpoint(&["v1", "documents", &emoji_id.to_string()])?;
        let document = self
            .get_json::<Document>(self.request(url))
            .await?
            .ok_or(DomainError::DocumentNotFound(emoji_id))?;

        Ok(document.into())
    }
}
