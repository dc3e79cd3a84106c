//! HTTP client for the Folio API and the list caches the front end keeps.
//!
//! [`Collection`] mirrors one entity list: it starts out `Loading`, becomes `Loaded`
//! after the first fetch, refetches after every create, and drops deleted items
//! locally without refetching. [`SettingsCache`] does the same for the settings map.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::types::{Book, Created, Deleted, NewSection, Paper, Section, Setting};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Paper as submitted from the publish form.
#[derive(Debug, Clone, Default)]
pub struct PaperDraft {
    pub title: String,
    pub topic: String,
    pub abstract_text: String,
    /// Defaults to today on the server when `None`.
    pub date: Option<String>,
    /// `(file name, content)` of an attached document.
    pub file: Option<(String, Vec<u8>)>,
}

/// Book as submitted from the library form.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub recommendation: String,
    pub date: Option<String>,
    /// `(file name, content)` of a cover image.
    pub cover: Option<(String, Vec<u8>)>,
}

/// Seven-day totals shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficTotals {
    pub page_views: u64,
    pub unique_visitors: u64,
}

impl TrafficTotals {
    /// Sums `sum.pageViews` and `sum.uniqueVisitors` over the first zone's daily groups.
    pub fn from_metrics(data: &Value) -> Option<Self> {
        let groups = data.pointer("/viewer/zones/0/httpRequests1dGroups")?.as_array()?;
        let mut totals = TrafficTotals::default();
        for group in groups {
            totals.page_views += group.pointer("/sum/pageViews").and_then(Value::as_u64).unwrap_or(0);
            totals.unique_visitors += group.pointer("/sum/uniqueVisitors").and_then(Value::as_u64).unwrap_or(0);
        }
        Some(totals)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// `base_url` is the server origin, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self { base, http }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Public URL of a stored upload.
    pub fn upload_url(&self, stored_name: &str) -> String {
        self.url(&format!("/uploads/{}", stored_name))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> ClientResult<T> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text).map(|b| b.error).unwrap_or(text);
        Err(ClientError::Api { status: status.as_u16(), message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::decode(self.http.get(self.url(path)).send().await?).await
    }

    async fn delete_json(&self, path: &str) -> ClientResult<Deleted> {
        Self::decode(self.http.delete(self.url(path)).send().await?).await
    }

    pub async fn papers(&self) -> ClientResult<Vec<Paper>> {
        self.get_json("/api/papers").await
    }

    pub async fn paper(&self, id: i64) -> ClientResult<Paper> {
        self.get_json(&format!("/api/papers/{}", id)).await
    }

    pub async fn create_paper(&self, draft: &PaperDraft) -> ClientResult<Paper> {
        let mut form = Form::new()
            .text("title", draft.title.clone())
            .text("topic", draft.topic.clone())
            .text("abstract", draft.abstract_text.clone());
        if let Some(date) = &draft.date {
            form = form.text("date", date.clone());
        }
        if let Some((name, bytes)) = &draft.file {
            form = form.part("file", Part::bytes(bytes.clone()).file_name(name.clone()));
        }
        let resp = self.http.post(self.url("/api/papers")).multipart(form).send().await?;
        Ok(Self::decode::<Created<Paper>>(resp).await?.data)
    }

    pub async fn delete_paper(&self, id: i64) -> ClientResult<Deleted> {
        self.delete_json(&format!("/api/papers/{}", id)).await
    }

    pub async fn sections(&self) -> ClientResult<Vec<Section>> {
        self.get_json("/api/sections").await
    }

    pub async fn create_section(&self, section: &NewSection) -> ClientResult<Section> {
        let resp = self.http.post(self.url("/api/sections")).json(section).send().await?;
        Ok(Self::decode::<Created<Section>>(resp).await?.data)
    }

    pub async fn delete_section(&self, id: i64) -> ClientResult<Deleted> {
        self.delete_json(&format!("/api/sections/{}", id)).await
    }

    pub async fn settings(&self) -> ClientResult<BTreeMap<String, String>> {
        self.get_json("/api/settings").await
    }

    pub async fn update_setting(&self, key: &str, value: &str) -> ClientResult<Setting> {
        let body = Setting { key: key.to_string(), value: value.to_string() };
        let resp = self.http.post(self.url("/api/settings")).json(&body).send().await?;
        Ok(Self::decode::<Created<Setting>>(resp).await?.data)
    }

    pub async fn books(&self) -> ClientResult<Vec<Book>> {
        self.get_json("/api/books").await
    }

    pub async fn create_book(&self, draft: &BookDraft) -> ClientResult<Book> {
        let mut form = Form::new()
            .text("title", draft.title.clone())
            .text("author", draft.author.clone())
            .text("summary", draft.summary.clone())
            .text("recommendation", draft.recommendation.clone());
        if let Some(date) = &draft.date {
            form = form.text("date", date.clone());
        }
        if let Some((name, bytes)) = &draft.cover {
            form = form.part("cover", Part::bytes(bytes.clone()).file_name(name.clone()));
        }
        let resp = self.http.post(self.url("/api/books")).multipart(form).send().await?;
        Ok(Self::decode::<Created<Book>>(resp).await?.data)
    }

    pub async fn delete_book(&self, id: i64) -> ClientResult<Deleted> {
        self.delete_json(&format!("/api/books/{}", id)).await
    }

    /// Raw analytics payload from `/api/metrics`.
    pub async fn metrics(&self) -> ClientResult<Value> {
        self.get_json("/api/metrics").await
    }
}

/// An entity list the client can fetch, extend and prune.
#[async_trait]
pub trait Resource: Sized + Send + Sync {
    type Draft: Send + Sync;

    fn id(&self) -> i64;
    async fn fetch_all(client: &ApiClient) -> ClientResult<Vec<Self>>;
    async fn create(client: &ApiClient, draft: &Self::Draft) -> ClientResult<Self>;
    async fn delete(client: &ApiClient, id: i64) -> ClientResult<Deleted>;
}

#[async_trait]
impl Resource for Paper {
    type Draft = PaperDraft;

    fn id(&self) -> i64 {
        self.id
    }
    async fn fetch_all(client: &ApiClient) -> ClientResult<Vec<Self>> {
        client.papers().await
    }
    async fn create(client: &ApiClient, draft: &PaperDraft) -> ClientResult<Self> {
        client.create_paper(draft).await
    }
    async fn delete(client: &ApiClient, id: i64) -> ClientResult<Deleted> {
        client.delete_paper(id).await
    }
}

#[async_trait]
impl Resource for Section {
    type Draft = NewSection;

    fn id(&self) -> i64 {
        self.id
    }
    async fn fetch_all(client: &ApiClient) -> ClientResult<Vec<Self>> {
        client.sections().await
    }
    async fn create(client: &ApiClient, draft: &NewSection) -> ClientResult<Self> {
        client.create_section(draft).await
    }
    async fn delete(client: &ApiClient, id: i64) -> ClientResult<Deleted> {
        client.delete_section(id).await
    }
}

#[async_trait]
impl Resource for Book {
    type Draft = BookDraft;

    fn id(&self) -> i64 {
        self.id
    }
    async fn fetch_all(client: &ApiClient) -> ClientResult<Vec<Self>> {
        client.books().await
    }
    async fn create(client: &ApiClient, draft: &BookDraft) -> ClientResult<Self> {
        client.create_book(draft).await
    }
    async fn delete(client: &ApiClient, id: i64) -> ClientResult<Deleted> {
        client.delete_book(id).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
}

/// Client-side cache of one entity list.
pub struct Collection<T: Resource> {
    client: ApiClient,
    state: LoadState<Vec<T>>,
}

impl<T: Resource> Collection<T> {
    pub fn new(client: ApiClient) -> Self {
        Self { client, state: LoadState::Loading }
    }

    pub fn state(&self) -> &LoadState<Vec<T>> {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded(_))
    }

    /// Current items; empty until the first successful load.
    pub fn items(&self) -> &[T] {
        match &self.state {
            LoadState::Loading => &[],
            LoadState::Loaded(items) => items,
        }
    }

    /// Fetches the full list. A failed fetch leaves the previous state untouched.
    pub async fn load(&mut self) -> ClientResult<()> {
        let items = T::fetch_all(&self.client).await?;
        self.state = LoadState::Loaded(items);
        Ok(())
    }

    /// Creates the item, then refetches the whole list.
    pub async fn create(&mut self, draft: &T::Draft) -> ClientResult<T> {
        let created = T::create(&self.client, draft).await?;
        self.load().await?;
        Ok(created)
    }

    /// Deletes on the server and drops the item locally without refetching.
    pub async fn delete(&mut self, id: i64) -> ClientResult<Deleted> {
        let deleted = T::delete(&self.client, id).await?;
        if let LoadState::Loaded(items) = &mut self.state {
            items.retain(|item| item.id() != id);
        }
        Ok(deleted)
    }
}

/// Client-side cache of the settings map.
pub struct SettingsCache {
    client: ApiClient,
    state: LoadState<BTreeMap<String, String>>,
}

impl SettingsCache {
    pub fn new(client: ApiClient) -> Self {
        Self { client, state: LoadState::Loading }
    }

    pub fn state(&self) -> &LoadState<BTreeMap<String, String>> {
        &self.state
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match &self.state {
            LoadState::Loading => None,
            LoadState::Loaded(map) => map.get(key).map(String::as_str),
        }
    }

    pub async fn load(&mut self) -> ClientResult<()> {
        let map = self.client.settings().await?;
        self.state = LoadState::Loaded(map);
        Ok(())
    }

    /// Saves the value, then patches the local map.
    pub async fn update(&mut self, key: &str, value: &str) -> ClientResult<()> {
        let saved = self.client.update_setting(key, value).await?;
        if let LoadState::Loaded(map) = &mut self.state {
            map.insert(saved.key, saved.value);
        }
        Ok(())
    }
}
