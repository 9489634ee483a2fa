//! Thin PostgREST client for a Supabase project.

use thiserror::Error;
use worker::{Env, Fetch, Headers, Method, Request, RequestInit, Url};

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("supabase misconfigured: {0}")]
    Config(String),

    #[error("supabase error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Worker(#[from] worker::Error),
}

pub type SupabaseResult<T> = std::result::Result<T, SupabaseError>;

/// Query parameters in PostgREST syntax, e.g. `("id", "eq.3")`.
pub type Params<'a> = &'a [(&'a str, String)];

#[derive(Clone, Debug)]
pub struct SupabaseClient {
    pub base_url: String,
    pub api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_env(env: &Env) -> SupabaseResult<Self> {
        let base_url = env
            .var("DB_API_URL")
            .map_err(|_| SupabaseError::Config("DB_API_URL is not set".into()))?
            .to_string();
        let api_key = env
            .var("DB_API_KEY")
            .or_else(|_| env.secret("DB_API_KEY"))
            .map(|v| v.to_string())
            .map_err(|_| SupabaseError::Config("DB_API_KEY is not set".into()))?;

        Ok(Self::new(base_url, api_key))
    }

    pub fn table_url(&self, table: &str, params: Params<'_>) -> SupabaseResult<Url> {
        let base = format!("{}/rest/v1/{}", self.base_url, table);
        let pairs = params.iter().map(|(k, v)| (*k, v.as_str()));
        Url::parse_with_params(&base, pairs).map_err(|e| SupabaseError::Config(e.to_string()))
    }

    fn headers(&self, returning: bool) -> SupabaseResult<Headers> {
        let mut headers = Headers::new();
        headers.set("apikey", &self.api_key)?;
        headers.set("Authorization", &format!("Bearer {}", self.api_key))?;
        headers.set("Content-Type", "application/json")?;
        if returning {
            headers.set("Prefer", "return=representation")?;
        }
        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
        ok: &[u16],
    ) -> SupabaseResult<worker::Response> {
        let returning = method != Method::Get;
        let mut init = RequestInit::new();
        init.with_method(method).with_headers(self.headers(returning)?);
        if let Some(body) = body {
            init.with_body(Some(body.to_string().into()));
        }

        let req = Request::new_with_init(url.as_str(), &init)?;
        let mut resp = Fetch::Request(req).send().await?;
        let status = resp.status_code();
        if !ok.contains(&status) {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Status { status, body });
        }
        Ok(resp)
    }

    /// `GET`; PostgREST answers with a JSON array of rows.
    pub async fn select(&self, table: &str, params: Params<'_>) -> SupabaseResult<serde_json::Value> {
        let url = self.table_url(table, params)?;
        let mut resp = self.send(Method::Get, url, None, &[200]).await?;
        Ok(resp.json().await?)
    }

    /// `POST` returning the inserted rows.
    pub async fn insert(&self, table: &str, body: serde_json::Value) -> SupabaseResult<serde_json::Value> {
        let url = self.table_url(table, &[])?;
        let mut resp = self.send(Method::Post, url, Some(body), &[200, 201]).await?;
        Ok(resp.json().await?)
    }

    /// `PATCH` on the rows matching `params`, returning them.
    pub async fn update(
        &self,
        table: &str,
        params: Params<'_>,
        body: serde_json::Value,
    ) -> SupabaseResult<serde_json::Value> {
        let url = self.table_url(table, params)?;
        let mut resp = self.send(Method::Patch, url, Some(body), &[200]).await?;
        Ok(resp.json().await?)
    }

    /// `DELETE` on the rows matching `params`, returning them.
    pub async fn delete(&self, table: &str, params: Params<'_>) -> SupabaseResult<serde_json::Value> {
        let url = self.table_url(table, params)?;
        let mut resp = self.send(Method::Delete, url, None, &[200]).await?;
        Ok(resp.json().await?)
    }
}
