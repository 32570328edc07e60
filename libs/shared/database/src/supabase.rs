use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key)
                .map_err(|_| anyhow!("Invalid anon key value"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| anyhow!("Invalid bearer token value"))?,
            );
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, auth_token, body, None)
            .await
    }

    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                409 => anyhow!("Conflict: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        // Some endpoints (sign out, updates without a Prefer header) return
        // an empty body; treat that as JSON null so T = Value still works.
        let text = response.text().await?;
        if text.is_empty() {
            return serde_json::from_value(Value::Null)
                .map_err(|e| anyhow!("Empty response could not be decoded: {}", e));
        }

        let data = serde_json::from_str::<T>(&text)?;
        Ok(data)
    }

    // ==========================================================================
    // REST helpers (PostgREST collections)
    // ==========================================================================

    /// Read rows from a collection. `filters` is the raw PostgREST query
    /// string, e.g. `provider_id=eq.1&is_available=eq.true&order=date`.
    pub async fn select<T>(
        &self,
        collection: &str,
        filters: &str,
        auth_token: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = if filters.is_empty() {
            format!("/rest/v1/{}?select=*", collection)
        } else {
            format!("/rest/v1/{}?select=*&{}", collection, filters)
        };

        self.request(Method::GET, &path, auth_token, None).await
    }

    /// Insert a row and return the stored representation.
    pub async fn insert<T>(
        &self,
        collection: &str,
        row: Value,
        auth_token: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}", collection);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let mut rows: Vec<T> = self
            .request_with_headers(Method::POST, &path, auth_token, Some(row), Some(headers))
            .await?;

        if rows.is_empty() {
            return Err(anyhow!("Insert into {} returned no rows", collection));
        }
        Ok(rows.remove(0))
    }

    /// Patch rows matching `filters` and return the stored representations.
    /// The representation comes back from the store so callers never patch
    /// local state optimistically.
    pub async fn update<T>(
        &self,
        collection: &str,
        filters: &str,
        changes: Value,
        auth_token: Option<&str>,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/{}?{}", collection, filters);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(Method::PATCH, &path, auth_token, Some(changes), Some(headers))
            .await
    }

    /// Call a stored procedure.
    pub async fn rpc<T>(&self, function: &str, args: Value, auth_token: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let path = format!("/rest/v1/rpc/{}", function);
        self.request(Method::POST, &path, auth_token, Some(args)).await
    }

    // ==========================================================================
    // Auth endpoints (GoTrue)
    // ==========================================================================

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Value> {
        let body = json!({ "email": email, "password": password });
        self.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(body),
        )
        .await
    }

    pub async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> Result<Value> {
        let body = json!({ "email": email, "password": password, "data": metadata });
        self.request(Method::POST, "/auth/v1/signup", None, Some(body)).await
    }

    pub async fn sign_out(&self, auth_token: &str) -> Result<()> {
        let _: Value = self
            .request(Method::POST, "/auth/v1/logout", Some(auth_token), None)
            .await?;
        Ok(())
    }

    pub async fn get_auth_user(&self, auth_token: &str) -> Result<Value> {
        self.request(Method::GET, "/auth/v1/user", Some(auth_token), None)
            .await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
