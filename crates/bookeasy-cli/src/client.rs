use anyhow::{bail, Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::Config;

pub struct ApiClient {
    client: Client,
    base_url: String,
    user_id: Option<String>,
    role: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("{}/api", config.server.trim_end_matches('/')),
            user_id: config.user_id.clone(),
            role: config.role.clone(),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.client.get(self.url(path));
        let resp = self.identify(req).send().await.context("request failed")?;
        self.handle_response(resp).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let req = self.client.get(self.url(path)).query(query);
        let resp = self.identify(req).send().await.context("request failed")?;
        self.handle_response(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let req = self.client.post(self.url(path)).json(body);
        let resp = self.identify(req).send().await.context("request failed")?;
        self.handle_response(resp).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let req = self.client.put(self.url(path)).json(body);
        let resp = self.identify(req).send().await.context("request failed")?;
        self.handle_response(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let req = self.client.delete(self.url(path));
        let resp = self.identify(req).send().await.context("request failed")?;
        let status = resp.status();
        let body = resp.text().await.context("failed to read response")?;
        if !status.is_success() {
            bail!(describe_error(status, &body));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn identify(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.user_id {
            Some(id) => req.header("user-id", id).header("user-type", &self.role),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let body = resp.text().await.context("failed to read response")?;

        if !status.is_success() {
            bail!(describe_error(status, &body));
        }

        serde_json::from_str(&body).context("failed to parse response")
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = err.get("error") {
            let code = error
                .get("code")
                .and_then(|c| c.as_str())
                .unwrap_or("unknown");
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            return format!("{}: {}", code, message);
        }
    }
    format!("request failed with status {}: {}", status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_is_unwrapped() {
        let body = r#"{"error":{"code":"capacity_exceeded","message":"too many"}}"#;
        assert_eq!(
            describe_error(reqwest::StatusCode::BAD_REQUEST, body),
            "capacity_exceeded: too many"
        );
    }

    #[test]
    fn plain_bodies_are_reported_verbatim() {
        let msg = describe_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(msg.contains("502"));
        assert!(msg.ends_with("upstream down"));
    }
}
