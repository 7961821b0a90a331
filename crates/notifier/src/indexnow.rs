use crate::{Notifier, SubmissionReport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use menusite_core::Site;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

const TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexNowPayload<'a> {
    host: &'a str,
    key: &'a str,
    key_location: &'a str,
    url_list: &'a [String],
}

/// IndexNow API client
pub struct IndexNowClient {
    client: reqwest::Client,
    endpoint: String,
    host: String,
    key: String,
    key_location: String,
}

impl IndexNowClient {
    pub fn new(endpoint: &str, host: &str, key: &str, key_location: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            host: host.to_string(),
            key: key.to_string(),
            key_location: key_location.to_string(),
        })
    }

    /// Client for a loaded site; the key file is expected at `<baseURL>/<key>.txt`
    pub fn from_site(site: &Site) -> Result<Self> {
        let key = site
            .config
            .metadata
            .index_now_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .context("site.json has no metadata.indexNowKey")?;
        let key_location = format!("{}/{}.txt", site.config.base(), key);

        Self::new(
            &site.manifest.indexnow_endpoint,
            site.config.host(),
            key,
            &key_location,
        )
    }

    fn payload<'a>(&'a self, urls: &'a [String]) -> IndexNowPayload<'a> {
        IndexNowPayload {
            host: &self.host,
            key: &self.key,
            key_location: &self.key_location,
            url_list: urls,
        }
    }
}

#[async_trait]
impl Notifier for IndexNowClient {
    async fn submit(&self, urls: &[String]) -> Result<SubmissionReport> {
        log::info!("submitting {} URLs to {}", urls.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.payload(urls))
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.endpoint))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK && status != StatusCode::ACCEPTED {
            anyhow::bail!("IndexNow submission failed ({}): {}", status, body);
        }

        log::info!("IndexNow accepted submission ({})", status);
        Ok(SubmissionReport {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accept one connection, answer with `status_line`, and hand back the request body
    async fn one_shot_server(
        status_line: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/indexnow", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                let request = String::from_utf8_lossy(&buf).to_string();
                if let Some((head, body)) = request.split_once("\r\n\r\n") {
                    let length = head
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if body.len() >= length || n == 0 {
                        let response = format!(
                            "HTTP/1.1 {}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
                            status_line
                        );
                        socket.write_all(response.as_bytes()).await.unwrap();
                        return body.to_string();
                    }
                }
                if n == 0 {
                    return String::new();
                }
            }
        });

        (endpoint, handle)
    }

    fn client(endpoint: &str) -> IndexNowClient {
        IndexNowClient::new(
            endpoint,
            "menu.example.com",
            "abc123",
            "https://menu.example.com/abc123.txt",
        )
        .unwrap()
    }

    #[test]
    fn test_payload_shape() {
        let client = client("http://localhost/indexnow");
        let urls = vec!["https://menu.example.com/".to_string()];
        let value = serde_json::to_value(client.payload(&urls)).unwrap();

        assert_eq!(value["host"], "menu.example.com");
        assert_eq!(value["key"], "abc123");
        assert_eq!(value["keyLocation"], "https://menu.example.com/abc123.txt");
        assert_eq!(value["urlList"][0], "https://menu.example.com/");
    }

    #[tokio::test]
    async fn test_accepted_submission() {
        let (endpoint, server) = one_shot_server("202 Accepted").await;
        let urls = vec![
            "https://menu.example.com/".to_string(),
            "https://menu.example.com/desserts".to_string(),
        ];

        let report = client(&endpoint).submit(&urls).await.unwrap();
        assert_eq!(report.status, 202);
        assert_eq!(report.body, "ok");

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(sent["urlList"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_submission_is_error() {
        let (endpoint, _server) = one_shot_server("403 Forbidden").await;
        let err = client(&endpoint)
            .submit(&["https://menu.example.com/".to_string()])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("403"));
    }
}
