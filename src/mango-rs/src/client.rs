use crate::{ClientError, Result};
use mango_core::{ClientConfig, CreateIndexRequest, CreateIndexResponse, FindRequest, FindResponse};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// CouchDB Mango API client.
///
/// Holds the connection parameters plus the find and index argument bundles;
/// [`Client::find`] and [`Client::create_index`] read the client's own
/// copies. Nothing mutates after construction, so a client can be shared
/// freely across tasks.
pub struct Client {
    host: String,
    port: u16,
    database: String,
    find_args: FindRequest,
    index_args: CreateIndexRequest,
    check_status: bool,
    http: HttpClient,
}

impl Client {
    /// Create a client for one database. `host` carries the scheme, e.g.
    /// "http://127.0.0.1".
    pub fn new(host: impl Into<String>, port: u16, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            database: database.into(),
            find_args: FindRequest::default(),
            index_args: CreateIndexRequest::default(),
            check_status: true,
            http: HttpClient::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        let mut client = Self::new(config.host.clone(), config.port, config.database.clone());
        client.check_status = config.check_status;
        client
    }

    /// Set the query bundle used by [`Client::find`].
    pub fn with_find_args(mut self, args: FindRequest) -> Self {
        self.find_args = args;
        self
    }

    /// Set the index definition used by [`Client::create_index`].
    pub fn with_index_args(mut self, args: CreateIndexRequest) -> Self {
        self.index_args = args;
        self
    }

    /// Decode non-2xx response bodies as results instead of failing with
    /// [`ClientError::Server`]. With this set, a rejected query is
    /// indistinguishable from an empty result unless the caller inspects
    /// the decoded body.
    pub fn allow_error_bodies(mut self) -> Self {
        self.check_status = false;
        self
    }

    /// Run the configured query against `POST /{database}/_find`.
    ///
    /// One request per call, no retry. Pagination is the caller's job: copy
    /// the response bookmark into the next request's `bookmark` field.
    pub async fn find(&self) -> Result<FindResponse> {
        self.post("_find", &self.find_args).await
    }

    /// Create the configured index via `POST /{database}/_index`.
    pub async fn create_index(&self) -> Result<CreateIndexResponse> {
        self.post("_index", &self.index_args).await
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}:{}/{}/{}", self.host, self.port, self.database, endpoint);
        debug!(%url, "sending Mango request");

        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(
            status = status.as_u16(),
            bytes = text.len(),
            "received Mango response"
        );

        if self.check_status && !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mango_core::{IndexFields, IndexState, Selector};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Bind an ephemeral port, serve exactly one canned HTTP response, and
    /// hand back the raw request for assertions.
    async fn respond_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before request completed");
                request.extend_from_slice(&buf[..n]);
                let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let headers = String::from_utf8_lossy(&request[..header_end]).to_string();
                let content_length = headers
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                let body_end = header_end + 4 + content_length;
                while request.len() < body_end {
                    let n = stream.read(&mut buf).await.unwrap();
                    assert!(n > 0, "connection closed mid-body");
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
                return String::from_utf8_lossy(&request).to_string();
            }
        });
        (port, handle)
    }

    #[tokio::test]
    async fn test_find_decodes_canned_response() {
        let payload = r#"{"docs":[{"_id":"x"}],"bookmark":"abc","execution_stats":{"execution_time_ms":1.5,"results_returned":1}}"#;
        let (port, server) = respond_once("200 OK", "application/json", payload).await;

        let client = Client::new("http://127.0.0.1", port, "db")
            .with_find_args(FindRequest::new(Selector::eq("status", "active")));
        let response = client.find().await.unwrap();

        assert_eq!(response.docs, vec![serde_json::json!({"_id": "x"})]);
        assert_eq!(response.bookmark.as_deref(), Some("abc"));
        assert_eq!(response.execution_stats.unwrap().execution_time_ms, 1.5);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /db/_find HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"selector":{"status":"active"}}"#));
    }

    #[tokio::test]
    async fn test_create_index_decodes_canned_response() {
        let payload = r#"{"result":"exists","id":"_design/abc","name":"idx1"}"#;
        let (port, server) = respond_once("200 OK", "application/json", payload).await;

        let client = Client::new("http://127.0.0.1", port, "db").with_index_args(
            CreateIndexRequest {
                index: IndexFields {
                    fields: vec!["year".to_string()],
                    partial_filter_selector: None,
                },
                ..CreateIndexRequest::default()
            },
        );
        let response = client.create_index().await.unwrap();

        assert_eq!(response.result, IndexState::Exists);
        assert_eq!(response.id, "_design/abc");
        assert_eq!(response.name, "idx1");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /db/_index HTTP/1.1\r\n"));
        assert!(request.ends_with(r#"{"index":{"fields":["year"]}}"#));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_transport_error() {
        // Grab a free port, then close it so the connect is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = Client::new("http://127.0.0.1", port, "db");
        match client.find().await {
            Err(ClientError::Transport(_)) => {}
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_surfaces_as_decode_error() {
        let (port, server) = respond_once("200 OK", "text/html", "<html>oops</html>").await;

        let client = Client::new("http://127.0.0.1", port, "db");
        match client.find().await {
            Err(ClientError::Decode(_)) => {}
            other => panic!("expected decode error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_surfaces_as_server_error() {
        let payload = r#"{"error":"bad_request","reason":"invalid operator"}"#;
        let (port, server) = respond_once("400 Bad Request", "application/json", payload).await;

        let client = Client::new("http://127.0.0.1", port, "db");
        match client.find().await {
            Err(ClientError::Server { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("invalid operator"));
            }
            other => panic!("expected server error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_allow_error_bodies_decodes_anyway() {
        let payload = r#"{"error":"bad_request","reason":"invalid operator"}"#;
        let (port, server) = respond_once("400 Bad Request", "application/json", payload).await;

        let client = Client::new("http://127.0.0.1", port, "db").allow_error_bodies();
        // The error body decodes as an (empty) result, exactly like clients
        // that never inspected status codes used to see it.
        let response = client.find().await.unwrap();
        assert!(response.docs.is_empty());
        assert!(response.bookmark.is_none());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_from_config_respects_status_policy() {
        let payload = r#"{"docs":[]}"#;
        let (port, server) = respond_once("500 Internal Server Error", "application/json", payload).await;

        let config = ClientConfig {
            host: "http://127.0.0.1".to_string(),
            port,
            database: "db".to_string(),
            check_status: false,
        };
        let response = Client::from_config(&config).find().await.unwrap();
        assert!(response.docs.is_empty());
        server.await.unwrap();
    }
}
