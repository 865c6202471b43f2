use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Error body the API returns alongside a non-2xx status.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Everything that can go wrong between issuing a request and holding a parsed body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request path {path:?}: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text shown to the user in place of the view's content.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidUrl { path, .. } => format!("Invalid request path: {path}"),
            ApiError::Transport(e) => format!("Network error: {e}"),
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status {
                status,
                message: None,
            } => format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string(),
            ApiError::Decode(e) => format!("Unexpected response from server: {e}"),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Thin JSON client bound to a single base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: Url) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> ApiResult<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidUrl {
                path: path.to_string(),
                source,
            })
    }

    /// GET `path` with query parameters and return the parsed JSON body.
    pub async fn get<Q>(&self, path: &str, query: &Q) -> ApiResult<Value>
    where
        Q: Serialize + ?Sized,
    {
        self.get_as(path, query).await
    }

    /// POST `body` as JSON to `path` and return the parsed JSON body.
    pub async fn post<B>(&self, path: &str, body: &B) -> ApiResult<Value>
    where
        B: Serialize + ?Sized,
    {
        self.post_as(path, body).await
    }

    pub async fn get_as<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!("GET {url}");
        let response = self.client.get(url).query(query).send().await?;
        Self::read_json(response).await
    }

    pub async fn post_as<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!("POST {url}");
        let response = self.client.post(url).json(body).send().await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .map(|b| b.message);
            warn!("request failed with {status}: {message:?}");
            return Err(ApiError::Status { status, message });
        }

        // An empty 2xx body reads as JSON null.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response and hand back the raw request that was received.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(end) = find_header_end(&request) {
                    let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        let url = Url::parse(&format!("http://{addr}")).unwrap();
        (url, handle)
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n")
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let client = HttpClient::new(Url::parse("http://localhost:5000").unwrap()).unwrap();
        assert_eq!(client.endpoint("/").unwrap().as_str(), "http://localhost:5000/");
        assert_eq!(client.endpoint("/42").unwrap().as_str(), "http://localhost:5000/42");

        let prefixed = HttpClient::new(Url::parse("http://api.test/dishes").unwrap()).unwrap();
        assert_eq!(prefixed.endpoint("/").unwrap().as_str(), "http://api.test/dishes/");
        assert_eq!(prefixed.endpoint("/42").unwrap().as_str(), "http://api.test/dishes/42");
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: Some("Dish not found".to_string()),
        };
        assert_eq!(err.user_message(), "Dish not found");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

        let err = ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(err.user_message(), "HTTP 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_get_parses_json_and_sends_query() {
        let (url, server) = serve_once("200 OK", r#"[{"id": 1, "name": "Kheer"}]"#).await;
        let client = HttpClient::new(url).unwrap();

        let value = client.get("/", &[("page", "2")]).await.unwrap();
        assert_eq!(value[0]["name"], "Kheer");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /?page=2 HTTP/1.1"));
        assert!(request.to_lowercase().contains("accept: application/json"));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let (url, server) = serve_once("404 Not Found", r#"{"message": "Dish 99 does not exist"}"#).await;
        let client = HttpClient::new(url).unwrap();

        let err = client.get("/99", &()).await.unwrap_err();
        match &err {
            ApiError::Status { status, message } => {
                assert_eq!(*status, StatusCode::NOT_FOUND);
                assert_eq!(message.as_deref(), Some("Dish 99 does not exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "Dish 99 does not exist");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_error_without_message_field() {
        let (url, server) = serve_once("503 Service Unavailable", "upstream down").await;
        let client = HttpClient::new(url).unwrap();

        let err = client.get("/", &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { message: None, .. }));
        assert_eq!(err.user_message(), "HTTP 503 Service Unavailable");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let (url, server) = serve_once("200 OK", "<html>").await;
        let client = HttpClient::new(url).unwrap();

        let err = client.get("/", &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let (url, server) = serve_once("201 Created", r#"{"ok": true}"#).await;
        let client = HttpClient::new(url).unwrap();

        let value = client
            .post("/", &serde_json::json!({"name": "Pongal"}))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST / HTTP/1.1"));
        assert!(request.ends_with(r#"{"name":"Pongal"}"#));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(Url::parse(&format!("http://{addr}")).unwrap()).unwrap();
        let err = client.get("/", &()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.user_message().starts_with("Network error"));
    }
}
