use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::stream::Stream;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;

use crate::config::HttpCfg;
use crate::error::{CoreResult, NewsReporterError};

/// Represents a single Server-Sent-Event line (already split on `\n`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseLine {
    pub line: String,
}

impl SseLine {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }
}

/// A boxed stream of `SseLine` results.
pub type SseStream = Pin<Box<dyn Stream<Item = CoreResult<SseLine>> + Send>>;

type ByteStream = Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>;

const USER_AGENT: &str = "news-reporter/0.1";

/// Thin wrapper around reqwest::Client with defaults and helpers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(cfg: &HttpCfg) -> CoreResult<Self> {
        Self::with_timeout(cfg, cfg.request_timeout_ms)
    }

    /// Same pool settings as `new`, with a different total request timeout.
    pub fn with_timeout(cfg: &HttpCfg, request_timeout_ms: u64) -> CoreResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout(Duration::from_millis(request_timeout_ms));
        if let Some(n) = cfg.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(n);
        }
        let inner = builder
            .build()
            .map_err(|e| NewsReporterError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            user_agent: USER_AGENT.to_string(),
        })
    }

    pub fn new_default() -> CoreResult<Self> {
        Self::new(&HttpCfg::default())
    }

    fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T, headers: &[(&str, &str)]) -> RequestBuilder {
        let mut req = self
            .inner
            .post(url)
            .json(body)
            .header("User-Agent", &self.user_agent);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        req
    }

    async fn send_checked(req: RequestBuilder) -> CoreResult<reqwest::Response> {
        let resp = req.send().await.map_err(|e| {
            tracing::debug!(error = %e, "http send failed");
            NewsReporterError::ProviderUnavailable {
                provider: "http".into(),
                reason: e.to_string(),
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let headers = resp.headers().clone();
            let ra = parse_retry_after(&headers);
            let body = resp.text().await.unwrap_or_default();
            return Err(map_http_error("http", status, ra, &body));
        }
        Ok(resp)
    }

    /// POST JSON and return the raw response body.
    pub async fn post_bytes<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> CoreResult<Vec<u8>> {
        let resp = Self::send_checked(self.post(url, body, headers)).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| NewsReporterError::StreamRead(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// POST JSON and return an SSE (Server-Sent Events) line stream.
    /// Each yielded item is one raw line (trim not applied) from the SSE channel.
    pub async fn post_sse_lines<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> CoreResult<SseStream> {
        let req = self.post(url, body, headers).header("Accept", "text/event-stream");
        let resp = Self::send_checked(req).await?;
        Ok(Box::pin(LineStream::new(Box::pin(resp.bytes_stream()))))
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    if let Some(v) = headers.get("retry-after")
        && let Ok(s) = v.to_str()
        && let Ok(secs) = s.trim().parse::<u64>()
    {
        return Some(secs);
    }
    // HTTP-date forms are ignored.
    None
}

fn map_http_error(provider: &str, status: StatusCode, retry_after: Option<u64>, body: &str) -> NewsReporterError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => NewsReporterError::RateLimited {
            provider: provider.to_string(),
            retry_after,
        },
        s if s.is_server_error() => NewsReporterError::ProviderUnavailable {
            provider: provider.to_string(),
            reason: s.to_string(),
        },
        s => NewsReporterError::ProviderError {
            provider: provider.to_string(),
            code: s.as_u16().to_string(),
            message: truncate(body, 300),
        },
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Internal line splitter over a bytes stream; yields `SseLine`s separated by '\n'.
///
/// Bytes are buffered until a full line is available so that a UTF-8 sequence
/// split across chunk boundaries decodes intact.
struct LineStream {
    inner: ByteStream,
    buf: Vec<u8>,
    finished: bool,
}

impl LineStream {
    fn new(inner: ByteStream) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            finished: false,
        }
    }

    fn take_line(&mut self) -> Option<SseLine> {
        let idx = self.buf.iter().position(|b| *b == b'\n')?;
        let mut raw: Vec<u8> = self.buf.drain(..=idx).collect();
        raw.pop();
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }
        Some(SseLine {
            line: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

impl Stream for LineStream {
    type Item = CoreResult<SseLine>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(line) = self.take_line() {
                return Poll::Ready(Some(Ok(line)));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    self.buf.extend_from_slice(&chunk);
                }
                Poll::Ready(Some(Err(e))) => {
                    self.finished = true;
                    self.buf.clear();
                    return Poll::Ready(Some(Err(NewsReporterError::StreamRead(e.to_string()))));
                }
                Poll::Ready(None) => {
                    self.finished = true;
                    if !self.buf.is_empty() {
                        let mut raw = std::mem::take(&mut self.buf);
                        if raw.last() == Some(&b'\r') {
                            raw.pop();
                        }
                        return Poll::Ready(Some(Ok(SseLine {
                            line: String::from_utf8_lossy(&raw).into_owned(),
                        })));
                    }
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use httpmock::Method::POST;
    use crate::stream::{parse_frame_line, reduce, EventFrames};
    use httpmock::MockServer;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn collect_lines(chunks: Vec<&'static [u8]>) -> Vec<String> {
        let inner = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, reqwest::Error>(bytes::Bytes::from_static(c))),
        );
        LineStream::new(Box::pin(inner))
            .map(|r| r.expect("line").line)
            .collect()
            .await
    }

    #[tokio::test]
    async fn line_stream_splits_across_chunks() {
        let lines = collect_lines(vec![b"data: a\r\n", b"\ndata: ", b"b\ndata: c"]).await;
        assert_eq!(lines, vec!["data: a", "", "data: b", "data: c"]);
    }

    #[tokio::test]
    async fn line_stream_keeps_multibyte_chars_split_across_chunks() {
        // "日本" is e6 97 a5 e6 9c ac; split inside the first character.
        let lines = collect_lines(vec![b"data: \xe6\x97", b"\xa5\xe6\x9c\xac\n"]).await;
        assert_eq!(lines, vec!["data: 日本"]);
    }

    #[tokio::test]
    async fn post_sse_lines_success() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/responses")
                .header("accept", "text/event-stream");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body("event: x\ndata: {\"a\":1}\n\ndata: [DONE]\n\n");
        });

        let client = HttpClient::new_default().unwrap();
        let stream = client
            .post_sse_lines(&format!("{}/responses", server.base_url()), &json!({"q":"hi"}), &[])
            .await
            .unwrap();
        let lines: Vec<String> = stream.map(|r| r.unwrap().line).collect().await;
        assert_eq!(lines, vec!["event: x", "data: {\"a\":1}", "", "data: [DONE]", ""]);
        m.assert();
    }

    #[tokio::test]
    async fn post_sse_lines_429_maps_to_rate_limited() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/responses");
            then.status(429).header("Retry-After", "3").body("slow down");
        });
        let client = HttpClient::new_default().expect("client");
        let err = match client
            .post_sse_lines(&format!("{}/responses", server.base_url()), &json!({}), &[])
            .await
        {
            Ok(_) => panic!("expected error"),
            Err(e) => e,
        };
        match err {
            NewsReporterError::RateLimited { provider, retry_after } => {
                assert_eq!(provider, "http");
                assert_eq!(retry_after, Some(3));
            }
            other => panic!("expected RateLimited, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn post_bytes_503_maps_to_unavailable() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(POST).path("/audio/speech");
            then.status(503).body("oops");
        });
        let client = HttpClient::new_default().expect("client");
        let err = client
            .post_bytes(&format!("{}/audio/speech", server.base_url()), &json!({}), &[])
            .await
            .unwrap_err();
        match err {
            NewsReporterError::ProviderUnavailable { reason, .. } => assert!(reason.starts_with("503")),
            other => panic!("expected ProviderUnavailable, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn post_bytes_400_truncates_body() {
        let server = MockServer::start();
        let big = "x".repeat(1000);
        let _m = server.mock(|when, then| {
            when.method(POST).path("/audio/speech");
            then.status(400).body(big.clone());
        });
        let client = HttpClient::new_default().expect("client");
        let err = client
            .post_bytes(&format!("{}/audio/speech", server.base_url()), &json!({}), &[])
            .await
            .unwrap_err();
        match err {
            NewsReporterError::ProviderError { code, message, .. } => {
                assert_eq!(code, "400");
                assert!(message.ends_with("..."));
                assert_eq!(message.len(), 303);
            }
            other => panic!("expected ProviderError, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn post_bytes_returns_body() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/audio/speech")
                .header("authorization", "Bearer k");
            then.status(200).body(vec![1u8, 2, 3]);
        });
        let client = HttpClient::new_default().expect("client");
        let body = client
            .post_bytes(
                &format!("{}/audio/speech", server.base_url()),
                &json!({"input": "hi"}),
                &[("Authorization", "Bearer k")],
            )
            .await
            .unwrap();
        assert_eq!(body, vec![1, 2, 3]);
        m.assert();
    }

    #[tokio::test]
    async fn network_error_maps_to_unavailable() {
        let client = HttpClient::new_default().expect("client");
        let err = client
            .post_bytes("http://127.0.0.1:9/audio/speech", &json!({}), &[])
            .await
            .unwrap_err();
        match err {
            NewsReporterError::ProviderUnavailable { reason, .. } => assert!(!reason.is_empty()),
            other => panic!("expected ProviderUnavailable, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn line_stream_strips_cr_from_unterminated_tail() {
        let lines = collect_lines(vec![&b"data: {}\r\ndata: [DONE]\r"[..]]).await;
        assert_eq!(lines, vec!["data: {}", "data: [DONE]"]);
        let last = parse_frame_line(&lines[1]).expect("data frame");
        assert!(last.is_terminal());
    }

    /// Serve one request: answer 200 with a `Content-Length` larger than the
    /// body actually written, then close the connection.
    async fn serve_truncated_body(body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain the request so closing does not reset the connection early.
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&req);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if req.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let head = "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: 1000\r\n\r\n";
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.flush().await.unwrap();
        });
        format!("http://{addr}/responses")
    }

    #[tokio::test]
    async fn truncated_body_aborts_reduction_with_stream_read() {
        let url = serve_truncated_body(
            b"data: {\"type\":\"response.output_text.delta\",\"delta\":\"partial\"}\n\n",
        )
        .await;
        let client = HttpClient::new_default().expect("client");
        let lines = client
            .post_sse_lines(&url, &json!({"q": "hi"}), &[])
            .await
            .expect("headers arrive intact");
        let err = reduce("q", EventFrames::new(lines)).await.unwrap_err();
        assert!(matches!(err, NewsReporterError::StreamRead(_)), "got: {:?}", err);
    }
}
