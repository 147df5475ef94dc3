// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::time::Duration;

use crate::SinkError;
use crate::sink::Sink;

/// A sink that pushes each rendered line to a webhook endpoint as a JSON
/// payload (`{"text": "..."}`).
///
/// Every request honors the bounded timeout configured at construction. A
/// request failure, a timeout, or a non-success status is a per-sink error;
/// the router treats it as non-fatal for the overall dispatch.
#[derive(Debug)]
pub struct WebhookSink {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl WebhookSink {
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<WebhookSink, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(WebhookSink {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Sink for WebhookSink {
    fn write(&self, formatted: &str) -> Result<(), SinkError> {
        let payload = serde_json::json!({ "text": formatted });
        let response = self.client.post(&self.endpoint).json(&payload).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::RemoteStatus(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;

    use super::*;

    /// Accepts one HTTP request, returns its raw bytes, and answers with the
    /// given status line.
    fn one_shot_server(status_line: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}/hook", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut data = Vec::new();
            let mut buf = [0u8; 1024];
            // Headers and body may arrive in separate reads.
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                data.extend_from_slice(&buf[..n]);
                if let Some(pos) = find_subsequence(&data, b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&data[..pos]).to_lowercase();
                    let content_length = headers
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if data.len() >= pos + 4 + content_length {
                        break;
                    }
                }
            }
            stream
                .write_all(
                    format!("{status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                        .as_bytes(),
                )
                .unwrap();
            String::from_utf8_lossy(&data).into_owned()
        });
        (endpoint, handle)
    }

    fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    #[test]
    fn test_posts_line_as_json_payload() {
        let (endpoint, server) = one_shot_server("HTTP/1.1 200 OK");
        let sink = WebhookSink::new(endpoint.clone(), Duration::from_secs(2)).unwrap();
        assert_eq!(sink.endpoint(), endpoint);

        sink.write("[2024-06-01 08:00:00] slack.CRITICAL: disk full").unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /hook"));
        assert!(request.contains(r#"{"text":"[2024-06-01 08:00:00] slack.CRITICAL: disk full"}"#));
    }

    #[test]
    fn test_non_success_status_is_an_error() {
        let (endpoint, server) = one_shot_server("HTTP/1.1 500 Internal Server Error");
        let sink = WebhookSink::new(endpoint, Duration::from_secs(2)).unwrap();

        let err = sink.write("boom").unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, SinkError::RemoteStatus(500)));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        // Bind then drop to get a port with no listener.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let sink = WebhookSink::new(
            format!("http://127.0.0.1:{port}/hook"),
            Duration::from_millis(500),
        )
        .unwrap();

        assert!(matches!(sink.write("boom"), Err(SinkError::Remote(_))));
    }
}
