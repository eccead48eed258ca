use cube_report_core::{reshape, FetchCommand, FetchError, FetchResult};
use reqwest::Client;

/// A finished fetch, ready to hand back to the controller.
#[derive(Debug)]
pub struct FetchOutcome {
    pub command: FetchCommand,
    pub result: Result<FetchResult, FetchError>,
}

/// Runs cube GET requests over HTTP.
#[derive(Debug, Clone)]
pub struct CubeClient {
    http: Client,
}

impl CubeClient {
    pub fn new() -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("cube-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { http })
    }

    /// One GET, any non-2xx status is an error, the body goes through the
    /// core reshaping step.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        reshape(&body)
    }

    pub async fn execute(&self, command: FetchCommand) -> FetchOutcome {
        tracing::debug!(url = %command.url, slot = command.slot.as_str(), "GET");
        let result = self.fetch(&command.url).await;
        FetchOutcome { command, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_report_core::Slot;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    /// Serves one canned HTTP response and returns the request line it saw.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> std::io::Result<(String, tokio::task::JoinHandle<String>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);

        let handle = tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return String::new();
            };
            let mut buffer = vec![0_u8; 4096];
            let read = socket.read(&mut buffer).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buffer[..read]).to_string();

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.ok();
            socket.shutdown().await.ok();

            request.lines().next().unwrap_or_default().to_string()
        });

        Ok((base, handle))
    }

    #[tokio::test]
    async fn fetches_and_reshapes() -> TestResult {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"response":{"p":{"2020-01":{"c":5}},"male":{"c":3}}}"#,
        )
        .await?;

        let client = CubeClient::new()?;
        let result = client.fetch(&format!("{base}/group_by/sex?weapon=knife")).await?;

        assert_eq!(result.time_series[&1_577_836_800_000]["c"], 5.0);
        assert_eq!(result.counter_series["male"]["c"], 3.0);
        assert_eq!(
            server.await?,
            "GET /group_by/sex?weapon=knife HTTP/1.1"
        );
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> TestResult {
        let (base, _server) = serve_once("503 Service Unavailable", "{}").await?;
        let result = CubeClient::new()?.fetch(&format!("{base}/")).await;
        assert_eq!(result, Err(FetchError::Status { status: 503 }));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() -> TestResult {
        let (base, _server) = serve_once("200 OK", "not json").await?;
        let result = CubeClient::new()?.fetch(&format!("{base}/")).await;
        assert!(matches!(result, Err(FetchError::Parse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() -> TestResult {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        drop(listener);

        let command = FetchCommand {
            slot: Slot::Primary,
            generation: 7,
            url: format!("http://{address}/"),
        };
        let outcome = CubeClient::new()?.execute(command.clone()).await;
        assert_eq!(outcome.command, command);
        assert!(matches!(outcome.result, Err(FetchError::Network(_))));
        Ok(())
    }
}
