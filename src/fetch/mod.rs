// src/fetch/mod.rs

use std::future::Future;
use std::time::Duration;

use reqwest::{header, Client};
use tracing::{debug, instrument};
use url::Url;

use crate::error::FetchError;

/// Where a fetch cycle gets its raw CSV text from.
pub trait Source: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// GETs the published sheet export over HTTP with caching disabled.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Client with a per-request timeout, so a stalled server cannot hold the cycle forever.
    pub fn with_timeout(url: Url, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, url))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Source for HttpSource {
    #[instrument(level = "debug", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(self.url.clone())
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        debug!(bytes = body.len(), "fetched sheet export");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP/1.0 response on a local port.
    async fn serve_once(response: &'static str) -> Result<Url> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Ok((mut sock, _)) = listener.accept().await {
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            }
        });
        Ok(Url::parse(&format!("http://{addr}/export?format=csv"))?)
    }

    #[tokio::test]
    async fn returns_body_on_success() -> Result<()> {
        let url = serve_once(
            "HTTP/1.0 200 OK\r\nContent-Type: text/csv\r\nContent-Length: 15\r\n\r\nNama Anak\nAli\n\n",
        )
        .await?;
        let body = HttpSource::with_timeout(url, Duration::from_secs(5))?.fetch().await?;
        assert_eq!(body, "Nama Anak\nAli\n\n");
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() -> Result<()> {
        let url = serve_once("HTTP/1.0 404 Not Found\r\nContent-Length: 0\r\n\r\n").await?;
        let err = HttpSource::with_timeout(url, Duration::from_secs(5))?
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(404)), "{err}");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_host_is_transport() -> Result<()> {
        // Bind then drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
        let url = Url::parse(&format!("http://{addr}/"))?;
        let err = HttpSource::with_timeout(url, Duration::from_secs(5))?
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "{err}");
        Ok(())
    }
}
