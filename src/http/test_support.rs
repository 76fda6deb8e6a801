use std::collections::BTreeMap;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::args::{PositiveUsize, parse_url};
use crate::config::RunConfig;
use crate::error::AppResult;

/// Upper bound on request head size read by the mock server.
const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Serves every request after `delay` with `status`, over keep-alive
/// connections.
pub(crate) struct MockServer {
    pub(crate) url: String,
    handle: JoinHandle<()>,
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub(crate) async fn spawn_mock_server(delay: Duration, status: u16) -> AppResult<MockServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_connection(stream, delay, status));
        }
    });

    Ok(MockServer {
        url: format!("http://{}/", addr),
        handle,
    })
}

async fn serve_connection(mut stream: TcpStream, delay: Duration, status: u16) {
    let mut head: Vec<u8> = Vec::with_capacity(1024);
    let mut buffer = [0u8; 1024];
    loop {
        let read = match stream.read(&mut buffer).await {
            Ok(0) | Err(_) => return,
            Ok(read) => read,
        };
        head.extend(buffer.iter().take(read));
        if head.len() > MAX_REQUEST_HEAD {
            return;
        }
        if !head.windows(4).any(|window| window == b"\r\n\r\n") {
            continue;
        }
        head.clear();

        tokio::time::sleep(delay).await;
        let response = format!(
            "HTTP/1.1 {} Mock\r\nContent-Length: 2\r\nConnection: keep-alive\r\n\r\nOK",
            status
        );
        if stream.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

/// Returns a URL on localhost with nothing listening behind it.
pub(crate) async fn closed_port_url() -> AppResult<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}/", addr))
}

pub(crate) fn test_config(
    url: &str,
    concurrency: usize,
    duration: Duration,
) -> AppResult<RunConfig> {
    Ok(RunConfig {
        target_url: parse_url(url)?,
        headers: BTreeMap::new(),
        concurrency: PositiveUsize::try_from(concurrency)?,
        duration,
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(1),
        drain_grace: Duration::from_secs(1),
    })
}

pub(crate) fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: std::future::Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?;
    runtime.block_on(future)
}
