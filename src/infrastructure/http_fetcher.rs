//! HTTP 下载器 - 基础设施层
//!
//! 持有唯一的 `reqwest::Client`，流式写盘，失败时不留下半个文件。

use crate::config::Config;
use crate::error::FetchError;
use futures::StreamExt;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// 下载能力
///
/// 成功时 `dest` 是完整的响应内容；失败时 `dest` 不存在。
pub trait PdfFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> impl Future<Output = Result<(), FetchError>> + Send;
}

/// 基于 reqwest 的下载器
pub struct HttpFetcher {
    client: reqwest::Client,
    chunk_size: usize,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            chunk_size: config.chunk_size.max(1),
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let request_err = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let write_err = |source| FetchError::Write {
            path: dest.display().to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let file = tokio::fs::File::create(dest).await.map_err(write_err)?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_err)?;
            writer.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        writer.flush().await.map_err(write_err)?;

        Ok(written)
    }
}

impl PdfFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        match self.download(url, dest).await {
            Ok(bytes) => {
                debug!("下载完成 {} → {} ({} 字节)", url, dest.display(), bytes);
                Ok(())
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(dest).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        debug!("清理未完成的下载失败 {}: {}", dest.display(), rm);
                    }
                }
                Err(e)
            }
        }
    }
}
