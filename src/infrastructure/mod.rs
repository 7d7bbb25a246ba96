//! 基础设施层
//!
//! 持有网络客户端，只暴露"把 URL 下载到文件"的能力，不认识记录和分区。

pub mod http_fetcher;

pub use http_fetcher::{HttpFetcher, PdfFetcher};
