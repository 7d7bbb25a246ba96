//! PDF 解析流程 - 流程层
//!
//! 核心职责：为"一条记录"得到一个本地 PDF
//!
//! 流程顺序：
//! 1. 缓存目录中已有且是 PDF → 直接使用
//! 2. 有 URL → 下载到缓存
//! 3. 没有 URL → 在备用目录查找并复制到缓存
//! 4. 得到的文件必须以 `%PDF-` 开头，否则删除并放弃该记录

use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, ResolveError};
use crate::infrastructure::PdfFetcher;
use crate::models::{AbstractRecord, PdfSource};
use crate::services::filename::filename_for_record;
use crate::services::pdf_store::{copy_into_cache, find_local_pdf, is_pdf_file, remove_file};
use crate::utils::logging::truncate_text;
use crate::workflow::record_ctx::RecordCtx;

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPdf {
    pub path: PathBuf,
    pub source: PdfSource,
}

/// PDF 解析流程
///
/// - 决定何时用缓存、何时下载、何时查本地
/// - 不持有网络资源，只借用下载器
pub struct ResolveFlow<'a, F: PdfFetcher> {
    config: &'a Config,
    fetcher: &'a F,
    pdf_dir: PathBuf,
}

impl<'a, F: PdfFetcher> ResolveFlow<'a, F> {
    pub fn new(config: &'a Config, fetcher: &'a F) -> Self {
        Self {
            config,
            fetcher,
            pdf_dir: config.pdf_dir(),
        }
    }

    pub async fn run(&self, record: &AbstractRecord, ctx: &RecordCtx) -> AppResult<ResolvedPdf> {
        if self.config.verbose_logging {
            debug!("{} 标题: {}", ctx, truncate_text(&record.title, 60));
        }

        let filename = filename_for_record(record, ctx.candidate_idx, self.config);
        let dest = self.pdf_dir.join(filename);

        // ========== 1: 缓存 ==========
        if dest.is_file() {
            if is_pdf_file(&dest) {
                info!("{} 📄 使用缓存 {}", ctx, dest.display());
                return Ok(ResolvedPdf {
                    path: dest,
                    source: PdfSource::Cache,
                });
            }
            warn!("{} ⚠️ 缓存文件不是 PDF，重新获取: {}", ctx, dest.display());
        }

        // ========== 2/3: 下载或本地 ==========
        let source = match &record.url {
            Some(url) => {
                info!("{} 🔽 下载 {}", ctx, url);
                self.fetcher.fetch(url, &dest).await?;
                PdfSource::Url
            }
            None => match find_local_pdf(record, self.config) {
                Some(local) => {
                    info!("{} 📁 使用本地文件 {}", ctx, local.display());
                    copy_into_cache(&local, &dest).await?;
                    PdfSource::Local
                }
                None => {
                    return Err(ResolveError::NoSource {
                        title: record.title.clone(),
                    }
                    .into())
                }
            },
        };

        // ========== 4: 校验 ==========
        if !is_pdf_file(&dest) {
            remove_file(&dest).await?;
            return Err(ResolveError::NotPdf {
                path: dest.display().to_string(),
            }
            .into());
        }

        info!("{} ✓ 来源={} → {}", ctx, source, dest.display());
        Ok(ResolvedPdf { path: dest, source })
    }
}
