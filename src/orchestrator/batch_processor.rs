//! 摘要集构建器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的构建。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：初始化跳过报告、创建 HTTP 下载器
//! 2. **读取表格**：提取候选记录并按 分区顺序 → 行号 排序
//! 3. **逐条解析**：顺序处理每条记录，失败的记录只跳过不中断
//! 4. **编号**：成功的记录按最终顺序获得连续编号和锚点
//! 5. **生成文档**：组装并写出 tex 文件
//! 6. **全局统计**：汇总缓存/下载/本地/跳过数量
//!
//! 没有任何记录成功时直接报错，不写 tex 文件。

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{HttpFetcher, PdfFetcher};
use crate::models::{AbstractRecord, PdfSource, ResolvedRecord, SheetSource, XlsxSheet};
use crate::orchestrator::record_processor;
use crate::services::{extract_records, write_tex, SkipWriter, TexBuilder};
use crate::utils::logging::{
    init_log_file, log_records_loaded, log_startup, print_final_stats, FinalStats,
};
use crate::workflow::{RecordCtx, ResolveFlow};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

/// 一次构建的结果
#[derive(Debug, Clone)]
pub struct BookSummary {
    pub stats: FinalStats,
    /// 按文档顺序排列的成功记录
    pub records: Vec<ResolvedRecord>,
    pub out_tex: PathBuf,
}

/// 应用主结构
pub struct App<F: PdfFetcher = HttpFetcher> {
    config: Config,
    fetcher: F,
    skip_writer: SkipWriter,
}

impl App<HttpFetcher> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化跳过报告
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: PdfFetcher> App<F> {
    /// 使用指定的下载器创建应用
    pub fn with_fetcher(config: Config, fetcher: F) -> Self {
        let skip_writer = SkipWriter::with_path(&config.output_log_file);
        Self {
            config,
            fetcher,
            skip_writer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BookSummary> {
        info!("\n📁 正在读取表格 {} ...", self.config.xlsx_path.display());
        let sheet = XlsxSheet::open(&self.config.xlsx_path, self.config.sheet_name.as_deref())
            .with_context(|| format!("无法读取表格 {}", self.config.xlsx_path.display()))?;
        info!("✓ 工作表: {}", sheet.name());

        self.build_from_sheet(&sheet).await
    }

    /// 从已经打开的表格构建摘要集
    pub async fn build_from_sheet(&self, sheet: &impl SheetSource) -> Result<BookSummary> {
        let candidates = self.order_candidates(extract_records(sheet, &self.config));
        log_records_loaded(candidates.len(), &self.area_counts(&candidates));

        let mut stats = FinalStats {
            candidates: candidates.len(),
            ..Default::default()
        };
        let flow = ResolveFlow::new(&self.config, &self.fetcher);
        let mut resolved: Vec<ResolvedRecord> = Vec::with_capacity(candidates.len());

        for (index, record) in candidates.into_iter().enumerate() {
            let ctx = RecordCtx::new(record.source_row, index + 1, record.area.as_str());

            match record_processor::process_record(&flow, &self.skip_writer, &record, &ctx).await {
                Some(pdf) => {
                    match pdf.source {
                        PdfSource::Cache => stats.from_cache += 1,
                        PdfSource::Url => stats.downloaded += 1,
                        PdfSource::Local => stats.local += 1,
                    }
                    let seq = resolved.len() + 1;
                    resolved.push(ResolvedRecord::new(record, pdf.path, pdf.source, seq));
                }
                None => stats.skipped += 1,
            }
        }

        if resolved.is_empty() {
            warn!("⚠️ 没有任何记录得到 PDF，不生成 tex");
            return Err(AppError::NoRecords {
                candidates: stats.candidates,
            }
            .into());
        }

        let tex = TexBuilder::new(&self.config).build(&resolved);
        write_tex(&self.config.out_tex, &tex)
            .await
            .with_context(|| format!("无法写出 {}", self.config.out_tex.display()))?;

        print_final_stats(&stats, &self.config.out_tex, &self.config.output_log_file);

        Ok(BookSummary {
            stats,
            records: resolved,
            out_tex: self.config.out_tex.clone(),
        })
    }

    /// 按分区顺序分桶，桶内保持行号顺序
    fn order_candidates(&self, mut records: Vec<AbstractRecord>) -> Vec<AbstractRecord> {
        records.sort_by_key(|r| self.config.area_position(&r.area));
        records
    }

    fn area_counts<'c>(&'c self, records: &[AbstractRecord]) -> Vec<(&'c str, usize)> {
        self.config
            .areas
            .iter()
            .map(|area| {
                let count = records.iter().filter(|r| &r.area == area).count();
                (area.as_str(), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}
