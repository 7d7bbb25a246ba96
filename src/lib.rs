//! # Book of Abstracts
//!
//! 从会议摘要表格（xlsx）生成一本可用 LuaLaTeX 编译的摘要集
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有网络客户端，只暴露下载能力
//! - `HttpFetcher` - 唯一的 reqwest Client owner，流式写盘
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条记录或纯数据
//! - `record_extractor` / `author_parser` - 表格行 → 记录
//! - `filename` / `pdf_store` - 缓存命名、本地查找、PDF 校验
//! - `tex_builder` / `author_index` - 文档生成
//! - `SkipWriter` - 写跳过报告能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整解析流程
//! - `RecordCtx` - 上下文封装（行号 + 候选序号 + 分区）
//! - `ResolveFlow` - 流程编排（缓存 → 下载 → 本地 → 校验）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 构建整本摘要集
//! - `orchestrator/record_processor` - 单条记录处理与跳过
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpFetcher, PdfFetcher};
pub use models::{AbstractRecord, MemorySheet, PdfSource, ResolvedRecord, SheetSource, XlsxSheet};
pub use orchestrator::{App, BookSummary};
pub use workflow::{RecordCtx, ResolveFlow};
