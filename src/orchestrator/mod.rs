//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 摘要集构建器
//! - 管理应用生命周期（初始化、运行）
//! - 读取表格并排序候选记录（Vec<AbstractRecord>）
//! - 持有 HTTP 下载器
//! - 编号、生成并写出 tex
//! - 输出全局统计信息
//!
//! ### `record_processor` - 单条记录处理器
//! - 调用 ResolveFlow
//! - 失败时写跳过报告，不中断运行
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<AbstractRecord>)
//!     ↓
//! record_processor (处理单个 AbstractRecord)
//!     ↓
//! workflow::ResolveFlow (缓存 → 下载 → 本地 → 校验)
//!     ↓
//! services (能力层：文件名 / 本地查找 / tex 生成 / 跳过报告)
//!     ↓
//! infrastructure (基础设施：HttpFetcher)
//! ```

pub mod batch_processor;
pub mod record_processor;

// 重新导出主要类型
pub use batch_processor::{App, BookSummary};
pub use record_processor::process_record;
