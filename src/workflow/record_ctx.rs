//! 记录处理上下文
//!
//! 封装"我正在处理表格第几行、第几个候选、属于哪个分区"这一信息

use std::fmt::Display;

/// 记录处理上下文
#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 表格行号（从1开始）
    pub source_row: u32,

    /// 候选序号（按 分区 → 行 排序后从1开始），决定缓存文件名
    pub candidate_idx: usize,

    /// 分区
    pub area: String,
}

impl RecordCtx {
    pub fn new(source_row: u32, candidate_idx: usize, area: impl Into<String>) -> Self {
        Self {
            source_row,
            candidate_idx,
            area: area.into(),
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[行 {} #{:04} {}]",
            self.source_row, self.candidate_idx, self.area
        )
    }
}
