//! 跳过记录写入服务 - 业务能力层
//!
//! 只负责"把被丢弃的记录追加到报告文件"，不关心流程

use crate::error::FileError;
use crate::models::AbstractRecord;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 跳过记录写入服务
///
/// 每条被丢弃的记录一行：行号、分区、标题、原因。
/// 文件头由 `utils::logging::init_log_file` 在运行开始时写入。
pub struct SkipWriter {
    path: PathBuf,
}

impl SkipWriter {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条跳过记录
    pub async fn write(&self, record: &AbstractRecord, reason: &str) -> Result<(), FileError> {
        debug!(
            "写入跳过记录: 行 {} | 分区 {} | 原因: {}",
            record.source_row, record.area, reason
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| FileError::write(&self.path, e))?;

        let line = format!(
            "行 {} | 分区 {} | 标题: {} | 原因: {}\n",
            record.source_row,
            record.area,
            record.title.replace(['\r', '\n'], " "),
            reason
        );

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| FileError::write(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| FileError::write(&self.path, e))?;
        Ok(())
    }
}
