use crate::config::Config;
use crate::error::FileError;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::path::Path;
use tracing::info;

/// 初始化跳过记录报告文件，写入带时间的文件头
pub fn init_log_file(log_file_path: &str) -> Result<(), FileError> {
    let log_header = format!(
        "{}\n跳过记录报告 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    let path = Path::new(log_file_path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| FileError::create_dir(parent, e))?;
    }
    std::fs::write(path, log_header).map_err(|e| FileError::write(path, e))
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 摘要集生成");
    info!("📊 表格: {}", config.xlsx_path.display());
    info!("📁 PDF 目录: {}", config.pdf_dir().display());
    if let Some(dir) = &config.fallback_dir {
        info!("📁 备用目录: {}", dir.display());
    }
    info!("📄 输出: {}", config.out_tex.display());
    info!("{}", "=".repeat(60));
}

/// 记录候选记录加载信息
///
/// # 参数
/// - `total`: 候选记录总数
/// - `per_area`: 每个分区的记录数（按分区顺序，不含空分区）
pub fn log_records_loaded(total: usize, per_area: &[(&str, usize)]) {
    info!("✓ 找到 {} 条候选记录", total);
    for (area, count) in per_area {
        info!("  📋 {}: {}", area, count);
    }
}

/// 最终统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FinalStats {
    pub candidates: usize,
    pub from_cache: usize,
    pub downloaded: usize,
    pub local: usize,
    pub skipped: usize,
}

impl FinalStats {
    pub fn resolved(&self) -> usize {
        self.from_cache + self.downloaded + self.local
    }
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &FinalStats, out_tex: &Path, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.resolved(), stats.candidates);
    info!(
        "   缓存 {} | 下载 {} | 本地 {}",
        stats.from_cache, stats.downloaded, stats.local
    );
    info!("❌ 跳过: {}", stats.skipped);
    info!("{}", "=".repeat(60));
    info!("📄 已生成: {}", out_tex.display());
    info!(
        "💡 用 lualatex 编译两次以解析页码引用: lualatex {}",
        out_tex
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    if stats.skipped > 0 {
        info!("\n跳过记录已保存至: {}", log_file_path);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("Überlänge", 4), "Über...");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/skipped.txt");
        std::fs::create_dir_all(dir.path().join("logs")).unwrap();
        std::fs::write(&path, "old content").unwrap();

        init_log_file(path.to_str().unwrap()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&"=".repeat(60)));
        assert!(content.contains("跳过记录报告"));
        assert!(!content.contains("old content"));
    }
}
