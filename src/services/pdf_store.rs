//! 本地 PDF 文件 - 业务能力层
//!
//! 负责 PDF 签名校验、备用目录查找、复制和清理，不关心流程顺序。

use crate::config::Config;
use crate::error::FileError;
use crate::models::AbstractRecord;
use crate::services::filename::sanitize_filename;
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// PDF 文件头
pub const PDF_MAGIC: &[u8; 5] = b"%PDF-";

/// 标题中用于模糊匹配的最短单词长度
const MIN_TOKEN_CHARS: usize = 6;

/// 文件前5个字节是否为 `%PDF-`，读不到5个字节或打不开都视为否
pub fn is_pdf_file(path: &Path) -> bool {
    let mut header = [0u8; 5];
    match File::open(path) {
        Ok(mut file) => file.read_exact(&mut header).is_ok() && &header == PDF_MAGIC,
        Err(_) => false,
    }
}

/// 在备用目录中为没有 URL 的记录寻找 PDF
///
/// 依次尝试：URL 单元格中的文件名、`<清理后的标题>.pdf`、
/// 文件名包含标题中第一个长单词的 PDF。第一个存在且通过签名校验的候选胜出。
pub fn find_local_pdf(record: &AbstractRecord, config: &Config) -> Option<PathBuf> {
    let base = config.fallback_dir.as_ref()?;
    if !base.is_dir() {
        warn!("备用目录不存在: {}", base.display());
        return None;
    }

    local_candidates(record, base, config)
        .into_iter()
        .find(|p| p.is_file() && is_pdf_file(p))
}

fn local_candidates(record: &AbstractRecord, base: &Path, config: &Config) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if config.use_url_cell_as_local_filename {
        let hint = record.url_cell_text.trim();
        if !hint.is_empty()
            && hint.contains('.')
            && !hint.contains("http://")
            && !hint.contains("https://")
        {
            candidates.push(base.join(hint));
        }
    }

    // 占位标题不参与查找
    let title = record.title.trim();
    if !title.is_empty() && title != config.placeholder_title.trim() {
        candidates.push(base.join(format!(
            "{}.pdf",
            sanitize_filename(title, config.max_filename_len)
        )));

        if let Some(token) = first_long_token(title) {
            if let Some(hit) = glob_first(base, token) {
                candidates.push(hit);
            }
        }
    }

    debug!("行 {} 的本地候选: {:?}", record.source_row, candidates);
    candidates
}

fn word_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W+").expect("word split regex"))
}

/// 标题中第一个至少6个字符的单词
fn first_long_token(title: &str) -> Option<&str> {
    word_split_re()
        .split(title)
        .find(|t| t.chars().count() >= MIN_TOKEN_CHARS)
}

/// `<base>/*<token>*.pdf` 的第一个匹配（按文件名排序）
fn glob_first(base: &Path, token: &str) -> Option<PathBuf> {
    let pattern = format!(
        "{}/*{}*.pdf",
        glob::Pattern::escape(&base.to_string_lossy()),
        token
    );
    match glob::glob(&pattern) {
        Ok(paths) => paths.filter_map(Result::ok).next(),
        Err(e) => {
            warn!("无效的查找模式 {}: {}", pattern, e);
            None
        }
    }
}

/// 复制到缓存目录，按需创建父目录
pub async fn copy_into_cache(from: &Path, to: &Path) -> Result<(), FileError> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::create_dir(parent, e))?;
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|e| FileError::CopyFailed {
            from: from.display().to_string(),
            to: to.display().to_string(),
            source: e,
        })?;
    Ok(())
}

/// 删除文件，文件本来不存在时不算错误
pub async fn remove_file(path: &Path) -> Result<(), FileError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FileError::DeleteFailed {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
