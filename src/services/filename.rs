//! 本地文件命名
//!
//! 缓存文件名只由记录内容和候选序号决定，重复运行时能命中缓存。

use crate::config::Config;
use crate::models::AbstractRecord;
use regex::Regex;
use reqwest::Url;
use std::path::Path;
use std::sync::OnceLock;

const FALLBACK_NAME: &str = "document";

fn forbidden_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("forbidden chars regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn strip_dots_spaces(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '.')
}

/// 清理文件名：去掉非法字符，合并空白，去掉首尾的点和空格，按字符截断
///
/// 对已经清理过的名字再次调用结果不变。
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    let name = forbidden_re().replace_all(name, "");
    let name = whitespace_re().replace_all(name.trim(), " ");
    let name = strip_dots_spaces(&name);

    let truncated: String = name.chars().take(max_len).collect();
    let truncated = strip_dots_spaces(&truncated);
    if truncated.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        truncated.to_string()
    }
}

/// 由 URL 得到文件名：`<stem>_<NNNN>.pdf`，URL 不以 `.pdf` 结尾时 stem 为 `file`
///
/// 最后一段路径先做百分号解码；`%` 和 `#` 在 tex 中有特殊含义，不出现在文件名里。
pub fn filename_from_url(url: &str, idx: usize, max_len: usize) -> String {
    let name = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(decode_segment))
        })
        .filter(|n| !n.is_empty() && n.to_lowercase().ends_with(".pdf"))
        .unwrap_or_else(|| "file.pdf".to_string());

    let stem = Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let stem = stem.replace(['%', '#'], "");
    sanitize_filename(&format!("{stem}_{idx:04}.pdf"), max_len)
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// 记录在缓存目录中的文件名
///
/// - 有 URL：由 URL 得到
/// - 没有 URL：URL 单元格里的文件名，其次是标题，最后是 `local_<NNNN>.pdf`
///
/// 占位标题视为没有标题，否则所有无标题的记录会共用同一个缓存文件。
pub fn filename_for_record(record: &AbstractRecord, idx: usize, config: &Config) -> String {
    let max_len = config.max_filename_len;
    if let Some(url) = &record.url {
        return filename_from_url(url, idx, max_len);
    }

    let hint = record.url_cell_text.trim();
    if !hint.is_empty() {
        if let Some(name) = Path::new(hint).file_name().and_then(|n| n.to_str()) {
            let name = if name.to_lowercase().ends_with(".pdf") {
                name.to_string()
            } else {
                format!("{name}.pdf")
            };
            return sanitize_filename(&name, max_len);
        }
    }

    let title = record.title.trim();
    if !title.is_empty() && title != config.placeholder_title.trim() {
        return format!("{}.pdf", sanitize_filename(title, max_len));
    }

    format!("local_{idx:04}.pdf")
}
