//! 作者姓名解析 - 业务能力层
//!
//! 作者单元格是逗号分隔的姓名列表，主要作者用标记字符（默认 `*`）标出。

use regex::Regex;
use std::sync::OnceLock;

const UNKNOWN_AUTHOR: &str = "Unknown";

/// 开头的缩写块：`P.`、`P.A.`、`P. A.`
fn initials_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z](?:\.\s*[A-Za-z])*\.)\s*(.*)$").expect("initials regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

fn split_tokens(authors_cell: &str) -> impl Iterator<Item = &str> {
    authors_cell.split(',').map(str::trim).filter(|a| !a.is_empty())
}

/// 主要作者：第一个带标记的姓名，没有标记时取第一个姓名
pub fn parse_main_author(authors_cell: &str, marker: char) -> String {
    let tokens: Vec<&str> = split_tokens(authors_cell).collect();
    let chosen = tokens
        .iter()
        .find(|a| a.contains(marker))
        .or_else(|| tokens.first());

    match chosen {
        Some(name) => {
            let name = name.replace(marker, "");
            let name = name.trim();
            if name.is_empty() {
                UNKNOWN_AUTHOR.to_string()
            } else {
                name.to_string()
            }
        }
        None => UNKNOWN_AUTHOR.to_string(),
    }
}

/// 全部作者，去掉标记和空项，保持顺序，不去重
pub fn parse_all_authors(authors_cell: &str, marker: char) -> Vec<String> {
    split_tokens(authors_cell)
        .map(|a| a.replace(marker, "").trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

/// 拆分缩写和姓氏
///
/// - `P. Van Morisson` → (`P.`, `Van Morisson`)
/// - `P.A. Van Morisson` → (`P.A.`, `Van Morisson`)
/// - 没有 `.` 时缩写为空，整个字符串作为姓氏
///
/// 匹配不到开头的缩写块时退回到在第一个 `.` 处切分，
/// 所以 `Jr.` 这类非开头位置的点会被当成缩写的结尾。
pub fn split_initials_surname(name: &str) -> (String, String) {
    let s = whitespace_re().replace_all(name.trim(), " ").into_owned();

    if !s.contains('.') {
        return (String::new(), s);
    }

    if let Some(caps) = initials_re().captures(&s) {
        let initials = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
        let rest = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
        return (initials, rest);
    }

    match s.find('.') {
        Some(i) => (s[..=i].trim().to_string(), s[i + 1..].trim().to_string()),
        None => (String::new(), s),
    }
}

/// 排序键：(姓氏, 缩写, 全名)，均忽略大小写
pub fn author_sort_key(name: &str) -> (String, String, String) {
    let (initials, surname) = split_initials_surname(name);
    (
        surname.to_lowercase(),
        initials.to_lowercase(),
        name.to_lowercase(),
    )
}
