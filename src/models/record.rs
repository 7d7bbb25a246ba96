use std::fmt;
use std::path::PathBuf;

/// 表格中的一条摘要记录（分区已通过校验）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractRecord {
    /// 原始行号，仅用于日志
    pub source_row: u32,
    pub area: String,
    pub title: String,
    pub main_author: String,
    /// 全部作者，保持表格中的顺序，不去重
    pub authors: Vec<String>,
    /// 绝对 http(s) 地址
    pub url: Option<String>,
    /// URL 单元格的原始文本，没有 URL 时作为本地文件名提示
    pub url_cell_text: String,
}

/// PDF 的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfSource {
    /// 缓存目录中已有有效文件
    Cache,
    /// 通过 URL 下载
    Url,
    /// 从本地备用目录复制
    Local,
}

impl fmt::Display for PdfSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PdfSource::Cache => "CACHE",
            PdfSource::Url => "URL",
            PdfSource::Local => "LOCAL",
        };
        f.write_str(name)
    }
}

/// 已经拿到本地 PDF 的记录
#[derive(Debug, Clone)]
pub struct ResolvedRecord {
    pub record: AbstractRecord,
    pub pdf_path: PathBuf,
    pub source: PdfSource,
    /// 从1开始的连续编号
    pub seq: usize,
    /// 超链接锚点，如 `abs:0001`
    pub id: String,
    /// 页码引用标签，如 `lab:0001`
    pub label: String,
}

impl ResolvedRecord {
    pub fn new(record: AbstractRecord, pdf_path: PathBuf, source: PdfSource, seq: usize) -> Self {
        Self {
            record,
            pdf_path,
            source,
            seq,
            id: anchor_id(seq),
            label: page_label(seq),
        }
    }
}

pub fn anchor_id(seq: usize) -> String {
    format!("abs:{seq:04}")
}

pub fn page_label(seq: usize) -> String {
    format!("lab:{seq:04}")
}
