//! 表格读取
//!
//! 上层只通过 `SheetSource` 按 (行, 列) 读取文本和超链接目标，行列号都从1开始。

pub mod hyperlinks;
pub mod xlsx_loader;

pub use xlsx_loader::XlsxSheet;

use std::collections::HashMap;

/// 按行列访问的工作表
pub trait SheetSource {
    /// 最后一行的行号，空表返回0
    fn max_row(&self) -> u32;

    /// 去掉首尾空白后的单元格文本，空单元格返回空字符串
    fn cell_text(&self, row: u32, col: u32) -> String;

    /// 单元格上附带的超链接目标
    fn cell_hyperlink(&self, row: u32, col: u32) -> Option<String>;
}

/// 内存中的工作表
#[derive(Debug, Clone, Default)]
pub struct MemorySheet {
    values: HashMap<(u32, u32), String>,
    links: HashMap<(u32, u32), String>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, row: u32, col: u32, text: impl Into<String>) -> Self {
        self.values.insert((row, col), text.into());
        self
    }

    pub fn link(mut self, row: u32, col: u32, target: impl Into<String>) -> Self {
        self.links.insert((row, col), target.into());
        self
    }
}

impl SheetSource for MemorySheet {
    fn max_row(&self) -> u32 {
        self.values
            .keys()
            .chain(self.links.keys())
            .map(|(row, _)| *row)
            .max()
            .unwrap_or(0)
    }

    fn cell_text(&self, row: u32, col: u32) -> String {
        self.values
            .get(&(row, col))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn cell_hyperlink(&self, row: u32, col: u32) -> Option<String> {
        self.links.get(&(row, col)).cloned()
    }
}
