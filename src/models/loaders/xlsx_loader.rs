use super::hyperlinks::{load_sheet_links, SheetLinks};
use super::SheetSource;
use crate::error::{AppResult, SheetError};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// 基于 calamine 的工作表
pub struct XlsxSheet {
    name: String,
    cells: Range<Data>,
    links: HashMap<(u32, u32), String>,
}

impl XlsxSheet {
    /// 打开工作簿并读取一个工作表（`None` 为活动工作表）
    pub fn open(path: &Path, sheet_name: Option<&str>) -> AppResult<Self> {
        let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::OpenFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        // 超链接和活动工作表只存在于 OOXML 格式里
        let SheetLinks { sheet_name: name, links } = if is_ooxml(path) {
            load_sheet_links(path, sheet_name)?
        } else {
            let name = match sheet_name {
                Some(name) => name.to_string(),
                None => workbook
                    .sheet_names()
                    .first()
                    .cloned()
                    .ok_or_else(|| SheetError::NoSheets {
                        path: path.display().to_string(),
                    })?,
            };
            debug!("{} 不是 xlsx 格式，不读取超链接", path.display());
            SheetLinks {
                sheet_name: name,
                links: HashMap::new(),
            }
        };

        if !workbook.sheet_names().iter().any(|n| n == &name) {
            return Err(SheetError::SheetNotFound { name }.into());
        }

        let cells = workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::RangeFailed {
                name: name.clone(),
                source: e,
            })?;

        info!(
            "📄 已打开工作表 '{}' (共 {} 行, {} 个超链接)",
            name,
            cells.end().map(|(r, _)| r + 1).unwrap_or(0),
            links.len()
        );

        Ok(Self { name, cells, links })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SheetSource for XlsxSheet {
    fn max_row(&self) -> u32 {
        self.cells.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    fn cell_text(&self, row: u32, col: u32) -> String {
        if row == 0 || col == 0 {
            return String::new();
        }
        self.cells
            .get_value((row - 1, col - 1))
            .map(render_cell)
            .unwrap_or_default()
    }

    fn cell_hyperlink(&self, row: u32, col: u32) -> Option<String> {
        self.links.get(&(row, col)).cloned()
    }
}

fn is_ooxml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm"))
        .unwrap_or(false)
}

/// 单元格值转文本，整数值的浮点数不带小数部分
fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}
