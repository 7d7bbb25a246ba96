//! 记录提取 - 业务能力层
//!
//! 逐行读取表格，生成 `AbstractRecord`。分区不在已知列表中的行直接丢弃。

use crate::config::Config;
use crate::models::{AbstractRecord, SheetSource};
use crate::services::author_parser::{parse_all_authors, parse_main_author};

/// URL：优先使用单元格上的超链接，其次是本身就是 http(s) 地址的文本
pub fn cell_url(sheet: &impl SheetSource, row: u32, col: u32) -> Option<String> {
    if let Some(target) = sheet.cell_hyperlink(row, col) {
        let target = target.trim();
        if !target.is_empty() {
            return Some(target.to_string());
        }
    }
    let text = sheet.cell_text(row, col);
    if text.starts_with("http://") || text.starts_with("https://") {
        Some(text)
    } else {
        None
    }
}

/// 提取一行，分区未知时返回 `None`
pub fn extract_row(sheet: &impl SheetSource, row: u32, config: &Config) -> Option<AbstractRecord> {
    let area = sheet.cell_text(row, config.area_col);
    config.area_position(&area)?;

    let title = sheet.cell_text(row, config.title_col);
    let authors_cell = sheet.cell_text(row, config.author_col);

    Some(AbstractRecord {
        source_row: row,
        area,
        title: if title.is_empty() {
            config.placeholder_title.clone()
        } else {
            title
        },
        main_author: parse_main_author(&authors_cell, config.main_author_marker),
        authors: parse_all_authors(&authors_cell, config.main_author_marker),
        url: cell_url(sheet, row, config.url_col),
        url_cell_text: sheet.cell_text(row, config.url_col),
    })
}

/// 提取从起始行到最后一行的全部记录，保持表格顺序
pub fn extract_records(sheet: &impl SheetSource, config: &Config) -> Vec<AbstractRecord> {
    (config.start_row..=sheet.max_row())
        .filter_map(|row| extract_row(sheet, row, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemorySheet;

    fn row(sheet: MemorySheet, r: u32, url: &str, title: &str, area: &str, authors: &str) -> MemorySheet {
        sheet.set(r, 3, url).set(r, 2, title).set(r, 9, area).set(r, 10, authors)
    }

    #[test]
    fn test_hyperlink_wins_over_text() {
        let sheet = MemorySheet::new()
            .set(3, 3, "click here")
            .link(3, 3, "https://conf.org/a.pdf")
            .set(4, 3, " https://conf.org/b.pdf ")
            .set(5, 3, "ftp://conf.org/c.pdf")
            .set(6, 3, "local.pdf");

        assert_eq!(cell_url(&sheet, 3, 3).as_deref(), Some("https://conf.org/a.pdf"));
        assert_eq!(cell_url(&sheet, 4, 3).as_deref(), Some("https://conf.org/b.pdf"));
        assert_eq!(cell_url(&sheet, 5, 3), None);
        assert_eq!(cell_url(&sheet, 6, 3), None);
        assert_eq!(cell_url(&sheet, 7, 3), None);
    }

    #[test]
    fn test_extract_row_fields() {
        let sheet = row(
            MemorySheet::new(),
            3,
            "paper.pdf",
            "",
            "Thin Ply",
            "A. Smith, B. Jones*",
        );
        let rec = extract_row(&sheet, 3, &Config::default()).unwrap();
        assert_eq!(rec.source_row, 3);
        assert_eq!(rec.area, "Thin Ply");
        assert_eq!(rec.title, "(No title)");
        assert_eq!(rec.main_author, "B. Jones");
        assert_eq!(rec.authors, vec!["A. Smith", "B. Jones"]);
        assert_eq!(rec.url, None);
        assert_eq!(rec.url_cell_text, "paper.pdf");
    }

    #[test]
    fn test_unknown_area_is_dropped() {
        let sheet = MemorySheet::new()
            .set(3, 9, "thin ply")
            .set(4, 9, "")
            .set(5, 9, " Structures ");
        let records = extract_records(&sheet, &Config::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_row, 5);
        assert_eq!(records[0].area, "Structures");
    }

    #[test]
    fn test_rows_before_start_are_ignored() {
        let sheet = MemorySheet::new()
            .set(1, 9, "Plenary")
            .set(2, 9, "Plenary")
            .set(3, 9, "Plenary");
        let records = extract_records(&sheet, &Config::default());
        assert_eq!(records.iter().map(|r| r.source_row).collect::<Vec<_>>(), vec![3]);
    }
}
