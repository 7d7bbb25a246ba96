//! 读取 xlsx 中单元格的超链接目标
//!
//! calamine 只给出单元格的值，超链接存放在工作表 XML 的 `<hyperlinks>` 节点里，
//! 真实地址在对应的 `_rels/*.rels` 关系文件中，这里直接从压缩包读取。

use crate::error::{AppResult, FileError, SheetError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// 一个工作表的超链接
#[derive(Debug, Clone, Default)]
pub struct SheetLinks {
    /// 实际使用的工作表名称
    pub sheet_name: String,
    /// (行, 列) → 链接目标，从1开始
    pub links: HashMap<(u32, u32), String>,
}

/// 读取指定工作表（`None` 为活动工作表）的超链接
pub fn load_sheet_links(path: &Path, sheet_name: Option<&str>) -> AppResult<SheetLinks> {
    let file = File::open(path).map_err(|e| FileError::read(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| SheetError::ArchiveFailed {
        path: path.display().to_string(),
        source: e,
    })?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?.ok_or_else(|| {
        SheetError::NoSheets {
            path: path.display().to_string(),
        }
    })?;
    let workbook = parse_workbook(&workbook_xml)?;

    let (name, rel_id) = match sheet_name {
        Some(wanted) => workbook
            .sheets
            .iter()
            .find(|(name, _)| name == wanted)
            .cloned()
            .ok_or_else(|| SheetError::SheetNotFound {
                name: wanted.to_string(),
            })?,
        None => workbook
            .sheets
            .get(workbook.active_tab)
            .or_else(|| workbook.sheets.first())
            .cloned()
            .ok_or_else(|| SheetError::NoSheets {
                path: path.display().to_string(),
            })?,
    };

    let workbook_rels = match read_part(&mut archive, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => parse_relationships("xl/_rels/workbook.xml.rels", &xml)?,
        None => HashMap::new(),
    };
    let Some(target) = workbook_rels.get(&rel_id) else {
        debug!("工作表 {} 没有关系记录，视为无超链接", name);
        return Ok(SheetLinks {
            sheet_name: name,
            links: HashMap::new(),
        });
    };

    let sheet_part = resolve_part("xl", target);
    let links = match read_part(&mut archive, &sheet_part)? {
        Some(sheet_xml) => {
            let refs = parse_hyperlink_refs(&sheet_part, &sheet_xml)?;
            let rels_part = rels_path_for(&sheet_part);
            let rels = match read_part(&mut archive, &rels_part)? {
                Some(xml) => parse_relationships(&rels_part, &xml)?,
                None => HashMap::new(),
            };
            let mut links = HashMap::new();
            for (cell_range, rid) in refs {
                let Some(link) = rels.get(&rid) else { continue };
                for cell in expand_range(&cell_range) {
                    links.insert(cell, link.clone());
                }
            }
            links
        }
        None => HashMap::new(),
    };

    debug!("工作表 {} 共读取到 {} 个超链接", name, links.len());
    Ok(SheetLinks {
        sheet_name: name,
        links,
    })
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>, SheetError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => {
            return Err(SheetError::ArchiveFailed {
                path: name.to_string(),
                source: e,
            })
        }
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| SheetError::PartReadFailed {
            part: name.to_string(),
            source: e,
        })?;
    Ok(Some(content))
}

struct WorkbookInfo {
    /// (名称, 关系ID)，按工作簿中的顺序
    sheets: Vec<(String, String)>,
    active_tab: usize,
}

fn parse_workbook(xml: &str) -> Result<WorkbookInfo, SheetError> {
    let mut info = WorkbookInfo {
        sheets: Vec::new(),
        active_tab: 0,
    };
    for_each_element(xml, "xl/workbook.xml", |name, attrs| {
        match name {
            "sheet" => {
                if let (Some(sheet), Some(rid)) = (attrs.get("name"), attrs.get("id")) {
                    info.sheets.push((sheet.clone(), rid.clone()));
                }
            }
            "workbookView" => {
                if let Some(tab) = attrs.get("activeTab").and_then(|v| v.parse().ok()) {
                    info.active_tab = tab;
                }
            }
            _ => {}
        }
    })?;
    Ok(info)
}

/// 关系ID → 目标
fn parse_relationships(part: &str, xml: &str) -> Result<HashMap<String, String>, SheetError> {
    let mut rels = HashMap::new();
    for_each_element(xml, part, |name, attrs| {
        if name == "Relationship" {
            if let (Some(id), Some(target)) = (attrs.get("Id"), attrs.get("Target")) {
                rels.insert(id.clone(), target.clone());
            }
        }
    })?;
    Ok(rels)
}

/// (单元格范围, 关系ID)；只有内部位置、没有关系ID的链接会被忽略
fn parse_hyperlink_refs(part: &str, xml: &str) -> Result<Vec<(String, String)>, SheetError> {
    let mut refs = Vec::new();
    for_each_element(xml, part, |name, attrs| {
        if name == "hyperlink" {
            if let (Some(cell), Some(rid)) = (attrs.get("ref"), attrs.get("id")) {
                refs.push((cell.clone(), rid.clone()));
            }
        }
    })?;
    Ok(refs)
}

/// 遍历所有元素，回调参数为本地名和按本地名索引的属性
fn for_each_element<F>(xml: &str, part: &str, mut visit: F) -> Result<(), SheetError>
where
    F: FnMut(&str, &HashMap<String, String>),
{
    let xml_err = |e: quick_xml::Error| SheetError::XmlFailed {
        part: part.to_string(),
        source: e,
    };
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                let attrs = element_attrs(&e).map_err(xml_err)?;
                visit(&name, &attrs);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn element_attrs(e: &BytesStart<'_>) -> Result<HashMap<String, String>, quick_xml::Error> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

/// 关系目标转成压缩包内路径
fn resolve_part(base_dir: &str, target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}/{}", base_dir, target),
    }
}

/// `xl/worksheets/sheet1.xml` → `xl/worksheets/_rels/sheet1.xml.rels`
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// `C3` → (3, 3)
fn parse_cell_ref(cell: &str) -> Option<(u32, u32)> {
    let cell = cell.replace('$', "");
    let split = cell.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = cell.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col = 0u32;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row = digits.parse().ok()?;
    Some((row, col))
}

/// `C3:D4` 展开为其中每个单元格
fn expand_range(range: &str) -> Vec<(u32, u32)> {
    let (start, end) = match range.split_once(':') {
        Some((a, b)) => (parse_cell_ref(a), parse_cell_ref(b)),
        None => {
            let cell = parse_cell_ref(range);
            (cell, cell)
        }
    };
    let (Some((r1, c1)), Some((r2, c2))) = (start, end) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    for row in r1.min(r2)..=r1.max(r2) {
        for col in c1.min(c2)..=c1.max(c2) {
            cells.push((row, col));
        }
    }
    cells
}
