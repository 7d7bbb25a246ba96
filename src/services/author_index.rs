use crate::models::ResolvedRecord;
use crate::services::author_parser::author_sort_key;
use std::collections::HashMap;

/// 作者在某篇摘要中的出现
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRef<'a> {
    pub seq: usize,
    pub id: &'a str,
    pub label: &'a str,
    pub title: &'a str,
    pub area: &'a str,
}

/// 作者索引中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIndexEntry<'a> {
    pub name: &'a str,
    /// 按编号排序
    pub refs: Vec<AuthorRef<'a>>,
}

/// 从全部记录构建作者索引，按姓名排序键排序
///
/// 先按首次出现的顺序分组再稳定排序，排序键相同的名字（只有大小写不同）保持首次出现的顺序。
pub fn build_author_index(records: &[ResolvedRecord]) -> Vec<AuthorIndexEntry<'_>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<AuthorIndexEntry<'_>> = Vec::new();
    for rec in records {
        for author in &rec.record.authors {
            let pos = *positions.entry(author.as_str()).or_insert_with(|| {
                entries.push(AuthorIndexEntry {
                    name: author.as_str(),
                    refs: Vec::new(),
                });
                entries.len() - 1
            });
            entries[pos].refs.push(AuthorRef {
                seq: rec.seq,
                id: &rec.id,
                label: &rec.label,
                title: &rec.record.title,
                area: &rec.record.area,
            });
        }
    }

    for entry in &mut entries {
        entry.refs.sort_by_key(|r| r.seq);
    }
    entries.sort_by_cached_key(|e| author_sort_key(e.name));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AbstractRecord, PdfSource};
    use std::path::PathBuf;

    fn resolved(seq: usize, authors: &[&str]) -> ResolvedRecord {
        let record = AbstractRecord {
            source_row: seq as u32 + 2,
            area: "Plenary".to_string(),
            title: format!("Title {seq}"),
            main_author: authors[0].to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            url: None,
            url_cell_text: String::new(),
        };
        ResolvedRecord::new(record, PathBuf::from("x.pdf"), PdfSource::Cache, seq)
    }

    #[test]
    fn test_index_groups_and_sorts() {
        let records = vec![
            resolved(1, &["B. Zeta", "A. Alpha"]),
            resolved(2, &["A. Alpha"]),
            resolved(3, &["C. Mid", "A. Alpha"]),
        ];
        let index = build_author_index(&records);

        let names: Vec<&str> = index.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["A. Alpha", "C. Mid", "B. Zeta"]);

        let alpha_ids: Vec<&str> = index[0].refs.iter().map(|r| r.id).collect();
        assert_eq!(alpha_ids, vec!["abs:0001", "abs:0002", "abs:0003"]);
        assert_eq!(index[0].refs[1].label, "lab:0002");
        assert_eq!(index[0].refs[2].title, "Title 3");
    }

    #[test]
    fn test_case_variants_keep_first_appearance_order() {
        let records = vec![
            resolved(1, &["A. SmItH", "a. smith"]),
            resolved(2, &["A. SMITH", "A. Smith", "a. smith"]),
        ];
        let expected = vec!["A. SmItH", "a. smith", "A. SMITH", "A. Smith"];
        for _ in 0..20 {
            let names: Vec<&str> = build_author_index(&records).iter().map(|e| e.name).collect();
            assert_eq!(names, expected);
        }
        let index = build_author_index(&records);
        assert_eq!(index[1].refs.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_author_listed_twice_gets_two_refs() {
        let records = vec![resolved(1, &["A. Alpha", "A. Alpha"])];
        let index = build_author_index(&records);
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].refs.len(), 2);
    }
}
