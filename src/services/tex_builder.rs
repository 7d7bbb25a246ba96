//! LaTeX 文档生成 - 业务能力层
//!
//! 输入是按 分区顺序 → 编号 排好的记录，输出整本摘要集的 tex 文本：
//! 导言区、目录、分区过渡页、逐个插入的 PDF、作者索引。
//! 生成过程是纯函数，写盘单独由 `write_tex` 完成。

use crate::config::{Config, ExtraPdf, HeaderStyle, IndexLayout};
use crate::error::FileError;
use crate::models::ResolvedRecord;
use crate::services::author_index::{build_author_index, AuthorIndexEntry};
use crate::services::author_parser::split_initials_surname;
use phf::phf_map;
use std::path::Path;

/// LaTeX 特殊字符替换表，其他字符（包括非 ASCII）原样保留
static LATEX_SPECIALS: phf::Map<char, &'static str> = phf_map! {
    '\\' => r"\textbackslash{}",
    '&' => r"\&",
    '%' => r"\%",
    '$' => r"\$",
    '#' => r"\#",
    '_' => r"\_",
    '{' => r"\{",
    '}' => r"\}",
    '~' => r"\textasciitilde{}",
    '^' => r"\textasciicircum{}",
};

/// 转义自由文本
pub fn latex_escape(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match LATEX_SPECIALS.get(&ch) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(ch),
        }
    }
    out
}

/// tex 中使用的路径：位于 tex 目录下时写相对路径，分隔符统一为 `/`
pub fn latex_path(path: &Path, tex_dir: &Path) -> String {
    let shown = if tex_dir.as_os_str().is_empty() {
        path
    } else {
        path.strip_prefix(tex_dir).unwrap_or(path)
    };
    shown.to_string_lossy().replace('\\', "/")
}

/// 插入 PDF 时的一次性锚点
#[derive(Debug, Clone, Copy)]
pub struct Anchor<'a> {
    pub id: &'a str,
    pub label: &'a str,
}

/// 文档生成器
pub struct TexBuilder<'a> {
    config: &'a Config,
}

impl<'a> TexBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// 生成完整文档
    pub fn build(&self, records: &[ResolvedRecord]) -> String {
        let doc = &self.config.document;
        let tex_dir = self.config.tex_dir();
        let mut parts = self.preamble();

        parts.push(r"\begin{document}".to_string());
        if let Some(front) = &doc.front_matter {
            parts.push(extra_pdf(front));
            parts.push(r"\pagenumbering{arabic}".to_string());
            parts.push(r"\setcounter{page}{1}".to_string());
        }

        parts.extend(self.custom_toc(records));

        let mut current_area: Option<&str> = None;
        for rec in records {
            let area = rec.record.area.as_str();
            if current_area != Some(area) {
                current_area = Some(area);
                parts.extend(transition_page(area));
            }
            let path = latex_path(&rec.pdf_path, &tex_dir);
            let anchor = Anchor {
                id: &rec.id,
                label: &rec.label,
            };
            parts.extend(include_pdf(&path, anchor, doc.scale));
        }

        let index = build_author_index(records);
        parts.extend(match doc.index_layout {
            IndexLayout::Table => author_index_table(&index),
            IndexLayout::TwoColumn => author_index_two_column(&index, doc.rows_per_column),
        });

        if let Some(back) = &doc.back_matter {
            parts.push(extra_pdf(back));
        }
        parts.push(r"\end{document}".to_string());

        parts.join("\n")
    }

    /// 导言区，与数据无关
    pub fn preamble(&self) -> Vec<String> {
        let doc = &self.config.document;
        let mut parts: Vec<String> = [
            r"\documentclass[11pt]{article}",
            r"\usepackage[a4paper,margin=1.5cm]{geometry}",
            r"\usepackage{pdfpages}",
            r"\usepackage{hyperref}",
            r"\hypersetup{hidelinks}",
            r"\usepackage{tabularx}",
            r"\usepackage{ltablex}",
            r"\usepackage{longtable}",
            r"\usepackage{array}",
            r"\usepackage{xcolor}",
            r"\usepackage{multicol}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(font) = &doc.main_font {
            parts.push(r"\usepackage{fontspec}".to_string());
            parts.push(format!(r"\setmainfont{{{}}}", font));
        }

        parts.push(r"\definecolor{HeaderGreen}{RGB}{0,120,60}".to_string());
        parts.push(r"\setlength{\headheight}{24pt}".to_string());
        parts.push(r"\keepXColumns".to_string());
        parts.push(r"\usepackage{fancyhdr}".to_string());
        parts.push(r"\pagestyle{fancy}".to_string());
        parts.push(r"\fancyhf{}".to_string());

        parts.push(match doc.header_style {
            HeaderStyle::Banner => format!(
                r"\fancyhead[C]{{\colorbox{{HeaderGreen}}{{\parbox{{\textwidth}}{{\centering\color{{white}}\large {}}}}}}}",
                latex_escape(&doc.header_text)
            ),
            HeaderStyle::Corner => format!(r"\fancyhead[R]{{\footnotesize {}}}", doc.header_text),
        });

        parts.push(r"\fancyfoot[C]{\thepage}".to_string());
        parts.push(r"\renewcommand{\headrulewidth}{0pt}".to_string());
        parts.push(r"\newcommand{\CurrentPDFTarget}{}".to_string());
        parts.push(r"\newcommand{\CurrentPDFLabel}{}".to_string());
        parts
    }

    /// 目录：按分区顺序分组，没有记录的分区不输出
    pub fn custom_toc(&self, records: &[ResolvedRecord]) -> Vec<String> {
        let mut parts: Vec<String> = [
            r"\pagestyle{empty}",
            r"\begin{center}",
            r"\LARGE Table of Contents",
            r"\end{center}",
            r"\vspace{1em}",
            r"\renewcommand{\arraystretch}{1.35}",
            r"\setlength{\tabcolsep}{6pt}",
            r"\noindent\begin{longtable}{@{}>{\bfseries}p{0.28\textwidth} p{0.62\textwidth} r@{}}",
            r"\textbf{Author} & \textbf{Title} & \textbf{Page}\\",
            r"\hline",
            r"\endfirsthead",
            r"\textbf{Author} & \textbf{Title} & \textbf{Page}\\",
            r"\hline",
            r"\endhead",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        for area in &self.config.areas {
            let entries: Vec<&ResolvedRecord> =
                records.iter().filter(|r| &r.record.area == area).collect();
            if entries.is_empty() {
                continue;
            }

            parts.push(format!(
                r"\multicolumn{{3}}{{@{{}}l@{{}}}}{{\Large\bfseries {}}}\\[4pt]",
                latex_escape(area)
            ));
            parts.push(r"\hline".to_string());
            parts.push(r"\noalign{\vskip 4pt}".to_string());

            for rec in entries {
                parts.push(format!(
                    r"{} & \hyperlink{{{}}}{{{}}} & \pageref{{{}}} \\",
                    latex_escape(&rec.record.main_author),
                    rec.id,
                    latex_escape(&rec.record.title),
                    rec.label
                ));
                parts.push(r"\noalign{\vskip 3pt}".to_string());
            }
            parts.push(r"\noalign{\vskip 8pt}".to_string());
        }

        parts.push(r"\end{longtable}".to_string());
        parts.push(r"\clearpage".to_string());
        parts.push(r"\pagestyle{fancy}".to_string());
        parts
    }
}

/// 分区过渡页，只有标题，不显示页码
pub fn transition_page(area: &str) -> Vec<String> {
    vec![
        r"\clearpage".to_string(),
        r"\thispagestyle{empty}".to_string(),
        r"\vspace*{\fill}".to_string(),
        r"\begin{center}".to_string(),
        format!(r"\Huge {}", latex_escape(area)),
        r"\end{center}".to_string(),
        r"\vspace*{\fill}".to_string(),
        r"\clearpage".to_string(),
    ]
}

/// 插入一个 PDF 的全部页
///
/// 先设置一次性的目标名和标签，第一页的 pagecommand 放置锚点后立即清空，
/// 同一个 PDF 的后续页不会重复放置。
pub fn include_pdf(path: &str, anchor: Anchor<'_>, scale: f64) -> Vec<String> {
    let scale_opt = if (scale - 1.0).abs() > f64::EPSILON {
        format!("scale={},", scale)
    } else {
        String::new()
    };

    vec![
        format!(r"\gdef\CurrentPDFTarget{{{}}}", anchor.id),
        format!(r"\gdef\CurrentPDFLabel{{{}}}", anchor.label),
        format!(
            concat!(
                r"\includepdf[pages=-,{}pagecommand={{\thispagestyle{{fancy}}",
                r"\ifx\CurrentPDFTarget\empty\else",
                r"\phantomsection",
                r"\hypertarget{{\CurrentPDFTarget}}{{}}",
                r"\label{{\CurrentPDFLabel}}",
                r"\gdef\CurrentPDFTarget{{}}\gdef\CurrentPDFLabel{{}}",
                r"\fi}}]{{{}}}"
            ),
            scale_opt, path
        ),
    ]
}

fn extra_pdf(extra: &ExtraPdf) -> String {
    format!(
        r"\includepdf[pages={},scale=1,pagecommand={{\thispagestyle{{empty}}}}]{{{}}}",
        extra.pages,
        extra.path.replace('\\', "/")
    )
}

/// 页码列表：每个页码链接到对应摘要
fn page_links(entry: &AuthorIndexEntry<'_>) -> String {
    entry
        .refs
        .iter()
        .map(|r| format!(r"\hyperlink{{{}}}{{\pageref{{{}}}}}", r.id, r.label))
        .collect::<Vec<_>>()
        .join(", ")
}

fn index_heading() -> Vec<String> {
    vec![
        r"\clearpage".to_string(),
        r"\section*{Author Index}".to_string(),
        r"\addcontentsline{toc}{section}{Author Index}".to_string(),
        r"\vspace{0.5em}".to_string(),
    ]
}

/// 作者索引：单个 longtable，缩写右对齐
pub fn author_index_table(index: &[AuthorIndexEntry<'_>]) -> Vec<String> {
    let mut parts = index_heading();
    parts.extend(
        [
            r"\renewcommand{\arraystretch}{1.2}",
            r"\setlength{\tabcolsep}{6pt}",
            r"\noindent\begin{longtable}{@{}p{0.1\textwidth} p{0.42\textwidth} p{0.46\textwidth}@{}}",
            r"\textbf{Initials} & \textbf{Surname} & \textbf{Pages}\\",
            r"\hline",
            r"\endfirsthead",
            r"\textbf{Initials} & \textbf{Surname} & \textbf{Pages}\\",
            r"\hline",
            r"\endhead",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    for entry in index {
        let (initials, surname) = split_initials_surname(entry.name);
        parts.push(format!(
            r"\makebox[\linewidth][r]{{{}}} & {} & {} \\",
            latex_escape(&initials),
            latex_escape(&surname),
            page_links(entry)
        ));
        parts.push(r"\noalign{\vskip 2pt}".to_string());
    }

    parts.push(r"\end{longtable}".to_string());
    parts
}

/// 作者索引：双栏，手动分页，每栏顶部都重复表头
///
/// multicols 不能自动在每栏重复表头，所以按 `rows_per_column` 预先切分。
pub fn author_index_two_column(index: &[AuthorIndexEntry<'_>], rows_per_column: usize) -> Vec<String> {
    let rows_per_column = rows_per_column.max(1);
    let header = [
        concat!(
            r"\parbox[t]{0.13\columnwidth}{\raggedleft\textbf{Initials}} ",
            r"\parbox[t]{0.52\columnwidth}{\raggedright\textbf{Surname}} ",
            r"\parbox[t]{0.26\columnwidth}{\raggedright\textbf{Pages}}\par"
        ),
        r"\hrule\vspace{4pt}",
    ];

    let rows: Vec<String> = index
        .iter()
        .map(|entry| {
            let (initials, surname) = split_initials_surname(entry.name);
            format!(
                concat!(
                    r"\parbox[t]{{0.13\columnwidth}}{{\raggedleft {}}} ",
                    r"\parbox[t]{{0.52\columnwidth}}{{\raggedright {}}} ",
                    r"\parbox[t]{{0.26\columnwidth}}{{\raggedright {}}}\par",
                    r"\vspace{{3pt}}"
                ),
                latex_escape(&initials),
                latex_escape(&surname),
                page_links(entry)
            )
        })
        .collect();

    let mut parts = index_heading();
    parts.push(r"\small".to_string());
    parts.push(r"\setlength{\parindent}{0pt}".to_string());

    for (page_no, page) in rows.chunks(2 * rows_per_column).enumerate() {
        if page_no > 0 {
            parts.push(r"\clearpage".to_string());
        }
        let split = page.len().min(rows_per_column);
        let (left, right) = page.split_at(split);

        parts.push(r"\thispagestyle{plain}".to_string());
        parts.push(r"\begin{multicols}{2}".to_string());
        parts.push(r"\setlength{\columnsep}{18pt}".to_string());
        parts.extend(header.iter().map(|s| s.to_string()));
        parts.extend(left.iter().cloned());
        parts.push(r"\columnbreak".to_string());
        parts.extend(header.iter().map(|s| s.to_string()));
        parts.extend(right.iter().cloned());
        parts.push(r"\end{multicols}".to_string());
    }

    parts
}

/// 写出 tex 文件（UTF-8），按需创建父目录
pub async fn write_tex(path: &Path, content: &str) -> Result<(), FileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::create_dir(parent, e))?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|e| FileError::write(path, e))
}
