//! 程序配置
//!
//! 所有固定查找表（区域顺序、列号、文档样式）都集中在 `Config` 里，
//! 以引用的方式显式传给各个组件，不使用全局状态。
//!
//! 加载顺序：内置默认值 → TOML 文件（可选）→ 环境变量覆盖。

use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 默认会议分区顺序
pub const DEFAULT_AREAS: &[&str] = &[
    "Plenary",
    "Damage Mechanics",
    "Optimization & Dynamic Response",
    "Delamination & Impact",
    "Novel Approaches",
    "Fracture Mechanics",
    "Thin Ply",
    "Buckling / Stability",
    "Structures",
    "Multi-scale modeling",
    "Novel Materials",
    "Machine Learning I",
    "Machine Learning II",
];

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 表格 ---
    /// Excel 文件路径
    pub xlsx_path: PathBuf,
    /// 工作表名称，`None` 表示使用活动工作表
    pub sheet_name: Option<String>,
    /// 数据起始行（从1开始）
    pub start_row: u32,
    /// URL 列（从1开始）
    pub url_col: u32,
    /// 标题列
    pub title_col: u32,
    /// 分区列
    pub area_col: u32,
    /// 作者列
    pub author_col: u32,
    /// 分区顺序，同时也是允许的分区集合
    pub areas: Vec<String>,
    /// 主要作者标记字符
    pub main_author_marker: char,
    /// 标题为空时的占位符
    pub placeholder_title: String,

    // --- 下载 ---
    /// HTTP 超时（秒）
    pub timeout_secs: u64,
    /// User-Agent 请求头
    pub user_agent: String,
    /// 写盘块大小（字节）
    pub chunk_size: usize,
    /// 文件名最大长度（字符）
    pub max_filename_len: usize,
    /// 下载/缓存目录，`None` 时放在输出 tex 旁边的 `downloaded_pdfs`
    pub pdf_dir: Option<PathBuf>,
    /// 没有 URL 时查找本地 PDF 的目录
    pub fallback_dir: Option<PathBuf>,
    /// 是否把 URL 单元格中的文本当作本地文件名
    pub use_url_cell_as_local_filename: bool,

    // --- 输出 ---
    /// 输出 tex 文件
    pub out_tex: PathBuf,
    /// 被跳过记录的报告文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 文档样式
    pub document: DocumentConfig,
}

/// 页眉样式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStyle {
    /// 居中的彩色横幅
    Banner,
    /// 右上角小字（原样输出 LaTeX）
    Corner,
}

/// 作者索引排版
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexLayout {
    /// 单个 longtable
    Table,
    /// 双栏手动分页
    TwoColumn,
}

/// 插入的额外 PDF（前言 / 封底）
#[derive(Clone, Debug, Deserialize)]
pub struct ExtraPdf {
    pub path: String,
    #[serde(default = "ExtraPdf::default_pages")]
    pub pages: String,
}

impl ExtraPdf {
    fn default_pages() -> String {
        "1".to_string()
    }
}

/// 文档样式配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// 每个 PDF 的缩放比例，小于1才能放下页眉和页码
    pub scale: f64,
    /// 主字体（需要 xelatex / lualatex）
    pub main_font: Option<String>,
    pub header_style: HeaderStyle,
    /// 页眉内容；`Banner` 会转义，`Corner` 原样输出
    pub header_text: String,
    pub front_matter: Option<ExtraPdf>,
    pub back_matter: Option<ExtraPdf>,
    pub index_layout: IndexLayout,
    /// 双栏布局下每栏的行数
    pub rows_per_column: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            scale: 0.95,
            main_font: None,
            header_style: HeaderStyle::Banner,
            header_text: "Book of Abstracts".to_string(),
            front_matter: None,
            back_matter: None,
            index_layout: IndexLayout::Table,
            rows_per_column: 46,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            xlsx_path: PathBuf::from("Abstract_list.xlsx"),
            sheet_name: None,
            start_row: 3,
            url_col: 3,
            title_col: 2,
            area_col: 9,
            author_col: 10,
            areas: DEFAULT_AREAS.iter().map(|a| a.to_string()).collect(),
            main_author_marker: '*',
            placeholder_title: "(No title)".to_string(),
            timeout_secs: 60,
            user_agent: "xlsx-pdf-embed/1.0".to_string(),
            chunk_size: 128 * 1024,
            max_filename_len: 80,
            pdf_dir: None,
            fallback_dir: None,
            use_url_cell_as_local_filename: true,
            out_tex: PathBuf::from("BookAbstract.tex"),
            output_log_file: "boa_run.txt".to_string(),
            verbose_logging: false,
            document: DocumentConfig::default(),
        }
    }
}

impl Config {
    /// 按 默认值 → TOML → 环境变量 的顺序加载配置
    pub fn load() -> AppResult<Self> {
        let file = match std::env::var("BOA_CONFIG") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => {
                let default_path = PathBuf::from("boa.toml");
                default_path.exists().then_some(default_path)
            }
        };

        let base = match file {
            Some(path) => Self::from_toml_file(&path)?,
            None => Self::default(),
        };

        let config = base.with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
            path: String::new(),
            source: e,
        })
    }

    /// 用环境变量覆盖
    pub fn with_env(self) -> Result<Self, ConfigError> {
        let mut config = self;
        if let Ok(v) = std::env::var("BOA_XLSX_PATH") {
            config.xlsx_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BOA_OUT_TEX") {
            config.out_tex = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("BOA_PDF_DIR") {
            config.pdf_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("BOA_FALLBACK_DIR") {
            config.fallback_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("BOA_SHEET_NAME") {
            config.sheet_name = Some(v);
        }
        if let Ok(v) = std::env::var("BOA_OUTPUT_LOG_FILE") {
            config.output_log_file = v;
        }
        if let Some(v) = parse_env("BOA_TIMEOUT_SECS", "u64")? {
            config.timeout_secs = v;
        }
        if let Some(v) = parse_env("BOA_VERBOSE", "bool")? {
            config.verbose_logging = v;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let columns = [
            ("url_col", self.url_col),
            ("title_col", self.title_col),
            ("area_col", self.area_col),
            ("author_col", self.author_col),
            ("start_row", self.start_row),
        ];
        for (field, value) in columns {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "行列号从1开始".to_string(),
                });
            }
        }
        if self.areas.is_empty() {
            return Err(ConfigError::Invalid {
                field: "areas".to_string(),
                reason: "分区列表不能为空".to_string(),
            });
        }
        if !(self.document.scale > 0.0) {
            return Err(ConfigError::Invalid {
                field: "document.scale".to_string(),
                reason: format!("缩放比例必须为正数: {}", self.document.scale),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size".to_string(),
                reason: "块大小不能为0".to_string(),
            });
        }
        Ok(())
    }

    /// 下载/缓存目录
    pub fn pdf_dir(&self) -> PathBuf {
        match &self.pdf_dir {
            Some(dir) => dir.clone(),
            None => self.tex_dir().join("downloaded_pdfs"),
        }
    }

    /// 输出 tex 所在目录
    pub fn tex_dir(&self) -> PathBuf {
        self.out_tex
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// 分区在顺序表中的位置
    pub fn area_position(&self, area: &str) -> Option<usize> {
        self.areas.iter().position(|a| a == area)
    }
}

fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
