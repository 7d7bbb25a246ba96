use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 表格读取错误
    #[error("表格错误: {0}")]
    Sheet(#[from] SheetError),
    /// 下载错误
    #[error("下载错误: {0}")]
    Fetch(#[from] FetchError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 单条记录无法得到 PDF
    #[error("解析错误: {0}")]
    Resolve(#[from] ResolveError),
    /// 没有任何记录成功
    #[error("没有获取到任何有效 PDF（共 {candidates} 条候选记录）")]
    NoRecords { candidates: usize },
}

/// 表格读取错误
#[derive(Debug, Error)]
pub enum SheetError {
    /// 打开工作簿失败
    #[error("无法打开工作簿 {path}: {source}")]
    OpenFailed {
        path: String,
        source: calamine::Error,
    },
    /// 工作簿里没有工作表
    #[error("工作簿 {path} 中没有工作表")]
    NoSheets { path: String },
    /// 指定的工作表不存在
    #[error("工作表不存在: {name}")]
    SheetNotFound { name: String },
    /// 读取单元格区域失败
    #[error("读取工作表 {name} 失败: {source}")]
    RangeFailed {
        name: String,
        source: calamine::Error,
    },
    /// xlsx 压缩包损坏
    #[error("无法读取 xlsx 压缩包 {path}: {source}")]
    ArchiveFailed {
        path: String,
        source: zip::result::ZipError,
    },
    /// xlsx 内部 XML 解析失败
    #[error("解析 {part} 失败: {source}")]
    XmlFailed {
        part: String,
        source: quick_xml::Error,
    },
    /// 读取 xlsx 内部文件失败
    #[error("读取 {part} 失败: {source}")]
    PartReadFailed {
        part: String,
        source: std::io::Error,
    },
}

/// 下载错误
#[derive(Debug, Error)]
pub enum FetchError {
    /// 创建 HTTP 客户端失败
    #[error("创建 HTTP 客户端失败: {0}")]
    Client(reqwest::Error),
    /// 网络请求失败
    #[error("请求失败 ({url}): {source}")]
    Request { url: String, source: reqwest::Error },
    /// 服务器返回非成功状态码
    #[error("HTTP {status} ({url})")]
    Status { url: String, status: u16 },
    /// 写入响应内容失败
    #[error("写入 {path} 失败: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
    /// 复制文件失败
    #[error("复制文件失败 ({from} -> {to}): {source}")]
    CopyFailed {
        from: String,
        to: String,
        source: std::io::Error,
    },
    /// 删除文件失败
    #[error("删除文件失败 ({path}): {source}")]
    DeleteFailed {
        path: String,
        source: std::io::Error,
    },
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

/// 单条记录解析失败
#[derive(Debug, Error)]
pub enum ResolveError {
    /// 没有 URL，本地也找不到
    #[error("没有可用来源（无 URL，本地也未找到）: {title}")]
    NoSource { title: String },
    /// 得到的文件不是 PDF
    #[error("不是 PDF 文件: {path}")]
    NotPdf { path: String },
}

// ========== 便捷构造函数 ==========

impl FileError {
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        FileError::ReadFailed {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn create_dir(path: &std::path::Path, source: std::io::Error) -> Self {
        FileError::CreateDirFailed {
            path: path.display().to_string(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
