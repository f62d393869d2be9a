// ==========================================
// 化工设备参数分析系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 输入类错误必须带足以修正文件的信息（缺失列名 / 行号+列名）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件过大: {size} 字节（上限 {limit} 字节）")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构校验错误 =====
    #[error("缺少必需列: {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("数值解析失败 (行 {row_index}, 列 {column}): {value:?} 不是有限数值")]
    RowError {
        row_index: usize,
        column: String,
        value: String,
    },

    #[error("数据集为空: 仅有表头，没有数据行")]
    EmptyDatasetError,

    // ===== 落库错误 =====
    #[error("数据集保存失败: {0}")]
    StoreError(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为输入类错误（文件本身有问题，重试无意义）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ImportError::UnsupportedFormat(_)
                | ImportError::PayloadTooLarge { .. }
                | ImportError::CsvParseError(_)
                | ImportError::SchemaError { .. }
                | ImportError::RowError { .. }
                | ImportError::EmptyDatasetError
        )
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<RepositoryError>
impl From<crate::repository::RepositoryError> for ImportError {
    fn from(err: crate::repository::RepositoryError) -> Self {
        ImportError::StoreError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
