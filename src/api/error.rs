// ==========================================
// 化工设备参数分析系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误，转换为稳定错误码 + 用户可理解的消息
// 红线: NotFound 不区分"id 错误"与"非本人数据集"
// ==========================================

use crate::importer::error::ImportError;
use crate::report::error::ReportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 上传输入错误
    // ==========================================
    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("文件过大: {size} 字节（上限 {limit} 字节）")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("缺少必需列: {}", .missing.join(", "))]
    SchemaError { missing: Vec<String> },

    #[error("数值解析失败 (行 {row_index}, 列 {column}): {value:?} 不是有限数值")]
    RowError {
        row_index: usize,
        column: String,
        value: String,
    },

    #[error("数据集为空: 仅有表头，没有数据行")]
    EmptyDataset,

    // ==========================================
    // 查询错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 报告错误（细节只写日志）
    // ==========================================
    #[error("报告生成失败")]
    RenderError,

    // ==========================================
    // 配置 / 数据访问错误
    // ==========================================
    #[error("配置读取失败: {0}")]
    ConfigError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定错误码（返回给调用方）
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::CsvParseError(_) => "CSV_PARSE_ERROR",
            ApiError::SchemaError { .. } => "SCHEMA_ERROR",
            ApiError::RowError { .. } => "ROW_ERROR",
            ApiError::EmptyDataset => "EMPTY_DATASET",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::RenderError => "RENDER_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::DatabaseTransactionError(_) => "DATABASE_TRANSACTION_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 是否为调用方输入问题（修正文件后可重试）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ApiError::UnsupportedFormat(_)
                | ApiError::PayloadTooLarge { .. }
                | ApiError::CsvParseError(_)
                | ApiError::SchemaError { .. }
                | ApiError::RowError { .. }
                | ApiError::EmptyDataset
                | ApiError::NotFound(_)
        )
    }

    /// 转换为响应体
    pub fn to_response(&self) -> ErrorResponse {
        let details = match self {
            ApiError::SchemaError { missing } => Some(serde_json::json!({ "missing": missing })),
            ApiError::RowError {
                row_index,
                column,
                value,
            } => Some(serde_json::json!({
                "row_index": row_index,
                "column": column,
                "value": value,
            })),
            ApiError::PayloadTooLarge { size, limit } => {
                Some(serde_json::json!({ "size": size, "limit": limit }))
            }
            _ => None,
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details,
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::UnsupportedFormat(name) => ApiError::UnsupportedFormat(name),
            ImportError::PayloadTooLarge { size, limit } => ApiError::PayloadTooLarge { size, limit },
            ImportError::CsvParseError(msg) => ApiError::CsvParseError(msg),
            ImportError::SchemaError { missing } => ApiError::SchemaError { missing },
            ImportError::RowError {
                row_index,
                column,
                value,
            } => ApiError::RowError {
                row_index,
                column,
                value,
            },
            ImportError::EmptyDatasetError => ApiError::EmptyDataset,
            ImportError::StoreError(msg) => ApiError::DatabaseError(msg),
            ImportError::ConfigReadError { key, message } => {
                ApiError::ConfigError(format!("{}: {}", key, message))
            }
            ImportError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::SerializationError(msg) => {
                ApiError::InternalError(format!("数据集反序列化失败: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ReportError 转换（细节由调用方记录日志）
// ==========================================
impl From<ReportError> for ApiError {
    fn from(_err: ReportError) -> Self {
        ApiError::RenderError
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 错误响应 DTO
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
