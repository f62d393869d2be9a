// ==========================================
// 化工设备参数分析系统 - 报告模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 渲染失败不产生任何部分输出
// ==========================================

use thiserror::Error;

/// 报告模块错误类型
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("报告渲染失败: {0}")]
    RenderError(String),

    #[error("报告布局无效: {0}")]
    LayoutError(String),
}

impl From<std::fmt::Error> for ReportError {
    fn from(err: std::fmt::Error) -> Self {
        ReportError::RenderError(err.to_string())
    }
}

/// Result 类型别名
pub type ReportResult<T> = Result<T, ReportError>;
