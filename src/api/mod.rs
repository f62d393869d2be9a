// ==========================================
// 化工设备参数分析系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP / CLI 外壳调用
// ==========================================

pub mod dataset_api;
pub mod error;

// 重导出核心类型
pub use dataset_api::DatasetApi;
pub use error::{ApiError, ApiResult, ErrorResponse};
