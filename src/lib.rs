// ==========================================
// 化工设备参数分析系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: CSV 设备参数导入、汇总统计、历史保留（每用户最近 5 个）、PDF 报告
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问 + 历史保留策略
pub mod repository;

// 引擎层 - 汇总统计
pub mod engine;

// 导入层 - CSV 解析与校验
pub mod importer;

// 报告层 - PDF 渲染
pub mod report;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{ChartData, Dataset, DatasetMeta, EquipmentRecord, Summary, HISTORY_LIMIT};

// 引擎
pub use engine::SummaryEngine;

// 仓储
pub use repository::{DatasetRepository, MemoryDatasetRepository, SqliteDatasetRepository};

// 报告
pub use report::{ReportFile, ReportRenderer};

// API
pub use api::{ApiError, ApiResult, DatasetApi, ErrorResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "化工设备参数分析系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(HISTORY_LIMIT, 5);
    }
}
