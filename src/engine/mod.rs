// ==========================================
// 化工设备参数分析系统 - 引擎层
// ==========================================
// 职责: 实现汇总统计规则,不拼 SQL
// 红线: Engine 纯计算,不访问仓储
// ==========================================

pub mod summary;

// 重导出核心引擎
pub use summary::SummaryEngine;
