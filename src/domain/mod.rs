// ==========================================
// 化工设备参数分析系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod dataset;
pub mod equipment;

// 重导出核心类型
pub use dataset::{
    AverageSeries, ChartData, Dataset, DatasetMeta, DistributionSeries, Summary, TrendSeries,
    HISTORY_LIMIT,
};
pub use equipment::{
    EquipmentRecord, NumericColumn, RawEquipmentRow, RawTable, REQUIRED_COLUMNS,
};
