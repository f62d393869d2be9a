// ==========================================
// 化工设备参数分析系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 数据集存取 + 每用户历史保留策略
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod dataset_repo;
pub mod dataset_repo_impl;
pub mod error;
pub mod memory_dataset_repo;
pub mod owner_history;

// 重导出核心仓储
pub use dataset_repo::DatasetRepository;
pub use dataset_repo_impl::SqliteDatasetRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use memory_dataset_repo::MemoryDatasetRepository;
pub use owner_history::{HistorySlot, OwnerHistory, OwnerLockRegistry};
