// ==========================================
// 化工设备参数分析系统 - 数据集 Repository Trait
// ==========================================
// 职责: 定义数据集存取接口 + 每用户历史保留策略
// 红线: 保留策略（最近 5 个）只在写入时执行，读取不做过滤
// 红线: put 仅允许导入器调用（唯一写入路径）
// ==========================================

use crate::domain::{Dataset, DatasetMeta, EquipmentRecord, Summary};
use crate::repository::error::RepositoryResult;

// ==========================================
// DatasetRepository Trait
// ==========================================
// 实现者: MemoryDatasetRepository, SqliteDatasetRepository
pub trait DatasetRepository: Send + Sync {
    /// 保存新数据集并执行保留策略
    ///
    /// # 流程（同一用户内原子）
    /// 1. 分配唯一 id，上传时间 = 当前时间
    /// 2. 写入数据集，追加到该用户历史
    /// 3. 历史超过 5 条时淘汰最旧条目（物理删除）
    fn put(
        &self,
        owner: &str,
        file_name: &str,
        records: Vec<EquipmentRecord>,
        summary: Summary,
    ) -> RepositoryResult<Dataset>;

    /// 该用户最近一次上传的数据集
    fn get_latest(&self, owner: &str) -> RepositoryResult<Dataset>;

    /// 指定数据集（非本人数据集同样返回 NotFound）
    fn get(&self, owner: &str, id: &str) -> RepositoryResult<Dataset>;

    /// 历史列表（≤5，最新在前，不含原始记录）
    fn list_history(&self, owner: &str) -> RepositoryResult<Vec<DatasetMeta>>;

    /// 该用户当前保存的数据集数量
    fn count(&self, owner: &str) -> RepositoryResult<usize>;
}
