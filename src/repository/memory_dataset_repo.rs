// ==========================================
// 化工设备参数分析系统 - 内存数据集仓储
// ==========================================
// 结构: 每用户一个分片（固定容量历史 + id → Arc<Dataset>），分片间无共享状态
// 并发: 同一用户的 put 经由该用户 RwLock 串行；不同用户互不阻塞
// 红线: 追加、淘汰、删除在同一把用户锁内完成，历史与数据集始终一致
// ==========================================

use crate::domain::{Dataset, DatasetMeta, EquipmentRecord, Summary, HISTORY_LIMIT};
use crate::repository::dataset_repo::DatasetRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::owner_history::{HistorySlot, OwnerHistory, OwnerLockRegistry};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

// ==========================================
// OwnerShard - 单用户分片
// ==========================================
// 不变量: datasets 的键集合 == history 中的 dataset_id 集合
struct OwnerShard {
    history: OwnerHistory,
    datasets: HashMap<String, Arc<Dataset>>,
}

impl OwnerShard {
    fn new() -> Self {
        Self {
            history: OwnerHistory::with_capacity(HISTORY_LIMIT),
            datasets: HashMap::with_capacity(HISTORY_LIMIT + 1),
        }
    }

    fn lookup(&self, id: &str) -> RepositoryResult<Dataset> {
        self.datasets
            .get(id)
            .map(|d| d.as_ref().clone())
            .ok_or_else(|| RepositoryError::dataset_not_found(id))
    }
}

pub struct MemoryDatasetRepository {
    shards: OwnerLockRegistry<OwnerShard>,
}

impl MemoryDatasetRepository {
    pub fn new() -> Self {
        Self {
            shards: OwnerLockRegistry::new(OwnerShard::new),
        }
    }

    /// 已存在的用户分片；未上传过的用户返回 None
    fn existing_shard(&self, owner: &str) -> RepositoryResult<Option<Arc<RwLock<OwnerShard>>>> {
        self.shards.existing(owner)
    }
}

impl Default for MemoryDatasetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetRepository for MemoryDatasetRepository {
    fn put(
        &self,
        owner: &str,
        file_name: &str,
        records: Vec<EquipmentRecord>,
        summary: Summary,
    ) -> RepositoryResult<Dataset> {
        let slot = self.shards.slot(owner)?;
        // 用户临界区：追加 + 淘汰
        let mut shard = slot
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let dataset = Dataset {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            file_name: file_name.to_string(),
            uploaded_at: shard.history.next_timestamp(Utc::now()),
            records,
            summary,
        };

        let evicted = shard.history.push(HistorySlot {
            dataset_id: dataset.id.clone(),
            uploaded_at: dataset.uploaded_at,
        });
        shard
            .datasets
            .insert(dataset.id.clone(), Arc::new(dataset.clone()));

        if let Some(old) = evicted {
            shard.datasets.remove(&old.dataset_id);
            tracing::debug!(owner = %owner, evicted_id = %old.dataset_id, "历史超限，淘汰最旧数据集");
        }

        Ok(dataset)
    }

    fn get_latest(&self, owner: &str) -> RepositoryResult<Dataset> {
        let slot = self
            .existing_shard(owner)?
            .ok_or_else(|| RepositoryError::dataset_not_found("latest"))?;
        let shard = slot
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let newest = shard
            .history
            .newest()
            .ok_or_else(|| RepositoryError::dataset_not_found("latest"))?;
        shard.lookup(&newest.dataset_id)
    }

    fn get(&self, owner: &str, id: &str) -> RepositoryResult<Dataset> {
        // 只在调用者自己的分片中查找，他人数据集天然不可见
        let slot = self
            .existing_shard(owner)?
            .ok_or_else(|| RepositoryError::dataset_not_found(id))?;
        let shard = slot
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        shard.lookup(id)
    }

    fn list_history(&self, owner: &str) -> RepositoryResult<Vec<DatasetMeta>> {
        let slot = match self.existing_shard(owner)? {
            Some(slot) => slot,
            None => return Ok(Vec::new()),
        };
        let shard = slot
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        Ok(shard
            .history
            .newest_first()
            .filter_map(|s| shard.datasets.get(&s.dataset_id))
            .map(|d| d.meta())
            .collect())
    }

    fn count(&self, owner: &str) -> RepositoryResult<usize> {
        match self.existing_shard(owner)? {
            Some(slot) => Ok(slot
                .read()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?
                .history
                .len()),
            None => Ok(0),
        }
    }
}
