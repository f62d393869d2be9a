// ==========================================
// 化工设备参数分析系统 - 数据集 Repository 实现（SQLite）
// ==========================================
// 职责: 数据集持久化 + 每用户最近 5 个的保留策略
// 红线: 写入 + 淘汰在同一 IMMEDIATE 事务内完成
// 并发: 先取用户锁（同用户串行），再取连接
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::{Dataset, DatasetMeta, EquipmentRecord, Summary, HISTORY_LIMIT};
use crate::repository::dataset_repo::DatasetRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::owner_history::OwnerLockRegistry;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

// ==========================================
// DatasetRow - 表行（JSON 列未解析）
// ==========================================
struct DatasetRow {
    dataset_id: String,
    owner: String,
    file_name: String,
    uploaded_at: DateTime<Utc>,
    summary_json: String,
    records_json: Option<String>,
}

impl DatasetRow {
    fn from_row(row: &Row, with_records: bool) -> rusqlite::Result<Self> {
        Ok(Self {
            dataset_id: row.get(0)?,
            owner: row.get(1)?,
            file_name: row.get(2)?,
            uploaded_at: row.get(3)?,
            summary_json: row.get(4)?,
            records_json: if with_records { Some(row.get(5)?) } else { None },
        })
    }

    fn into_meta(self) -> RepositoryResult<DatasetMeta> {
        Ok(DatasetMeta {
            id: self.dataset_id,
            owner: self.owner,
            file_name: self.file_name,
            uploaded_at: self.uploaded_at,
            summary: serde_json::from_str(&self.summary_json)?,
        })
    }

    fn into_dataset(self) -> RepositoryResult<Dataset> {
        let records: Vec<EquipmentRecord> = match &self.records_json {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };
        let meta = self.into_meta()?;
        Ok(Dataset {
            id: meta.id,
            owner: meta.owner,
            file_name: meta.file_name,
            uploaded_at: meta.uploaded_at,
            records,
            summary: meta.summary,
        })
    }
}

// ==========================================
// SqliteDatasetRepository
// ==========================================
pub struct SqliteDatasetRepository {
    conn: Arc<Mutex<Connection>>,
    owner_locks: OwnerLockRegistry<()>,
}

impl SqliteDatasetRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（建表幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self {
            conn,
            owner_locks: OwnerLockRegistry::new(|| ()),
        };
        init_schema(&*repo.get_conn()?)?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn find_one(&self, sql: &str, key: &str, owner: &str) -> RepositoryResult<Option<Dataset>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let row = stmt
            .query_row(params![key, owner], |row| DatasetRow::from_row(row, true))
            .optional()?;
        row.map(DatasetRow::into_dataset).transpose()
    }
}

impl DatasetRepository for SqliteDatasetRepository {
    fn put(
        &self,
        owner: &str,
        file_name: &str,
        records: Vec<EquipmentRecord>,
        summary: Summary,
    ) -> RepositoryResult<Dataset> {
        // 用户临界区：追加 + 淘汰
        let slot = self.owner_locks.slot(owner)?;
        let _owner_guard = slot
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let last_uploaded: Option<DateTime<Utc>> = tx
            .query_row(
                "SELECT uploaded_at FROM equipment_dataset WHERE owner = ?1 ORDER BY seq DESC LIMIT 1",
                params![owner],
                |row| row.get(0),
            )
            .optional()?;
        let now = Utc::now();
        let uploaded_at = match last_uploaded {
            Some(last) if last > now => last,
            _ => now,
        };

        let dataset = Dataset {
            id: Uuid::new_v4().to_string(),
            owner: owner.to_string(),
            file_name: file_name.to_string(),
            uploaded_at,
            records,
            summary,
        };

        tx.execute(
            r#"
            INSERT INTO equipment_dataset (
                dataset_id, owner, file_name, uploaded_at, summary_json, records_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                dataset.id,
                dataset.owner,
                dataset.file_name,
                dataset.uploaded_at,
                serde_json::to_string(&dataset.summary)?,
                serde_json::to_string(&dataset.records)?,
            ],
        )?;

        let evicted = tx.execute(
            r#"
            DELETE FROM equipment_dataset
            WHERE owner = ?1
              AND seq NOT IN (
                SELECT seq FROM equipment_dataset
                WHERE owner = ?1
                ORDER BY seq DESC
                LIMIT ?2
              )
            "#,
            params![owner, HISTORY_LIMIT as i64],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        if evicted > 0 {
            tracing::debug!(owner = %owner, evicted, "历史超限，淘汰最旧数据集");
        }

        Ok(dataset)
    }

    fn get_latest(&self, owner: &str) -> RepositoryResult<Dataset> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT dataset_id, owner, file_name, uploaded_at, summary_json, records_json
            FROM equipment_dataset
            WHERE owner = ?1
            ORDER BY seq DESC
            LIMIT 1
            "#,
        )?;
        let row = stmt
            .query_row(params![owner], |row| DatasetRow::from_row(row, true))
            .optional()?;

        match row {
            Some(r) => r.into_dataset(),
            None => Err(RepositoryError::dataset_not_found("latest")),
        }
    }

    fn get(&self, owner: &str, id: &str) -> RepositoryResult<Dataset> {
        self.find_one(
            r#"
            SELECT dataset_id, owner, file_name, uploaded_at, summary_json, records_json
            FROM equipment_dataset
            WHERE dataset_id = ?1 AND owner = ?2
            "#,
            id,
            owner,
        )?
        .ok_or_else(|| RepositoryError::dataset_not_found(id))
    }

    fn list_history(&self, owner: &str) -> RepositoryResult<Vec<DatasetMeta>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT dataset_id, owner, file_name, uploaded_at, summary_json
            FROM equipment_dataset
            WHERE owner = ?1
            ORDER BY seq DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt
            .query_map(params![owner, HISTORY_LIMIT as i64], |row| {
                DatasetRow::from_row(row, false)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(DatasetRow::into_meta).collect()
    }

    fn count(&self, owner: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row(
            "SELECT COUNT(*) FROM equipment_dataset WHERE owner = ?1",
            params![owner],
            |row| row.get(0),
        )?;
        Ok(n as usize)
    }
}
