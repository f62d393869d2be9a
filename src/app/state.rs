// ==========================================
// 化工设备参数分析系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::DatasetApi;
use crate::config::ConfigManager;
use crate::db::{open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::SqliteDatasetRepository;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "CHEM_EQUIPMENT_DB_PATH";

const DB_FILE_NAME: &str = "chem_equipment.db";

/// 基于 SQLite 的数据集 API
pub type SqliteDatasetApi = DatasetApi<SqliteDatasetRepository, ConfigManager>;

/// 应用状态
///
/// 包含API实例和共享资源（仓储与配置共享同一连接）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 数据集API
    pub dataset_api: Arc<SqliteDatasetApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;

        // 拒绝由更新版本程序创建的数据库
        let found_version =
            read_schema_version(&conn).map_err(|e| format!("读取 schema_version 失败: {}", e))?;
        match found_version {
            Some(v) if v > CURRENT_SCHEMA_VERSION => {
                return Err(format!(
                    "数据库 schema_version={} 高于当前程序支持的 {}",
                    v, CURRENT_SCHEMA_VERSION
                ));
            }
            Some(v) => tracing::debug!(schema_version = v, "检测到已有数据库"),
            None => tracing::info!("新数据库，将初始化 schema"),
        }

        let conn = Arc::new(Mutex::new(conn));

        let dataset_repo = Arc::new(
            SqliteDatasetRepository::from_connection(conn.clone())
                .map_err(|e| format!("数据集仓储初始化失败: {}", e))?,
        );
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("配置管理器初始化失败: {}", e))?,
        );

        let dataset_api = Arc::new(DatasetApi::new(dataset_repo, config_manager.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            config_manager,
            dataset_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 CHEM_EQUIPMENT_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(format!("./{}", DB_FILE_NAME));

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("chem-equipment-analytics-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("chem-equipment-analytics");

        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join(DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_shares_connection() {
        let temp_file = NamedTempFile::new().unwrap();
        let state = AppState::new(temp_file.path().to_str().unwrap().to_string()).unwrap();

        state
            .config_manager
            .update_config(crate::config::config_keys::REPORT_TITLE, "Plant 7")
            .unwrap();
        state
            .dataset_api
            .upload(
                "alice",
                "a.csv",
                b"Equipment Name,Type,Flowrate,Pressure,Temperature\nP-1,Pump,1,2,3\n",
            )
            .await
            .unwrap();

        let report = state.dataset_api.get_report("alice", None).await.unwrap();
        assert!(String::from_utf8_lossy(&report.bytes).contains("(Plant 7) Tj"));
    }

    #[test]
    fn test_app_state_rejects_newer_schema() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();
        {
            let conn = open_sqlite_connection(&db_path).unwrap();
            crate::db::init_schema(&conn).unwrap();
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [CURRENT_SCHEMA_VERSION + 1],
            )
            .unwrap();
        }

        let err = AppState::new(db_path).err().unwrap();
        assert!(err.contains("schema_version"));
    }

    #[test]
    fn test_app_state_reopens_current_schema() {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        assert!(AppState::new(db_path.clone()).is_ok());
        assert!(AppState::new(db_path).is_ok());
    }
}
