// ==========================================
// 化工设备参数分析系统 - 设备数据导入器实现
// ==========================================
// 职责: 整合导入流程，从原始字节到数据集仓储
// 流程: 解析 → 结构校验 → 汇总 → 落库（保留最近 5 个）
// 红线: 落库之前的任何失败都不写入任何数据
// ==========================================

use crate::config::UploadConfigReader;
use crate::domain::Summary;
use crate::engine::SummaryEngine;
use crate::importer::equipment_importer_trait::{EquipmentImporter, FileParser, SchemaValidator};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::CsvParser;
use crate::importer::schema_validator::SchemaValidator as SchemaValidatorImpl;
use crate::repository::DatasetRepository;
use crate::config::config_keys;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// EquipmentImporterImpl - 设备数据导入器实现
// ==========================================
pub struct EquipmentImporterImpl<R, C>
where
    R: DatasetRepository,
    C: UploadConfigReader,
{
    // 数据访问层（与查询接口共享）
    dataset_repo: Arc<R>,

    // 配置读取器
    config: Arc<C>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    schema_validator: Box<dyn SchemaValidator>,
    summary_engine: SummaryEngine,
}

impl<R, C> EquipmentImporterImpl<R, C>
where
    R: DatasetRepository,
    C: UploadConfigReader,
{
    /// 创建新的 EquipmentImporter 实例
    ///
    /// # 参数
    /// - dataset_repo: 数据集仓储
    /// - config: 配置读取器
    /// - file_parser: 文件解析器
    /// - schema_validator: 结构校验器
    /// - summary_engine: 汇总引擎
    pub fn new(
        dataset_repo: Arc<R>,
        config: Arc<C>,
        file_parser: Box<dyn FileParser>,
        schema_validator: Box<dyn SchemaValidator>,
        summary_engine: SummaryEngine,
    ) -> Self {
        Self {
            dataset_repo,
            config,
            file_parser,
            schema_validator,
            summary_engine,
        }
    }

    /// 使用默认组件（CSV 解析 + 严格校验）
    pub fn with_defaults(dataset_repo: Arc<R>, config: Arc<C>) -> Self {
        Self::new(
            dataset_repo,
            config,
            Box::new(CsvParser),
            Box::new(SchemaValidatorImpl),
            SummaryEngine::new(),
        )
    }
}

#[async_trait::async_trait]
impl<R, C> EquipmentImporter for EquipmentImporterImpl<R, C>
where
    R: DatasetRepository,
    C: UploadConfigReader,
{
    #[instrument(skip(self, raw_bytes), fields(size = raw_bytes.len()))]
    async fn upload(
        &self,
        owner: &str,
        file_name: &str,
        raw_bytes: &[u8],
    ) -> ImportResult<Summary> {
        info!("开始导入设备数据");

        let max_upload_bytes = self.config.get_max_upload_bytes().await.map_err(|e| {
            ImportError::ConfigReadError {
                key: config_keys::UPLOAD_MAX_BYTES.to_string(),
                message: e.to_string(),
            }
        })?;

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let table = self
            .file_parser
            .parse_to_raw_table(file_name, raw_bytes, max_upload_bytes)
            .map_err(|e| {
                warn!(error = %e, "文件解析失败");
                e
            })?;
        info!(
            columns = table.headers.len(),
            rows = table.rows.len(),
            "文件解析完成"
        );

        // === 步骤 2: 结构与数值校验 ===
        debug!("步骤 2: 结构校验");
        let records = self.schema_validator.validate(&table).map_err(|e| {
            warn!(error = %e, "结构校验失败，拒绝上传");
            e
        })?;

        // === 步骤 3: 汇总 ===
        debug!("步骤 3: 汇总统计");
        let summary = self.summary_engine.summarize(&records);

        // === 步骤 4: 落库 + 历史淘汰 ===
        debug!("步骤 4: 保存数据集");
        let dataset = self
            .dataset_repo
            .put(owner, file_name, records, summary)
            .map_err(|e| {
                error!(error = %e, "数据集保存失败");
                ImportError::from(e)
            })?;

        info!(
            dataset_id = %dataset.id,
            total_equipment = dataset.summary.total_equipment,
            "设备数据导入完成"
        );
        Ok(dataset.summary)
    }

    async fn batch_upload(
        &self,
        owner: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Vec<ImportResult<Summary>> {
        use futures::future::join_all;

        info!(count = files.len(), "开始批量导入文件");

        // 为每个文件创建导入任务
        let upload_tasks = files.iter().map(|(file_name, bytes)| async move {
            let result = self.upload(owner, file_name, bytes).await;
            match &result {
                Err(e) if e.is_input_error() => {
                    warn!(file = %file_name, error = %e, "文件内容不合格，已拒绝")
                }
                Err(e) => error!(file = %file_name, error = %e, "文件导入失败"),
                Ok(_) => {}
            }
            result
        });

        // 并发执行所有导入任务
        let results = join_all(upload_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadConfig;
    use crate::repository::MemoryDatasetRepository;

    const VALID_CSV: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                             Pump-1,Pump,10,1,20\n\
                             Pump-2,Pump,20,3,30\n\
                             Valve-1,Valve,15,2,25\n";

    fn create_importer(
        config: UploadConfig,
    ) -> (
        Arc<MemoryDatasetRepository>,
        EquipmentImporterImpl<MemoryDatasetRepository, UploadConfig>,
    ) {
        let repo = Arc::new(MemoryDatasetRepository::new());
        let importer = EquipmentImporterImpl::with_defaults(repo.clone(), Arc::new(config));
        (repo, importer)
    }

    #[tokio::test]
    async fn test_upload_returns_summary_and_stores_dataset() {
        let (repo, importer) = create_importer(UploadConfig::default());

        let summary = importer
            .upload("alice", "plant.csv", VALID_CSV.as_bytes())
            .await
            .unwrap();

        assert_eq!(summary.total_equipment, 3);
        assert_eq!(summary.average_flowrate, 15.0);
        assert_eq!(summary.type_distribution.get("Pump"), Some(&2));

        let latest = repo.get_latest("alice").unwrap();
        assert_eq!(latest.summary, summary);
        assert_eq!(latest.file_name, "plant.csv");
        assert_eq!(latest.records.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_upload_stores_nothing() {
        let (repo, importer) = create_importer(UploadConfig::default());
        let csv = "Equipment Name,Type,Flowrate,Temperature\nPump-1,Pump,10,20\n";

        let result = importer.upload("alice", "bad.csv", csv.as_bytes()).await;

        assert!(matches!(result, Err(ImportError::SchemaError { .. })));
        assert_eq!(repo.count("alice").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_configured_limit_applies() {
        let config = UploadConfig {
            max_upload_bytes: 32,
            ..UploadConfig::default()
        };
        let (repo, importer) = create_importer(config);

        let result = importer.upload("alice", "big.csv", VALID_CSV.as_bytes()).await;

        assert!(matches!(
            result,
            Err(ImportError::PayloadTooLarge { limit: 32, .. })
        ));
        assert_eq!(repo.count("alice").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_batch_upload_keeps_order_and_independence() {
        let (repo, importer) = create_importer(UploadConfig::default());
        let files = vec![
            ("a.csv".to_string(), VALID_CSV.as_bytes().to_vec()),
            ("b.txt".to_string(), VALID_CSV.as_bytes().to_vec()),
            ("c.csv".to_string(), VALID_CSV.as_bytes().to_vec()),
        ];

        let results = importer.batch_upload("alice", files).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(ImportError::UnsupportedFormat(_))));
        assert!(results[2].is_ok());
        assert_eq!(repo.count("alice").unwrap(), 2);
    }
}
