// ==========================================
// 化工设备参数分析系统 - 数据集 API
// ==========================================
// 职责: 上传、汇总查询、历史、图表数据、PDF 报告
// 前置条件: owner 已由外部认证确认（本层不做鉴权）
// ==========================================

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{defaults, UploadConfigReader};
use crate::domain::{ChartData, Dataset, DatasetMeta, Summary};
use crate::engine::SummaryEngine;
use crate::importer::{EquipmentImporter, EquipmentImporterImpl};
use crate::report::{ReportFile, ReportRenderer};
use crate::repository::DatasetRepository;

// ==========================================
// DatasetApi - 数据集 API
// ==========================================

/// 数据集API
///
/// 职责：
/// 1. 上传（唯一写入路径，委托给导入器）
/// 2. 汇总 / 数据集 / 图表数据查询（id 缺省时取最新）
/// 3. 历史列表（≤5，最新在前）
/// 4. PDF 报告
pub struct DatasetApi<R, C>
where
    R: DatasetRepository,
    C: UploadConfigReader,
{
    dataset_repo: Arc<R>,
    config: Arc<C>,
    importer: EquipmentImporterImpl<R, C>,
    summary_engine: SummaryEngine,
}

impl<R, C> DatasetApi<R, C>
where
    R: DatasetRepository,
    C: UploadConfigReader,
{
    /// 创建新的DatasetApi实例
    ///
    /// # 参数
    /// - dataset_repo: 数据集仓储（与导入器共享）
    /// - config: 配置读取器
    pub fn new(dataset_repo: Arc<R>, config: Arc<C>) -> Self {
        let importer = EquipmentImporterImpl::with_defaults(dataset_repo.clone(), config.clone());
        Self {
            dataset_repo,
            config,
            importer,
            summary_engine: SummaryEngine::new(),
        }
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 上传 CSV，返回新数据集的汇总
    pub async fn upload(&self, owner: &str, file_name: &str, raw_bytes: &[u8]) -> ApiResult<Summary> {
        self.importer
            .upload(owner, file_name, raw_bytes)
            .await
            .map_err(ApiError::from)
    }

    /// 批量上传（各文件独立成功/失败，结果顺序与输入一致）
    pub async fn batch_upload(
        &self,
        owner: &str,
        files: Vec<(String, Vec<u8>)>,
    ) -> Vec<ApiResult<Summary>> {
        self.importer
            .batch_upload(owner, files)
            .await
            .into_iter()
            .map(|r| r.map_err(ApiError::from))
            .collect()
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 汇总统计
    ///
    /// # 参数
    /// - owner: 用户标识
    /// - dataset_id: 数据集 id；None 表示最新
    pub fn get_summary(&self, owner: &str, dataset_id: Option<&str>) -> ApiResult<Summary> {
        Ok(self.resolve(owner, dataset_id)?.summary)
    }

    /// 完整数据集（记录 + 汇总）
    pub fn get_dataset(&self, owner: &str, dataset_id: &str) -> ApiResult<Dataset> {
        self.resolve(owner, Some(dataset_id))
    }

    /// 图表数据（类型分布、平均值、按记录索引的趋势）
    pub fn get_chart_data(&self, owner: &str, dataset_id: Option<&str>) -> ApiResult<ChartData> {
        let dataset = self.resolve(owner, dataset_id)?;
        Ok(self
            .summary_engine
            .chart_data(&dataset.summary, &dataset.records))
    }

    /// 历史列表（≤5，最新在前；无历史时为空列表）
    pub fn get_history(&self, owner: &str) -> ApiResult<Vec<DatasetMeta>> {
        let history = self.dataset_repo.list_history(owner)?;
        debug!(owner = %owner, count = history.len(), "查询历史");
        Ok(history)
    }

    // ==========================================
    // 报告接口
    // ==========================================

    /// 渲染 PDF 报告
    ///
    /// # 返回
    /// - Ok(ReportFile): 完整 PDF（不会返回部分内容）
    /// - Err(ApiError::NotFound): 数据集不存在或不属于该用户
    /// - Err(ApiError::RenderError): 渲染失败（细节写入日志）
    pub async fn get_report(&self, owner: &str, dataset_id: Option<&str>) -> ApiResult<ReportFile> {
        let dataset = self.resolve(owner, dataset_id)?;

        let title = match self.config.get_report_title().await {
            Ok(title) => title,
            Err(e) => {
                warn!(error = %e, "报告标题读取失败，使用默认标题");
                defaults::REPORT_TITLE.to_string()
            }
        };

        let report = ReportRenderer::new(title)
            .render(&dataset, dataset_id)
            .map_err(|e| {
                error!(owner = %owner, dataset_id = %dataset.id, error = %e, "报告渲染失败");
                ApiError::from(e)
            })?;

        info!(
            owner = %owner,
            dataset_id = %dataset.id,
            bytes = report.bytes.len(),
            "报告生成完成"
        );
        Ok(report)
    }

    fn resolve(&self, owner: &str, dataset_id: Option<&str>) -> ApiResult<Dataset> {
        let dataset = match dataset_id {
            Some(id) => self.dataset_repo.get(owner, id),
            None => self.dataset_repo.get_latest(owner),
        };
        dataset.map_err(|e| {
            debug!(owner = %owner, dataset_id = ?dataset_id, error = %e, "数据集查询失败");
            ApiError::from(e)
        })
    }
}
