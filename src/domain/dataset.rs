// ==========================================
// 化工设备参数分析系统 - 数据集领域模型
// ==========================================
// 职责: 定义数据集、汇总统计、历史条目、图表数据
// 红线: 数据集创建后不可变（重新上传 = 新数据集）
// ==========================================

use crate::domain::equipment::EquipmentRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 每个用户保留的历史数据集上限
pub const HISTORY_LIMIT: usize = 5;

// ==========================================
// Summary - 汇总统计
// ==========================================
// 不变量: total_equipment == type_distribution 计数之和 == 记录数
// 说明: 平均值不做舍入（舍入属于展示层）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_equipment: usize,
    pub average_flowrate: f64,
    pub average_pressure: f64,
    pub average_temperature: f64,
    pub type_distribution: BTreeMap<String, usize>,

    // ===== 范围统计 =====
    pub min_flowrate: f64,
    pub max_flowrate: f64,
    pub min_pressure: f64,
    pub max_pressure: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
}

// ==========================================
// Dataset - 数据集
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub owner: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub records: Vec<EquipmentRecord>,
    pub summary: Summary,
}

impl Dataset {
    /// 历史视图（不含原始记录）
    pub fn meta(&self) -> DatasetMeta {
        DatasetMeta {
            id: self.id.clone(),
            owner: self.owner.clone(),
            file_name: self.file_name.clone(),
            uploaded_at: self.uploaded_at,
            summary: self.summary.clone(),
        }
    }
}

// ==========================================
// DatasetMeta - 历史条目（元数据 + 汇总）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub id: String,
    pub owner: String,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub summary: Summary,
}

// ==========================================
// ChartData - 图表数据（供前端/桌面端绘图）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub type_distribution: DistributionSeries,
    pub averages: AverageSeries,
    pub trend: TrendSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSeries {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageSeries {
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// 按记录索引寻址的趋势序列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub names: Vec<String>,
    pub flowrate: Vec<f64>,
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
}
