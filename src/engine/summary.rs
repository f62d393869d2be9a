// ==========================================
// 化工设备参数分析系统 - 汇总统计引擎
// ==========================================
// 职责: 从校验后的设备记录计算汇总统计 + 图表数据
// 红线: 纯函数、单次遍历、确定性（相同输入 → 逐位相同输出）
// 前置条件: 记录非空（由结构校验器保证）
// ==========================================

use crate::domain::{
    AverageSeries, ChartData, DistributionSeries, EquipmentRecord, NumericColumn, Summary,
    TrendSeries,
};
use std::collections::BTreeMap;

// ==========================================
// FieldAccumulator - 单列累加器
// ==========================================
#[derive(Debug, Clone, Copy)]
struct FieldAccumulator {
    count: f64,
    sum: f64,
    // 逐项预除 count 的和；sum 溢出时使用，|scaled_sum| 不超过最大输入值
    scaled_sum: f64,
    min: f64,
    max: f64,
}

impl FieldAccumulator {
    fn new(count: usize) -> Self {
        Self {
            count: count as f64,
            sum: 0.0,
            scaled_sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.scaled_sum += value / self.count;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// 有限输入的均值必须有限
    fn mean(&self) -> f64 {
        if self.sum.is_finite() {
            self.sum / self.count
        } else {
            self.scaled_sum
        }
    }
}

// ==========================================
// SummaryEngine - 汇总统计引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryEngine;

impl SummaryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 计算汇总统计
    ///
    /// # 参数
    /// - records: 非空设备记录（有序）
    ///
    /// # 返回
    /// - Summary: 计数、三项平均值、范围、类型分布
    pub fn summarize(&self, records: &[EquipmentRecord]) -> Summary {
        debug_assert!(!records.is_empty(), "summarize requires at least one record");

        let count = records.len();
        let mut flowrate = FieldAccumulator::new(count);
        let mut pressure = FieldAccumulator::new(count);
        let mut temperature = FieldAccumulator::new(count);
        let mut type_distribution: BTreeMap<String, usize> = BTreeMap::new();

        for record in records {
            flowrate.push(record.flowrate);
            pressure.push(record.pressure);
            temperature.push(record.temperature);
            *type_distribution
                .entry(record.equipment_type.clone())
                .or_insert(0) += 1;
        }

        Summary {
            total_equipment: count,
            average_flowrate: flowrate.mean(),
            average_pressure: pressure.mean(),
            average_temperature: temperature.mean(),
            type_distribution,
            min_flowrate: flowrate.min,
            max_flowrate: flowrate.max,
            min_pressure: pressure.min,
            max_pressure: pressure.max,
            min_temperature: temperature.min,
            max_temperature: temperature.max,
        }
    }

    /// 生成图表数据（类型分布 / 平均值 / 按索引的趋势序列）
    pub fn chart_data(&self, summary: &Summary, records: &[EquipmentRecord]) -> ChartData {
        let (labels, values) = summary
            .type_distribution
            .iter()
            .map(|(label, count)| (label.clone(), *count))
            .unzip();

        let series = |column: NumericColumn| -> Vec<f64> {
            records.iter().map(|r| r.value(column)).collect()
        };

        ChartData {
            type_distribution: DistributionSeries { labels, values },
            averages: AverageSeries {
                flowrate: summary.average_flowrate,
                pressure: summary.average_pressure,
                temperature: summary.average_temperature,
            },
            trend: TrendSeries {
                names: records.iter().map(|r| r.name.clone()).collect(),
                flowrate: series(NumericColumn::Flowrate),
                pressure: series(NumericColumn::Pressure),
                temperature: series(NumericColumn::Temperature),
            },
        }
    }
}
