// ==========================================
// 化工设备参数分析系统 - 设备参数报告
// ==========================================
// 职责: 将单个数据集渲染为固定版式 PDF
// 版式: 标题 → 文件信息 → 汇总 → 范围 → 类型分布 → 全部记录（按存储顺序）
// 红线: 同一数据集两次渲染输出逐字节一致
// ==========================================

use crate::domain::{Dataset, NumericColumn};
use crate::report::error::ReportResult;
use crate::report::pdf_writer::{Font, PdfWriter};
use serde::Serialize;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const TITLE_SIZE: f64 = 18.0;
const SECTION_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 10.0;
const TABLE_SIZE: f64 = 9.0;

// ==========================================
// ReportFile - 渲染结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFile {
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// 报告文件名：指定 id 时带 id，否则为 latest
pub fn report_file_name(requested_id: Option<&str>) -> String {
    match requested_id {
        Some(id) => format!("equipment_report_{}.pdf", id),
        None => "equipment_report_latest.pdf".to_string(),
    }
}

// ==========================================
// ReportRenderer
// ==========================================
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    title: String,
}

impl ReportRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// 渲染数据集报告
    ///
    /// # 参数
    /// - dataset: 已解析的数据集（调用方负责所有权校验）
    /// - requested_id: 调用方请求的 id（None 表示"最新"）
    pub fn render(&self, dataset: &Dataset, requested_id: Option<&str>) -> ReportResult<ReportFile> {
        let bytes = self.render_bytes(dataset)?;
        Ok(ReportFile {
            file_name: report_file_name(requested_id),
            content_type: PDF_CONTENT_TYPE.to_string(),
            bytes,
        })
    }

    fn render_bytes(&self, dataset: &Dataset) -> ReportResult<Vec<u8>> {
        let summary = &dataset.summary;
        let mut pdf = PdfWriter::new(&self.title);
        let width = pdf.content_width();

        // 标题 + 文件信息
        pdf.text_line(&self.title, Font::Bold, TITLE_SIZE)?;
        pdf.spacer(6.0);
        pdf.text_line(&format!("File: {}", dataset.file_name), Font::Regular, BODY_SIZE)?;
        pdf.text_line(
            &format!(
                "Uploaded: {}",
                dataset.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Font::Regular,
            BODY_SIZE,
        )?;
        pdf.text_line(&format!("Dataset: {}", dataset.id), Font::Regular, BODY_SIZE)?;

        // 汇总
        pdf.spacer(10.0);
        pdf.text_line("Summary", Font::Bold, SECTION_SIZE)?;
        let pair = [width * 0.5, width * 0.5];
        for (label, value) in [
            ("Total Equipment", summary.total_equipment.to_string()),
            ("Average Flowrate", format_value(summary.average_flowrate)),
            ("Average Pressure", format_value(summary.average_pressure)),
            ("Average Temperature", format_value(summary.average_temperature)),
        ] {
            pdf.table_row(&[label.to_string(), value], &pair, Font::Regular, BODY_SIZE)?;
        }

        // 范围
        pdf.spacer(10.0);
        pdf.text_line("Parameter Ranges", Font::Bold, SECTION_SIZE)?;
        let range_widths = [width * 0.4, width * 0.3, width * 0.3];
        pdf.table_row(
            &["Parameter".to_string(), "Min".to_string(), "Max".to_string()],
            &range_widths,
            Font::Bold,
            TABLE_SIZE,
        )?;
        for column in NumericColumn::ALL {
            let (min, max) = match column {
                NumericColumn::Flowrate => (summary.min_flowrate, summary.max_flowrate),
                NumericColumn::Pressure => (summary.min_pressure, summary.max_pressure),
                NumericColumn::Temperature => (summary.min_temperature, summary.max_temperature),
            };
            pdf.table_row(
                &[
                    column.column_name().to_string(),
                    format_value(min),
                    format_value(max),
                ],
                &range_widths,
                Font::Regular,
                TABLE_SIZE,
            )?;
        }

        // 类型分布（BTreeMap 保证顺序）
        pdf.spacer(10.0);
        pdf.text_line("Equipment Type Distribution", Font::Bold, SECTION_SIZE)?;
        let dist_widths = [width * 0.6, width * 0.4];
        pdf.table_row(
            &["Type".to_string(), "Count".to_string()],
            &dist_widths,
            Font::Bold,
            TABLE_SIZE,
        )?;
        for (equipment_type, count) in &summary.type_distribution {
            pdf.table_row(
                &[equipment_type.clone(), count.to_string()],
                &dist_widths,
                Font::Regular,
                TABLE_SIZE,
            )?;
        }

        // 全部记录
        pdf.spacer(10.0);
        pdf.text_line("Equipment Records", Font::Bold, SECTION_SIZE)?;
        let record_widths = [
            width * 0.06,
            width * 0.28,
            width * 0.2,
            width * 0.15,
            width * 0.15,
            width * 0.16,
        ];
        let header = [
            "#",
            "Equipment Name",
            "Type",
            "Flowrate",
            "Pressure",
            "Temperature",
        ]
        .map(String::from);
        pdf.table_row(&header, &record_widths, Font::Bold, TABLE_SIZE)?;
        for (idx, record) in dataset.records.iter().enumerate() {
            pdf.table_row(
                &[
                    (idx + 1).to_string(),
                    record.name.clone(),
                    record.equipment_type.clone(),
                    format_value(record.flowrate),
                    format_value(record.pressure),
                    format_value(record.temperature),
                ],
                &record_widths,
                Font::Regular,
                TABLE_SIZE,
            )?;
        }

        pdf.finish()
    }
}

fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EquipmentRecord;
    use crate::engine::SummaryEngine;
    use chrono::{TimeZone, Utc};

    fn dataset(n: usize) -> Dataset {
        let records: Vec<EquipmentRecord> = (0..n)
            .map(|i| EquipmentRecord {
                name: format!("Pump-{}", i),
                equipment_type: if i % 2 == 0 { "Pump" } else { "Valve" }.to_string(),
                flowrate: 100.0 + i as f64,
                pressure: 5.5,
                temperature: 110.25,
            })
            .collect();
        let summary = SummaryEngine::new().summarize(&records);
        Dataset {
            id: "ds-1".to_string(),
            owner: "alice".to_string(),
            file_name: "plant (A).csv".to_string(),
            uploaded_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            records,
            summary,
        }
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name(Some("abc")), "equipment_report_abc.pdf");
        assert_eq!(report_file_name(None), "equipment_report_latest.pdf");
    }

    #[test]
    fn test_render_produces_pdf() {
        let renderer = ReportRenderer::new("Report");
        let file = renderer.render(&dataset(3), Some("ds-1")).unwrap();

        assert_eq!(file.content_type, PDF_CONTENT_TYPE);
        assert_eq!(file.file_name, "equipment_report_ds-1.pdf");
        assert!(file.bytes.starts_with(b"%PDF"));

        let text = String::from_utf8_lossy(&file.bytes);
        assert!(text.contains(r"(File: plant \(A\).csv) Tj"));
        assert!(text.contains("(Uploaded: 2024-03-01 08:30:00 UTC) Tj"));
        assert!(text.contains("(Pump-2) Tj"));
        assert!(text.contains("(101.00) Tj"));
    }

    #[test]
    fn test_render_is_byte_identical() {
        let renderer = ReportRenderer::new("Report");
        let ds = dataset(40);
        let first = renderer.render(&ds, None).unwrap();
        let second = renderer.render(&ds, None).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.file_name, "equipment_report_latest.pdf");
    }

    #[test]
    fn test_large_dataset_paginates() {
        let renderer = ReportRenderer::new("Report");
        let file = renderer.render(&dataset(300), None).unwrap();
        let text = String::from_utf8_lossy(&file.bytes);
        assert!(!text.contains("/Count 1 "));
        assert!(text.contains("(Pump-299) Tj"));
    }
}
