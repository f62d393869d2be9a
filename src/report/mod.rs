// ==========================================
// 化工设备参数分析系统 - 报告层
// ==========================================
// 职责: 从不可变数据集渲染 PDF 报告快照
// ==========================================

pub mod equipment_report;
pub mod error;
pub mod pdf_writer;

pub use equipment_report::{report_file_name, ReportFile, ReportRenderer, PDF_CONTENT_TYPE};
pub use error::{ReportError, ReportResult};
