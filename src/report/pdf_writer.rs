// ==========================================
// 化工设备参数分析系统 - 最小 PDF 1.4 写出器
// ==========================================
// 职责: 固定版式的文本/表格排版 + 自动分页
// 红线: 输出只由输入决定（不写入创建时间等易变元数据）
// 字体: 内置 Type1 Helvetica / Helvetica-Bold（仅 ASCII，其余字符以 '?' 代替）
// ==========================================

use crate::report::error::{ReportError, ReportResult};
use std::fmt::Write as _;

/// A4 纵向（单位: pt）
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN: f64 = 50.0;

const LINE_SPACING: f64 = 1.4;
const FOOTER_FONT_SIZE: f64 = 8.0;
// Helvetica 平均字宽约为字号的一半
const AVG_CHAR_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

// ==========================================
// PdfWriter - 排版状态 + 页面内容流
// ==========================================
pub struct PdfWriter {
    title: String,
    pages: Vec<String>,
    cursor_y: f64,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            pages: vec![String::new()],
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// 可用排版宽度
    pub fn content_width(&self) -> f64 {
        PAGE_WIDTH - 2.0 * MARGIN
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 写一行文本（超出宽度时截断）
    pub fn text_line(&mut self, text: &str, font: Font, size: f64) -> ReportResult<()> {
        self.ensure_space(size * LINE_SPACING);
        self.cursor_y -= size * LINE_SPACING;
        let fitted = fit_to_width(text, self.content_width(), size);
        let y = self.cursor_y;
        self.put_text(MARGIN, y, &fitted, font, size)
    }

    /// 写一行表格（按列宽截断各单元格）
    pub fn table_row(
        &mut self,
        cells: &[String],
        widths: &[f64],
        font: Font,
        size: f64,
    ) -> ReportResult<()> {
        if cells.len() != widths.len() {
            return Err(ReportError::LayoutError(format!(
                "单元格数量 {} 与列宽数量 {} 不一致",
                cells.len(),
                widths.len()
            )));
        }

        self.ensure_space(size * LINE_SPACING);
        self.cursor_y -= size * LINE_SPACING;
        let y = self.cursor_y;

        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(widths) {
            let fitted = fit_to_width(cell, width - 4.0, size);
            self.put_text(x, y, &fitted, font, size)?;
            x += width;
        }
        Ok(())
    }

    /// 垂直留白
    pub fn spacer(&mut self, height: f64) {
        self.cursor_y -= height;
        if self.cursor_y < MARGIN {
            self.new_page();
        }
    }

    /// 当前页剩余高度不足时强制换页
    pub fn ensure_space(&mut self, height: f64) {
        if self.cursor_y - height < MARGIN + FOOTER_FONT_SIZE * 2.0 {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages.push(String::new());
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    fn put_text(&mut self, x: f64, y: f64, text: &str, font: Font, size: f64) -> ReportResult<()> {
        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| ReportError::RenderError("没有可写入的页面".to_string()))?;
        writeln!(
            page,
            "BT /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
            font.resource_name(),
            size,
            x,
            y,
            escape_pdf_string(text)
        )?;
        Ok(())
    }

    /// 生成完整 PDF 字节（整份文档在内存中构建完毕后才返回）
    pub fn finish(mut self) -> ReportResult<Vec<u8>> {
        let total = self.pages.len();
        for (idx, page) in self.pages.iter_mut().enumerate() {
            let footer = format!("Page {} / {}", idx + 1, total);
            writeln!(
                page,
                "BT /F1 {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
                FOOTER_FONT_SIZE,
                MARGIN,
                MARGIN - FOOTER_FONT_SIZE,
                footer
            )?;
        }

        // 对象编号: 1 Catalog, 2 Pages, 3/4 字体, 5 Info, 之后每页 (Page, Contents)
        let first_page_obj = 6;
        let mut objects: Vec<String> = Vec::with_capacity(5 + total * 2);

        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());

        let kids = (0..total)
            .map(|i| format!("{} 0 R", first_page_obj + i * 2))
            .collect::<Vec<_>>()
            .join(" ");
        objects.push(format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, total));

        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
        );
        objects.push(format!(
            "<< /Title ({}) /Producer (chem-equipment-analytics) >>",
            escape_pdf_string(&self.title)
        ));

        for (idx, content) in self.pages.iter().enumerate() {
            let contents_obj = first_page_obj + idx * 2 + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents {} 0 R /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> >>",
                PAGE_WIDTH, PAGE_HEIGHT, contents_obj
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ));
        }

        let mut pdf: Vec<u8> = Vec::new();
        pdf.extend_from_slice(b"%PDF-1.4\n");
        pdf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut xref_positions = Vec::with_capacity(objects.len());
        for (idx, body) in objects.iter().enumerate() {
            xref_positions.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", idx + 1, body).as_bytes());
        }

        let xref_start = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for pos in &xref_positions {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", pos).as_bytes());
        }

        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_start
            )
            .as_bytes(),
        );

        Ok(pdf)
    }
}

/// 转义 PDF 字符串字面量；非 ASCII 可打印字符替换为 '?'
pub fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// 按估算字宽截断文本，截断时以 "..." 结尾
fn fit_to_width(text: &str, width: f64, size: f64) -> String {
    let max_chars = (width / (size * AVG_CHAR_WIDTH)).floor().max(0.0) as usize;
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return text.chars().take(max_chars).collect();
    }
    let mut fitted: String = text.chars().take(max_chars - 3).collect();
    fitted.push_str("...");
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_pdf_string("泵 P-1"), "? P-1");
        assert_eq!(escape_pdf_string("tab\there"), "tab?here");
    }

    #[test]
    fn test_fit_to_width_truncates() {
        // 100pt / (10pt * 0.5) = 20 chars
        assert_eq!(fit_to_width("short", 100.0, 10.0), "short");
        let long = "x".repeat(30);
        let fitted = fit_to_width(&long, 100.0, 10.0);
        assert_eq!(fitted.chars().count(), 20);
        assert!(fitted.ends_with("..."));
    }

    #[test]
    fn test_single_page_document_structure() {
        let mut writer = PdfWriter::new("Demo");
        writer.text_line("Hello", Font::Bold, 14.0).unwrap();
        let pdf = writer.finish().unwrap();
        let text = String::from_utf8_lossy(&pdf);

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("(Page 1 / 1) Tj"));
    }

    #[test]
    fn test_startxref_points_to_xref_table() {
        let mut writer = PdfWriter::new("Demo");
        writer.text_line("Hello", Font::Regular, 10.0).unwrap();
        let pdf = writer.finish().unwrap();
        let text = String::from_utf8_lossy(&pdf).to_string();

        let tail = text.rsplit("startxref\n").next().unwrap();
        let offset: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(pdf[offset..].starts_with(b"xref\n"));
    }

    #[test]
    fn test_overflow_creates_new_pages() {
        let mut writer = PdfWriter::new("Long");
        for i in 0..200 {
            writer
                .text_line(&format!("line {}", i), Font::Regular, 10.0)
                .unwrap();
        }
        assert!(writer.page_count() > 1);
        let pages = writer.page_count();
        let pdf = writer.finish().unwrap();
        let text = String::from_utf8_lossy(&pdf);
        assert!(text.contains(&format!("/Count {}", pages)));
        assert!(text.contains(&format!("(Page {} / {}) Tj", pages, pages)));
    }

    #[test]
    fn test_table_row_rejects_mismatched_widths() {
        let mut writer = PdfWriter::new("Bad");
        let result = writer.table_row(&["a".to_string()], &[10.0, 20.0], Font::Regular, 9.0);
        assert!(matches!(result, Err(ReportError::LayoutError(_))));
    }
}
