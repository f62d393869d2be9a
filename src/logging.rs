// ==========================================
// 化工设备参数分析系统 - 日志初始化
// ==========================================
// 输出: 文本（终端排查）或 JSON（采集入库）
// 导入管道的 span 带 owner / file_name / size 字段，
// 拒绝上传记录为 warn，落库失败记录为 error
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志格式环境变量（取值 json 时输出结构化 JSON）
pub const LOG_FORMAT_ENV: &str = "CHEM_EQUIPMENT_LOG_FORMAT";

/// 未设置 RUST_LOG 时的过滤规则：本系统 info，第三方库只报 warn
const DEFAULT_FILTER: &str = "warn,chem_equipment_analytics=info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 解析格式取值；未知取值按文本处理
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// 初始化日志系统（CLI 入口调用一次）
///
/// # 环境变量
/// - RUST_LOG: 覆盖默认过滤规则，如 RUST_LOG=chem_equipment_analytics::importer=debug
/// - CHEM_EQUIPMENT_LOG_FORMAT: text（默认）/ json
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match LogFormat::from_env() {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .init(),
    }
}

/// 测试用：debug 级别写入测试输出，重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" JSON ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("text")), LogFormat::Text);
        assert_eq!(LogFormat::parse(Some("yaml")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }

    #[test]
    fn test_default_filter_is_valid() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
