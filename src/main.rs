// ==========================================
// 化工设备参数分析系统 - 命令行入口
// ==========================================
// 用法:
//   chem-equipment-analytics ingest <owner> <file.csv> [more.csv ...]
//   chem-equipment-analytics history <owner>
//   chem-equipment-analytics summary <owner> [dataset_id]
//   chem-equipment-analytics report <owner> <out.pdf> [dataset_id]
//   chem-equipment-analytics config [set <key> <value>]
//
// 数据库路径: CHEM_EQUIPMENT_DB_PATH 或用户数据目录
// ==========================================

use chem_equipment_analytics::app::{get_default_db_path, AppState};
use chem_equipment_analytics::{logging, ApiError, APP_NAME, VERSION};
use std::path::Path;

const USAGE: &str = "用法:
  chem-equipment-analytics ingest <owner> <file.csv> [more.csv ...]
  chem-equipment-analytics history <owner>
  chem-equipment-analytics summary <owner> [dataset_id]
  chem-equipment-analytics report <owner> <out.pdf> [dataset_id]
  chem-equipment-analytics config [set <key> <value>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => {
            eprintln!("{} v{}\n\n{}", APP_NAME, VERSION, USAGE);
            std::process::exit(2);
        }
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let api = &state.dataset_api;

    let outcome = match (command, rest) {
        ("ingest", [owner, files @ ..]) if !files.is_empty() => {
            let mut payloads = Vec::with_capacity(files.len());
            for file in files {
                let bytes = std::fs::read(file)?;
                let name = Path::new(file)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| file.clone());
                payloads.push((name, bytes));
            }

            let mut failed = false;
            for (file, result) in files.iter().zip(api.batch_upload(owner, payloads).await) {
                match result {
                    Ok(summary) => println!("{}: {}", file, serde_json::to_string(&summary)?),
                    Err(e) => {
                        failed = true;
                        println!("{}: {}", file, serde_json::to_string(&e.to_response())?);
                    }
                }
            }
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        ("history", [owner]) => api
            .get_history(owner)
            .and_then(|h| print_json(&h)),
        ("summary", [owner, rest @ ..]) if rest.len() <= 1 => api
            .get_summary(owner, rest.first().map(String::as_str))
            .and_then(|s| print_json(&s)),
        ("report", [owner, out, rest @ ..]) if rest.len() <= 1 => {
            match api.get_report(owner, rest.first().map(String::as_str)).await {
                Ok(report) => {
                    std::fs::write(out, &report.bytes)?;
                    println!("{} -> {} ({} bytes)", report.file_name, out, report.bytes.len());
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        ("config", []) => state
            .config_manager
            .get_config_snapshot()
            .map(|snapshot| println!("{}", snapshot))
            .map_err(|e| ApiError::ConfigError(e.to_string())),
        ("config", [set, key, value]) if set == "set" => state
            .config_manager
            .update_config(key, value)
            .map_err(|e| ApiError::ConfigError(e.to_string())),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = outcome {
        eprintln!("{}", serde_json::to_string(&e.to_response())?);
        std::process::exit(1);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ApiError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
