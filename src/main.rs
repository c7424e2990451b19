// ==========================================
// 考勤导入引擎 - 命令行入口
// ==========================================
// 用法: attendance-import <数据库路径> <考勤表文件> [上传人ID]
// 配置: ATTENDANCE_IMPORT_CONFIG 指向 JSON 配置文件 (可选)
// ==========================================

use attendance_import::importer::AttendanceImporter;
use attendance_import::{
    AttendanceImporterImpl, AttendanceImportRepositoryImpl, ImportConfig, UniversalFileParser,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    attendance_import::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", attendance_import::APP_NAME, attendance_import::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("用法: {} <数据库路径> <考勤表文件> [上传人ID]", args[0]);
        return ExitCode::from(2);
    }
    let db_path = &args[1];
    let file_path = &args[2];
    let uploaded_by = args.get(3).and_then(|v| v.parse::<u64>().ok());

    // 配置: 环境变量指定 JSON 文件, 否则使用默认阈值
    let config = match std::env::var("ATTENDANCE_IMPORT_CONFIG") {
        Ok(path) => match std::fs::read_to_string(&path).map_err(anyhow::Error::from).and_then(|raw| {
            ImportConfig::from_json(&raw).map_err(anyhow::Error::from)
        }) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, config_path = %path, "配置加载失败");
                return ExitCode::FAILURE;
            }
        },
        Err(_) => ImportConfig::default(),
    };

    tracing::info!(db = %db_path, file = %file_path, "初始化仓储");
    let repo = match AttendanceImportRepositoryImpl::new(db_path) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "数据库初始化失败");
            return ExitCode::FAILURE;
        }
    };

    let importer = AttendanceImporterImpl::new(repo, config, Box::new(UniversalFileParser));

    match importer.import_from_file(file_path, uploaded_by).await {
        Ok(result) => {
            tracing::info!(
                batch_id = %result.batch_id,
                imported = result.imported,
                skipped = result.skipped,
                "导入完成"
            );
            for err in &result.errors {
                tracing::warn!(
                    row = err.row_number,
                    field = %err.field,
                    value = %err.value,
                    "{}", err.message
                );
            }
            if result.is_clean() {
                ExitCode::SUCCESS
            } else {
                // 部分成功: 结果已写库, 以退出码提示调用方关注错误清单
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "导入失败");
            ExitCode::FAILURE
        }
    }
}
