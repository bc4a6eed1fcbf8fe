//! ORCC客户端演示程序
//!
//! 读取配置（可选的配置文件路径作为第一个参数，`ORCC__BASE_URL` 等环境变量覆盖），
//! 然后依次演示：
//! - 后端健康检查
//! - 按手术状态分组的患者列表
//! - 按MRN查询规划数据（第二个参数）

use anyhow::{Context, Result};
use orcc::orcc_core::{map_procedure_to_orcc, SurgicalStatus};
use orcc::{ClientConfig, OrccClient, ProcedureLookup};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let mrn = args.next();

    let config = ClientConfig::load(config_path.as_deref()).context("Failed to load client configuration")?;
    info!("🚀 ORCC客户端演示，后端地址: {}", config.base_url);

    let client = OrccClient::new(config).context("Failed to create ORCC client")?;

    demo_health(&client).await;
    demo_status_board(&client).await?;

    if let Some(mrn) = mrn {
        demo_planning(&client, &mrn).await;
    }

    info!("✅ 演示完成");
    Ok(())
}

/// 健康检查演示
async fn demo_health(client: &OrccClient) {
    match client.check_health().await {
        Ok(status) => info!("后端状态: {}", status),
        Err(e) => warn!("❌ 健康检查失败: {}", e),
    }
}

/// 手术状态看板演示
async fn demo_status_board(client: &OrccClient) -> Result<()> {
    let groups = [
        (SurgicalStatus::Ready, client.get_ready_patients().await),
        (SurgicalStatus::NearReady, client.get_near_ready_patients().await),
        (SurgicalStatus::Workup, client.get_workup_patients().await),
        (SurgicalStatus::Hold, client.get_hold_patients().await),
    ];

    for (status, result) in groups {
        let procedures = result.with_context(|| format!("Failed to list {} procedures", status))?;
        info!("📋 {}: {} 例", status, procedures.len());

        for procedure in &procedures {
            info!(
                "   #{} {} - {} ({})",
                procedure.id().unwrap_or_default(),
                procedure.patient_name().unwrap_or("-"),
                procedure.procedure_type().unwrap_or("-"),
                procedure.barriers().join(", ")
            );
        }
    }

    Ok(())
}

/// 规划数据查询演示
async fn demo_planning(client: &OrccClient, mrn: &str) {
    match client.lookup_latest_procedure(mrn).await {
        ProcedureLookup::Found { id, procedure } => {
            let view = map_procedure_to_orcc(&procedure);
            match serde_json::to_string(&view) {
                Ok(json) => info!("🩺 MRN {} 的最新手术 #{}: {}", mrn, id, json),
                Err(e) => warn!("❌ 手术 #{} 视图序列化失败: {}", id, e),
            }
        }
        ProcedureLookup::NotFound => info!("MRN {} 暂无手术", mrn),
        ProcedureLookup::LookupFailed(e) => warn!("❌ MRN {} 规划数据查询失败: {}", mrn, e),
    }
}
