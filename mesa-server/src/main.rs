use mesa_server::{ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    print_banner();
    tracing::info!("Mesa server starting...");

    // 2. 初始化服务器状态
    let state = ServerState::initialize(&config).await?;

    // 3. 启动后台任务
    let tasks = state.start_background_tasks()?;

    tracing::info!(
        database = %config.database_url,
        session_ttl_hours = config.session_ttl_hours,
        "Mesa server ready, press Ctrl-C to stop"
    );

    // 4. 等待退出信号
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    if tasks.check_health() > 0 {
        tracing::warn!("Some background tasks had already stopped");
    }
    tasks.shutdown().await;
    state.db.pool.close().await;

    tracing::info!("Mesa server stopped");
    Ok(())
}
