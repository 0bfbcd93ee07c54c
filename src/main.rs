use clap::Parser;
use voice_agent_client::core::ConfigProvider;
use voice_agent_client::utils::error::ErrorSeverity;
use voice_agent_client::utils::{logger, validation::Validate};
use voice_agent_client::{render_outcome, ApiClient, ChatSession, CliConfig, ClientError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting voice-agent-client");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證參數並合併設定
    let config = match cli.validate().and_then(|_| cli.resolve()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Using backend at {}", config.base_url());

    let client = ApiClient::new(&config)?;
    let session = ChatSession::new(client).with_upload_file_name(config.audio_file_name());

    match session.run(cli.chat_command()).await {
        Ok(outcome) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome.response)?);
            } else {
                print!("{}", render_outcome(&outcome));
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: ClientError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
