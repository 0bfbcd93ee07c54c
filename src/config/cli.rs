use crate::config::toml_config::ClientConfig;
use crate::core::session::ChatCommand;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{validate_path, validate_url, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "voice-agent-client")]
#[command(about = "Talk to the voice agent backend by audio file or text")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Backend base URL (overrides the config file)")]
    pub base_url: Option<String>,

    #[arg(long, help = "Print the response as JSON")]
    pub json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Upload an audio recording for transcription and an answer
    Transcribe {
        file: PathBuf,

        #[arg(long, help = "Save the spoken reply to this path")]
        save_audio: Option<PathBuf>,
    },
    /// Send a text message
    Text {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

impl CliConfig {
    /// 合併設定：命令列參數 > 設定檔 > 預設值
    pub fn resolve(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                ClientConfig::from_file(path).map_err(|e| match e {
                    ClientError::IoError(io) => ClientError::ConfigError {
                        message: format!("Cannot read {}: {}", path.display(), io),
                    },
                    other => other,
                })?
            }
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.server.base_url = base_url.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn chat_command(&self) -> ChatCommand {
        match &self.command {
            CliCommand::Transcribe { file, save_audio } => ChatCommand::Transcribe {
                file: file.clone(),
                save_audio: save_audio.clone(),
            },
            CliCommand::Text { message } => ChatCommand::Text {
                message: message.join(" "),
            },
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            validate_url("base_url", base_url)?;
        }

        match &self.command {
            CliCommand::Transcribe { file, save_audio } => {
                validate_path("file", &file.to_string_lossy())?;
                if let Some(target) = save_audio {
                    validate_path("save_audio", &target.to_string_lossy())?;
                }
            }
            // 空訊息交給後端判斷
            CliCommand::Text { .. } => {}
        }

        Ok(())
    }
}
