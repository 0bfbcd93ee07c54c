use crate::core::{AudioPayload, ChatBackend, TranscribeResponse};
use crate::domain::model::DEFAULT_AUDIO_FILE_NAME;
use crate::utils::error::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// 上傳錄音檔，必要時把回覆語音存到 `save_audio`
    Transcribe {
        file: PathBuf,
        save_audio: Option<PathBuf>,
    },
    Text {
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: TranscribeResponse,
    pub saved_audio: Option<PathBuf>,
}

pub struct ChatSession<B: ChatBackend> {
    backend: B,
    upload_file_name: String,
}

impl<B: ChatBackend> ChatSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            upload_file_name: DEFAULT_AUDIO_FILE_NAME.to_string(),
        }
    }

    pub fn with_upload_file_name(mut self, name: impl Into<String>) -> Self {
        self.upload_file_name = name.into();
        self
    }

    pub async fn run(&self, command: ChatCommand) -> Result<ChatOutcome> {
        match command {
            ChatCommand::Transcribe { file, save_audio } => {
                self.transcribe(&file, save_audio.as_deref()).await
            }
            ChatCommand::Text { message } => {
                tracing::info!("Sending text message");
                let response = self.backend.send_text_message(&message).await?;
                Ok(ChatOutcome {
                    response,
                    saved_audio: None,
                })
            }
        }
    }

    async fn transcribe(&self, file: &Path, save_audio: Option<&Path>) -> Result<ChatOutcome> {
        let payload = AudioPayload::from_file(file)
            .await?
            .with_file_name(self.upload_file_name.clone());
        if payload.is_empty() {
            tracing::warn!("Audio file {} is empty", file.display());
        }

        tracing::info!("Uploading {} ({} bytes)", file.display(), payload.len());
        let response = self.backend.transcribe_audio(payload).await?;
        tracing::info!("Transcription: {}", response.transcription);

        let saved_audio = match (save_audio, response.audio_url.as_deref()) {
            (Some(target), Some(audio_url)) => {
                let audio = self.backend.fetch_audio(audio_url).await?;
                if let Some(parent) = target.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
                tokio::fs::write(target, &audio).await?;
                tracing::info!("Saved reply audio ({} bytes) to {}", audio.len(), target.display());
                Some(target.to_path_buf())
            }
            (Some(_), None) => {
                tracing::warn!("Server response has no audio_url; nothing to save");
                None
            }
            _ => None,
        };

        Ok(ChatOutcome {
            response,
            saved_audio,
        })
    }
}

/// 給人看的輸出格式
pub fn render_outcome(outcome: &ChatOutcome) -> String {
    let reply = &outcome.response.ganesha_response;
    let mut out = String::new();

    let _ = writeln!(out, "🗣  You: {}", outcome.response.transcription);
    let _ = writeln!(out, "🙏 [{}] {}", reply.lang, reply.spoken_text().trim());
    if let Some(reason) = reply.refusal_reason() {
        let _ = writeln!(out, "⚠️  Refused: {}", reason);
    } else if reply.refusal {
        let _ = writeln!(out, "⚠️  Refused");
    }
    if let Some(path) = &outcome.saved_audio {
        let _ = writeln!(out, "🔊 Reply audio saved to: {}", path.display());
    } else if let Some(audio_url) = &outcome.response.audio_url {
        let _ = writeln!(out, "🔊 Reply audio: {}", audio_url);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AgentReply;
    use crate::utils::error::ClientError;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockBackend {
        uploads: Arc<Mutex<Vec<AudioPayload>>>,
        messages: Arc<Mutex<Vec<String>>>,
        fetched: Arc<Mutex<Vec<String>>>,
        audio_url: Option<String>,
    }

    fn reply(transcription: &str, audio_url: Option<String>) -> TranscribeResponse {
        TranscribeResponse {
            id: "id-1".to_string(),
            transcription: transcription.to_string(),
            ganesha_response: AgentReply {
                lang: "en".to_string(),
                blessing_open: "Om. ".to_string(),
                answer: "Act without attachment.".to_string(),
                blessing_close: " Be blessed.".to_string(),
                refusal: false,
                refusal_reason: Some(String::new()),
            },
            audio_url,
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn transcribe_audio(&self, payload: AudioPayload) -> Result<TranscribeResponse> {
            self.uploads.lock().await.push(payload);
            Ok(reply("spoken words", self.audio_url.clone()))
        }

        async fn send_text_message(&self, message: &str) -> Result<TranscribeResponse> {
            if message.is_empty() {
                return Err(ClientError::ServerError {
                    status: 400,
                    message: "Message cannot be empty".to_string(),
                    details: None,
                });
            }
            self.messages.lock().await.push(message.to_string());
            Ok(reply(message, None))
        }

        async fn fetch_audio(&self, audio_url: &str) -> Result<Vec<u8>> {
            self.fetched.lock().await.push(audio_url.to_string());
            Ok(b"RIFF-reply".to_vec())
        }
    }

    #[tokio::test]
    async fn test_text_command() {
        let backend = MockBackend::default();
        let session = ChatSession::new(backend.clone());

        let outcome = session
            .run(ChatCommand::Text {
                message: "What is dharma?".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome.response.transcription, "What is dharma?");
        assert!(outcome.saved_audio.is_none());
        assert_eq!(*backend.messages.lock().await, vec!["What is dharma?"]);
    }

    #[tokio::test]
    async fn test_text_command_surfaces_server_error() {
        let session = ChatSession::new(MockBackend::default());
        let err = session
            .run(ChatCommand::Text {
                message: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Message cannot be empty");
    }

    #[tokio::test]
    async fn test_transcribe_uploads_file_and_saves_audio() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("question.wav");
        std::fs::write(&input, b"wav-bytes").unwrap();
        let output = temp_dir.path().join("replies").join("answer.wav");

        let backend = MockBackend {
            audio_url: Some("http://localhost:5000/audio/output.wav".to_string()),
            ..Default::default()
        };
        let session = ChatSession::new(backend.clone()).with_upload_file_name("clip.webm");

        let outcome = session
            .run(ChatCommand::Transcribe {
                file: input,
                save_audio: Some(output.clone()),
            })
            .await
            .unwrap();

        let uploads = backend.uploads.lock().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].bytes, b"wav-bytes".to_vec());
        assert_eq!(uploads[0].file_name, "clip.webm");
        assert_eq!(uploads[0].mime_type, "audio/wav");

        assert_eq!(outcome.saved_audio.as_deref(), Some(output.as_path()));
        assert_eq!(std::fs::read(&output).unwrap(), b"RIFF-reply".to_vec());
        assert_eq!(
            *backend.fetched.lock().await,
            vec!["http://localhost:5000/audio/output.wav"]
        );
    }

    #[tokio::test]
    async fn test_transcribe_without_audio_url_skips_download() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("question.webm");
        std::fs::write(&input, b"webm").unwrap();

        let backend = MockBackend::default();
        let session = ChatSession::new(backend.clone());
        let outcome = session
            .run(ChatCommand::Transcribe {
                file: input,
                save_audio: Some(temp_dir.path().join("answer.wav")),
            })
            .await
            .unwrap();

        assert!(outcome.saved_audio.is_none());
        assert!(backend.fetched.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_transcribe_missing_file_is_io_error() {
        let session = ChatSession::new(MockBackend::default());
        let err = session
            .run(ChatCommand::Transcribe {
                file: PathBuf::from("/definitely/not/here.webm"),
                save_audio: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::IoError(_)));
    }

    #[test]
    fn test_render_outcome() {
        let outcome = ChatOutcome {
            response: reply("Who are you?", Some("http://localhost:5000/audio/output.wav".to_string())),
            saved_audio: None,
        };
        let text = render_outcome(&outcome);
        assert!(text.contains("You: Who are you?"));
        assert!(text.contains("[en] Om. Act without attachment. Be blessed."));
        assert!(text.contains("Reply audio: http://localhost:5000/audio/output.wav"));
        assert!(!text.contains("Refused"));
    }

    #[test]
    fn test_render_refusal() {
        let mut response = reply("", None);
        response.ganesha_response.refusal = true;
        response.ganesha_response.refusal_reason = Some("Empty transcription".to_string());
        let text = render_outcome(&ChatOutcome {
            response,
            saved_audio: None,
        });
        assert!(text.contains("Refused: Empty transcription"));
    }

    #[test]
    fn test_run_with_block_on() {
        let session = ChatSession::new(MockBackend::default());
        let outcome = tokio_test::block_on(session.run(ChatCommand::Text {
            message: "hello".to_string(),
        }))
        .unwrap();
        assert_eq!(outcome.response.id, "id-1");
    }
}
