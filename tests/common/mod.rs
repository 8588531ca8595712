#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use studyhub_api::app::{app, AppState};
use studyhub_api::auth::{generate_jwt, Claims};
use studyhub_api::config::AppConfig;
use studyhub_api::database::models::*;
use studyhub_api::database::{MemoryStore, MemoryTables};
use studyhub_api::types::{Plan, Role};
use studyhub_api::vendors::*;

pub const QUESTION_ID: Uuid = Uuid::from_u128(0x1001);
pub const QUESTION_NO_YEAR_ID: Uuid = Uuid::from_u128(0x1002);
pub const QUESTION_OTHER_ID: Uuid = Uuid::from_u128(0x1003);
pub const THEORY_ID: Uuid = Uuid::from_u128(0x2001);
pub const THEORY_BASIC_ONLY_ID: Uuid = Uuid::from_u128(0x2002);

pub const SUMMARY_TEXT: &str = "# Resumo\n- ponto-chave";
pub const TUTOR_REPLY: &str = "A sepse é uma disfunção orgânica causada por resposta desregulada à infecção.";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::development())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::with_tables(seed()));
        let state = AppState::new(config.clone(), store.clone(), fake_vendors());
        Self { router: app(state), store, config }
    }

    /// Bearer token for `user_id` signed with the test configuration
    pub fn token(&self, user_id: Uuid) -> String {
        let claims = Claims::new(user_id, Some(format!("{}@example.com", user_id.simple())), &self.config.security);
        generate_jwt(&claims, &self.config.security).expect("token")
    }

    /// Inserts a profile so the caller starts with the given plan and role
    pub async fn user(&self, plan: Plan, role: Role) -> Uuid {
        use studyhub_api::database::ProfileStore;

        let id = Uuid::new_v4();
        let mut profile = Profile::new(id, Some("aluno@example.com".into()));
        profile.plano = plan.as_str().to_string();
        profile.papel = role.as_str().to_string();
        self.store.insert_profile(&profile).await.expect("profile");
        id
    }

    pub async fn get(&self, path: &str, user: Option<Uuid>) -> (StatusCode, Value) {
        self.send(Method::GET, path, user, None).await
    }

    pub async fn post(&self, path: &str, user: Option<Uuid>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, user, Some(body)).await
    }

    pub async fn patch(&self, path: &str, user: Option<Uuid>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, user, Some(body)).await
    }

    pub async fn send(&self, method: Method, path: &str, user: Option<Uuid>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };
        let (status, _, bytes) = self.raw(request).await;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }

    /// Status, content type and body bytes for any request
    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.expect("router");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, content_type, bytes.to_vec())
    }
}

fn question(id: Uuid, enunciado: &str, banca: &str, ano: Option<i32>, disciplina_id: i64) -> Question {
    Question {
        id,
        enunciado: enunciado.to_string(),
        alternativas: json!([
            {"letra": "A", "texto": "Opção A"},
            {"letra": "B", "texto": "Opção B"},
            {"letra": "C", "texto": "Opção C"}
        ]),
        gabarito: Some("B".to_string()),
        explicacao: Some("Explicação comentada".to_string()),
        banca: Some(banca.to_string()),
        ano,
        disciplina_id: Some(disciplina_id),
        assunto_id: None,
        subassunto_id: None,
        updated_at: None,
    }
}

pub fn seed() -> MemoryTables {
    MemoryTables {
        disciplines: vec![
            Discipline { id: 1, nome: "Clínica Médica".into() },
            Discipline { id: 2, nome: "Cirurgia".into() },
        ],
        subjects: vec![
            Subject { id: 10, nome: "Cardiologia".into(), disciplina_id: 1 },
            Subject { id: 11, nome: "Infectologia".into(), disciplina_id: 1 },
        ],
        subtopics: vec![Subtopic { id: 100, nome: "Insuficiência cardíaca".into(), assunto_id: 10 }],
        exam_boards: vec![
            ExamBoard { id: 2, nome: "USP-SP".into(), sigla: Some("USP".into()), total_questoes: 1 },
            ExamBoard { id: 1, nome: "ENARE".into(), sigla: None, total_questoes: 2 },
        ],
        questions: vec![
            question(QUESTION_ID, "Paciente com insuficiência cardíaca descompensada", "ENARE", Some(2023), 1),
            question(QUESTION_NO_YEAR_ID, "Conduta inicial na sepse", "ENARE", None, 1),
            question(QUESTION_OTHER_ID, "Abdome agudo inflamatório", "USP-SP", Some(2021), 2),
        ],
        theories: vec![
            Theory {
                id: THEORY_ID,
                titulo: "Sepse".into(),
                conteudo_basico: "Sepse: conceito".into(),
                conteudo_avancado: Some("Sepse: fisiopatologia".into()),
                conteudo_expert: Some("Sepse: diretrizes".into()),
                disciplina_id: Some(1),
            },
            Theory {
                id: THEORY_BASIC_ONLY_ID,
                titulo: "Apendicite".into(),
                conteudo_basico: "Apendicite: conceito".into(),
                conteudo_avancado: None,
                conteudo_expert: Some("   ".into()),
                disciplina_id: Some(2),
            },
        ],
        ..Default::default()
    }
}

pub fn fake_vendors() -> Vendors {
    Vendors {
        text: Arc::new(FakeText),
        chat: Arc::new(FakeChat),
        speech: Arc::new(FakeSpeech),
        transcriber: Arc::new(FakeTranscriber),
        images: Arc::new(FakeImages),
    }
}

pub struct FakeText;

#[async_trait]
impl TextGenerator for FakeText {
    async fn generate(&self, _prompt: &str) -> Result<Generation, VendorError> {
        Ok(Generation {
            text: SUMMARY_TEXT.to_string(),
            model: "gemini-1.5-flash".to_string(),
            usage: TokenUsage { input_tokens: 1_000, output_tokens: 200 },
        })
    }
}

/// Asks for one question lookup, then answers
pub struct FakeChat;

#[async_trait]
impl ChatModel for FakeChat {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatTurn, VendorError> {
        let looked_up = messages.iter().any(|m| m.role == ChatRole::Tool);
        let message = if looked_up || tools.is_empty() {
            ChatMessage::text(ChatRole::Assistant, TUTOR_REPLY)
        } else {
            ChatMessage {
                role: ChatRole::Assistant,
                content: None,
                tool_calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: "buscar_questoes".into(),
                    arguments: json!({"termo": "sepse"}),
                }],
                tool_call_id: None,
            }
        };
        Ok(ChatTurn {
            message,
            model: "gpt-4o-mini".to_string(),
            usage: TokenUsage { input_tokens: 300, output_tokens: 40 },
        })
    }
}

pub struct FakeSpeech;

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, _voice: Option<&str>) -> Result<Speech, VendorError> {
        Ok(Speech {
            audio: vec![0xFF, 0xFB, 0x90, 0x00],
            content_type: "audio/mpeg".to_string(),
            model: "tts-1".to_string(),
            characters: text.chars().count() as i64,
        })
    }
}

pub struct FakeTranscriber;

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: AudioUpload) -> Result<Transcription, VendorError> {
        Ok(Transcription {
            text: format!("transcrição de {}", audio.file_name),
            model: "whisper-1".to_string(),
            seconds: 2,
        })
    }
}

pub struct FakeImages;

#[async_trait]
impl ImageSearch for FakeImages {
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<ImageResult>, VendorError> {
        Ok((0..limit.min(3))
            .map(|i| ImageResult {
                titulo: format!("{} {}", term, i),
                url: format!("https://openi.nlm.nih.gov/imgs/512/{}.png", i),
                miniatura: None,
                fonte: "Open-i (NLM)".to_string(),
            })
            .collect())
    }
}
