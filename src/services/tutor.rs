//! Chat tutoring with tool calling.
//!
//! The model may ask for `buscar_questoes` or `buscar_teoria`; results are
//! fed back as tool messages. After `max_rounds` tool rounds one last
//! completion is requested without tools, so a reply always terminates.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::prompts::TUTOR_SYSTEM_PROMPT;
use crate::database::models::QuestionFilter;
use crate::database::{ContentStore, QuestionStore, Range};
use crate::vendors::{ChatMessage, ChatModel, TokenUsage, ToolCall, ToolSpec, VendorError};

const MAX_TOOL_QUESTIONS: i64 = 5;
const MAX_TOOL_THEORIES: i64 = 3;
const THEORY_EXCERPT_CHARS: usize = 2_000;

pub const FALLBACK_REPLY: &str = "Não consegui concluir a resposta agora. Tente reformular a pergunta.";

#[derive(Debug, Clone, Serialize)]
pub struct TutorReply {
    pub resposta: String,
    /// Tool names in call order
    pub ferramentas: Vec<String>,
    #[serde(skip)]
    pub model: String,
    #[serde(skip)]
    pub usage: TokenUsage,
}

pub fn tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "buscar_questoes",
            description: "Busca questões do banco por termo no enunciado, banca ou disciplina.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "termo": {"type": "string", "description": "Trecho do enunciado"},
                    "banca": {"type": "string"},
                    "disciplina_id": {"type": "integer"},
                    "limite": {"type": "integer", "minimum": 1, "maximum": MAX_TOOL_QUESTIONS}
                }
            }),
        },
        ToolSpec {
            name: "buscar_teoria",
            description: "Busca material teórico pelo título.",
            parameters: json!({
                "type": "object",
                "properties": {"termo": {"type": "string"}},
                "required": ["termo"]
            }),
        },
    ]
}

#[derive(Debug, Default, Deserialize)]
struct QuestionArgs {
    termo: Option<String>,
    banca: Option<String>,
    disciplina_id: Option<i64>,
    limite: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct TheoryArgs {
    #[serde(default)]
    termo: String,
}

/// Runs one tool call; failures are reported to the model, never to the client.
async fn run_tool<S>(store: &S, call: &ToolCall) -> Value
where
    S: QuestionStore + ContentStore + ?Sized,
{
    match call.name.as_str() {
        "buscar_questoes" => {
            let args: QuestionArgs = serde_json::from_value(call.arguments.clone()).unwrap_or_default();
            let limite = args.limite.unwrap_or(MAX_TOOL_QUESTIONS).clamp(1, MAX_TOOL_QUESTIONS);
            let filter = QuestionFilter {
                disciplina_id: args.disciplina_id,
                banca: args.banca,
                termo: args.termo.filter(|t| !t.trim().is_empty()),
                range: Some(Range::new(0, limite - 1)),
                ..Default::default()
            };
            match store.list_questions(&filter).await {
                Ok(questions) => json!(questions
                    .iter()
                    .map(|q| json!({
                        "id": q.id,
                        "enunciado": q.enunciado,
                        "alternativas": q.alternativas,
                        "gabarito": q.gabarito,
                        "banca": q.banca,
                        "ano": q.ano,
                    }))
                    .collect::<Vec<_>>()),
                Err(e) => {
                    warn!("buscar_questoes failed: {}", e);
                    json!({"erro": "falha ao buscar questões"})
                }
            }
        }
        "buscar_teoria" => {
            let args: TheoryArgs = serde_json::from_value(call.arguments.clone()).unwrap_or_default();
            if args.termo.trim().is_empty() {
                return json!({"erro": "termo obrigatório"});
            }
            match store.search_theories(args.termo.trim(), MAX_TOOL_THEORIES).await {
                Ok(theories) => json!(theories
                    .iter()
                    .map(|t| json!({
                        "id": t.id,
                        "titulo": t.titulo,
                        "conteudo": t.conteudo_basico.chars().take(THEORY_EXCERPT_CHARS).collect::<String>(),
                    }))
                    .collect::<Vec<_>>()),
                Err(e) => {
                    warn!("buscar_teoria failed: {}", e);
                    json!({"erro": "falha ao buscar teoria"})
                }
            }
        }
        other => json!({"erro": format!("ferramenta desconhecida: {}", other)}),
    }
}

pub async fn run_tutor<S>(
    chat: &dyn ChatModel,
    store: &S,
    history: Vec<ChatMessage>,
    max_rounds: usize,
) -> Result<TutorReply, VendorError>
where
    S: QuestionStore + ContentStore + ?Sized,
{
    let tool_specs = tools();
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(TUTOR_SYSTEM_PROMPT));
    messages.extend(history);

    let mut ferramentas = Vec::new();
    let mut usage = TokenUsage::default();
    let mut model = String::new();

    for round in 0..=max_rounds {
        let offered: &[ToolSpec] = if round < max_rounds { &tool_specs[..] } else { &[] };
        let turn = chat.complete(&messages, offered).await?;
        usage.input_tokens += turn.usage.input_tokens;
        usage.output_tokens += turn.usage.output_tokens;
        model = turn.model;

        if turn.message.tool_calls.is_empty() || offered.is_empty() {
            let resposta = turn
                .message
                .content
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_REPLY.to_string());
            return Ok(TutorReply { resposta, ferramentas, model, usage });
        }

        debug!("Tutor round {}: {} tool calls", round + 1, turn.message.tool_calls.len());
        let calls = turn.message.tool_calls.clone();
        messages.push(turn.message);
        for call in &calls {
            let result = run_tool(store, call).await;
            ferramentas.push(call.name.clone());
            messages.push(ChatMessage::tool_result(call.id.clone(), result.to_string()));
        }
    }

    Ok(TutorReply { resposta: FALLBACK_REPLY.to_string(), ferramentas, model, usage })
}
