use serde::{Deserialize, Serialize};

use crate::types::AccessLevel;

pub const TUTOR_SYSTEM_PROMPT: &str = "Você é um tutor de medicina que prepara alunos para provas de residência. \
Responda em português do Brasil, de forma objetiva e didática. \
Use a ferramenta buscar_questoes para encontrar questões do banco e buscar_teoria para consultar o material teórico \
antes de afirmar algo específico sobre o conteúdo da plataforma. Nunca invente gabaritos.";

/// Prompt for `POST /api/ia/resumo`
pub fn summary_prompt(titulo: &str, texto: &str, nivel: AccessLevel) -> String {
    let profundidade = match nivel {
        AccessLevel::Basic => "conceitos essenciais, linguagem simples",
        AccessLevel::Advanced => "fisiopatologia, diagnóstico e conduta",
        AccessLevel::Expert => "detalhes de diretrizes, exceções e pegadinhas de prova",
    };
    format!(
        "Gere um resumo de estudo em Markdown sobre \"{titulo}\" para um aluno de medicina.\n\
         Profundidade: {profundidade}.\n\
         Organize em tópicos curtos e termine com 3 pontos-chave para revisão.\n\n\
         Texto base:\n{texto}"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    Diagrama,
    Ilustracao,
    Esquema,
    Realista,
}

/// Text-to-image prompt for a topic in one of the supported styles
pub fn image_prompt(tema: &str, estilo: ImageStyle) -> String {
    let tema = tema.trim();
    match estilo {
        ImageStyle::Diagrama => format!(
            "Clean medical diagram of {tema}, labeled anatomical structures, white background, flat colors, textbook style"
        ),
        ImageStyle::Ilustracao => format!(
            "Detailed medical illustration of {tema}, soft lighting, educational, high detail, no text"
        ),
        ImageStyle::Esquema => format!(
            "Schematic flowchart summarizing {tema}, boxes and arrows, minimal color palette, suitable for study notes"
        ),
        ImageStyle::Realista => format!(
            "Photorealistic clinical image depicting {tema}, neutral background, high resolution, accurate anatomy"
        ),
    }
}
