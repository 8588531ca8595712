use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::{Discipline, Subject, Subtopic};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineNode {
    pub id: i64,
    pub nome: String,
    pub assuntos: Vec<SubjectNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectNode {
    pub id: i64,
    pub nome: String,
    pub subassuntos: Vec<SubtopicNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtopicNode {
    pub id: i64,
    pub nome: String,
}

/// Nests the three flat classification tables.
///
/// Children land under the parent their foreign key names and keep their
/// input order; rows whose parent is absent are dropped.
pub fn build_filter_tree(
    disciplines: &[Discipline],
    subjects: &[Subject],
    subtopics: &[Subtopic],
) -> Vec<DisciplineNode> {
    let mut subtopics_by_subject: HashMap<i64, Vec<SubtopicNode>> = HashMap::new();
    for subtopic in subtopics {
        subtopics_by_subject
            .entry(subtopic.assunto_id)
            .or_default()
            .push(SubtopicNode { id: subtopic.id, nome: subtopic.nome.clone() });
    }

    let mut subjects_by_discipline: HashMap<i64, Vec<SubjectNode>> = HashMap::new();
    for subject in subjects {
        subjects_by_discipline.entry(subject.disciplina_id).or_default().push(SubjectNode {
            id: subject.id,
            nome: subject.nome.clone(),
            subassuntos: subtopics_by_subject.remove(&subject.id).unwrap_or_default(),
        });
    }

    disciplines
        .iter()
        .map(|discipline| DisciplineNode {
            id: discipline.id,
            nome: discipline.nome.clone(),
            assuntos: subjects_by_discipline.remove(&discipline.id).unwrap_or_default(),
        })
        .collect()
}
