mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{TestApp, QUESTION_ID, QUESTION_NO_YEAR_ID, QUESTION_OTHER_ID};
use studyhub_api::services::hashing::hash_text;
use studyhub_api::types::{Plan, Role};

#[tokio::test]
async fn filters_are_nested_and_ordered_by_name() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/api/filtros", Some(Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["nome"], "Cirurgia");
    assert_eq!(body[1]["nome"], "Clínica Médica");
    assert_eq!(body[1]["assuntos"][0]["nome"], "Cardiologia");
    assert_eq!(body[1]["assuntos"][0]["subassuntos"][0]["nome"], "Insuficiência cardíaca");
    assert_eq!(body[0]["assuntos"], json!([]));
    Ok(())
}

#[tokio::test]
async fn exam_boards_are_ordered_by_name() -> Result<()> {
    let app = TestApp::new();
    let (_, body) = app.get("/api/bancas", Some(Uuid::new_v4())).await;

    let names: Vec<&str> = body.as_array().unwrap().iter().map(|b| b["nome"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["ENARE", "USP-SP"]);
    Ok(())
}

#[tokio::test]
async fn questions_are_newest_first_with_undated_ones_leading() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/api/questoes", Some(Uuid::new_v4())).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = body["questoes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        vec![QUESTION_NO_YEAR_ID.to_string(), QUESTION_ID.to_string(), QUESTION_OTHER_ID.to_string()]
    );
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 20);
    Ok(())
}

#[tokio::test]
async fn questions_filter_by_board_and_term() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (_, body) = app.get("/api/questoes?banca=USP-SP", user).await;
    assert_eq!(body["questoes"].as_array().unwrap().len(), 1);
    assert_eq!(body["questoes"][0]["id"], QUESTION_OTHER_ID.to_string());

    let (_, body) = app.get("/api/questoes?termo=SEPSE&disciplina_id=1", user).await;
    assert_eq!(body["questoes"].as_array().unwrap().len(), 1);
    assert_eq!(body["questoes"][0]["id"], QUESTION_NO_YEAR_ID.to_string());
    Ok(())
}

#[tokio::test]
async fn question_pages_are_clamped() -> Result<()> {
    let app = TestApp::new();
    let (_, body) = app.get("/api/questoes?page=2&per_page=2", Some(Uuid::new_v4())).await;
    assert_eq!(body["questoes"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/questoes?per_page=5000", Some(Uuid::new_v4())).await;
    assert_eq!(body["per_page"], 100);
    Ok(())
}

#[tokio::test]
async fn hash_ignores_case_and_surrounding_whitespace() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, single) = app.post("/api/questoes/hash", user, json!({"texto": "  Qual a CONDUTA? "})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(single["hash"], hash_text("qual a conduta?"));

    let (_, batch) = app
        .post("/api/questoes/hash", user, json!({"textos": ["Qual a conduta?", "outra"]}))
        .await;
    assert_eq!(batch["hashes"][0], single["hash"]);
    assert_eq!(batch["hashes"].as_array().unwrap().len(), 2);
    Ok(())
}

#[tokio::test]
async fn hash_rejects_blank_or_missing_text() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, _) = app.post("/api/questoes/hash", user, json!({"texto": "   "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/questoes/hash", user, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/questoes/hash", user, json!({"textos": ["ok", ""]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn corrections_are_admin_only() -> Result<()> {
    let app = TestApp::new();
    let student = app.user(Plan::Premium, Role::Student).await;

    let (status, _) = app
        .post(
            "/api/questoes/correcoes",
            Some(student),
            json!({"correcoes": [{"id": QUESTION_ID, "gabarito": "C"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn corrections_report_each_failure() -> Result<()> {
    let app = TestApp::new();
    let admin = app.user(Plan::Free, Role::Admin).await;
    let missing = Uuid::new_v4();

    let (status, report) = app
        .post(
            "/api/questoes/correcoes",
            Some(admin),
            json!({"correcoes": [
                {"id": QUESTION_ID, "gabarito": "C", "explicacao": "Revisada"},
                {"id": missing, "gabarito": "A"},
                {"id": "nao-e-uuid", "gabarito": "A"}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total"], 3);
    assert_eq!(report["sucesso"], 1);
    assert_eq!(report["erros"], 2);
    assert_eq!(report["falhas"][0]["id"], missing.to_string());

    let tables = app.store.snapshot().await;
    let corrected = tables.questions.iter().find(|q| q.id == QUESTION_ID).unwrap();
    assert_eq!(corrected.gabarito.as_deref(), Some("C"));
    assert_eq!(corrected.explicacao.as_deref(), Some("Revisada"));
    Ok(())
}

#[tokio::test]
async fn malformed_correction_ids_do_not_reject_the_batch() -> Result<()> {
    let app = TestApp::new();
    let admin = app.user(Plan::Free, Role::Admin).await;

    let (status, report) = app
        .post(
            "/api/questoes/correcoes",
            Some(admin),
            json!({"correcoes": [
                {"id": QUESTION_ID, "gabarito": "D"},
                {"id": 42, "gabarito": "B"},
                {"gabarito": "C"}
            ]}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total"], 3);
    assert_eq!(report["sucesso"], 1);
    assert_eq!(report["erros"], 2);
    assert_eq!(report["falhas"][0]["id"], "42");
    assert_eq!(report["falhas"][0]["erro"], "id inválido");
    assert_eq!(report["falhas"][1]["id"], "");

    let tables = app.store.snapshot().await;
    let corrected = tables.questions.iter().find(|q| q.id == QUESTION_ID).unwrap();
    assert_eq!(corrected.gabarito.as_deref(), Some("D"));
    Ok(())
}

#[tokio::test]
async fn correction_batches_are_bounded() -> Result<()> {
    let mut config = studyhub_api::config::AppConfig::development();
    config.limits.max_batch_size = 1;
    let app = TestApp::with_config(config);
    let admin = app.user(Plan::Free, Role::Admin).await;

    let (status, _) = app
        .post(
            "/api/questoes/correcoes",
            Some(admin),
            json!({"correcoes": [{"id": QUESTION_ID, "gabarito": "A"}, {"id": QUESTION_OTHER_ID, "gabarito": "A"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
