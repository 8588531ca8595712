mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{TestApp, QUESTION_ID, THEORY_BASIC_ONLY_ID, THEORY_ID};
use studyhub_api::types::{Plan, Role};

#[tokio::test]
async fn free_plan_reads_basic_content_whatever_it_asks_for() -> Result<()> {
    let app = TestApp::new();
    let user = app.user(Plan::Free, Role::Student).await;

    let (status, body) = app.get(&format!("/api/teorias/{}?nivel=expert", THEORY_ID), Some(user)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nivel_solicitado"], "expert");
    assert_eq!(body["nivel_permitido"], "basico");
    assert_eq!(body["nivel_servido"], "basico");
    assert_eq!(body["conteudo"], "Sepse: conceito");
    Ok(())
}

#[tokio::test]
async fn paid_plans_unlock_richer_tiers() -> Result<()> {
    let app = TestApp::new();
    let pro = app.user(Plan::Pro, Role::Student).await;
    let premium = app.user(Plan::Premium, Role::Student).await;
    let path = format!("/api/teorias/{}?nivel=expert", THEORY_ID);

    let (_, body) = app.get(&path, Some(pro)).await;
    assert_eq!(body["nivel_servido"], "avancado");
    assert_eq!(body["conteudo"], "Sepse: fisiopatologia");

    let (_, body) = app.get(&path, Some(premium)).await;
    assert_eq!(body["nivel_servido"], "expert");
    assert_eq!(body["conteudo"], "Sepse: diretrizes");
    Ok(())
}

#[tokio::test]
async fn missing_tiers_fall_back_to_basic() -> Result<()> {
    let app = TestApp::new();
    let premium = app.user(Plan::Premium, Role::Student).await;

    let (_, body) = app
        .get(&format!("/api/teorias/{}?nivel=expert", THEORY_BASIC_ONLY_ID), Some(premium))
        .await;
    assert_eq!(body["nivel_permitido"], "expert");
    assert_eq!(body["nivel_servido"], "basico");
    assert_eq!(body["conteudo"], "Apendicite: conceito");
    Ok(())
}

#[tokio::test]
async fn unknown_theory_or_level_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, _) = app.get(&format!("/api/teorias/{}", Uuid::new_v4()), user).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/api/teorias/{}?nivel=mestre", THEORY_ID), user).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/teorias/nao-e-uuid", user).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn answers_are_checked_and_listed_newest_first() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, wrong) = app
        .post("/api/respostas", user, json!({"questao_id": QUESTION_ID, "alternativa": "A"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(wrong["correta"], false);
    assert_eq!(wrong["gabarito"], "B");
    assert_eq!(wrong["explicacao"], "Explicação comentada");

    let (_, right) = app
        .post("/api/respostas", user, json!({"questao_id": QUESTION_ID, "alternativa": " b "}))
        .await;
    assert_eq!(right["correta"], true);

    let (status, body) = app.get("/api/respostas", user).await;
    assert_eq!(status, StatusCode::OK);
    let respostas = body["respostas"].as_array().unwrap();
    assert_eq!(respostas.len(), 2);
    assert_eq!(respostas[0]["alternativa"], "b");
    Ok(())
}

#[tokio::test]
async fn answers_need_a_known_question_and_an_alternative() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, _) = app
        .post("/api/respostas", user, json!({"questao_id": Uuid::new_v4(), "alternativa": "A"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/api/respostas", user, json!({"questao_id": QUESTION_ID, "alternativa": "  "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn reading_progress_is_upserted_and_completes_at_100() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, body) = app
        .post("/api/progresso-leitura", user, json!({"teoria_id": THEORY_ID, "percentual": 40}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concluido"], false);

    let (_, body) = app
        .post("/api/progresso-leitura", user, json!({"teoria_id": THEORY_ID, "percentual": 100}))
        .await;
    assert_eq!(body["concluido"], true);

    let (_, body) = app.get("/api/progresso-leitura", user).await;
    let progresso = body["progresso"].as_array().unwrap();
    assert_eq!(progresso.len(), 1);
    assert_eq!(progresso[0]["percentual"], 100);
    Ok(())
}

#[tokio::test]
async fn reading_progress_is_validated() -> Result<()> {
    let app = TestApp::new();
    let user = Some(Uuid::new_v4());

    let (status, _) = app
        .post("/api/progresso-leitura", user, json!({"teoria_id": THEORY_ID, "percentual": 101}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/progresso-leitura", user, json!({"teoria_id": Uuid::new_v4(), "percentual": 10}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
