use std::sync::Arc;

use carebot_chat::{ChatError, ConversationOrchestrator, PromptConfig, TurnStage};
use carebot_core::{CompletionModel, CompletionRequest, ModelError, Role};
use carebot_model::MockCompletionModel;
use carebot_rag::{
    Document, HashingEmbeddingProvider, RagConfig, RagError, RagPipeline, Retriever,
};
use carebot_session::SessionStore;

const DIABETES: &str = "Diabetes is managed with insulin.";

const HYPERTENSION: &[&str] = &[
    "Hypertension is persistently high blood pressure in the arteries.",
    "Hypertension is treated with lifestyle changes such as reduced salt intake, \
     and with medication such as ACE inhibitors or diuretics.",
    "Anxiety disorders can be eased with breathing exercises and therapy.",
];

async fn retriever_over(texts: &[&str]) -> Retriever {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
        .build()
        .unwrap();
    let documents: Vec<Document> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Document::new(format!("guide_p{}", i + 1), *text))
        .collect();
    let index = pipeline.build_index(&documents).await.unwrap();
    pipeline.retriever(index).unwrap()
}

fn is_rewrite(request: &CompletionRequest) -> bool {
    request.system == PromptConfig::default().contextualize
}

/// Stand-in for a real model: resolves "it" against the last user question
/// when rewriting, and answers with the retrieved context otherwise.
fn grounded_model() -> MockCompletionModel {
    MockCompletionModel::new("scripted").with_fallback(|request| {
        if is_rewrite(request) {
            let topic = request
                .history
                .iter()
                .filter(|m| m.role == Role::User)
                .last()
                .and_then(|m| m.content.strip_prefix("What is "))
                .map(|rest| rest.trim_end_matches('?').to_string())
                .unwrap_or_default();
            return Ok(request.input.replace(" it ", &format!(" {topic} ")));
        }
        let context = request.system.split_once("\n\n").map(|(_, context)| context).unwrap_or_default();
        if context.trim().is_empty() {
            Ok("I don't know.".to_string())
        } else {
            Ok(format!("According to the guide: {context}"))
        }
    })
}

fn orchestrator(model: Arc<dyn CompletionModel>, retriever: Retriever) -> ConversationOrchestrator {
    ConversationOrchestrator::new(model, retriever, PromptConfig::default()).unwrap()
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w.eq_ignore_ascii_case(word))
}

#[tokio::test]
async fn single_document_question_is_answered_from_it() {
    let model = Arc::new(grounded_model());
    let chat = orchestrator(model.clone(), retriever_over(&[DIABETES]).await);
    let sessions = SessionStore::new();

    let response =
        chat.handle_turn(&sessions, "A", "How is diabetes treated?").await.unwrap();

    assert_eq!(response.sources[0].text, DIABETES);
    assert!(response.answer.contains("insulin"));
    assert_eq!(response.standalone_query, "How is diabetes treated?");
    assert_eq!(response.session_id, "A");
    // First turn: no rewrite call, only the answer.
    assert_eq!(model.call_count().await, 1);
}

#[tokio::test]
async fn follow_up_pronoun_is_resolved_from_history() {
    let model = Arc::new(grounded_model());
    let chat = orchestrator(model.clone(), retriever_over(HYPERTENSION).await);
    let sessions = SessionStore::new();

    chat.handle_turn(&sessions, "A", "What is hypertension?").await.unwrap();
    let second = chat.handle_turn(&sessions, "A", "How is it treated?").await.unwrap();

    assert!(!has_word(&second.standalone_query, "it"), "query: {}", second.standalone_query);
    assert!(has_word(&second.standalone_query, "hypertension"));
    assert!(second.sources[0].text.contains("treated"));

    let requests = model.requests().await;
    assert_eq!(requests.len(), 3);
    let rewrite = &requests[1];
    assert!(is_rewrite(rewrite));
    assert_eq!(rewrite.history.len(), 2);
    assert_eq!(rewrite.input, "How is it treated?");

    let answer = &requests[2];
    assert_eq!(answer.input, second.standalone_query);
    assert_eq!(answer.history.len(), 2);
    assert_eq!(answer.history[0].content, "What is hypertension?");

    assert_eq!(sessions.history("A").await.unwrap().len(), 2);
}

#[tokio::test]
async fn generation_failure_leaves_history_untouched() {
    let model = Arc::new(
        MockCompletionModel::new("flaky")
            .with_reply("Diabetes is treated with insulin.")
            .with_reply("How is diabetes monitored?")
            .with_error(ModelError::Api {
                provider: "Groq".into(),
                status: 503,
                message: "service unavailable".into(),
            }),
    );
    let chat = orchestrator(model, retriever_over(&[DIABETES]).await);
    let sessions = SessionStore::new();

    chat.handle_turn(&sessions, "A", "How is diabetes treated?").await.unwrap();
    let err = chat.handle_turn(&sessions, "A", "And how is it monitored?").await.unwrap_err();

    assert!(matches!(err, ChatError::Generation(ref msg) if msg.contains("503")));
    assert_eq!(err.stage(), TurnStage::Generating);
    let history = sessions.history("A").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.turns()[0].utterance, "How is diabetes treated?");
}

#[tokio::test]
async fn rewrite_failure_is_reported_at_rewriting() {
    let model = Arc::new(
        MockCompletionModel::new("flaky")
            .with_reply("Diabetes is treated with insulin.")
            .with_reply("   "),
    );
    let chat = orchestrator(model, retriever_over(&[DIABETES]).await);
    let sessions = SessionStore::new();

    chat.handle_turn(&sessions, "A", "How is diabetes treated?").await.unwrap();
    let err = chat.handle_turn(&sessions, "A", "What about it?").await.unwrap_err();

    assert_eq!(err.stage(), TurnStage::Rewriting);
    assert_eq!(sessions.history("A").await.unwrap().len(), 1);
}

#[tokio::test]
async fn sessions_do_not_see_each_other() {
    let model = Arc::new(grounded_model());
    let chat = orchestrator(model.clone(), retriever_over(HYPERTENSION).await);
    let sessions = SessionStore::new();

    chat.handle_turn(&sessions, "A", "What is hypertension?").await.unwrap();
    let b = chat.handle_turn(&sessions, "B", "How is it treated?").await.unwrap();

    // B has no history, so its utterance is used verbatim.
    assert_eq!(b.standalone_query, "How is it treated?");
    assert_eq!(sessions.history("A").await.unwrap().len(), 1);
    assert_eq!(sessions.history("B").await.unwrap().len(), 1);
    let last = model.requests().await.pop().unwrap();
    assert!(last.history.is_empty());
}

#[tokio::test]
async fn blank_utterance_fails_before_touching_the_session() {
    let model = Arc::new(grounded_model());
    let chat = orchestrator(model.clone(), retriever_over(&[DIABETES]).await);
    let sessions = SessionStore::new();

    let err = chat.handle_turn(&sessions, "A", "  \n").await.unwrap_err();
    assert!(matches!(err, ChatError::EmptyUtterance));
    assert_eq!(err.stage(), TurnStage::Received);
    assert!(!sessions.has_session("A").await);
    assert_eq!(model.call_count().await, 0);
}

#[tokio::test]
async fn empty_corpus_stops_before_any_orchestrator_exists() {
    let pipeline = RagPipeline::builder()
        .config(RagConfig::default())
        .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
        .build()
        .unwrap();

    let err = pipeline.build_index(&[]).await.unwrap_err();
    assert!(matches!(err, RagError::IngestionError(_)));
}

#[tokio::test]
async fn nothing_retrieved_still_answers_with_empty_context() {
    let model = Arc::new(grounded_model());
    let retriever = {
        let pipeline = RagPipeline::builder()
            .config(RagConfig::builder().similarity_threshold(0.99).build().unwrap())
            .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
            .build()
            .unwrap();
        let index = pipeline.build_index(&[Document::new("d", DIABETES)]).await.unwrap();
        pipeline.retriever(index).unwrap()
    };
    let chat = orchestrator(model, retriever);
    let sessions = SessionStore::new();

    let response = chat.handle_turn(&sessions, "A", "What is sleep apnea?").await.unwrap();
    assert!(response.sources.is_empty());
    assert_eq!(response.answer, "I don't know.");
}

#[tokio::test]
async fn configured_contextualize_prompt_reaches_the_model_verbatim() {
    let contextualize = "Rewrite the last question so it stands alone. Never answer it.";
    let prompts = PromptConfig { contextualize: contextualize.into(), ..PromptConfig::default() };
    let model = Arc::new(
        MockCompletionModel::new("scripted")
            .with_reply("Diabetes is treated with insulin.")
            .with_reply("How is diabetes monitored?")
            .with_reply("With blood glucose checks."),
    );
    let chat =
        ConversationOrchestrator::new(model.clone(), retriever_over(&[DIABETES]).await, prompts)
            .unwrap();
    let sessions = SessionStore::new();

    chat.handle_turn(&sessions, "A", "How is diabetes treated?").await.unwrap();
    chat.handle_turn(&sessions, "A", "And how is it monitored?").await.unwrap();

    let requests = model.requests().await;
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1].system, contextualize);
    assert_eq!(requests[1].input, "And how is it monitored?");
    assert_ne!(requests[2].system, contextualize);
}

#[test]
fn turn_stages_serialize_in_snake_case() {
    let stages = [
        (TurnStage::Received, "\"received\""),
        (TurnStage::Rewriting, "\"rewriting\""),
        (TurnStage::Retrieving, "\"retrieving\""),
        (TurnStage::Generating, "\"generating\""),
        (TurnStage::Completed, "\"completed\""),
        (TurnStage::Failed, "\"failed\""),
    ];
    for (stage, json) in stages {
        assert_eq!(serde_json::to_string(&stage).unwrap(), json);
        assert_eq!(serde_json::from_str::<TurnStage>(json).unwrap(), stage);
        assert_eq!(json.trim_matches('"'), stage.as_str());
    }
}

#[tokio::test]
async fn turn_response_serializes_for_front_ends() {
    let model = Arc::new(grounded_model());
    let chat = orchestrator(model, retriever_over(&[DIABETES]).await);
    let sessions = SessionStore::new();

    let response = chat.handle_turn(&sessions, "A", "How is diabetes treated?").await.unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["session_id"], "A");
    assert_eq!(value["standalone_query"], "How is diabetes treated?");
    assert_eq!(value["sources"][0]["text"], DIABETES);
    assert!(value["answer"].as_str().unwrap().contains("insulin"));
}
