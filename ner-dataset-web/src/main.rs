//! Servidor web Axum que recebe documentos gerados e monta o corpus NER, com
//! WebSocket para acompanhar o progresso em tempo real.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ner_dataset::{
    align::AlignmentMode,
    config::{DatasetConfig, Loader},
    document::{DocumentType, RawDocument},
    generation::GenerationPlan,
    output::{write_corpus, CorpusFiles},
    pipeline::{AssembledCorpus, DatasetPipeline, DocumentFailure, PipelineEvent},
    split::{rng_from_seed, SplitName},
    stats::StatisticsRecord,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: DatasetPipeline,
    config: DatasetConfig,
}

impl AppState {
    fn pipeline_for(&self, alignment: Option<AlignmentMode>) -> DatasetPipeline {
        match alignment {
            Some(mode) => self.pipeline.with_alignment(mode),
            None => self.pipeline,
        }
    }
}

#[derive(Deserialize)]
struct PlanQuery {
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct AnnotateRequest {
    document: RawDocument,
    #[serde(default)]
    alignment: Option<AlignmentMode>,
}

/// Pedido de montagem do corpus (HTTP e WebSocket)
#[derive(Deserialize)]
struct CorpusRequest {
    documents: Vec<RawDocument>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    alignment: Option<AlignmentMode>,
    /// Grava os arquivos em `dataset.output_path`.
    #[serde(default)]
    persist: bool,
}

#[derive(Serialize)]
struct CorpusResponse {
    train: String,
    dev: String,
    test: String,
    statistics: StatisticsRecord,
    failures: Vec<DocumentFailure>,
    files: Option<CorpusFiles>,
}

impl CorpusResponse {
    fn new(corpus: AssembledCorpus, files: Option<CorpusFiles>) -> Self {
        Self {
            train: corpus.split.render(SplitName::Train),
            dev: corpus.split.render(SplitName::Dev),
            test: corpus.split.render(SplitName::Test),
            statistics: corpus.statistics,
            failures: corpus.failures,
            files,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Loader::new()
        .with_optional_file("ner-dataset.toml")
        .with_env()
        .build()?;
    let pipeline = DatasetPipeline::from_config(&config)?;
    let addr = config.server.addr.clone();
    let state = Arc::new(AppState { pipeline, config });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Servidor do corpus NER iniciado em http://{addr}");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/document-types", get(document_types_handler))
        .route("/plan", get(plan_handler))
        .route("/annotate", post(annotate_handler))
        .route("/corpus", post(corpus_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// Tabela de tipos de documento (nome alemão e campos obrigatórios)
async fn document_types_handler() -> impl IntoResponse {
    Json(DocumentType::descriptors())
}

/// Sorteia o plano de geração do próximo documento
async fn plan_handler(Query(query): Query<PlanQuery>) -> impl IntoResponse {
    let mut rng = rng_from_seed(query.seed);
    Json(GenerationPlan::random(&mut rng))
}

/// Anota um único documento
async fn annotate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnotateRequest>,
) -> Response {
    match state.pipeline_for(req.alignment).annotate(&req.document) {
        Ok(doc) => Json(doc).into_response(),
        Err(err) => error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
    }
}

/// Monta o corpus completo e, opcionalmente, grava os arquivos
async fn corpus_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CorpusRequest>,
) -> Response {
    if req.documents.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Nenhum documento");
    }
    let limit = state.pipeline.target_size();
    if req.documents.len() > limit {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("{} documentos excedem o limite de {limit}", req.documents.len()),
        );
    }

    info!("Montando corpus com {} documentos", req.documents.len());

    // Pipeline síncrono em thread separada para não bloquear o runtime
    let state_for_thread = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        let pipeline = state_for_thread.pipeline_for(req.alignment);
        let mut rng = rng_from_seed(req.seed.or(state_for_thread.config.split.seed));
        let corpus = pipeline.build_corpus(req.documents, &mut rng);
        let files = if req.persist {
            let dir = &state_for_thread.config.dataset.output_path;
            Some(write_corpus(dir, &corpus.split, &corpus.statistics)?)
        } else {
            None
        };
        Ok::<_, ner_dataset::Error>(CorpusResponse::new(corpus, files))
    })
    .await;

    match result {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(err)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe um `CorpusRequest`, executa o pipeline e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let req = match serde_json::from_str::<CorpusRequest>(&text) {
                    Ok(req) => req,
                    Err(err) => {
                        let reply = serde_json::json!({"error": err.to_string()}).to_string();
                        if socket.send(Message::Text(reply)).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };
                if req.documents.len() > state.pipeline.target_size() {
                    let reply = serde_json::json!({"error": "Documentos excedem o limite"}).to_string();
                    if socket.send(Message::Text(reply)).await.is_err() {
                        return;
                    }
                    continue;
                }

                info!("Montando corpus via WebSocket: {} documentos", req.documents.len());

                let (tx_std, rx_std) = std::sync::mpsc::channel::<PipelineEvent>();
                let state_for_thread = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    let pipeline = state_for_thread.pipeline_for(req.alignment);
                    let mut rng = rng_from_seed(req.seed.or(state_for_thread.config.split.seed));
                    pipeline.build_corpus_streaming(req.documents, &mut rng, &tx_std);
                });

                // Eventos ficam na fila std::mpsc até o pipeline concluir
                handle.await.ok();
                let events: Vec<PipelineEvent> = rx_std.try_iter().collect();

                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use ner_dataset::config::load_defaults;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        let config = load_defaults().unwrap();
        let pipeline = DatasetPipeline::from_config(&config).unwrap();
        Arc::new(AppState { pipeline, config })
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn contract_document(id: u32) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "type": "POLICY_CONFIRMATION",
            "text": "Vertragsnummer VS-2024-123456 wurde erstellt.",
            "entities": {"contract_numbers": ["VS-2024-123456"]}
        })
    }

    #[tokio::test]
    async fn lists_document_types() {
        let response = app(test_state())
            .oneshot(Request::get("/document-types").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[1]["german_name"], "Schadensmeldung");
    }

    #[tokio::test]
    async fn seeded_plan_is_stable() {
        let a = app(test_state())
            .oneshot(Request::get("/plan?seed=11").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let b = app(test_state())
            .oneshot(Request::get("/plan?seed=11").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(a).await, json_body(b).await);
    }

    #[tokio::test]
    async fn annotates_single_document() {
        let request = post_json("/annotate", serde_json::json!({"document": contract_document(1)}));
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["tagged_text"],
            "Vertragsnummer\tO\nVS-2024-123456\tS-CONTRACT_NUMBER\nwurde\tO\nerstellt\tO\n.\tO\n\n"
        );
    }

    #[tokio::test]
    async fn empty_document_is_unprocessable() {
        let document = serde_json::json!({"id": 2, "type": "CANCELLATION", "text": "   "});
        let request = post_json("/annotate", serde_json::json!({"document": document}));
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn builds_corpus() {
        let documents: Vec<_> = (1..=10).map(contract_document).collect();
        let request = post_json("/corpus", serde_json::json!({"documents": documents, "seed": 3}));
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["statistics"]["train_size"], 7);
        assert_eq!(body["statistics"]["dev_size"], 1);
        assert_eq!(body["statistics"]["test_size"], 2);
        assert!(body["files"].is_null());
        assert!(body["dev"].as_str().unwrap().ends_with(".\tO\n\n\n\n"));
    }

    #[tokio::test]
    async fn malformed_entities_do_not_abort_corpus() {
        let documents = serde_json::json!([
            contract_document(1),
            {"id": 2, "type": "CLAIM_REPORT", "text": "Herr Max Weber", "entities": {"person_names": "Max"}},
            {"id": 3, "type": "CLAIM_REPORT", "text": "Kunde KD-1", "entities": null},
        ]);
        let request = post_json("/corpus", serde_json::json!({"documents": documents, "seed": 1}));
        let response = app(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["statistics"]["total_documents"], 3);
        assert_eq!(body["statistics"]["failed_documents"], 0);
        assert_eq!(body["statistics"]["entity_counts"]["PERSON_NAME"], 0);
        assert_eq!(body["statistics"]["entity_counts"]["CONTRACT_NUMBER"], 1);
    }

    #[tokio::test]
    async fn rejects_corpus_above_target_size() {
        let config = Loader::new()
            .set_override("dataset.target_size", 2)
            .unwrap()
            .build()
            .unwrap();
        let pipeline = DatasetPipeline::from_config(&config).unwrap();
        let state = Arc::new(AppState { pipeline, config });

        let documents: Vec<_> = (1..=3).map(contract_document).collect();
        let request = post_json("/corpus", serde_json::json!({"documents": documents}));
        let response = app(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
