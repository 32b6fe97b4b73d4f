//! HTTP request handlers for the waypoint graph API
//!
//! Handlers only translate between JSON/text bodies and the graph, path and
//! storage modules. Every handler takes the shared graph lock for exactly the
//! duration of its graph access.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::core::error::{Error, GraphError, ImportError};
use crate::core::types::{EdgeRecord, NodeId};
use crate::core::AppState;
use crate::graph::{PathFinder, Snapshot};
use crate::storage::{self, SkippedEdge};

// Response types

/// Plain success acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always true
    pub success: bool,
}

impl SuccessResponse {
    fn ok() -> Self {
        Self { success: true }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create an error response with a message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Result of adding a node
#[derive(Debug, Serialize)]
pub struct AddNodeResponse {
    /// Always true
    pub success: bool,
    /// Id allocated to the new node
    pub node_id: NodeId,
}

/// Weight lookup result
#[derive(Debug, Serialize)]
pub struct WeightResponse {
    /// Edge weight
    pub weight: f64,
}

/// Shortest path result
#[derive(Debug, Serialize)]
pub struct PathResponse {
    /// Node ids from start to end inclusive
    pub path: Vec<NodeId>,
    /// Sum of edge weights along the path
    pub total_weight: f64,
}

/// Node as exposed by the graph query
#[derive(Debug, Serialize)]
pub struct NodeView {
    /// `[lat, lng]`
    pub pos: [f64; 2],
}

/// Graph query body: `nodes` keyed by id, `edges` as `[n1, n2, weight]`
#[derive(Debug, Serialize)]
pub struct GraphView {
    /// Node id to position
    pub nodes: BTreeMap<NodeId, NodeView>,
    /// Edge triples
    pub edges: Vec<EdgeRecord>,
}

impl From<Snapshot> for GraphView {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            nodes: snapshot
                .nodes
                .into_iter()
                .map(|(id, pos)| (id, NodeView { pos: [pos.lat, pos.lng] }))
                .collect(),
            edges: snapshot.edges,
        }
    }
}

/// Import result: the rebuilt graph plus what was skipped
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Always true; skipped edges do not fail an import
    pub success: bool,
    /// Graph after import
    pub graph: GraphView,
    /// Number of edge records that were skipped
    pub skipped_edges: usize,
    /// Details of each skipped edge record
    pub skipped: Vec<SkippedEdge>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Nodes currently in the graph
    pub nodes: usize,
    /// Edges currently in the graph
    pub edges: usize,
}

// Request types

/// Accept either a JSON number or a numeric string
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Value(T),
        Text(String),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Value(value) => Ok(value),
        Raw::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

/// Add node request
#[derive(Debug, Deserialize)]
pub struct AddNodeRequest {
    /// Latitude
    #[serde(deserialize_with = "lenient")]
    pub lat: f64,
    /// Longitude
    #[serde(deserialize_with = "lenient")]
    pub lng: f64,
}

/// Add edge request
#[derive(Debug, Deserialize)]
pub struct AddEdgeRequest {
    /// First endpoint
    #[serde(deserialize_with = "lenient")]
    pub node1: NodeId,
    /// Second endpoint
    #[serde(deserialize_with = "lenient")]
    pub node2: NodeId,
    /// Edge weight
    #[serde(deserialize_with = "lenient")]
    pub weight: f64,
}

/// Edge lookup request
#[derive(Debug, Deserialize)]
pub struct EdgeRequest {
    /// First endpoint
    #[serde(deserialize_with = "lenient")]
    pub node1: NodeId,
    /// Second endpoint
    #[serde(deserialize_with = "lenient")]
    pub node2: NodeId,
}

/// Shortest path request
#[derive(Debug, Deserialize)]
pub struct ShortestPathRequest {
    /// Start node
    #[serde(deserialize_with = "lenient")]
    pub start: NodeId,
    /// End node
    #[serde(deserialize_with = "lenient")]
    pub end: NodeId,
}

// Errors

/// Crate error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Graph(GraphError::EdgeNotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Import(ImportError::InputTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request rejected: {}", self.0);
        }
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}

/// JSON extractor that reports rejections as an `ErrorResponse`
pub struct JsonRequest<T>(pub T);

impl<T, S> FromRequest<S> for JsonRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonRequest(value)),
            Err(rejection) => {
                let error_message = match rejection {
                    JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
                    JsonRejection::JsonSyntaxError(_) => "Malformed JSON".to_string(),
                    JsonRejection::MissingJsonContentType(_) => {
                        "Missing or invalid Content-Type header. Expected 'application/json'".to_string()
                    }
                    JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
                    _ => "Invalid JSON request".to_string(),
                };

                tracing::warn!("JSON parsing error: {}", error_message);
                Err((StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error_message))))
            }
        }
    }
}

// Graph handlers

/// Add a node at the given position
pub async fn add_node(
    State(state): State<AppState>,
    JsonRequest(request): JsonRequest<AddNodeRequest>,
) -> Result<Json<AddNodeResponse>, ApiError> {
    if !(request.lat.is_finite() && request.lng.is_finite()) {
        return Err(Error::invalid_input(format!(
            "Coordinates must be finite numbers, got ({}, {})",
            request.lat, request.lng
        ))
        .into());
    }
    let node_id = state.graph.write().add_node(request.lat, request.lng);
    tracing::info!("Added node {} at ({}, {})", node_id, request.lat, request.lng);
    Ok(Json(AddNodeResponse {
        success: true,
        node_id,
    }))
}

/// Connect two existing nodes
pub async fn add_edge(
    State(state): State<AppState>,
    JsonRequest(request): JsonRequest<AddEdgeRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .graph
        .write()
        .add_edge(request.node1, request.node2, request.weight)?;
    tracing::info!(
        "Added edge {} -- {} (weight {})",
        request.node1,
        request.node2,
        request.weight
    );
    Ok(Json(SuccessResponse::ok()))
}

/// Weight of the edge between two nodes
pub async fn get_edge_weight(
    State(state): State<AppState>,
    JsonRequest(request): JsonRequest<EdgeRequest>,
) -> Result<Json<WeightResponse>, ApiError> {
    let weight = state.graph.read().edge_weight(request.node1, request.node2)?;
    Ok(Json(WeightResponse { weight }))
}

/// Minimum-weight path between two nodes
pub async fn shortest_path(
    State(state): State<AppState>,
    JsonRequest(request): JsonRequest<ShortestPathRequest>,
) -> Result<Json<PathResponse>, ApiError> {
    tracing::debug!("Shortest path requested: {} -> {}", request.start, request.end);
    let route = {
        let graph = state.graph.read();
        PathFinder::new(&graph).route(request.start, request.end)?
    };
    Ok(Json(PathResponse {
        path: route.nodes,
        total_weight: route.total_weight,
    }))
}

/// Current graph: nodes keyed by id and edge triples
pub async fn get_graph(State(state): State<AppState>) -> Json<GraphView> {
    let snapshot = state.graph.read().snapshot();
    Json(snapshot.into())
}

/// Remove every node and edge and restart id allocation
pub async fn reset_graph(State(state): State<AppState>) -> Json<SuccessResponse> {
    state.graph.write().clear();
    tracing::info!("Graph reset");
    Json(SuccessResponse::ok())
}

// File handlers

/// Export the graph as a text attachment, keeping a copy in the data directory
pub async fn export_graph(State(state): State<AppState>) -> Result<Response, ApiError> {
    let graph = state.graph.clone();
    let path = state.config.export_path();
    let document = tokio::task::spawn_blocking(move || {
        let graph = graph.read();
        storage::export_to_file(&graph, &path)
    })
    .await
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;

    let disposition = format!("attachment; filename=\"{}\"", state.config.storage.export_file);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response())
}

/// Replace the graph with the one described by the request body
pub async fn import_graph(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportResponse>, ApiError> {
    let importer = state.importer()?;
    let (report, snapshot) = {
        let mut graph = state.graph.write();
        let report = importer.import(&mut graph, &body)?;
        (report, graph.snapshot())
    };

    Ok(Json(ImportResponse {
        success: true,
        graph: snapshot.into(),
        skipped_edges: report.skipped.len(),
        skipped: report.skipped,
    }))
}

// System handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let graph = state.graph.read();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
    })
}

/// Root API endpoint
pub async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Waypoint Graph API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "endpoints": {
            "add_node": "POST /add_node",
            "add_edge": "POST /add_edge",
            "get_edge_weight": "POST /get_edge_weight",
            "shortest_path": "POST /shortest_path",
            "get_graph": "GET /get_graph",
            "export_graph": "GET /export_graph",
            "import_graph": "POST /import_graph",
            "reset": "POST /reset",
            "health": "GET /health"
        }
    }))
}
