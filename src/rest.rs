/*!
chartdeck REST API Server

Serves chart manifests and NVD3 aggregate payloads for one dataset, loaded
once at startup. Every request is a pure derivation over the shared
immutable snapshot; date filters are per-request and never touch state.

## Usage

```bash
chartdeck-rest --data campaign.csv --structure structure.json --port 3334
```

## Endpoints

- `GET /api/v1/health` - Health check
- `GET /api/v1/version` - Version information
- `GET /api/v1/structure` - Column structure and classification
- `GET /api/v1/manifest` - Chart manifest (optional `page`, `page_size`)
- `GET /api/v1/charts/:id/data` - One chart's payload (optional `start`, `end`)
- `GET /api/v1/ratio` - Per-group measure ratio (`dimension`, `numerator`, `denominator`)
- `GET /api/v1/scatter` - Per-group scatter series (`dimension`, `x`, `y`)
*/

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chartdeck::reader::{CsvSource, RowSource, StructureFile, StructureSource};
use chartdeck::writer::Nvd3Writer;
use chartdeck::{
    filter, schema, ChartData, ChartKind, ChartSpec, ColumnDescriptor, Columns, Dataset,
    DeckError, DEFAULT_PAGE_SIZE, VERSION,
};

/// CLI arguments for the REST API server
#[derive(Parser)]
#[command(name = "chartdeck-rest")]
#[command(about = "chartdeck REST API Server")]
#[command(version = VERSION)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind to
    #[arg(long, default_value = "3334")]
    port: u16,

    /// CORS allowed origins (comma-separated)
    #[arg(long, default_value = "*")]
    cors_origin: String,

    /// Path to the CSV dataset to serve
    #[arg(long)]
    data: PathBuf,

    /// Structure manifest path (inferred from the data when omitted)
    #[arg(long)]
    structure: Option<PathBuf>,

    /// Default charts per manifest page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    /// The dataset loaded at startup, shared read-only across requests
    dataset: Arc<Dataset>,
    /// Default page size when a request does not pass one
    page_size: usize,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for /api/v1/manifest
#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
    page_size: Option<usize>,
}

/// Date window query parameters
#[derive(Debug, Deserialize)]
struct WindowQuery {
    start: Option<String>,
    end: Option<String>,
}

/// Query parameters for /api/v1/ratio
#[derive(Debug, Deserialize)]
struct RatioQuery {
    dimension: Option<String>,
    numerator: Option<String>,
    denominator: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

/// Query parameters for /api/v1/scatter
#[derive(Debug, Deserialize)]
struct ScatterQuery {
    dimension: Option<String>,
    x: Option<String>,
    y: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

/// Successful API response
#[derive(Debug, Serialize)]
struct ApiSuccess<T> {
    status: String,
    data: T,
}

/// Error API response body
#[derive(Debug, Serialize)]
struct ApiError {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    code: String,
    message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Version response
#[derive(Debug, Serialize)]
struct VersionResponse {
    version: String,
    writers: Vec<String>,
}

/// Structure endpoint result
#[derive(Debug, Serialize)]
struct StructureResult {
    rows: usize,
    structure: Vec<ColumnDescriptor>,
    classified: Columns,
}

/// Manifest endpoint result
#[derive(Debug, Serialize)]
struct ManifestResult {
    total: usize,
    page: Option<usize>,
    page_count: usize,
    page_size: usize,
    charts: Vec<ChartSpec>,
}

/// Chart payload result
#[derive(Debug, Serialize)]
struct ChartResult {
    chart: ChartSpec,
    data: serde_json::Value,
}

// ============================================================================
// Error Handling
// ============================================================================

/// Custom error type for API responses
struct ApiErrorResponse {
    status: StatusCode,
    error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let json = Json(self.error);
        (self.status, json).into_response()
    }
}

impl From<DeckError> for ApiErrorResponse {
    fn from(err: DeckError) -> Self {
        let (status, code) = match &err {
            DeckError::ValidationError(_) => (StatusCode::BAD_REQUEST, "ValidationError"),
            DeckError::StructureError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "StructureError"),
            DeckError::SourceError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SourceError"),
            DeckError::DuplicateChartId(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DuplicateChartId")
            }
            DeckError::WriterError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "WriterError"),
        };

        ApiErrorResponse {
            status,
            error: ApiError {
                error: ErrorDetails {
                    code: code.to_string(),
                    message: err.to_string(),
                },
            },
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Load the dataset to serve, reading or inferring its structure
fn load_dataset(cli: &Cli) -> Result<Dataset, DeckError> {
    let source = CsvSource::open(&cli.data)?;
    let rows = source.rows()?;

    let descriptors = match &cli.structure {
        Some(path) => StructureFile::new(path).structure()?,
        None => {
            info!("No structure manifest given, inferring from the data");
            schema::infer_structure(&source.column_names()?, &rows)
        }
    };

    let dataset = Dataset::load(descriptors, rows)?;
    info!(
        "Loaded {} rows, {} columns, {} charts from {}",
        dataset.row_count(),
        dataset.structure().len(),
        dataset.manifest().len(),
        cli.data.display()
    );
    Ok(dataset)
}

/// 404 response for an id the manifest does not contain
fn unknown_chart(id: &str) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::NOT_FOUND,
        error: ApiError {
            error: ErrorDetails {
                code: "UnknownChart".to_string(),
                message: format!("No chart with id '{}'", id),
            },
        },
    }
}

/// 400 response for a required query parameter that was not supplied
fn missing_param(name: &str) -> ApiErrorResponse {
    DeckError::ValidationError(format!("Missing query parameter '{}'", name)).into()
}

// ============================================================================
// Handler Functions
// ============================================================================

/// GET /api/v1/health - Health check
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

/// GET /api/v1/version - Version information
async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: VERSION.to_string(),
        writers: vec!["nvd3".to_string()],
    })
}

/// GET /api/v1/structure - Column structure and classification
async fn structure_handler(State(state): State<AppState>) -> Json<ApiSuccess<StructureResult>> {
    let dataset = &state.dataset;
    Json(ApiSuccess {
        status: "success".to_string(),
        data: StructureResult {
            rows: dataset.row_count(),
            structure: dataset.structure().to_vec(),
            classified: dataset.columns().clone(),
        },
    })
}

/// GET /api/v1/manifest - Chart manifest, whole or one page
async fn manifest_handler(
    State(state): State<AppState>,
    Query(params): Query<PageQuery>,
) -> Json<ApiSuccess<ManifestResult>> {
    let dataset = &state.dataset;
    let page_size = params.page_size.unwrap_or(state.page_size);
    let charts = match params.page {
        Some(page) => dataset.page(page, page_size).to_vec(),
        None => dataset.manifest().to_vec(),
    };

    Json(ApiSuccess {
        status: "success".to_string(),
        data: ManifestResult {
            total: dataset.manifest().len(),
            page: params.page,
            page_count: dataset.page_count(page_size),
            page_size,
            charts,
        },
    })
}

/// GET /api/v1/charts/:id/data - One chart's NVD3 payload
async fn chart_data_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<ApiSuccess<ChartResult>>, ApiErrorResponse> {
    let range = filter::parse_range(params.start.as_deref(), params.end.as_deref())?;

    let dataset = &state.dataset;
    let spec = dataset.find_chart(&id).ok_or_else(|| unknown_chart(&id))?;
    let data = dataset.aggregate_in(spec, &range);
    let payload = Nvd3Writer::new().payload(spec, &data)?;

    info!("Serving chart '{}': {} points", spec.id, data.len());

    Ok(Json(ApiSuccess {
        status: "success".to_string(),
        data: ChartResult {
            chart: spec.clone(),
            data: payload,
        },
    }))
}

/// GET /api/v1/ratio - Per-group ratio of two measures
async fn ratio_handler(
    State(state): State<AppState>,
    Query(params): Query<RatioQuery>,
) -> Result<Json<ApiSuccess<ChartResult>>, ApiErrorResponse> {
    let dimension = params.dimension.ok_or_else(|| missing_param("dimension"))?;
    let numerator = params.numerator.ok_or_else(|| missing_param("numerator"))?;
    let denominator = params
        .denominator
        .ok_or_else(|| missing_param("denominator"))?;
    let range = filter::parse_range(params.start.as_deref(), params.end.as_deref())?;

    let dataset = &state.dataset;
    let bars = dataset.ratio_in(&dimension, &numerator, &denominator, &range);

    let spec = ChartSpec {
        id: "ratio".to_string(),
        title: format!("{} / {}", numerator, denominator),
        kind: ChartKind::CategoricalBar,
        measure: numerator,
        dimension,
    };
    let payload = Nvd3Writer::new().payload(&spec, &ChartData::Bars(bars))?;

    info!("Serving ratio '{}'", spec.title);

    Ok(Json(ApiSuccess {
        status: "success".to_string(),
        data: ChartResult {
            chart: spec,
            data: payload,
        },
    }))
}

/// GET /api/v1/scatter - Per-group scatter series of two measures
async fn scatter_handler(
    State(state): State<AppState>,
    Query(params): Query<ScatterQuery>,
) -> Result<Json<ApiSuccess<serde_json::Value>>, ApiErrorResponse> {
    let dimension = params.dimension.ok_or_else(|| missing_param("dimension"))?;
    let x = params.x.ok_or_else(|| missing_param("x"))?;
    let y = params.y.ok_or_else(|| missing_param("y"))?;
    let range = filter::parse_range(params.start.as_deref(), params.end.as_deref())?;

    let dataset = &state.dataset;
    let series = dataset.scatter_in(&dimension, &x, &y, &range);
    let payload = Nvd3Writer::new().scatter_payload(&series);

    info!("Serving scatter {} vs {} by {}", x, y, dimension);

    Ok(Json(ApiSuccess {
        status: "success".to_string(),
        data: payload,
    }))
}

/// Root handler
async fn root_handler() -> &'static str {
    "chartdeck REST API Server - See /api/v1/health for status"
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chartdeck_rest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load the dataset once; requests share it read-only
    let dataset = load_dataset(&cli)?;

    let state = AppState {
        dataset: Arc::new(dataset),
        page_size: cli.page_size,
    };

    // Configure CORS
    let cors = if cli.cors_origin == "*" {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(vec![header::CONTENT_TYPE])
    } else {
        let origins: Vec<_> = cli
            .cors_origin
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(vec![header::CONTENT_TYPE])
    };

    // Build router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/version", get(version_handler))
        .route("/api/v1/structure", get(structure_handler))
        .route("/api/v1/manifest", get(manifest_handler))
        .route("/api/v1/charts/:id/data", get(chart_data_handler))
        .route("/api/v1/ratio", get(ratio_handler))
        .route("/api/v1/scatter", get(scatter_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .expect("Invalid host or port");

    info!("Starting chartdeck REST API server on {}", addr);
    info!("API documentation:");
    info!("  GET /api/v1/health - Health check");
    info!("  GET /api/v1/version - Version info");
    info!("  GET /api/v1/structure - Column structure");
    info!("  GET /api/v1/manifest - Chart manifest");
    info!("  GET /api/v1/charts/:id/data - Chart payload");
    info!("  GET /api/v1/ratio - Measure ratio");
    info!("  GET /api/v1/scatter - Scatter series");

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
