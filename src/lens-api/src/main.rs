use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use hyper::header::{self, HeaderValue};
use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{body, Body, Method, Request, Response, Server, StatusCode};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

use lens_serve::{
    build_query, ApiError, Config, LabelDetector, MockCommerce, ProductProvider, Timer,
};

#[derive(Deserialize)]
struct SearchRequest {
    image: Option<String>,
}

fn json_response(status: StatusCode, payload: serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("Failed to render response")
}

fn error_response(err: &ApiError) -> Response<Body> {
    let status = if err.status_code() == 400 {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    json_response(status, json!({ "error": err.to_string() }))
}

/// All origins are allowed on all routes.
fn with_cors(mut response: Response<Body>) -> Response<Body> {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

async fn search(req: Request<Body>, detector: &LabelDetector) -> Result<Response<Body>, ApiError> {
    let mut t = Timer::new_start("Handling search request");

    let raw = body::to_bytes(req.into_body()).await.map_err(|err| {
        error!("failed to read request body: {}", err);
        ApiError::Internal
    })?;

    let request: SearchRequest =
        serde_json::from_slice(&raw).unwrap_or(SearchRequest { image: None });
    let image_data = request.image.ok_or(ApiError::MissingImage)?;

    // Strip a data-URL prefix such as "data:image/jpeg;base64,".
    let encoded = match image_data.find("base64,") {
        Some(idx) => &image_data[idx + "base64,".len()..],
        None => image_data.as_str(),
    };

    let image = base64::decode(encoded).map_err(|err| {
        error!("failed to decode base64 image: {}", err);
        ApiError::InvalidImage
    })?;

    let labels = detector.detect_labels(&image).await;

    if labels.is_empty() {
        return Err(ApiError::NoDetection);
    }

    let query = build_query(&labels);
    info!("searching products for: {}", query);

    let products = MockCommerce.search(&query);

    t.stop();

    Ok(json_response(
        StatusCode::OK,
        json!({ "products": products }),
    ))
}

fn health() -> Response<Body> {
    let timestamp = Utc::now().timestamp_millis() as f64 / 1000.0;

    json_response(
        StatusCode::OK,
        json!({ "status": "ok", "timestamp": timestamp }),
    )
}

async fn handle(
    req: Request<Body>,
    detector: Arc<LabelDetector>,
) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::POST, "/api/search") => match search(req, &detector).await {
            Ok(response) => response,
            Err(err) => {
                error!("search request failed: {}", err);
                error_response(&err)
            }
        },
        (&Method::GET, "/api/health") => health(),
        (&Method::OPTIONS, _) => Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Body::empty())
            .expect("Failed to render response"),
        _ => json_response(StatusCode::NOT_FOUND, json!({ "error": "Not found" })),
    };

    Ok(with_cors(response))
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    let default_level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let detector = Arc::new(LabelDetector::from_config(&config));

    // A `MakeService` that produces a `Service` to handle each connection.
    let make_service = make_service_fn(move |_conn: &AddrStream| {
        let detector = Arc::clone(&detector);

        let service = service_fn(move |req| handle(req, detector.clone()));

        async move { Ok::<_, Infallible>(service) }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{}", addr);

    let server = Server::bind(&addr).serve(make_service);

    if let Err(e) = server.await {
        eprintln!("server error: {}", e);
    }
}
