//! The polyfill bundle route.
//!
//! `GET {context}/v3/polyfill.js` and `GET {context}/v3/polyfill.min.js`.
//! The handler is a thin adapter: extract parameters, validate requested
//! feature names in strict mode, then stream the generated bundle through
//! the chosen compressor into the response body.

use std::io::Read;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::compression::{create_compressor, Encoding};
use crate::handlers::AppError;
use crate::params::PolyfillParameters;
use crate::state::AppState;

/// Cache policy shared by every polyfill response, rejections included.
const CACHE_CONTROL: &str =
    "public, s-maxage=31536000, max-age=604800, stale-while-revalidate=604800, stale-if-error=604800";
const SURROGATE_KEY: &str = "surrogate-key";
const SURROGATE_KEY_VALUE: &str = "polyfill-service";

/// Streamed body chunk size.
const CHUNK_SIZE: usize = 16 * 1024;

/// Serve the readable bundle (GET {context}/v3/polyfill.js).
pub async fn polyfill(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    respond(&state, &headers, query.as_deref(), false)
}

/// Serve the minified bundle (GET {context}/v3/polyfill.min.js).
pub async fn polyfill_min(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Response, AppError> {
    respond(&state, &headers, query.as_deref(), true)
}

fn respond(
    state: &AppState,
    headers: &HeaderMap,
    query: Option<&str>,
    minify: bool,
) -> Result<Response, AppError> {
    let parameters = PolyfillParameters::from_request(query, headers, minify);

    // 400 if requested polyfills are missing
    if parameters.strict {
        let missing = missing_features(state, &parameters);
        if !missing.is_empty() {
            return Ok(respond_with_missing_features(&missing));
        }
    }

    let bundle = state.bundle(&parameters.options)?;

    tracing::debug!(
        bytes = bundle.len(),
        compression = ?parameters.compression,
        minify,
        "Serving bundle"
    );

    Ok(respond_with_bundle(state, &parameters, bundle))
}

/// Requested feature names absent from the alias and polyfill name sets.
fn missing_features(state: &AppState, parameters: &PolyfillParameters) -> Vec<String> {
    parameters
        .options
        .features
        .iter()
        .filter(|request| !state.catalog.contains(&request.name))
        .map(|request| request.name.clone())
        .collect()
}

fn respond_with_missing_features(missing: &[String]) -> Response {
    let missing = missing.join(",");
    tracing::debug!(features = %missing, "Rejecting unknown features");

    (
        StatusCode::BAD_REQUEST,
        [
            ("cache-control", CACHE_CONTROL),
            (SURROGATE_KEY, SURROGATE_KEY_VALUE),
        ],
        format!(
            "Requested features do not all exist in polyfill-service, \
             please remove them from the URL: {missing} do not exist."
        ),
    )
        .into_response()
}

fn respond_with_bundle(
    state: &AppState,
    parameters: &PolyfillParameters,
    bundle: Arc<String>,
) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET,HEAD,OPTIONS")
        .header(header::CACHE_CONTROL, CACHE_CONTROL)
        .header(header::CONTENT_TYPE, "text/javascript; charset=utf-8")
        .header(SURROGATE_KEY, SURROGATE_KEY_VALUE)
        .header(header::LAST_MODIFIED, state.last_modified.as_ref());

    if let Some(token) = parameters.compression.content_encoding() {
        builder = builder.header(header::CONTENT_ENCODING, token);
    }

    builder
        .body(stream_bundle(bundle, parameters.compression))
        .unwrap()
}

/// Streams the bundle through the compressor in bounded chunks.
///
/// A client that disconnects mid-stream simply stops polling the body;
/// the stream is dropped without touching any error path. Compressor I/O
/// failures end the stream with an error, which aborts the response at
/// the transport level.
fn stream_bundle(bundle: Arc<String>, encoding: Encoding) -> Body {
    let stream = async_stream::stream! {
        let mut source = create_compressor(encoding, bundle.as_bytes().to_vec());
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => yield Ok::<_, std::io::Error>(buffer[..n].to_vec()),
                Err(error) => {
                    tracing::error!(error = %error, "Bundle streaming failed");
                    yield Err(error);
                    break;
                }
            }
        }
    };
    Body::from_stream(stream)
}
