//! Line-oriented JSON front end: one request per input line, one response per
//! output line. Lets the click/zoom/reset operations be driven without a
//! terminal, e.g. `world-map --batch < requests.jsonl`.

use crate::error::MapError;
use crate::map::{RenderPipeline, ViewportState};
use crate::service::{ClickRequest, MapService, SelectionResponse, ZoomRequest};
use crate::session::SessionStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// Session used when a request names none
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Op {
    Click,
    Zoom,
    Reset,
}

/// Wire form of a request. Pixel fields stay optional so a missing one is
/// reported as invalid input instead of a parse failure.
#[derive(Debug, Deserialize)]
struct RawRequest {
    op: Op,
    session: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    x1: Option<f64>,
    y1: Option<f64>,
    x2: Option<f64>,
    y2: Option<f64>,
    #[serde(alias = "img_width")]
    displayed_width: Option<f64>,
    #[serde(alias = "img_height")]
    displayed_height: Option<f64>,
}

/// Only the session of a request, for lines that fail to parse as a whole
#[derive(Debug, Deserialize)]
struct SessionTag {
    session: Option<String>,
}

/// Session named by `line`, if it is at least a JSON object with one
fn session_of(line: &str) -> Option<String> {
    let mut bytes = line.as_bytes().to_vec();
    simd_json::serde::from_slice::<SessionTag>(&mut bytes)
        .ok()
        .and_then(|tag| tag.session)
}

fn required(value: Option<f64>, name: &str) -> Result<f64, MapError> {
    value.ok_or_else(|| MapError::InvalidInput(format!("missing field `{name}`")))
}

impl RawRequest {
    fn click(&self) -> Result<ClickRequest, MapError> {
        Ok(ClickRequest {
            x: required(self.x, "x")?,
            y: required(self.y, "y")?,
            displayed_width: required(self.displayed_width, "displayed_width")?,
            displayed_height: required(self.displayed_height, "displayed_height")?,
        })
    }

    fn zoom(&self) -> Result<ZoomRequest, MapError> {
        Ok(ZoomRequest {
            x1: required(self.x1, "x1")?,
            y1: required(self.y1, "y1")?,
            x2: required(self.x2, "x2")?,
            y2: required(self.y2, "y2")?,
            displayed_width: required(self.displayed_width, "displayed_width")?,
            displayed_height: required(self.displayed_height, "displayed_height")?,
        })
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct BatchResponse {
    pub session: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enemies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// `[lon_min, lon_max, lat_min, lat_max]` after the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResponse {
    fn ok(session: String, resp: SelectionResponse, state: &ViewportState) -> Self {
        Self {
            session,
            country: Some(resp.country),
            allies: resp.allies,
            enemies: resp.enemies,
            image: Some(resp.handle.token().to_string()),
            extent: Some(state.extent().to_array()),
            error: None,
        }
    }

    fn failed(session: String, err: &MapError, state: Option<&ViewportState>) -> Self {
        Self {
            session,
            country: None,
            allies: Vec::new(),
            enemies: Vec::new(),
            image: None,
            extent: state.map(|s| s.extent().to_array()),
            error: Some(err.to_string()),
        }
    }
}

/// Run one request line against the session store
pub fn handle_line<R, S>(service: &MapService<R>, sessions: &S, line: &str) -> BatchResponse
where
    R: RenderPipeline,
    S: SessionStore,
{
    let mut bytes = line.as_bytes().to_vec();
    let raw: RawRequest = match simd_json::serde::from_slice(&mut bytes) {
        Ok(raw) => raw,
        Err(e) => {
            let err = MapError::InvalidInput(format!("malformed request: {e}"));
            let session = session_of(line).unwrap_or_else(|| DEFAULT_SESSION.to_string());
            return BatchResponse::failed(session, &err, None);
        }
    };
    let session = raw.session.clone().unwrap_or_else(|| DEFAULT_SESSION.to_string());

    sessions.with_session(&session, |state| {
        let result = match raw.op {
            Op::Click => raw.click().and_then(|req| service.handle_click(state, &req)),
            Op::Zoom => raw.zoom().and_then(|req| service.handle_zoom_rectangle(state, &req)),
            Op::Reset => service.reset_view(state),
        };
        match result {
            Ok(resp) => BatchResponse::ok(session.clone(), resp, state),
            Err(err) => {
                warn!(session = %session, error = %err, "batch request failed");
                BatchResponse::failed(session.clone(), &err, Some(state))
            }
        }
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub requests: usize,
    pub failures: usize,
}

/// Answer every non-blank line of `input` on `output`
pub fn run_batch<R, S>(
    service: &MapService<R>,
    sessions: &S,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<BatchSummary>
where
    R: RenderPipeline,
    S: SessionStore,
{
    let mut summary = BatchSummary::default();
    for line in input.lines() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(service, sessions, &line);
        summary.requests += 1;
        if response.error.is_some() {
            summary.failures += 1;
        }
        let encoded = simd_json::serde::to_string(&response).context("encoding response")?;
        writeln!(output, "{encoded}").context("writing response")?;
    }
    output.flush().context("flushing responses")?;
    debug!(requests = summary.requests, failures = summary.failures, "batch finished");
    Ok(summary)
}
