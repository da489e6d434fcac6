//! Leaderboard submission
//!
//! Posts a finished run to the lodge leaderboard endpoint. Submission is
//! fire-and-forget: the game never blocks on the network and a failed
//! post only leaves a log line behind.

use serde::Serialize;

/// Relative endpoint; the hosting page and API share an origin.
pub const SUBMIT_URL: &str = "/api/leaderboard";

/// One finished run, as the API expects it.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub user_id: String,
    pub name: String,
    pub score: u64,
    /// True when the run ended at the east gate rather than on a quit
    pub completed: bool,
}

impl RunReport {
    pub fn new(user_id: &str, name: &str, score: u64, completed: bool) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.to_string(),
            score,
            completed,
        }
    }
}

/// Submit a run in the background (WASM only).
#[cfg(target_arch = "wasm32")]
pub fn submit(report: RunReport) {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::{spawn_local, JsFuture};
    use web_sys::{Request, RequestInit, RequestMode, Response};

    let body = match serde_json::to_string(&report) {
        Ok(body) => body,
        Err(e) => {
            log::error!("Leaderboard payload failed to serialize: {e}");
            return;
        }
    };

    spawn_local(async move {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_body(&JsValue::from_str(&body));

        let request = match Request::new_with_str_and_init(SUBMIT_URL, &opts) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Leaderboard request build failed: {e:?}");
                return;
            }
        };
        if request
            .headers()
            .set("Content-Type", "application/json")
            .is_err()
        {
            log::error!("Leaderboard request headers rejected");
            return;
        }

        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        match JsFuture::from(window.fetch_with_request(&request)).await {
            Ok(value) => {
                let response: Response = match value.dyn_into() {
                    Ok(r) => r,
                    Err(_) => {
                        log::error!("Leaderboard fetch returned a non-Response value");
                        return;
                    }
                };
                if response.ok() {
                    log::info!("Run submitted: {} points", report.score);
                } else {
                    log::warn!("Leaderboard rejected the run: HTTP {}", response.status());
                }
            }
            Err(e) => log::warn!("Leaderboard submit failed: {e:?}"),
        }
    });
}

/// Native builds have nowhere to send a run.
#[cfg(not(target_arch = "wasm32"))]
pub fn submit(report: RunReport) {
    log::info!(
        "Run finished: {} scored {} (completed: {})",
        report.name,
        report.score,
        report.completed
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_flat() {
        let report = RunReport::new("u-42", "Hiram", 1650, true);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"user_id\":\"u-42\""));
        assert!(json.contains("\"score\":1650"));
        assert!(json.contains("\"completed\":true"));
    }
}
