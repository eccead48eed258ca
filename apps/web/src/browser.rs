//! Browser adapters: location/history as the dashboard's query store,
//! `window.innerWidth` as the viewport and `fetch` as the transport.

use cube_report_core::{reshape, FetchError, FetchResult, HistoryPort, ViewportProvider};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Dashboard query mirrored into the address bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserHistory;

impl HistoryPort for BrowserHistory {
    fn initial_query(&self) -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        let query = search.trim_start_matches('?');
        (!query.is_empty()).then(|| query.to_string())
    }

    fn push(&mut self, query: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let (Ok(origin), Ok(path)) = (location.origin(), location.pathname()) else {
            return;
        };
        let url = if query.is_empty() {
            format!("{origin}{path}")
        } else {
            format!("{origin}{path}?{query}")
        };

        let pushed = window
            .history()
            .and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&url)));
        if let Err(error) = pushed {
            web_sys::console::warn_2(&"Failed to update history".into(), &error);
        }
    }
}

/// Width of the browser window in CSS pixels, read on every call so a
/// resize takes effect on the next frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserViewport;

impl ViewportProvider for BrowserViewport {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn width(&self) -> u16 {
        web_sys::window()
            .and_then(|window| window.inner_width().ok())
            .and_then(|width| width.as_f64())
            .map_or(0, |width| width.clamp(0.0, f64::from(u16::MAX)) as u16)
    }
}

fn js_error(value: &JsValue) -> FetchError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    FetchError::Network(message)
}

/// One GET through `window.fetch`. Non-2xx responses are errors; the body
/// is read as text and reshaped by the core.
pub async fn fetch_cube(url: &str) -> Result<FetchResult, FetchError> {
    let window =
        web_sys::window().ok_or_else(|| FetchError::Network("no browser window".to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(url, &opts).map_err(|e| js_error(&e))?;
    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error(&e))?;
    let response: Response = response_value.dyn_into().map_err(|e| js_error(&e))?;

    if !response.ok() {
        return Err(FetchError::Status {
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(|e| js_error(&e))?)
        .await
        .map_err(|e| js_error(&e))?;
    let body = text
        .as_string()
        .ok_or_else(|| FetchError::Parse("response body is not text".to_string()))?;
    reshape(body.as_bytes())
}
