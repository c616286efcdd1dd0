use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use chord_core::{Dataset, LoadError};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Served next to the page.
pub const DATA_URL: &str = "data/chart4_chord_all.json";

pub type LoadResult = Result<Rc<Dataset>, Rc<LoadError>>;

/// The one load of a page; every clone resolves to the same result.
pub type PendingLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

/// Starts a load on first use and hands the same in-flight future to everyone
/// after. The result, failures included, is kept for the page's lifetime.
#[derive(Default)]
pub struct SharedLoad {
    pending: RefCell<Option<PendingLoad>>,
}

impl SharedLoad {
    pub fn load<F, Fut>(&self, fetch: F) -> PendingLoad
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Dataset, LoadError>> + 'static,
    {
        self.pending
            .borrow_mut()
            .get_or_insert_with(|| {
                let document = fetch();
                async move {
                    let dataset = document.await?;
                    dataset.validate()?;
                    Ok::<_, LoadError>(Rc::new(dataset))
                }
                .map(|result| result.map_err(Rc::new))
                .boxed_local()
                .shared()
            })
            .clone()
    }
}

thread_local! {
    static DATASET: SharedLoad = SharedLoad::default();
}

/// Fetches and validates the dataset once per page; every caller shares it.
pub async fn load_dataset() -> LoadResult {
    DATASET.with(|load| load.load(|| fetch_dataset(DATA_URL))).await
}

async fn fetch_dataset(url: &str) -> Result<Dataset, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".to_string()))?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let response: Response = response_value.dyn_into().map_err(js_error)?;

    if !response.ok() {
        return Err(LoadError::Fetch(format!(
            "{url}: HTTP {} {}",
            response.status(),
            response.status_text()
        )));
    }

    let json = JsFuture::from(response.json().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    serde_wasm_bindgen::from_value::<Dataset>(json)
        .map_err(|error| LoadError::Fetch(format!("{url}: {error}")))
}

fn js_error(value: JsValue) -> LoadError {
    LoadError::Fetch(
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}")),
    )
}
