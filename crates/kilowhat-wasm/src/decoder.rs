//! Off-page image preloading.

use kilowhat_core::{ImageDecoder, UiError, platform::DecodeCallback};
use log::debug;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlImageElement;

/// Loads and decodes through a detached `<img>` and `HTMLImageElement.decode()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserImageDecoder;

impl ImageDecoder for BrowserImageDecoder {
    fn decode(&self, url: &str, done: DecodeCallback) {
        let url = url.to_string();
        spawn_local(async move {
            let result = load(&url).await.map_err(|err| {
                debug!("decode of {url} failed: {err:?}");
                UiError::image_load(url.as_str())
            });
            done(result);
        });
    }
}

async fn load(url: &str) -> Result<(), JsValue> {
    let image = HtmlImageElement::new()?;
    image.set_src(url);
    JsFuture::from(image.decode()).await?;
    Ok(())
}
