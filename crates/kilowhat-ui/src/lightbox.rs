//! Lightbox overlay and the images that open in it.

use kilowhat_core::{LightboxOptions, LightboxState};
use kilowhat_wasm::TouchLightbox;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

/// An image shown inline and enlarged on click.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    /// Inline (thumbnail) URL.
    pub src: String,

    /// Full-resolution URL.
    #[serde(default)]
    pub full_src: Option<String>,

    /// Alt text.
    #[serde(default)]
    pub alt: String,
}

impl ImageData {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            full_src: None,
            alt: alt.into(),
        }
    }

    pub fn with_full_src(mut self, full_src: impl Into<String>) -> Self {
        self.full_src = Some(full_src.into());
        self
    }

    /// URL opened in the overlay, falling back to the inline image.
    pub fn enlarged_src(&self) -> &str {
        self.full_src
            .as_deref()
            .filter(|src| !src.is_empty())
            .unwrap_or(&self.src)
    }
}

/// Thumbnail that opens in the page's [`Lightbox`].
#[component]
pub fn LightboxImage(
    /// The image to show.
    image: ImageData,
    /// Extra classes for the `<img>`.
    #[prop(default = "".to_string())]
    class: String,
) -> impl IntoView {
    let full_src = image.enlarged_src().to_string();

    view! {
      <img
        src=image.src
        alt=image.alt
        class=class
        loading="lazy"
        data-lightbox="true"
        data-full-src=full_src
      />
    }
}

/// Overlay markup plus the touch lightbox bound to it.
///
/// Clicks on any `<img data-lightbox="true">` on the page open the overlay.
#[component]
pub fn Lightbox(
    /// Element id of the overlay.
    #[prop(default = "lightbox".to_string())]
    id: String,
    /// Gesture and animation options.
    #[prop(optional)]
    options: Option<LightboxOptions>,
    /// Mirrors whether an image is showing.
    #[prop(optional)]
    open: Option<RwSignal<bool>>,
) -> impl IntoView {
    let root = NodeRef::<leptos::html::Div>::new();
    let instance = StoredValue::new_local(None::<TouchLightbox>);
    let options = options.unwrap_or_default();

    Effect::new(move |_| {
        let Some(element) = root.get() else {
            return;
        };
        if instance.with_value(Option::is_some) {
            return;
        }

        match TouchLightbox::mount(element.into(), options.clone()) {
            Ok(lightbox) => {
                if let Some(open) = open {
                    lightbox
                        .lightbox()
                        .set_state_observer(move |state| open.set(state == LightboxState::Open));
                }
                instance.set_value(Some(lightbox));
            }
            Err(err) => log::error!("lightbox failed to mount: {err}"),
        }
    });

    on_cleanup(move || {
        instance.update_value(|lightbox| {
            if let Some(lightbox) = lightbox.take() {
                lightbox.destroy();
            }
        });
    });

    view! {
      <div
        id=id
        class="lightbox"
        role="dialog"
        aria-modal="true"
        aria-label="Image viewer"
        aria-hidden="true"
        node_ref=root
      >
        <div class="lightbox-container">
          <button class="lightbox-close" type="button" aria-label="Close image">
            "×"
          </button>
          <div class="lightbox-loading" aria-hidden="true"></div>
          <img class="lightbox-image" alt="" />
        </div>
      </div>
    }
}
