//! Rotating tagline component.

use kilowhat_core::TypewriterOptions;
use kilowhat_wasm::TaglineTypewriter;
use leptos::prelude::*;

/// Default options with `phrases` swapped in. An empty list keeps the
/// built-in taglines.
pub fn tagline_options(phrases: Vec<String>) -> TypewriterOptions {
    let mut options = TypewriterOptions::default();
    if !phrases.is_empty() {
        options.phrases = phrases;
    }
    options
}

/// Tagline that types, holds and erases each phrase in turn.
#[component]
pub fn Tagline(
    /// Phrases to rotate through. Defaults to the site taglines.
    #[prop(default = vec![])]
    phrases: Vec<String>,
    /// Full options; overrides `phrases` when given.
    #[prop(optional)]
    options: Option<TypewriterOptions>,
    /// Updated with each phrase once it is fully typed.
    #[prop(optional)]
    current: Option<RwSignal<String>>,
    /// Extra classes for the container.
    #[prop(default = "tagline".to_string())]
    class: String,
) -> impl IntoView {
    let container = NodeRef::<leptos::html::Div>::new();
    let instance = StoredValue::new_local(None::<TaglineTypewriter>);
    let options = options.unwrap_or_else(|| tagline_options(phrases));

    Effect::new(move |_| {
        let Some(element) = container.get() else {
            return;
        };
        if instance.with_value(Option::is_some) {
            return;
        }

        match TaglineTypewriter::mount(element.into(), options.clone()) {
            Ok(tagline) => {
                if let Some(current) = current {
                    tagline
                        .typewriter()
                        .on_phrase_complete(move |phrase, _| current.set(phrase.to_string()));
                }
                tagline.start();
                instance.set_value(Some(tagline));
            }
            Err(err) => log::error!("tagline failed to mount: {err}"),
        }
    });

    on_cleanup(move || {
        instance.update_value(|tagline| {
            if let Some(tagline) = tagline.take() {
                tagline.destroy();
            }
        });
    });

    view! { <div id="tagline-container" class=class node_ref=container></div> }
}
