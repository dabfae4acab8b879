//! Reading progress bar component.

use kilowhat_wasm::ReadingProgressBar;
use leptos::prelude::*;

/// Adds the reading progress bar while mounted.
///
/// Place it on article pages; the bar itself is appended to `<body>`.
#[component]
pub fn ReadingProgress() -> impl IntoView {
    let instance = StoredValue::new_local(None::<ReadingProgressBar>);

    Effect::new(move |_| {
        if instance.with_value(Option::is_some) {
            return;
        }
        match ReadingProgressBar::mount() {
            Ok(bar) => instance.set_value(Some(bar)),
            Err(err) => log::error!("reading progress failed to mount: {err}"),
        }
    });

    on_cleanup(move || {
        instance.update_value(|bar| {
            if let Some(bar) = bar.take() {
                bar.destroy();
            }
        });
    });
}
