//! ARIA live regions for screen reader announcements.

use std::rc::Rc;

use kilowhat_core::{Announcer, Politeness, Scheduler};
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::error::LogFailure;

/// Delay between clearing a region and writing the message, so an identical
/// message is still read again.
pub const ANNOUNCE_DELAY_MS: u32 = 100;

const OFFSCREEN_STYLE: &str = "position: absolute; left: -10000px; width: 1px; height: 1px; overflow: hidden;";

/// Element id of the live region for `politeness`.
pub fn region_id(politeness: Politeness) -> &'static str {
    match politeness {
        Politeness::Polite => "aria-live-polite",
        Politeness::Assertive => "aria-live-assertive",
    }
}

/// Writes announcements into page-wide live regions, creating them on first use.
pub struct LiveRegionAnnouncer {
    document: Document,
    scheduler: Rc<dyn Scheduler>,
}

impl LiveRegionAnnouncer {
    pub fn new(document: Document, scheduler: Rc<dyn Scheduler>) -> Self {
        Self { document, scheduler }
    }

    /// Find the region for `politeness` or append a new one to `<body>`.
    pub fn region(&self, politeness: Politeness) -> Option<HtmlElement> {
        let id = region_id(politeness);
        if let Some(existing) = self.document.get_element_by_id(id) {
            return existing.dyn_into::<HtmlElement>().ok();
        }

        let region = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        region.set_id(id);
        region.set_attribute("aria-live", politeness.as_str()).or_log("set aria-live");
        region.set_attribute("aria-atomic", "true").or_log("set aria-atomic");
        region.set_class_name("sr-only");
        region.style().set_css_text(OFFSCREEN_STYLE);

        let body = self.document.body()?;
        if let Err(err) = body.append_child(&region) {
            warn!("could not attach live region {id}: {err:?}");
            return None;
        }
        Some(region)
    }

    /// Empty both regions.
    pub fn clear(&self) {
        for politeness in [Politeness::Polite, Politeness::Assertive] {
            if let Some(region) = self.document.get_element_by_id(region_id(politeness)) {
                region.set_text_content(None);
            }
        }
    }
}

impl Announcer for LiveRegionAnnouncer {
    fn announce(&self, message: &str, politeness: Politeness) {
        let Some(region) = self.region(politeness) else {
            return;
        };
        region.set_text_content(None);

        let message = message.to_string();
        self.scheduler.set_timeout(
            ANNOUNCE_DELAY_MS,
            Box::new(move || region.set_text_content(Some(&message))),
        );
    }
}
