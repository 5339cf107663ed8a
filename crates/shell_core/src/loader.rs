use std::sync::Arc;

use shared::domain::SectionId;
use tracing::{debug, info, warn};

use crate::{markup::scan_fragment, ShellController, ShellEvent};

/// Fixed fragment installed whenever retrieval fails, whatever the cause.
pub const NOT_FOUND_FRAGMENT: &str = r#"<div class="error">Section not found.</div>"#;

impl ShellController {
    /// Fetch and install `section`'s fragment. Never fails outward: an
    /// unavailable fragment installs [`NOT_FOUND_FRAGMENT`] instead, and the
    /// postlude (scroll, active-link recomputation, behavior rebinding) runs
    /// exactly once after installation. A result whose load generation is no
    /// longer the latest issued is discarded whole, postlude included.
    pub(crate) async fn load(self: &Arc<Self>, section: SectionId) {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.load_generation += 1;
            inner.load_generation
        };

        let fetched = self.fragments.fetch(&section).await;

        let mut inner = self.inner.lock().await;
        if inner.load_generation != generation {
            debug!(
                section = %section,
                generation,
                latest = inner.load_generation,
                "discarding stale fragment load"
            );
            return;
        }

        let event = match fetched {
            Ok(html) => {
                inner.content.replace(html);
                info!(section = %section, "section fragment installed");
                ShellEvent::SectionLoaded {
                    section: section.clone(),
                }
            }
            Err(error) => {
                warn!(section = %section, %error, "section fragment unavailable");
                inner.content.replace(NOT_FOUND_FRAGMENT.to_string());
                ShellEvent::SectionMissing {
                    section: section.clone(),
                }
            }
        };
        inner.current_section = section.clone();

        self.viewport.scroll_to_top();
        let _ = self.events.send(event);
        let _ = self.events.send(ShellEvent::ActiveLinkChanged { section });

        let bindings = scan_fragment(inner.content.html());
        inner.content.bind(bindings);
    }
}
