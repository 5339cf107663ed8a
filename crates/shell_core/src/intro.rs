use std::{sync::Arc, time::Duration};

use crate::{ShellController, ShellEvent};

/// Delay between the backdrop reveal and the hero's risen state.
pub(crate) const HERO_RISE_DELAY: Duration = Duration::from_millis(1500);

impl ShellController {
    /// One-shot page-load animation, independent of navigation. Repeat
    /// calls are no-ops; the toggles themselves are idempotent.
    pub(crate) async fn run_intro(self: &Arc<Self>) {
        {
            let mut inner = self.inner.lock().await;
            if inner.intro_started {
                return;
            }
            inner.intro_started = true;
        }

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            // Reveal on the next scheduled tick rather than synchronously.
            tokio::task::yield_now().await;
            {
                let mut inner = controller.inner.lock().await;
                inner.backdrop_shown = true;
            }
            let _ = controller.events.send(ShellEvent::IntroBackdropShown);

            tokio::time::sleep(HERO_RISE_DELAY).await;
            {
                let mut inner = controller.inner.lock().await;
                inner.hero_risen = true;
            }
            let _ = controller.events.send(ShellEvent::IntroHeroRisen);
        });
    }
}
