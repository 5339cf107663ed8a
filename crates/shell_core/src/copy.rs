use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{ShellController, ShellEvent};

/// How long a button reads "Copied" before reverting.
pub(crate) const COPY_LABEL_REVERT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyLabel {
    Copy,
    Copied,
}

impl CopyLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyLabel::Copy => "Copy",
            CopyLabel::Copied => "Copied",
        }
    }
}

/// A copy-capable element of the current fragment: the payload it carries
/// and its two-state label. Rebuilt from scratch on every load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyButton {
    payload: String,
    label: CopyLabel,
}

impl CopyButton {
    pub(crate) fn new(payload: String) -> Self {
        Self {
            payload,
            label: CopyLabel::Copy,
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn label(&self) -> CopyLabel {
        self.label
    }

    pub(crate) fn set_label(&mut self, label: CopyLabel) {
        self.label = label;
    }
}

impl ShellController {
    /// Activation handler for one copy-capable element. The secure path is
    /// attempted first; if the context is insecure, the capability absent,
    /// or the write rejected, the fallback writer carries the payload
    /// instead. The label flips to "Copied" either way and reverts after a
    /// fixed delay.
    pub async fn activate_copy_button(self: &Arc<Self>, index: usize) {
        let (payload, generation) = {
            let inner = self.inner.lock().await;
            let Some(button) = inner.content.copy_buttons().get(index) else {
                return;
            };
            (button.payload().to_string(), inner.load_generation)
        };

        let mut copied = false;
        if self.config.secure_context {
            match self.clipboard.write_text(&payload).await {
                Ok(()) => copied = true,
                Err(error) => {
                    debug!(%error, "secure clipboard write failed, using fallback");
                }
            }
        }
        if !copied {
            if let Err(error) = self.clipboard_fallback.write_text(&payload).await {
                warn!(%error, "fallback copy failed");
            }
        }

        self.set_copy_label(index, generation, CopyLabel::Copied)
            .await;

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(COPY_LABEL_REVERT_DELAY).await;
            controller
                .set_copy_label(index, generation, CopyLabel::Copy)
                .await;
        });
    }

    /// Label writes are generation-guarded: once a newer fragment is
    /// installed, updates aimed at the detached one are dropped.
    async fn set_copy_label(&self, index: usize, generation: u64, label: CopyLabel) {
        let mut inner = self.inner.lock().await;
        if inner.load_generation != generation {
            return;
        }
        let Some(button) = inner.content.copy_buttons_mut().get_mut(index) else {
            return;
        };
        if button.label() == label {
            return;
        }
        button.set_label(label);
        drop(inner);
        let _ = self.events.send(ShellEvent::CopyLabelChanged {
            button: index,
            label,
        });
    }
}
