use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{section_path, NavTarget, SectionId};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use url::Url;

pub mod confetti;
pub mod copy;
pub mod history;
mod intro;
mod loader;
mod markup;

pub use confetti::{Particle, ParticleSurface, ParticleTrigger};
pub use copy::{CopyButton, CopyLabel};
pub use history::{HistoryStore, MemoryHistory};
pub use loader::NOT_FOUND_FRAGMENT;

/// Static description of the page shell the controller drives: the declared
/// navigation anchors, the section to fall back to when the URL carries no
/// fragment, and whether the secure clipboard path may be attempted.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub default_section: SectionId,
    pub nav_targets: Vec<NavTarget>,
    pub secure_context: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            default_section: SectionId::from("why"),
            nav_targets: Vec::new(),
            secure_context: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ShellEvent {
    SectionLoaded { section: SectionId },
    SectionMissing { section: SectionId },
    ActiveLinkChanged { section: SectionId },
    CopyLabelChanged { button: usize, label: CopyLabel },
    ConfettiStarted,
    ConfettiFinished,
    IntroBackdropShown,
    IntroHeroRisen,
}

#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch(&self, section: &SectionId) -> Result<String>;
}

pub struct MissingFragmentSource;

#[async_trait]
impl FragmentSource for MissingFragmentSource {
    async fn fetch(&self, section: &SectionId) -> Result<String> {
        Err(anyhow!("fragment source unavailable for section {section}"))
    }
}

/// Retrieves fragment documents from the site server over HTTP. Any
/// non-success status or transport failure surfaces as an error for the
/// loader to recover from; the distinction is deliberately not preserved.
pub struct HttpFragmentSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpFragmentSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl FragmentSource for HttpFragmentSource {
    async fn fetch(&self, section: &SectionId) -> Result<String> {
        let url = Url::parse(&self.base_url)?.join(&section_path(section))?;
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard capability unavailable")]
    Unavailable,
    #[error("clipboard write rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ClipboardWriter: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

pub struct MissingClipboard;

#[async_trait]
impl ClipboardWriter for MissingClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// In-process sink used as the manual-selection fallback: always available,
/// never fails, and lets a driver read back what was last copied.
#[derive(Default)]
pub struct BufferedClipboard {
    contents: Mutex<Option<String>>,
}

impl BufferedClipboard {
    pub async fn contents(&self) -> Option<String> {
        self.contents.lock().await.clone()
    }
}

#[async_trait]
impl ClipboardWriter for BufferedClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock().await = Some(text.to_string());
        Ok(())
    }
}

/// Boundary to the page viewport: smooth scroll after each install, and the
/// window dimensions the particle surface tracks.
pub trait Viewport: Send + Sync {
    fn scroll_to_top(&self);
    fn size(&self) -> (u32, u32);
}

pub struct HeadlessViewport {
    width: u32,
    height: u32,
    scrolls: AtomicUsize,
}

impl HeadlessViewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scrolls: AtomicUsize::new(0),
        }
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls.load(Ordering::Relaxed)
    }
}

impl Default for HeadlessViewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl Viewport for HeadlessViewport {
    fn scroll_to_top(&self) {
        self.scrolls.fetch_add(1, Ordering::Relaxed);
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The single DOM subtree fragments are installed into. Owned and replaced
/// by the loader; the behavior bindings attached to the current fragment
/// live and die with it.
#[derive(Debug, Default)]
pub struct ContentRegion {
    html: String,
    copy_buttons: Vec<CopyButton>,
    particle_triggers: Vec<ParticleTrigger>,
}

impl ContentRegion {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn copy_buttons(&self) -> &[CopyButton] {
        &self.copy_buttons
    }

    pub fn particle_triggers(&self) -> &[ParticleTrigger] {
        &self.particle_triggers
    }

    pub(crate) fn replace(&mut self, html: String) {
        self.html = html;
        self.copy_buttons.clear();
        self.particle_triggers.clear();
    }

    pub(crate) fn bind(&mut self, bindings: markup::FragmentBindings) {
        self.copy_buttons = bindings.copy_buttons;
        self.particle_triggers = bindings.particle_triggers;
    }

    pub(crate) fn copy_buttons_mut(&mut self) -> &mut [CopyButton] {
        &mut self.copy_buttons
    }

    pub(crate) fn particle_triggers_mut(&mut self) -> &mut [ParticleTrigger] {
        &mut self.particle_triggers
    }
}

pub(crate) struct ShellState {
    pub(crate) current_section: SectionId,
    pub(crate) content: ContentRegion,
    pub(crate) load_generation: u64,
    pub(crate) intro_started: bool,
    pub(crate) backdrop_shown: bool,
    pub(crate) hero_risen: bool,
    pub(crate) confetti: confetti::ConfettiState,
}

pub struct ShellController {
    fragments: Arc<dyn FragmentSource>,
    history: Arc<dyn HistoryStore>,
    viewport: Arc<dyn Viewport>,
    clipboard: Arc<dyn ClipboardWriter>,
    clipboard_fallback: Arc<dyn ClipboardWriter>,
    config: ShellConfig,
    inner: Mutex<ShellState>,
    events: broadcast::Sender<ShellEvent>,
}

impl ShellController {
    pub fn new(config: ShellConfig) -> Arc<Self> {
        Self::new_with_fragment_source(config, Arc::new(MissingFragmentSource))
    }

    pub fn new_with_fragment_source(
        config: ShellConfig,
        fragments: Arc<dyn FragmentSource>,
    ) -> Arc<Self> {
        Self::new_with_dependencies(
            config,
            fragments,
            Arc::new(MemoryHistory::new()),
            Arc::new(HeadlessViewport::default()),
            Arc::new(MissingClipboard),
            Arc::new(BufferedClipboard::default()),
        )
    }

    pub fn new_with_dependencies(
        config: ShellConfig,
        fragments: Arc<dyn FragmentSource>,
        history: Arc<dyn HistoryStore>,
        viewport: Arc<dyn Viewport>,
        clipboard: Arc<dyn ClipboardWriter>,
        clipboard_fallback: Arc<dyn ClipboardWriter>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let inner = Mutex::new(ShellState {
            current_section: config.default_section.clone(),
            content: ContentRegion::default(),
            load_generation: 0,
            intro_started: false,
            backdrop_shown: false,
            hero_risen: false,
            confetti: confetti::ConfettiState::default(),
        });
        Arc::new(Self {
            fragments,
            history,
            viewport,
            clipboard,
            clipboard_fallback,
            config,
            inner,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }

    pub fn nav_targets(&self) -> &[NavTarget] {
        &self.config.nav_targets
    }

    pub async fn current_section(&self) -> SectionId {
        self.inner.lock().await.current_section.clone()
    }

    pub async fn content_html(&self) -> String {
        self.inner.lock().await.content.html().to_string()
    }

    pub async fn copy_buttons(&self) -> Vec<CopyButton> {
        self.inner.lock().await.content.copy_buttons().to_vec()
    }

    pub async fn particle_trigger_count(&self) -> usize {
        self.inner.lock().await.content.particle_triggers().len()
    }

    /// Active-link state is derived, never stored: each declared target is
    /// current exactly when its bound section matches the current one.
    pub async fn active_links(&self) -> Vec<(SectionId, bool)> {
        let inner = self.inner.lock().await;
        self.config
            .nav_targets
            .iter()
            .map(|target| {
                let active = target.section == inner.current_section;
                (target.section.clone(), active)
            })
            .collect()
    }

    pub async fn intro_state(&self) -> (bool, bool) {
        let inner = self.inner.lock().await;
        (inner.backdrop_shown, inner.hero_risen)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
