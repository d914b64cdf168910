//! One-time application startup.
//!
//! ORDER
//! =====
//! 1. Logging and panic hook.
//! 2. Global UI assets (theme, icons). Views assume both are in place.
//! 3. Conversation store constructed and initialized.
//! 4. `App` mounted once into `#root`, with the store provided above the
//!    route switch.
//!
//! `BootSequence` tracks the phase and refuses steps out of order, so the
//! ordering holds whether the steps run from `bootstrap()` or from a test.
//! Every error here is fatal to the page.

#[cfg(test)]
#[path = "bootstrap_test.rs"]
mod bootstrap_test;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::state::{ConversationStore, StoreError};
use crate::util::{icons, theme};

/// Id of the element the app mounts into.
pub const MOUNT_POINT_ID: &str = "root";

static BOOTSTRAPPED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("application already bootstrapped")]
    AlreadyBootstrapped,

    #[error("bootstrap step `{step}` called during phase {phase:?}")]
    OutOfOrder { step: &'static str, phase: BootPhase },

    #[error("mount point #{0} not found in document")]
    MissingMountPoint(String),

    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootPhase {
    Fresh,
    AssetsReady,
    StoreReady,
    Mounted,
}

/// Ordered startup steps. Each step only runs from the phase before it.
#[derive(Debug)]
pub struct BootSequence {
    phase: BootPhase,
    store: Option<ConversationStore>,
}

impl Default for BootSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl BootSequence {
    pub const fn new() -> Self {
        Self { phase: BootPhase::Fresh, store: None }
    }

    pub const fn phase(&self) -> BootPhase {
        self.phase
    }

    fn expect_phase(&self, step: &'static str, expected: BootPhase) -> Result<(), BootstrapError> {
        if self.phase == expected { Ok(()) } else { Err(BootstrapError::OutOfOrder { step, phase: self.phase }) }
    }

    /// Apply the theme and register icons.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::OutOfOrder`] unless the sequence is fresh.
    pub fn init_assets(&mut self) -> Result<theme::Theme, BootstrapError> {
        self.expect_phase("init_assets", BootPhase::Fresh)?;
        let theme = theme::init();
        icons::register();
        self.phase = BootPhase::AssetsReady;
        Ok(theme)
    }

    /// Initialize `store` and keep it for mounting.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::OutOfOrder`] before assets are ready, or
    /// [`BootstrapError::Store`] if the store was already initialized.
    pub fn init_store(&mut self, store: ConversationStore) -> Result<ConversationStore, BootstrapError> {
        self.expect_phase("init_store", BootPhase::AssetsReady)?;
        store.initialize()?;
        self.store = Some(store.clone());
        self.phase = BootPhase::StoreReady;
        Ok(store)
    }

    /// Run `mount` with the initialized store. The phase only advances if
    /// `mount` succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::OutOfOrder`] before the store is ready or
    /// after a previous mount, or whatever `mount` returns.
    pub fn mount<T>(
        &mut self,
        mount: impl FnOnce(ConversationStore) -> Result<T, BootstrapError>,
    ) -> Result<T, BootstrapError> {
        self.expect_phase("mount", BootPhase::StoreReady)?;
        let Some(store) = self.store.clone() else {
            return Err(BootstrapError::OutOfOrder { step: "mount", phase: self.phase });
        };
        let mounted = mount(store)?;
        self.phase = BootPhase::Mounted;
        Ok(mounted)
    }
}

/// Claim the process-wide bootstrap slot. Only the first call succeeds.
///
/// # Errors
///
/// Returns [`BootstrapError::AlreadyBootstrapped`] on every later call.
pub fn claim_once() -> Result<(), BootstrapError> {
    if BOOTSTRAPPED.swap(true, Ordering::SeqCst) {
        return Err(BootstrapError::AlreadyBootstrapped);
    }
    Ok(())
}

fn init_logging() {
    #[cfg(feature = "csr")]
    {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Debug) {
            web_sys::console::warn_1(&format!("Failed to set up console logging: {e}").into());
        }
    }
}

/// Start the application: logging, assets, store, mount.
///
/// Preconditions: called once per page, with `#root` present in the document.
/// Postconditions: the store holds one fresh session and `App` is mounted.
///
/// # Errors
///
/// Returns a [`BootstrapError`] on a second call, a missing mount point, or a
/// store initialization failure. All are fatal.
pub fn bootstrap() -> Result<(), BootstrapError> {
    claim_once()?;
    init_logging();

    let mut boot = BootSequence::new();
    let theme = boot.init_assets()?;
    log::info!("starting chat client ({} theme)", theme.as_str());
    boot.init_store(ConversationStore::new())?;
    boot.mount(mount_app)?;
    log::info!("chat client mounted at #{MOUNT_POINT_ID}");
    Ok(())
}

#[cfg(feature = "csr")]
fn mount_app(store: ConversationStore) -> Result<(), BootstrapError> {
    use leptos::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::App;

    let parent = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(MOUNT_POINT_ID))
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        .ok_or_else(|| BootstrapError::MissingMountPoint(MOUNT_POINT_ID.to_owned()))?;

    leptos::mount::mount_to(parent, move || view! { <App store=store/> }).forget();
    Ok(())
}

#[cfg(not(feature = "csr"))]
fn mount_app(store: ConversationStore) -> Result<(), BootstrapError> {
    let _ = store;
    Err(BootstrapError::MissingMountPoint(MOUNT_POINT_ID.to_owned()))
}
