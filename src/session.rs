//! The owning editor session.
//!
//! A [`Session`] holds the current [`StyleSettings`] snapshot, the active
//! [`ImageAsset`] and its palette. Every change produces a new snapshot;
//! renderers read [`Session::composition`] and never see partial updates.
//!
//! ## Palette requests
//!
//! Loading an image returns a [`PaletteRequest`] tagged with the image id.
//! The caller runs it wherever it likes and hands the [`PaletteResult`] back
//! to [`Session::apply_palette`], which drops results for an image that is
//! no longer active.
//!
//! ## Export guard
//!
//! Only one export may run at a time. [`Session::begin_export`] hands out an
//! [`ExportGuard`] that releases the flag when dropped, on success and on
//! every error path.

use crate::asset::{ImageAsset, ImageId};
use crate::compose::{Composition, compose};
use crate::export::{ExportError, ExportOutput, ExportRequest, render_export};
use crate::imaging::{BackendError, ImageBackend, PixelDensity};
use crate::palette::{Palette, extract_palette};
use crate::settings::{AspectRatio, StylePatch, StyleSettings};
use crate::suggestion::{StyleAdvisor, StyleSuggestion, SuggestionError};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Palette extraction for one specific image.
#[derive(Debug, Clone)]
pub struct PaletteRequest {
    asset: ImageAsset,
}

impl PaletteRequest {
    pub fn image_id(&self) -> &ImageId {
        self.asset.id()
    }

    /// Run the extraction. Never fails; see [`extract_palette`].
    pub fn run(self) -> PaletteResult {
        let palette = extract_palette(self.asset.image());
        PaletteResult {
            image_id: self.asset.id().clone(),
            palette,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaletteResult {
    pub image_id: ImageId,
    pub palette: Palette,
}

/// Holds the export-in-progress flag for as long as it lives.
#[derive(Debug)]
pub struct ExportGuard {
    flag: Arc<AtomicBool>,
}

impl ExportGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, ExportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::InProgress)?;
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct Session {
    defaults: StyleSettings,
    settings: StyleSettings,
    asset: Option<ImageAsset>,
    palette: Option<Palette>,
    exporting: Arc<AtomicBool>,
    density: PixelDensity,
    wallpaper_root: Option<PathBuf>,
}

impl Session {
    /// New session starting from `defaults`, which [`reset`](Self::reset) returns to.
    pub fn new(defaults: StyleSettings) -> Self {
        let defaults = defaults.normalized();
        Self {
            settings: defaults.clone(),
            defaults,
            asset: None,
            palette: None,
            exporting: Arc::new(AtomicBool::new(false)),
            density: PixelDensity::default(),
            wallpaper_root: None,
        }
    }

    pub fn with_density(mut self, density: PixelDensity) -> Self {
        self.density = density;
        self
    }

    pub fn with_wallpaper_root(mut self, root: Option<PathBuf>) -> Self {
        self.wallpaper_root = root;
        self
    }

    pub fn settings(&self) -> &StyleSettings {
        &self.settings
    }

    pub fn asset(&self) -> Option<&ImageAsset> {
        self.asset.as_ref()
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn density(&self) -> PixelDensity {
        self.density
    }

    // =========================================================================
    // Image lifecycle
    // =========================================================================

    /// Replace the image as a fresh upload: pan and zoom reset and the
    /// transparent preset applies.
    pub fn upload(&mut self, asset: ImageAsset) -> PaletteRequest {
        self.apply_patch(&StylePatch::after_upload());
        self.set_image(asset)
    }

    /// Replace the image, keeping the current settings.
    pub fn set_image(&mut self, asset: ImageAsset) -> PaletteRequest {
        let dims = asset.dimensions();
        info!(
            "image {} ({}x{})",
            asset.id().short(),
            dims.width,
            dims.height
        );
        self.palette = None;
        self.asset = Some(asset.clone());
        PaletteRequest { asset }
    }

    /// Decode `path` with `backend` and make it the current image.
    pub fn open(
        &mut self,
        backend: &impl ImageBackend,
        path: &Path,
    ) -> Result<PaletteRequest, BackendError> {
        let image = backend.decode(path)?;
        Ok(self.set_image(ImageAsset::new(image)))
    }

    pub fn clear_image(&mut self) {
        self.asset = None;
        self.palette = None;
    }

    /// Store a palette if it belongs to the current image.
    ///
    /// Returns `false` when the result is stale and was dropped.
    pub fn apply_palette(&mut self, result: PaletteResult) -> bool {
        match &self.asset {
            Some(asset) if *asset.id() == result.image_id => {
                self.palette = Some(result.palette);
                true
            }
            _ => {
                debug!(
                    "dropping palette for {}, no longer the active image",
                    result.image_id.short()
                );
                false
            }
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn apply_patch(&mut self, patch: &StylePatch) {
        self.settings = patch.apply(&self.settings);
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.apply_patch(&StylePatch::aspect_ratio(ratio));
    }

    /// Reshuffle the mesh blobs without touching the image.
    pub fn shuffle_mesh(&mut self) {
        let seed = self.settings.mesh_seed.wrapping_add(1);
        self.apply_patch(&StylePatch {
            mesh_seed: Some(seed),
            ..Default::default()
        });
    }

    /// Back to the defaults the session was created with.
    pub fn reset(&mut self) {
        self.settings = self.defaults.clone();
    }

    /// Merge a suggestion outcome. Failures leave the settings untouched.
    pub fn apply_suggestion(&mut self, outcome: Result<StyleSuggestion, SuggestionError>) -> bool {
        match outcome {
            Ok(suggestion) => {
                self.apply_patch(&suggestion.to_patch());
                true
            }
            Err(e) => {
                warn!("ignoring style suggestion: {e}");
                false
            }
        }
    }

    /// Ask `advisor` about the current image and merge the answer.
    ///
    /// Without an image there is nothing to ask about.
    pub fn request_suggestion(&mut self, advisor: &impl StyleAdvisor) -> bool {
        let Some(asset) = &self.asset else {
            return false;
        };
        let outcome = advisor.suggest(asset, &self.settings);
        self.apply_suggestion(outcome)
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Geometry for the current snapshot, `None` without an image.
    pub fn composition(&self) -> Option<Composition> {
        let asset = self.asset.as_ref()?;
        Some(compose(
            asset.dimensions(),
            &self.settings,
            self.palette.as_ref(),
        ))
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    /// Claim the export slot. Fails with [`ExportError::InProgress`] while
    /// another guard is alive.
    pub fn begin_export(&self) -> Result<ExportGuard, ExportError> {
        ExportGuard::acquire(&self.exporting)
    }

    /// Render the current snapshot to PNG.
    pub fn export(&self, backend: &impl ImageBackend) -> Result<ExportOutput, ExportError> {
        let _guard = self.begin_export()?;
        let asset = self.asset.as_ref().ok_or(ExportError::NoImage)?;
        render_export(
            backend,
            &ExportRequest {
                settings: &self.settings,
                asset,
                palette: self.palette.as_ref(),
                density: self.density,
                wallpaper_root: self.wallpaper_root.as_deref(),
            },
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(StyleSettings::default())
    }
}
