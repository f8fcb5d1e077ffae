use std::sync::Arc;

use log::{info, warn};

use crate::config::Config;
use crate::enums::Orientation;
use crate::error::DashboardError;
use crate::percent::PercentStack;
use crate::porosity::{PorosityTable, TARGET_COLUMNS};
use crate::scene::{Scene, SceneStore};
use crate::volume::Volume;
use crate::volume_loader::VolumeLoader;

/// Display factor of the solid fraction layer.
pub const SOLID_SCALE: f32 = 1000.0;

/// Volume shown by a slicer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Ct,
    Solid,
}

impl Layer {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "ct" => Some(Layer::Ct),
            "solid" => Some(Layer::Solid),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Layer::Ct => "ct",
            Layer::Solid => "solid",
        }
    }
}

/// Shared, read-only data plus the UI stores, handed to every handler.
pub struct AppState {
    pub ct: Arc<Volume>,
    pub solid: Option<Arc<Volume>>,
    pub percent: Option<Arc<PercentStack>>,
    pub porosity: Option<Arc<PorosityTable>>,
    pub scenes: Arc<SceneStore>,
    pub scene_id: String,
}

impl AppState {
    /// State around a CT volume, with one scene sized after it.
    pub fn new(ct: Volume, scene_id: impl Into<String>) -> Self {
        let scene_id = scene_id.into();
        let nslices = Orientation::ALL.map(|o| ct.nslices(o));
        let scenes = SceneStore::new();
        scenes.insert(Scene::new(scene_id.clone(), nslices));

        Self {
            ct: Arc::new(ct),
            solid: None,
            percent: None,
            porosity: None,
            scenes: Arc::new(scenes),
            scene_id,
        }
    }

    /// Adds the model layers. Their shape must equal the CT volume's.
    pub fn with_percent(mut self, stack: PercentStack) -> Result<Self, DashboardError> {
        if stack.dim() != self.ct.dim() {
            return Err(DashboardError::ShapeMismatch {
                ct: self.ct.dim(),
                percent: stack.dim(),
            });
        }
        self.solid = Some(Arc::new(stack.solid_volume(self.ct.spacing(), SOLID_SCALE)));
        self.percent = Some(Arc::new(stack));
        Ok(self)
    }

    pub fn with_porosity(mut self, table: PorosityTable) -> Self {
        self.porosity = Some(Arc::new(table));
        self
    }

    /// Loads every configured input. Only the CT volume is mandatory; the
    /// other layers are skipped with a warning when their paths are absent.
    pub fn load(config: &Config) -> Result<Self, DashboardError> {
        let mut ct = VolumeLoader::load_from_directory(&config.dicom_dir, config.sort_by)?;
        if let Some(max_slices) = config.max_slices {
            ct = ct.truncated(max_slices);
            info!("volume truncated to {:?}", ct.dim());
        }
        let mut state = Self::new(ct, config.scene.clone());

        if config.image_np_dir.is_dir() && config.percent_np_dir.is_dir() {
            let stack = PercentStack::load(&config.image_np_dir, &config.percent_np_dir)?;
            state = state.with_percent(stack)?;
        } else {
            warn!(
                "percent layers not found under {} / {}, serving CT only",
                config.image_np_dir.display(),
                config.percent_np_dir.display()
            );
        }

        if config.porosity.is_file() {
            let table = PorosityTable::load_xlsx(
                &config.porosity,
                &config.sheet,
                &TARGET_COLUMNS,
                config.rows,
            )?;
            state = state.with_porosity(table);
        } else {
            warn!("porosity sheet {} not found", config.porosity.display());
        }

        Ok(state)
    }

    pub fn layer(&self, layer: Layer) -> Option<&Arc<Volume>> {
        match layer {
            Layer::Ct => Some(&self.ct),
            Layer::Solid => self.solid.as_ref(),
        }
    }

    pub fn scene(&self) -> Option<Arc<Scene>> {
        self.scenes.get(&self.scene_id)
    }
}
