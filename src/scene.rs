use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::callbacks;
use crate::enums::Orientation;

/// One optional value per slicer axis, indexed by [`Orientation::axis`].
pub type AxisValues = [Option<usize>; 3];

/// Scene position request in `(x, y, z)` order. `None` leaves that axis alone.
///
/// Serialized as a three element array, the shape of a slicer `setpos` store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AxisValues", into = "AxisValues")]
pub struct SetPosition {
    pub x: Option<usize>,
    pub y: Option<usize>,
    pub z: Option<usize>,
}

impl SetPosition {
    pub fn new(x: Option<usize>, y: Option<usize>, z: Option<usize>) -> Self {
        Self { x, y, z }
    }

    /// Coordinate that drives the slicer looking along `orientation`.
    pub fn for_orientation(&self, orientation: Orientation) -> Option<usize> {
        match orientation {
            Orientation::Axial => self.z,
            Orientation::Coronal => self.y,
            Orientation::Sagittal => self.x,
        }
    }
}

impl From<AxisValues> for SetPosition {
    fn from([x, y, z]: AxisValues) -> Self {
        Self { x, y, z }
    }
}

impl From<SetPosition> for AxisValues {
    fn from(pos: SetPosition) -> Self {
        [pos.x, pos.y, pos.z]
    }
}

/// Values mirrored between the builtin sliders, the auxiliary sliders and the
/// navigation fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SliderMirror {
    pub drag: AxisValues,
    pub auxiliary: AxisValues,
    pub nav: AxisValues,
}

#[derive(Debug)]
struct SceneState {
    positions: [usize; 3],
    setpos: Option<SetPosition>,
    sliders: SliderMirror,
}

/// Point-in-time copy of a scene, as served to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SceneSnapshot {
    pub id: String,
    pub nslices: [usize; 3],
    pub positions: [usize; 3],
    pub setpos: Option<SetPosition>,
    pub sliders: SliderMirror,
}

/// Slicers sharing one position store. All slicers of a scene view volumes of
/// the same shape.
pub struct Scene {
    id: String,
    nslices: [usize; 3],
    state: RwLock<SceneState>,
}

impl Scene {
    /// Every axis starts on its middle slice.
    pub fn new(id: impl Into<String>, nslices: [usize; 3]) -> Self {
        Self {
            id: id.into(),
            nslices,
            state: RwLock::new(SceneState {
                positions: nslices.map(|n| n / 2),
                setpos: None,
                sliders: SliderMirror::default(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nslices(&self, orientation: Orientation) -> usize {
        self.nslices[orientation.axis()]
    }

    pub fn position(&self, orientation: Orientation) -> usize {
        self.state.read().positions[orientation.axis()]
    }

    /// Writes the `setpos` store and moves the slicers it addresses.
    /// Positions past the last slice are clamped.
    pub fn apply_setpos(&self, setpos: SetPosition) -> [usize; 3] {
        let mut state = self.state.write();
        self.apply_locked(&mut state, setpos);
        state.positions
    }

    /// A builtin slider moved: update that slicer, mirror the value through
    /// the auxiliary slider and navigation field, then feed the fields back.
    ///
    /// The other sliders report where their slicers currently are, so the
    /// feedback never moves them.
    pub fn drag(&self, orientation: Orientation, value: usize) -> SliderMirror {
        let mut state = self.state.write();
        let axis = orientation.axis();
        let value = self.clamp(axis, value);
        state.positions[axis] = value;
        state.sliders.drag = state.positions.map(Some);

        let auxiliary = callbacks::write_to_auxiliary_sliders(state.sliders.drag);
        let nav = callbacks::write_to_position_table(auxiliary);
        state.sliders.auxiliary = auxiliary;
        state.sliders.nav = nav;

        let setpos = callbacks::write_table_values_to_slicer(nav);
        self.apply_locked(&mut state, setpos);
        state.sliders
    }

    /// Navigation fields edited by the user.
    pub fn navigate(&self, nav: AxisValues) -> [usize; 3] {
        let mut state = self.state.write();
        state.sliders.nav = nav;
        let setpos = callbacks::write_table_values_to_slicer(nav);
        self.apply_locked(&mut state, setpos);
        state.positions
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let state = self.state.read();
        SceneSnapshot {
            id: self.id.clone(),
            nslices: self.nslices,
            positions: state.positions,
            setpos: state.setpos,
            sliders: state.sliders,
        }
    }

    fn apply_locked(&self, state: &mut SceneState, setpos: SetPosition) {
        for orientation in Orientation::ALL {
            if let Some(value) = setpos.for_orientation(orientation) {
                let axis = orientation.axis();
                state.positions[axis] = self.clamp(axis, value);
            }
        }
        state.setpos = Some(setpos);
        debug!("scene {} setpos {:?} -> {:?}", self.id, setpos, state.positions);
    }

    fn clamp(&self, axis: usize, value: usize) -> usize {
        value.min(self.nslices[axis].saturating_sub(1))
    }
}

/// Registry of scenes by id.
#[derive(Default)]
pub struct SceneStore {
    scenes: RwLock<HashMap<String, Arc<Scene>>>,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, scene: Scene) -> Arc<Scene> {
        let scene = Arc::new(scene);
        self.scenes
            .write()
            .insert(scene.id().to_string(), scene.clone());
        scene
    }

    pub fn get(&self, id: &str) -> Option<Arc<Scene>> {
        self.scenes.read().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.scenes.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_centered() {
        let scene = Scene::new("rock", [500, 256, 128]);
        assert_eq!(scene.snapshot().positions, [250, 128, 64]);
        assert_eq!(scene.snapshot().setpos, None);
    }

    #[test]
    fn setpos_moves_addressed_axes_only() {
        let scene = Scene::new("rock", [10, 20, 30]);
        let positions = scene.apply_setpos(SetPosition::new(None, None, Some(3)));
        assert_eq!(positions, [3, 10, 15]);

        let positions = scene.apply_setpos(SetPosition::new(Some(29), Some(0), None));
        assert_eq!(positions, [3, 0, 29]);
    }

    #[test]
    fn setpos_is_clamped() {
        let scene = Scene::new("rock", [10, 20, 30]);
        let positions = scene.apply_setpos(SetPosition::new(Some(100), None, Some(100)));
        assert_eq!(positions, [9, 10, 29]);
    }

    #[test]
    fn drag_mirrors_through_sliders_and_fields() {
        let scene = Scene::new("brain", [10, 20, 30]);
        let mirror = scene.drag(Orientation::Coronal, 7);
        assert_eq!(mirror.drag, [Some(5), Some(7), Some(15)]);
        assert_eq!(mirror.auxiliary, [Some(5), Some(7), Some(15)]);
        assert_eq!(mirror.nav, [Some(5), Some(7), Some(15)]);
        assert_eq!(scene.position(Orientation::Coronal), 7);
        assert_eq!(
            scene.snapshot().setpos,
            Some(SetPosition::new(Some(15), Some(7), Some(5)))
        );
    }

    #[test]
    fn drag_keeps_positions_set_elsewhere() {
        let scene = Scene::new("rock", [10, 20, 30]);
        scene.drag(Orientation::Axial, 5);
        scene.apply_setpos(SetPosition::new(None, None, Some(8)));
        assert_eq!(scene.position(Orientation::Axial), 8);

        let mirror = scene.drag(Orientation::Coronal, 2);
        assert_eq!(scene.position(Orientation::Axial), 8);
        assert_eq!(scene.snapshot().positions, [8, 2, 15]);
        assert_eq!(mirror.nav, [Some(8), Some(2), Some(15)]);
    }

    #[test]
    fn navigation_fields_drive_slicers() {
        let scene = Scene::new("brain", [10, 20, 30]);
        let positions = scene.navigate([Some(1), Some(2), Some(3)]);
        assert_eq!(positions, [1, 2, 3]);
        assert_eq!(scene.snapshot().setpos, Some(SetPosition::new(Some(3), Some(2), Some(1))));
    }

    #[test]
    fn setpos_serializes_as_triple() {
        let json = serde_json::to_value(SetPosition::new(None, Some(4), Some(4))).unwrap();
        assert_eq!(json, serde_json::json!([null, 4, 4]));
        let back: SetPosition = serde_json::from_value(json).unwrap();
        assert_eq!(back, SetPosition::new(None, Some(4), Some(4)));
    }

    #[test]
    fn store_looks_up_by_id() {
        let store = SceneStore::new();
        store.insert(Scene::new("rock", [1, 1, 1]));
        assert!(store.get("rock").is_some());
        assert!(store.get("brain").is_none());
        assert_eq!(store.ids(), ["rock"]);
    }
}
