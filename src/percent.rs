//! Model output layers: the normalized image fed to the network and the
//! three phase fractions it predicted, one `.npy` pair per slice.

use log::info;
use ndarray::{Array2, Array3, Array4, ArrayD, Axis, s};
use ndarray_npy::{ReadNpyError, read_npy};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use web_time::Instant;

use crate::volume::Volume;

/// Hounsfield value of air.
pub const AIR: f32 = -1024.0;

/// Upper end of the HU range the normalized images were scaled from.
pub const CT_MAX: f32 = 3000.0;

/// Number of phase fractions stored per voxel.
pub const PHASES: usize = 3;

#[derive(Debug, Error)]
pub enum PercentError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Npy {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },

    #[error("{path} has shape {shape:?}, expected {expected}")]
    Shape {
        path: PathBuf,
        shape: Vec<usize>,
        expected: String,
    },

    #[error("no image slices in {0}")]
    Empty(PathBuf),

    #[error("nothing to stack")]
    NoSlices,

    #[error("{images} image slices but {percents} percent slices")]
    SliceCount { images: usize, percents: usize },

    #[error("slice {index} has shape {shape:?}, expected {expected:?}")]
    SliceShape {
        index: usize,
        shape: Vec<usize>,
        expected: Vec<usize>,
    },
}

/// Converts a network image value in `[-1, 1]` back to Hounsfield units.
#[inline]
pub fn percent_to_hu(img: f32) -> f32 {
    ((img + 1.0) / 2.0) * (CT_MAX - AIR) + AIR
}

/// Per-slice model layers stacked into volumes sharing one spatial shape.
#[derive(Debug, Clone)]
pub struct PercentStack {
    cts: Array3<f32>,
    /// `(slice, phase, height, width)`
    phases: Array4<f32>,
}

impl PercentStack {
    /// Reads `img_{i}.npy` from `image_dir` and `percent_{i}.npy` from
    /// `percent_dir` for every `i` below the number of files in `image_dir`.
    pub fn load(image_dir: impl AsRef<Path>, percent_dir: impl AsRef<Path>) -> Result<Self, PercentError> {
        let started = Instant::now();
        let image_dir = image_dir.as_ref();
        let percent_dir = percent_dir.as_ref();

        let count = fs::read_dir(image_dir)
            .map_err(|source| PercentError::Io {
                path: image_dir.to_path_buf(),
                source,
            })?
            .filter_map(Result::ok)
            .count();
        if count == 0 {
            return Err(PercentError::Empty(image_dir.to_path_buf()));
        }

        let mut images = Vec::with_capacity(count);
        let mut percents = Vec::with_capacity(count);
        for i in 0..count {
            let img_path = image_dir.join(format!("img_{i}.npy"));
            let img = Self::read_image(&img_path)?;
            let (h, w) = img.dim();

            let percent_path = percent_dir.join(format!("percent_{i}.npy"));
            let percent = read_float_npy(&percent_path)?;
            let percent = reshape_to(&percent_path, percent, (PHASES, h, w))?;

            images.push(img);
            percents.push(percent);
        }

        let stack = Self::from_slices(&images, &percents)?;
        info!(
            "loaded percent stack {:?} from {} in {:?}",
            stack.dim(),
            percent_dir.display(),
            started.elapsed()
        );
        Ok(stack)
    }

    /// Stacks already decoded slices. Every image must share the first
    /// image's shape and every percent slice must be `(PHASES, h, w)`.
    pub fn from_slices(
        images: &[Array2<f32>],
        percents: &[Array3<f32>],
    ) -> Result<Self, PercentError> {
        let Some(first) = images.first() else {
            return Err(PercentError::NoSlices);
        };
        let (h, w) = first.dim();
        if images.len() != percents.len() {
            return Err(PercentError::SliceCount {
                images: images.len(),
                percents: percents.len(),
            });
        }

        let depth = images.len();
        let mut stacked_images = Array3::<f32>::zeros((depth, h, w));
        let mut phases = Array4::<f32>::zeros((depth, PHASES, h, w));
        for (i, (img, percent)) in images.iter().zip(percents).enumerate() {
            if img.dim() != (h, w) {
                return Err(PercentError::SliceShape {
                    index: i,
                    shape: img.shape().to_vec(),
                    expected: vec![h, w],
                });
            }
            if percent.dim() != (PHASES, h, w) {
                return Err(PercentError::SliceShape {
                    index: i,
                    shape: percent.shape().to_vec(),
                    expected: vec![PHASES, h, w],
                });
            }
            stacked_images.slice_mut(s![i, .., ..]).assign(img);
            phases.slice_mut(s![i, .., .., ..]).assign(percent);
        }

        let cts = stacked_images.mapv_into(percent_to_hu);
        Ok(Self { cts, phases })
    }

    fn read_image(path: &Path) -> Result<Array2<f32>, PercentError> {
        let img = read_float_npy(path)?;
        let shape = img.shape().to_vec();
        if shape.len() < 2 {
            return Err(PercentError::Shape {
                path: path.to_path_buf(),
                shape,
                expected: "at least two dimensions".to_string(),
            });
        }
        let h = shape[shape.len() - 2];
        let w = shape[shape.len() - 1];
        let plane = reshape_to(path, img, (1, h, w))?;
        Ok(plane.index_axis_move(Axis(0), 0))
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.cts.dim()
    }

    pub fn cts(&self) -> &Array3<f32> {
        &self.cts
    }

    /// Phase 0 volume.
    pub fn solids(&self) -> Array3<f32> {
        self.phases.index_axis(Axis(1), 0).to_owned()
    }

    /// Solid fraction as a displayable volume, scaled by `factor`.
    pub fn solid_volume(&self, spacing: (f32, f32, f32), factor: f32) -> Volume {
        Volume::new(self.solids().mapv(|v| v * factor), spacing)
    }

    /// `(ct, phase1, phase2, phase3)` at voxel `(z, y, x)`.
    pub fn customdata(&self, z: usize, y: usize, x: usize) -> Option<[f32; 4]> {
        let ct = *self.cts.get((z, y, x))?;
        Some([
            ct,
            self.phases[(z, 0, y, x)],
            self.phases[(z, 1, y, x)],
            self.phases[(z, 2, y, x)],
        ])
    }
}

/// Hover label of one voxel.
pub fn hover_text(x: usize, y: usize, z: usize, customdata: &[f32; 4]) -> String {
    format!(
        "x: {x} <br> y: {y} <br> z: {z} <br> ct: {:.4} <br> percent: {:.4},  {:.4}, {:.4}",
        customdata[0], customdata[1], customdata[2], customdata[3]
    )
}

fn read_float_npy(path: &Path) -> Result<ArrayD<f32>, PercentError> {
    match read_npy::<_, ArrayD<f32>>(path) {
        Ok(array) => Ok(array),
        // float64 arrays are common when the files come from numpy directly
        Err(ReadNpyError::WrongDescriptor(_)) => read_npy::<_, ArrayD<f64>>(path)
            .map(|array| array.mapv(|v| v as f32))
            .map_err(|source| PercentError::Npy {
                path: path.to_path_buf(),
                source,
            }),
        Err(source) => Err(PercentError::Npy {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn reshape_to(
    path: &Path,
    array: ArrayD<f32>,
    shape: (usize, usize, usize),
) -> Result<Array3<f32>, PercentError> {
    let dims = array.shape().to_vec();
    Array3::from_shape_vec(shape, array.iter().copied().collect()).map_err(|_| PercentError::Shape {
        path: path.to_path_buf(),
        shape: dims,
        expected: format!("{shape:?}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};
    use ndarray_npy::write_npy;

    #[test]
    fn hu_formula_spans_air_to_max() {
        assert_eq!(percent_to_hu(-1.0), AIR);
        assert_eq!(percent_to_hu(1.0), CT_MAX);
        assert_eq!(percent_to_hu(0.0), (CT_MAX + AIR) / 2.0);
    }

    fn write_fixture(dir: &Path, slices: usize) -> (PathBuf, PathBuf) {
        let image_dir = dir.join("image_np");
        let percent_dir = dir.join("percent_np");
        fs::create_dir_all(&image_dir).unwrap();
        fs::create_dir_all(&percent_dir).unwrap();

        for i in 0..slices {
            // stored with leading batch/channel axes as the model writes them
            let img = Array::from_elem(IxDyn(&[1, 1, 2, 3]), i as f32 / 10.0);
            write_npy(image_dir.join(format!("img_{i}.npy")), &img).unwrap();

            let percent = Array::from_shape_fn(IxDyn(&[1, 3, 2, 3]), |idx| {
                (idx[1] as f64) * 0.25 + i as f64
            });
            write_npy(percent_dir.join(format!("percent_{i}.npy")), &percent).unwrap();
        }
        (image_dir, percent_dir)
    }

    #[test]
    fn loads_and_stacks_slices() {
        let tmp = tempfile::tempdir().unwrap();
        let (image_dir, percent_dir) = write_fixture(tmp.path(), 3);

        let stack = PercentStack::load(&image_dir, &percent_dir).unwrap();
        assert_eq!(stack.dim(), (3, 2, 3));
        assert_eq!(stack.cts()[(2, 1, 2)], percent_to_hu(0.2));

        let solids = stack.solids();
        assert_eq!(solids[(1, 0, 0)], 1.0);

        let data = stack.customdata(1, 1, 1).unwrap();
        assert_eq!(data, [percent_to_hu(0.1), 1.0, 1.25, 1.5]);
        assert!(stack.customdata(3, 0, 0).is_none());
    }

    #[test]
    fn solid_volume_is_scaled() {
        let tmp = tempfile::tempdir().unwrap();
        let (image_dir, percent_dir) = write_fixture(tmp.path(), 2);
        let stack = PercentStack::load(&image_dir, &percent_dir).unwrap();

        let volume = stack.solid_volume((1.0, 1.0, 1.0), 1000.0);
        assert_eq!(volume.dim(), (2, 2, 3));
        assert_eq!(volume.value_at(1, 0, 0), Some(1000.0));
    }

    #[test]
    fn missing_percent_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let (image_dir, percent_dir) = write_fixture(tmp.path(), 2);
        fs::remove_file(percent_dir.join("percent_1.npy")).unwrap();

        let err = PercentStack::load(&image_dir, &percent_dir).unwrap_err();
        assert!(matches!(err, PercentError::Npy { .. }));
    }

    #[test]
    fn mismatched_slice_shapes_are_rejected() {
        let images = vec![Array2::zeros((2, 2)), Array2::zeros((3, 2))];
        let percents = vec![Array3::zeros((3, 2, 2)), Array3::zeros((3, 3, 2))];
        let err = PercentStack::from_slices(&images, &percents).unwrap_err();
        assert!(matches!(
            err,
            PercentError::SliceShape { index: 1, ref shape, ref expected }
                if shape == &[3, 2] && expected == &[2, 2]
        ));
    }

    #[test]
    fn slice_counts_must_agree() {
        let err = PercentStack::from_slices(&[Array2::zeros((2, 2))], &[]).unwrap_err();
        assert!(matches!(err, PercentError::SliceCount { images: 1, percents: 0 }));
        assert!(matches!(
            PercentStack::from_slices(&[], &[]),
            Err(PercentError::NoSlices)
        ));
    }

    #[test]
    fn hover_text_formats_four_decimals() {
        let text = hover_text(1, 2, 3, &[-12.5, 0.5, 0.25, 0.125]);
        assert_eq!(
            text,
            "x: 1 <br> y: 2 <br> z: 3 <br> ct: -12.5000 <br> percent: 0.5000,  0.2500, 0.1250"
        );
    }
}
