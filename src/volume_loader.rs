use crate::{enums::SortBy, volume::Volume};

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use log::{debug, info, warn};
use ndarray::{Array2, Array3, s};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use web_time::Instant;

#[derive(Debug, Error)]
pub enum VolumeLoaderError {
    #[error("No valid DICOM images found in {0}")]
    NoValidImages(String),

    #[error("Inconsistent image dimensions: expected {expected:?}, found {found:?}")]
    InconsistentDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type OrderedImage = (Option<f32>, Array2<f32>);

pub struct VolumeLoader;

impl VolumeLoader {
    /// Builds a Hounsfield-unit volume from already opened DICOM objects.
    ///
    /// Objects without decodable pixel data are skipped. Rescale slope and
    /// intercept are applied; no VOI LUT is.
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let mut images_with_order: Vec<OrderedImage> = dicom_objects
            .par_iter()
            .filter_map(|dicom_object| Self::extract_image_with_order(dicom_object, sort_by))
            .collect();

        if images_with_order.is_empty() {
            return Err(VolumeLoaderError::NoValidImages(format!(
                "{} DICOM objects",
                dicom_objects.len()
            )));
        }
        if images_with_order.len() < dicom_objects.len() {
            warn!(
                "{} of {} DICOM objects had no decodable image",
                dicom_objects.len() - images_with_order.len(),
                dicom_objects.len()
            );
        }

        Self::sort_images(&mut images_with_order, sort_by);

        let images: Vec<_> = images_with_order
            .into_iter()
            .map(|(_, image)| image)
            .collect();

        Self::validate_dimensions(&images)?;

        let volume_array = Self::build_volume_array(&images);
        let spacing = Self::get_spacing(dicom_objects).unwrap_or_else(|| {
            debug!("no spacing attributes found, assuming unit spacing");
            (1.0, 1.0, 1.0)
        });

        Ok(Volume::new(volume_array, spacing))
    }

    /// Opens and loads the given files. Files that fail to parse are skipped.
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path> + Sync],
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let objects: Vec<_> = paths
            .par_iter()
            .filter_map(|path| match open_file(path.as_ref()) {
                Ok(object) => Some(object),
                Err(err) => {
                    warn!("skipping {}: {}", path.as_ref().display(), err);
                    None
                }
            })
            .collect();

        Self::load_from_dicom_objects(&objects, sort_by)
    }

    /// Loads every `.dcm` or extension-less file of a directory.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Volume, VolumeLoaderError> {
        let started = Instant::now();
        let paths = Self::candidate_files(path.as_ref())?;

        if paths.is_empty() {
            return Err(VolumeLoaderError::NoValidImages(
                path.as_ref().display().to_string(),
            ));
        }

        let volume = Self::load_from_file_paths(&paths, sort_by)?;
        info!(
            "loaded volume {:?} from {} in {:?}",
            volume.dim(),
            path.as_ref().display(),
            started.elapsed()
        );
        Ok(volume)
    }

    fn candidate_files(dir: &Path) -> Result<Vec<PathBuf>, VolumeLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| match path.extension().and_then(|s| s.to_str()) {
                Some(ext) => ext.eq_ignore_ascii_case("dcm"),
                None => true,
            })
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn extract_image_with_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: SortBy,
    ) -> Option<OrderedImage> {
        let order = Self::get_sort_order(dicom_object, sort_by)?;
        let image_2d = Self::decode_image(dicom_object)?;
        Some((order, image_2d))
    }

    fn get_sort_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: SortBy,
    ) -> Option<Option<f32>> {
        match sort_by {
            SortBy::ImagePositionPatient => {
                let pos = dicom_object
                    .element(tags::IMAGE_POSITION_PATIENT)
                    .ok()
                    .and_then(|e| e.to_multi_float32().ok());
                Some(pos.and_then(|p| p.get(2).copied()))
            }
            SortBy::TablePosition => {
                let pos = dicom_object
                    .element(tags::TABLE_POSITION)
                    .ok()
                    .and_then(|e| e.to_float32().ok());
                Some(pos)
            }
            SortBy::InstanceNumber => {
                let num = dicom_object
                    .element(tags::INSTANCE_NUMBER)
                    .ok()
                    .and_then(|e| e.to_int::<i32>().ok())
                    .map(|n| n as f32);
                Some(num)
            }
            SortBy::None => Some(Some(0.0)),
        }
    }

    fn decode_image(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<Array2<f32>> {
        let pixel_data = dicom_object.decode_pixel_data().ok()?;
        let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Identity);
        pixel_data
            .to_ndarray_with_options::<f32>(&options)
            .ok()
            .map(|arr| arr.slice_move(s![0, .., .., 0]))
    }

    fn sort_images(images_with_order: &mut [OrderedImage], sort_by: SortBy) {
        if !matches!(sort_by, SortBy::None) {
            images_with_order
                .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        }

        if matches!(sort_by, SortBy::ImagePositionPatient) {
            images_with_order.reverse();
        }
    }

    fn validate_dimensions(images: &[Array2<f32>]) -> Result<(), VolumeLoaderError> {
        let expected = images[0].dim();
        match images.iter().map(|img| img.dim()).find(|dim| *dim != expected) {
            Some(found) => Err(VolumeLoaderError::InconsistentDimensions { expected, found }),
            None => Ok(()),
        }
    }

    fn build_volume_array(images: &[Array2<f32>]) -> Array3<f32> {
        let (height, width) = images[0].dim();
        let depth = images.len();
        let mut volume = Array3::<f32>::zeros((depth, height, width));

        for (i, image) in images.iter().enumerate() {
            volume.slice_mut(s![i, .., ..]).assign(image);
        }

        volume
    }

    fn get_spacing(dicom_objects: &[FileDicomObject<InMemDicomObject>]) -> Option<(f32, f32, f32)> {
        dicom_objects.iter().find_map(|dicom_object| {
            let pixel_spacing = dicom_object
                .element(tags::PIXEL_SPACING)
                .ok()?
                .to_multi_float32()
                .ok()?;

            let slice_thickness = dicom_object
                .element(tags::SLICE_THICKNESS)
                .ok()?
                .to_float32()
                .ok()?;

            Some((*pixel_spacing.first()?, *pixel_spacing.get(1)?, slice_thickness))
        })
    }
}
