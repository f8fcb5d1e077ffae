use crate::enums::Interpolation;
use crate::enums::Orientation;
use crate::interpolator::Interpolator;
use crate::window::CtWindow;

use image::GrayImage;
use image::ImageBuffer;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::s;
use rayon::prelude::*;

/// Immutable intensity volume laid out as `(depth, height, width)`.
///
/// For CT data the values are Hounsfield units; derived layers (such as the
/// solid fraction) reuse the same type.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    data: Array3<f32>,
    spacing: (f32, f32, f32),
    interpolated_dim: (u32, u32, u32),
    range: (f32, f32),
}

impl Volume {
    /// `spacing` is `(row, column, slice)` in millimeters.
    pub fn new(data: Array3<f32>, spacing: (f32, f32, f32)) -> Self {
        let original_dim = data.dim();
        let range = Self::compute_range(&data);
        Self {
            data,
            spacing,
            interpolated_dim: Interpolator::get_isotropic_dimensions(spacing, original_dim),
            range,
        }
    }

    /// Get the dimensions of the volume (depth, height, width)
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn spacing(&self) -> (f32, f32, f32) {
        self.spacing
    }

    /// Smallest and largest finite value, `(0, 0)` for an empty volume.
    pub fn value_range(&self) -> (f32, f32) {
        self.range
    }

    /// Number of slices available along `orientation`.
    pub fn nslices(&self, orientation: Orientation) -> usize {
        self.data.len_of(Axis(orientation.axis()))
    }

    /// Slice shown before the user moves anything.
    pub fn middle_index(&self, orientation: Orientation) -> usize {
        self.nslices(orientation) / 2
    }

    /// Voxel value at `(z, y, x)`.
    pub fn value_at(&self, z: usize, y: usize, x: usize) -> Option<f32> {
        self.data.get((z, y, x)).copied()
    }

    /// Copy of this volume with every voxel multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.data.mapv(|v| v * factor), self.spacing)
    }

    /// Keeps only the first `max_slices` axial slices.
    pub fn truncated(self, max_slices: usize) -> Self {
        if max_slices >= self.data.len_of(Axis(0)) {
            return self;
        }
        let data = self.data.slice(s![..max_slices, .., ..]).to_owned();
        Self::new(data, self.spacing)
    }

    /// Auto window covering the value range of the volume.
    pub fn auto_window(&self) -> Option<CtWindow> {
        CtWindow::from_range(self.range.0, self.range.1)
    }

    pub fn get_slice_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
    ) -> Option<ArrayView2<'_, f32>> {
        if !self.is_valid_index(index, orientation) {
            return None;
        }
        let slice = match orientation {
            Orientation::Axial => self.data.slice(s![index, .., ..]),
            Orientation::Coronal => self.data.slice(s![.., index, ..]),
            Orientation::Sagittal => self.data.slice(s![.., .., index]),
        };
        Some(slice)
    }

    fn get_output_dimensions(&self, orientation: Orientation) -> (u32, u32) {
        // Always (width, height)
        match orientation {
            Orientation::Axial => (self.interpolated_dim.2, self.interpolated_dim.1),
            Orientation::Coronal => (self.interpolated_dim.2, self.interpolated_dim.0),
            Orientation::Sagittal => (self.interpolated_dim.1, self.interpolated_dim.0),
        }
    }

    fn slice_to_image(slice: &ArrayView2<'_, f32>, window: &CtWindow) -> Option<GrayImage> {
        let (height, width) = slice.dim();
        let pixel_data: Vec<u8> = slice
            .into_par_iter()
            .map(|&v| window.eval(v).unwrap_or(0))
            .collect();
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }

    /// Renders one slice to an 8-bit grayscale image.
    ///
    /// Falls back to [`Volume::auto_window`] when `window` is `None`. Returns
    /// `None` for an out-of-range index or an empty volume.
    pub fn get_image_from_axis(
        &self,
        index: usize,
        orientation: Orientation,
        interpolation: Interpolation,
        window: Option<CtWindow>,
    ) -> Option<GrayImage> {
        let window = window.or_else(|| self.auto_window())?;
        let slice = self.get_slice_from_axis(index, orientation)?;
        if slice.is_empty() {
            return None;
        }

        match interpolation {
            Interpolation::None => Self::slice_to_image(&slice, &window),
            Interpolation::Bilinear => {
                // Axial slices are already isotropic in-plane
                if matches!(orientation, Orientation::Axial) {
                    return Self::slice_to_image(&slice, &window);
                }
                let (width, height) = self.get_output_dimensions(orientation);
                Self::interpolate_slice(&slice, width, height, &window)
            }
        }
    }

    fn interpolate_slice(
        slice: &ArrayView2<'_, f32>,
        width: u32,
        height: u32,
        window: &CtWindow,
    ) -> Option<GrayImage> {
        let (slice_height, slice_width) = slice.dim();

        let pixel_data: Vec<u8> = (0..height)
            .into_par_iter()
            .flat_map(|y| {
                (0..width)
                    .map(|x| {
                        // Pixel centers in normalized coordinates
                        let norm_x = (x as f32 + 0.5) / width as f32;
                        let norm_y = (y as f32 + 0.5) / height as f32;

                        let src_x = norm_x * slice_width as f32 - 0.5;
                        let src_y = norm_y * slice_height as f32 - 0.5;

                        let src_x = src_x.max(0.0).min((slice_width - 1) as f32);
                        let src_y = src_y.max(0.0).min((slice_height - 1) as f32);

                        let value = Interpolator::bilinear_interpolate(slice, src_y, src_x);
                        window.eval(value).unwrap_or(0)
                    })
                    .collect::<Vec<u8>>()
            })
            .collect();

        ImageBuffer::from_raw(width, height, pixel_data)
    }

    fn is_valid_index(&self, index: usize, orientation: Orientation) -> bool {
        index < self.nslices(orientation)
    }

    fn compute_range(data: &Array3<f32>) -> (f32, f32) {
        let (min, max) = data
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min > max { (0.0, 0.0) } else { (min, max) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(depth: usize, height: usize, width: usize) -> Volume {
        let data = Array3::from_shape_fn((depth, height, width), |(z, y, x)| {
            (z * 100 + y * 10 + x) as f32
        });
        Volume::new(data, (1.0, 1.0, 1.0))
    }

    #[test]
    fn slices_follow_axes() {
        let volume = ramp(4, 3, 2);
        assert_eq!(volume.nslices(Orientation::Axial), 4);
        assert_eq!(volume.nslices(Orientation::Coronal), 3);
        assert_eq!(volume.nslices(Orientation::Sagittal), 2);

        let coronal = volume.get_slice_from_axis(1, Orientation::Coronal).unwrap();
        assert_eq!(coronal.dim(), (4, 2));
        assert_eq!(coronal[[2, 1]], 211.0);

        assert!(volume.get_slice_from_axis(2, Orientation::Sagittal).is_none());
    }

    #[test]
    fn middle_index_is_half_count() {
        let volume = ramp(5, 4, 3);
        assert_eq!(volume.middle_index(Orientation::Axial), 2);
        assert_eq!(volume.middle_index(Orientation::Coronal), 2);
        assert_eq!(volume.middle_index(Orientation::Sagittal), 1);
    }

    #[test]
    fn range_and_scaling() {
        let volume = ramp(2, 2, 2);
        assert_eq!(volume.value_range(), (0.0, 111.0));
        let scaled = volume.scaled(1000.0);
        assert_eq!(scaled.value_range(), (0.0, 111_000.0));
        assert_eq!(scaled.value_at(1, 1, 1), Some(111_000.0));
    }

    #[test]
    fn truncation_keeps_leading_slices() {
        let volume = ramp(6, 2, 2).truncated(4);
        assert_eq!(volume.dim(), (4, 2, 2));
        assert_eq!(volume.value_at(3, 0, 0), Some(300.0));
    }

    #[test]
    fn renders_axial_image_with_window() {
        let volume = ramp(2, 3, 4);
        let window = CtWindow::new(50.0, 100.0).unwrap();
        let image = volume
            .get_image_from_axis(1, Orientation::Axial, Interpolation::None, Some(window))
            .unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        // every voxel of slice 1 is >= 100 -> saturated
        assert!(image.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn bilinear_stretches_thick_slices() {
        let data = Array3::<f32>::zeros((2, 4, 4));
        let volume = Volume::new(data, (1.0, 1.0, 2.0));
        let image = volume
            .get_image_from_axis(0, Orientation::Coronal, Interpolation::Bilinear, None)
            .unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }
}
