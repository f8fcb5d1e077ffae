//! # Rock core CT dashboard
//!
//! Serves CT scans of rock core samples next to the porosity measured (and
//! predicted by several models) along the same core.
//!
//! The crate is built from a few independent parts:
//!
//!  - [`volume_loader`] reads a directory of DICOM slices into a
//!    Hounsfield-unit [`volume::Volume`]. Files are decoded in parallel
//!    using rayon.
//!  - [`percent`] stacks the per-slice model outputs (`img_{i}.npy`,
//!    `percent_{i}.npy`) into volumes of the same shape and provides the
//!    per-voxel `(ct, phase1, phase2, phase3)` hover data.
//!  - [`porosity`] reads the depth-indexed porosity sheet.
//!  - [`figure`] and [`callbacks`] turn the table and UI events into
//!    Plotly figures and slicer positions.
//!  - [`scene`] keeps the position store shared by the slicers of a scene.
//!  - [`routes`] and [`handlers`] expose all of it over HTTP with actix-web.
//!
//! Slices are cut along the three axes of the `(depth, height, width)` array:
//!  - Axial (axis 0)
//!  - Coronal (axis 1)
//!  - Sagittal (axis 2)
//!
//! # Examples
//!
//! ## Rendering the middle slice of a scan
//!
//! ```no_run
//! # use rock_ct_dashboard::{VolumeLoader, Orientation, Interpolation, SortBy};
//! let volume = VolumeLoader::load_from_directory("assets/RockCT", SortBy::ImagePositionPatient)
//!     .expect("should have loaded files from directory");
//! let image = volume
//!     .get_image_from_axis(
//!         volume.middle_index(Orientation::Axial),
//!         Orientation::Axial,
//!         Interpolation::None,
//!         None,
//!     )
//!     .expect("should have returned image at center of volume");
//! image.save("result.png").unwrap();
//! ```
//!
//! ## Redrawing the porosity chart
//!
//! ```
//! # use rock_ct_dashboard::callbacks::{update_line_chart, LineSelection};
//! # use rock_ct_dashboard::porosity::PorosityTable;
//! let table = PorosityTable::from_columns(
//!     "Depth (cm)",
//!     vec![0.0, 0.5],
//!     vec![("Fractional porosity".to_string(), vec![0.21, 0.24])],
//! )
//! .unwrap();
//! let figure = update_line_chart(&table, &LineSelection::parse("All")).unwrap();
//! assert_eq!(figure.data.len(), 1);
//! ```

pub mod app_state;
pub mod callbacks;
pub mod config;
pub mod enums;
pub mod error;
pub mod figure;
pub mod handlers;
mod interpolator;
pub mod percent;
pub mod porosity;
pub mod routes;
pub mod scene;
pub mod volume;
pub mod volume_loader;
pub mod window;

pub use app_state::AppState;
pub use enums::{Interpolation, Orientation, SortBy};
pub use error::DashboardError;
pub use volume::Volume;
pub use volume_loader::VolumeLoader;
