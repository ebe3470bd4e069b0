//! Image file collaborators: mask decoding and PNG export.
//!
//! The pipeline itself never touches the filesystem; callers load the mask
//! here, run the pipeline in memory and hand the result back for export.

mod png;

pub use png::{
    export_noise_png, export_png, load_mask, ImageLoadError, ImageWriteError, PngExportOptions,
};
