//! Image processing for listing derivatives in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (PNG, JPEG) |
//! | **Main image** | `resize_exact` with `Nearest`, width-bound |
//! | **Thumbnail** | `resize_exact` with `CatmullRom` |
//! | **Encode** | `JpegEncoder` at the configured quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{scale_to_width, thumbnail_dimensions};
pub use operations::{DerivativeConfig, create_derivatives, plan_derivatives};
pub use params::{Filter, Quality, ResizeParams};
pub use rust_backend::RustBackend;
