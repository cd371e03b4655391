//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Results are never smaller than 1x1.

/// Scale `source` to `width`, keeping the aspect ratio.
///
/// ```
/// # use trowel::imaging::scale_to_width;
/// assert_eq!(scale_to_width((1000, 750), 500), (500, 375));
/// ```
pub fn scale_to_width(source: (u32, u32), width: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 {
        return (width.max(1), src_h.max(1));
    }
    let height = (src_h as f64 * width as f64 / src_w as f64).round() as u32;
    (width.max(1), height.max(1))
}

/// Resolve the requested thumbnail box against the source size.
///
/// - Both edges set: used as-is (the aspect ratio may change).
/// - One edge zero: derived from the other, keeping the aspect ratio.
/// - Both zero: the source size.
pub fn thumbnail_dimensions(source: (u32, u32), requested: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    match requested {
        (0, 0) => (src_w.max(1), src_h.max(1)),
        (w, 0) => scale_to_width(source, w),
        (0, h) => {
            if src_h == 0 {
                return (src_w.max(1), h);
            }
            let w = (src_w as f64 * h as f64 / src_h as f64).round() as u32;
            (w.max(1), h)
        }
        (w, h) => (w, h),
    }
}
