/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Default working-size limit for the viewer (longest side, in pixels).
pub const DEFAULT_VIEWER_MAX_SIZE: u32 = 2000;

/// Default working-size limit for the correspondence editor.
pub const DEFAULT_EDITOR_MAX_SIZE: u32 = 500;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Number of channels in a raster image (R, G, B, A).
pub const RASTER_CHANNELS: usize = 4;

/// Number of histogram bins for Otsu's thresholding.
pub const OTSU_HISTOGRAM_BINS: usize = 256;

/// Lowe ratio test: keep a match only if best < ratio * second best.
pub const DEFAULT_RATIO_TEST: f32 = 0.5;

/// Maximum reprojection error (working-size pixels) for a RANSAC inlier.
pub const DEFAULT_RANSAC_THRESHOLD: f64 = 3.0;

/// Upper bound on RANSAC iterations.
pub const DEFAULT_RANSAC_MAX_ITERS: usize = 2000;

/// Probability that at least one RANSAC sample is outlier-free.
pub const DEFAULT_RANSAC_CONFIDENCE: f64 = 0.995;

/// Minimum number of point pairs for a projective fit.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Sigma of the Gaussian used by the unsharp step after warping.
pub const UNSHARP_SIGMA: f32 = 1.0;

/// Kernel size of the Gaussian used by the unsharp step after warping.
pub const UNSHARP_KERNEL_SIZE: usize = 3;

/// Fraction of (original - blurred) added back: 1.5*orig - 0.5*blur.
pub const UNSHARP_AMOUNT: f32 = 0.5;

/// Sigma of the Gaussian feathering the highlight masks.
pub const FEATHER_SIGMA: f32 = 1.0;

/// Kernel size of the Gaussian feathering the highlight masks.
pub const FEATHER_KERNEL_SIZE: usize = 3;

/// Dilation iterations restoring significant difference regions.
pub const HIGHLIGHT_DILATE_ITERATIONS: usize = 3;

/// White-pixel rate at or above which a binarized input counts as
/// dark-on-light.
pub const WHITE_RATE_THRESHOLD: f64 = 0.5;

/// Saturation (0-255) below which an image is treated as monochrome.
pub const MONOCHROME_SATURATION_LIMIT: u8 = 3;

/// Coverage value above which a warped pixel has true source coverage.
pub const COVERAGE_THRESHOLD: f32 = 0.5;

/// Default FAST-9 intensity threshold (fraction of full scale).
pub const DEFAULT_FAST_THRESHOLD: f32 = 20.0 / 255.0;

/// Default total keypoint budget across all pyramid levels.
pub const DEFAULT_MAX_KEYPOINTS: usize = 1000;

/// Default number of pyramid levels for keypoint detection.
pub const DEFAULT_PYRAMID_LEVELS: usize = 4;

/// Default downscale factor between consecutive pyramid levels.
pub const DEFAULT_PYRAMID_SCALE: f32 = 1.3;

/// Radius of the square patch used for orientation and descriptors.
pub const PATCH_RADIUS: usize = 15;

/// Keypoints closer than this to the border are discarded, so a rotated
/// descriptor patch always stays inside the image.
pub const DESCRIPTOR_BORDER: usize = 22;

/// Sigma of the Gaussian applied before sampling descriptor pairs.
pub const DESCRIPTOR_BLUR_SIGMA: f32 = 2.0;

/// Number of intensity comparisons in a binary descriptor.
pub const DESCRIPTOR_BITS: usize = 256;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f64 = 1e-10;
