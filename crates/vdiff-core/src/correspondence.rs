//! Correspondence resolution: from a hint to the transform taking image 2
//! onto image 1.
//!
//! Hints are resolved with a fallback chain that never fails: an invalid
//! point set is treated as absent and resolved automatically, and an
//! automatic match with too few features resolves to the image corners.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::consts::MIN_CORRESPONDENCES;
use crate::coords::{FullSpace, Point, Rect, WorkingSpace};
use crate::features::{detect_and_describe, ratio_test_matches, FeatureParams};
use crate::geometry::{
    bounding_rect, intersect_or_full, parse_fragment_rect, FragmentRect, PixelRect, Unit,
};
use crate::homography::{find_homography_ransac, Homography};
use crate::pipeline::config::MatchingConfig;
use crate::raster::WorkingImage;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub w: f64,
    pub h: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointXY {
    pub x: f64,
    pub y: f64,
}

/// Points measured on one image, with the image size they refer to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImagePoints {
    pub size: ImageSize,
    pub pts: Vec<PointXY>,
}

impl ImagePoints {
    fn is_valid(&self) -> bool {
        self.size.w.is_finite()
            && self.size.h.is_finite()
            && self.size.w > 0.0
            && self.size.h > 0.0
            && self.pts.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }

    /// Rescale into a frame of `width`x`height`.
    fn rescaled(&self, width: f64, height: f64) -> Vec<(f64, f64)> {
        self.pts
            .iter()
            .map(|p| (p.x / self.size.w * width, p.y / self.size.h * height))
            .collect()
    }

    fn from_full(natural: (usize, usize), pts: &[Point<FullSpace>]) -> Self {
        Self {
            size: ImageSize {
                w: natural.0 as f64,
                h: natural.1 as f64,
            },
            pts: pts.iter().map(|p| PointXY { x: p.x, y: p.y }).collect(),
        }
    }
}

/// Ordered point pairs between image 1 and image 2.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrespondencePointSet {
    pub img1: ImagePoints,
    pub img2: ImagePoints,
}

impl CorrespondencePointSet {
    /// Both sides carry the same number of points (at least four), every
    /// coordinate is finite and both sizes are positive.
    pub fn is_valid(&self) -> bool {
        self.img1.pts.len() == self.img2.pts.len()
            && self.img1.pts.len() >= MIN_CORRESPONDENCES
            && self.img1.is_valid()
            && self.img2.is_valid()
    }

    pub fn len(&self) -> usize {
        self.img1.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.img1.pts.is_empty()
    }

    /// Build a set from full-size points of both images.
    pub fn from_full_points(
        natural1: (usize, usize),
        pts1: &[Point<FullSpace>],
        natural2: (usize, usize),
        pts2: &[Point<FullSpace>],
    ) -> Self {
        Self {
            img1: ImagePoints::from_full(natural1, pts1),
            img2: ImagePoints::from_full(natural2, pts2),
        }
    }
}

/// How the caller wants correspondences found.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CorrespondenceHint {
    Points(CorrespondencePointSet),
    Corners,
    #[default]
    Auto,
}

/// How a resolution was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionMethod {
    Explicit,
    Corners,
    Auto { matches: usize, inliers: usize },
    /// Automatic matching was attempted but found too little to fit.
    CornersFallback { matches: usize },
}

impl std::fmt::Display for ResolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit points"),
            Self::Corners => write!(f, "corners"),
            Self::Auto { matches, inliers } => {
                write!(f, "auto ({inliers}/{matches} inliers)")
            }
            Self::CornersFallback { matches } => {
                write!(f, "corners (auto found {matches} matches)")
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Resolution {
    /// Maps image 2 working coordinates to image 1 working coordinates.
    pub transform: Homography,
    /// The correspondences behind `transform`, in full-size coordinates.
    pub correspondences: CorrespondencePointSet,
    /// Region of interest on image 1.
    pub roi: Rect<WorkingSpace>,
    pub method: ResolutionMethod,
}

/// Resolve `hint` into a transform from `b` onto `a`.
///
/// `roi_fragment` restricts automatic matching (and later compositing) to a
/// region of `a`; pixel fragments are in `a`'s full-size frame.
pub fn resolve(
    a: &WorkingImage,
    b: &WorkingImage,
    hint: &CorrespondenceHint,
    roi_fragment: Option<&str>,
    matching: &MatchingConfig,
    features: &FeatureParams,
) -> Resolution {
    let explicit_roi = roi_fragment
        .filter(|s| !s.is_empty())
        .map(|frag| fragment_roi(a, frag));

    match hint {
        CorrespondenceHint::Points(set) if set.is_valid() => {
            match resolve_explicit(a, b, set, explicit_roi) {
                Some(r) => return r,
                None => warn!("Correspondence points are degenerate, matching automatically"),
            }
        }
        CorrespondenceHint::Points(_) => {
            warn!("Correspondence points are malformed, matching automatically");
        }
        CorrespondenceHint::Corners => {
            return resolve_corners(a, b, explicit_roi, ResolutionMethod::Corners);
        }
        CorrespondenceHint::Auto => {}
    }

    let roi = explicit_roi.unwrap_or_else(|| full_roi(a));
    resolve_auto(a, b, roi, matching, features)
}

/// Evaluate a fragment on image 1's working frame.
pub fn fragment_roi(a: &WorkingImage, fragment: &str) -> Rect<WorkingSpace> {
    let mut rect = parse_fragment_rect(fragment);
    if rect.unit == Unit::Pixel {
        let full = Rect::<FullSpace>::new(rect.x, rect.y, rect.width, rect.height);
        let working: Rect<WorkingSpace> = a.mapping.convert_rect(&full);
        rect = FragmentRect::pixel(working.x, working.y, working.width, working.height);
    }
    Rect::from_pixel_rect(intersect_or_full(a.width() as f64, a.height() as f64, &rect))
}

fn full_roi(a: &WorkingImage) -> Rect<WorkingSpace> {
    Rect::from_pixel_rect(PixelRect::full(a.width() as f64, a.height() as f64))
}

fn working_corners(img: &WorkingImage) -> [(f64, f64); 4] {
    PixelRect::full(img.width() as f64, img.height() as f64).corners()
}

fn natural_corners(img: &WorkingImage) -> Vec<Point<FullSpace>> {
    let (w, h) = img.mapping.natural_size();
    PixelRect::full(w as f64, h as f64)
        .corners()
        .into_iter()
        .map(Point::from)
        .collect()
}

fn resolve_corners(
    a: &WorkingImage,
    b: &WorkingImage,
    roi: Option<Rect<WorkingSpace>>,
    method: ResolutionMethod,
) -> Resolution {
    let transform = Homography::from_four_points(&working_corners(b), &working_corners(a))
        .unwrap_or_else(|| {
            let sx = a.width() as f64 / b.width() as f64;
            let sy = a.height() as f64 / b.height() as f64;
            Homography::scaling(sx, sy)
        });
    info!(%method, "Resolved correspondences");

    Resolution {
        transform,
        correspondences: CorrespondencePointSet::from_full_points(
            a.mapping.natural_size(),
            &natural_corners(a),
            b.mapping.natural_size(),
            &natural_corners(b),
        ),
        roi: roi.unwrap_or_else(|| full_roi(a)),
        method,
    }
}

fn resolve_explicit(
    a: &WorkingImage,
    b: &WorkingImage,
    set: &CorrespondencePointSet,
    roi: Option<Rect<WorkingSpace>>,
) -> Option<Resolution> {
    let pts_a = set.img1.rescaled(a.width() as f64, a.height() as f64);
    let pts_b = set.img2.rescaled(b.width() as f64, b.height() as f64);
    let transform = Homography::fit(&pts_b, &pts_a)?;

    let roi = roi.unwrap_or_else(|| {
        let bounds = bounding_rect(pts_a.iter().copied())
            .unwrap_or_else(|| PixelRect::full(a.width() as f64, a.height() as f64));
        Rect::from_pixel_rect(intersect_or_full(
            a.width() as f64,
            a.height() as f64,
            &bounds.to_fragment_rect(),
        ))
    });

    let (na, nb) = (a.mapping.natural_size(), b.mapping.natural_size());
    let full = |img: &ImagePoints, natural: (usize, usize)| -> Vec<Point<FullSpace>> {
        img.rescaled(natural.0 as f64, natural.1 as f64)
            .into_iter()
            .map(Point::from)
            .collect()
    };
    info!(points = set.len(), "Resolved correspondences from explicit points");

    Some(Resolution {
        transform,
        correspondences: CorrespondencePointSet::from_full_points(
            na,
            &full(&set.img1, na),
            nb,
            &full(&set.img2, nb),
        ),
        roi,
        method: ResolutionMethod::Explicit,
    })
}

fn resolve_auto(
    a: &WorkingImage,
    b: &WorkingImage,
    roi: Rect<WorkingSpace>,
    matching: &MatchingConfig,
    features: &FeatureParams,
) -> Resolution {
    let gray_a = a.raster.luminance();
    let gray_b = b.raster.luminance();
    let mask_a = roi_mask(a.height(), a.width(), &roi);

    let feats_a = detect_and_describe(&gray_a, Some(&mask_a), features);
    let feats_b = detect_and_describe(&gray_b, None, features);
    let matches = ratio_test_matches(&feats_a.descriptors, &feats_b.descriptors, matching.ratio_test);
    debug!(
        keypoints_1 = feats_a.len(),
        keypoints_2 = feats_b.len(),
        matches = matches.len(),
        "Matched descriptors"
    );

    let fallback = |n: usize| {
        warn!(matches = n, "Too few feature matches, falling back to corners");
        resolve_corners(a, b, Some(roi), ResolutionMethod::CornersFallback { matches: n })
    };

    if matches.len() < MIN_CORRESPONDENCES {
        return fallback(matches.len());
    }

    let src: Vec<(f64, f64)> = matches
        .iter()
        .map(|m| {
            let kp = feats_b.keypoints[m.train_idx];
            (kp.x as f64, kp.y as f64)
        })
        .collect();
    let dst: Vec<(f64, f64)> = matches
        .iter()
        .map(|m| {
            let kp = feats_a.keypoints[m.query_idx];
            (kp.x as f64, kp.y as f64)
        })
        .collect();

    let Some(fit) = find_homography_ransac(&src, &dst, &matching.ransac_params()) else {
        return fallback(matches.len());
    };

    // Export the ROI corners of image 1 and their pre-images on image 2.
    let corners_a: [Point<WorkingSpace>; 4] = roi.corners();
    let Some(inverse) = fit.homography.inverse() else {
        return fallback(matches.len());
    };
    let mut corners_b = Vec::with_capacity(4);
    for p in &corners_a {
        match inverse.apply(p.x, p.y) {
            Some(q) if q.0.is_finite() && q.1.is_finite() => {
                corners_b.push(Point::<WorkingSpace>::from(q))
            }
            _ => return fallback(matches.len()),
        }
    }

    let full_a: Vec<Point<FullSpace>> = corners_a.iter().map(|p| a.mapping.to_full(*p)).collect();
    let full_b: Vec<Point<FullSpace>> = corners_b.iter().map(|p| b.mapping.to_full(*p)).collect();

    let method = ResolutionMethod::Auto {
        matches: matches.len(),
        inliers: fit.inlier_count,
    };
    info!(%method, "Resolved correspondences");

    Resolution {
        transform: fit.homography,
        correspondences: CorrespondencePointSet::from_full_points(
            a.mapping.natural_size(),
            &full_a,
            b.mapping.natural_size(),
            &full_b,
        ),
        roi,
        method,
    }
}

/// Binary mask of the integer-snapped ROI.
pub fn roi_mask(h: usize, w: usize, roi: &Rect<WorkingSpace>) -> Array2<bool> {
    let (col0, row0, col1, row1) = roi.as_pixel_rect().snapped(w, h);
    let mut mask = Array2::from_elem((h, w), false);
    for row in row0..row1 {
        for col in col0..col1 {
            mask[[row, col]] = true;
        }
    }
    mask
}
