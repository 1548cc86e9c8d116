use approx::assert_abs_diff_eq;

use vdiff_core::coords::{
    scaled_size, working_ratio, DisplayLimit, DisplaySpace, FrameMapping, FullSpace, Point, Rect,
    WorkingSpace,
};

// ---------------------------------------------------------------------------
// Working ratio
// ---------------------------------------------------------------------------

#[test]
fn test_working_ratio_shrinks_longest_side() {
    assert_abs_diff_eq!(working_ratio(4000, 3000, 2000), 0.5);
    assert_abs_diff_eq!(working_ratio(1000, 2500, 500), 0.2);
}

#[test]
fn test_working_ratio_never_enlarges() {
    assert_eq!(working_ratio(640, 480, 2000), 1.0);
    assert_eq!(working_ratio(500, 500, 500), 1.0);
}

#[test]
fn test_scaled_size_rounds_and_keeps_one_pixel() {
    assert_eq!(scaled_size(4000, 3000, 0.5), (2000, 1500));
    assert_eq!(scaled_size(3000, 3, 0.1), (300, 1));
}

#[test]
fn test_mapping_working_size() {
    let m = FrameMapping::new(3000, 1500, 500);
    assert_eq!(m.natural_size(), (3000, 1500));
    assert_eq!(m.working_size(), (500, 250));
}

// ---------------------------------------------------------------------------
// Display ratio
// ---------------------------------------------------------------------------

#[test]
fn test_display_max_width_takes_precedence() {
    let limit = DisplayLimit {
        max_width: Some(100.0),
        max_height: Some(10.0),
    };
    assert_abs_diff_eq!(limit.ratio(400.0, 200.0), 0.25);
}

#[test]
fn test_display_max_height_used_alone() {
    let limit = DisplayLimit {
        max_width: None,
        max_height: Some(50.0),
    };
    assert_abs_diff_eq!(limit.ratio(400.0, 200.0), 0.25);
}

#[test]
fn test_display_never_enlarges() {
    let limit = DisplayLimit {
        max_width: Some(1000.0),
        max_height: None,
    };
    assert_eq!(limit.ratio(400.0, 200.0), 1.0);
    assert_eq!(DisplayLimit::default().ratio(400.0, 200.0), 1.0);
}

#[test]
fn test_side_by_side_display_doubles_width() {
    let m = FrameMapping::new(800, 400, 400).with_display_limit(&DisplayLimit {
        max_width: Some(200.0),
        max_height: None,
    });
    let (w, h) = m.display_size();
    assert_abs_diff_eq!(w, 200.0);
    assert_abs_diff_eq!(h, 100.0);
    let (sw, sh) = m.side_by_side_display_size();
    assert_abs_diff_eq!(sw, 400.0);
    assert_abs_diff_eq!(sh, 100.0);
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

#[test]
fn test_point_full_to_working_and_back() {
    let m = FrameMapping::new(4000, 2000, 1000);
    let p = Point::<FullSpace>::new(1000.0, 500.0);
    let w = m.to_working(p);
    assert_abs_diff_eq!(w.x, 250.0);
    assert_abs_diff_eq!(w.y, 125.0);
    let back = m.to_full(w);
    assert_abs_diff_eq!(back.x, p.x);
    assert_abs_diff_eq!(back.y, p.y);
}

#[test]
fn test_point_display_round_trip() {
    let m = FrameMapping::new(2000, 1000, 1000).with_display_limit(&DisplayLimit {
        max_width: Some(250.0),
        max_height: None,
    });
    let w = Point::<WorkingSpace>::new(400.0, 100.0);
    let d: Point<DisplaySpace> = m.to_display(w);
    assert_abs_diff_eq!(d.x, 100.0);
    assert_abs_diff_eq!(d.y, 25.0);
    let full: Point<FullSpace> = m.convert_point(d);
    assert_abs_diff_eq!(full.x, 800.0);
    assert_abs_diff_eq!(full.y, 200.0);
    let again = m.from_display(d);
    assert_abs_diff_eq!(again.x, w.x);
}

#[test]
fn test_rect_conversion_scales_every_field() {
    let m = FrameMapping::new(1000, 1000, 500);
    let r = Rect::<FullSpace>::new(100.0, 200.0, 300.0, 400.0);
    let w: Rect<WorkingSpace> = m.convert_rect(&r);
    assert_eq!((w.x, w.y, w.width, w.height), (50.0, 100.0, 150.0, 200.0));
}

#[test]
fn test_identity_mapping_keeps_points() {
    let m = FrameMapping::identity(10, 10);
    let p = m.to_working(Point::new(3.0, 4.0));
    assert_eq!(p.to_tuple(), (3.0, 4.0));
}

#[test]
fn test_rounded_working_size_converts_per_axis() {
    // 1201 * (2000 / 3001) = 800.4, so the raster is 2000x800.
    let m = FrameMapping::new(3001, 1201, 2000);
    assert_eq!(m.working_size(), (2000, 800));

    let corner = m.to_full(Point::<WorkingSpace>::new(2000.0, 800.0));
    assert_abs_diff_eq!(corner.x, 3001.0, epsilon = 1e-9);
    assert_abs_diff_eq!(corner.y, 1201.0, epsilon = 1e-9);

    let back = m.to_working(corner);
    assert_abs_diff_eq!(back.x, 2000.0, epsilon = 1e-9);
    assert_abs_diff_eq!(back.y, 800.0, epsilon = 1e-9);
}

#[test]
fn test_rounded_working_rect_covers_full_image() {
    let m = FrameMapping::new(3001, 1201, 2000);
    let full: Rect<FullSpace> = m.convert_rect(&Rect::<WorkingSpace>::new(0.0, 0.0, 2000.0, 800.0));
    assert_abs_diff_eq!(full.width, 3001.0, epsilon = 1e-9);
    assert_abs_diff_eq!(full.height, 1201.0, epsilon = 1e-9);
}
