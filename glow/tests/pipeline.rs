//! End-to-end glow removal on synthetic skies.

use approx::assert_abs_diff_eq;
use glow::filter::{Filter, GaussianBlurFilter, MedianFilter, PseudoMedianFilter};
use glow::gradient::idw_factors;
use glow::{
    GlowConfig, GlowError, GlowRemover, GlowStrategy, GradientInterpolation, Point, PointSelectionStrategy,
    SampleSubtraction, SubtractLinear, SubtractSpline, SubtractionStrategy, VoronoiPoints,
};
use shared::color::SampleChannel;
use shared::{ArrayImage, ColorModel, PixelSource};
use test_helpers::{max_abs_difference, mean_abs_difference, SyntheticSky};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn corner_anchors(width: i32, height: i32) -> Vec<Point> {
    vec![
        Point::new(5, 5),
        Point::new(-6, 5),
        Point::new(5, -6),
        Point::new(-6, -6),
        Point::new(width / 2, height / 2),
    ]
}

#[test]
fn test_gradient_recovers_smooth_glow() {
    init_logging();
    let sky = SyntheticSky::new(120, 80).with_noise(0.002).with_seed(11).generate();

    let config = GlowConfig::gradient_with_fix_points(corner_anchors(120, 80))
        .with_subtraction(SubtractionStrategy::Subtract);
    let removal = GlowRemover::new(config).unwrap().remove(&sky.image).unwrap();

    // IDW over all anchors is smooth but not bilinear, so only the mean is tight
    let error = mean_abs_difference(&removal.glow, &sky.glow);
    assert!(error < 0.03, "mean glow error {error}");
    let center = removal.glow.native_pixel(60, 40);
    let truth = sky.glow.native_pixel(60, 40);
    assert_abs_diff_eq!(center[0], truth[0], epsilon = 0.005);
}

#[test]
fn test_voronoi_and_nearest_selection_run_in_pipeline() {
    init_logging();
    let sky = SyntheticSky::new(90, 60).with_seed(5).generate();
    let anchors: Vec<Point> = (0..3)
        .flat_map(|j| (0..4).map(move |i| Point::new(10 + i * 23 + j * 2, 8 + j * 22 + i)))
        .collect();

    for selection in [PointSelectionStrategy::Voronoi, PointSelectionStrategy::Nearest { k: 3 }] {
        let config = GlowConfig {
            glow_strategy: GlowStrategy::Gradient {
                sample_radius: 3,
                interpolation_power: 3.0,
                point_selection: selection,
                fix_points: anchors.clone(),
            },
            subtraction: SubtractionStrategy::Subtract,
            ..GlowConfig::default()
        };
        let removal = GlowRemover::new(config).unwrap().remove(&sky.image).unwrap();
        let error = mean_abs_difference(&removal.glow, &sky.glow);
        assert!(error < 0.03, "{selection:?} mean glow error {error}");
    }
}

#[test]
fn test_blur_strategy_removes_glow_and_keeps_stars() {
    init_logging();
    let sky = SyntheticSky::new(80, 60)
        .with_uniform_glow([0.2, 0.15, 0.1])
        .with_stars(6)
        .with_seed(9)
        .generate();

    let config = GlowConfig {
        glow_strategy: GlowStrategy::Blur {
            despeckle_radius: 4,
            blur_radius: 6,
        },
        subtraction: SubtractionStrategy::Subtract,
        ..GlowConfig::default()
    };
    let removal = GlowRemover::new(config).unwrap().remove(&sky.image).unwrap();

    for &(x, y) in &sky.stars {
        let star = removal.output.native_pixel(x, y);
        assert!(star[0] > 0.3, "star at ({x}, {y}) lost: {star:?}");
    }
    let background = removal.output.native_pixel(0, 0);
    if !sky.stars.iter().any(|&(x, y)| x < 6 && y < 6) {
        assert_abs_diff_eq!(background[0], 0.0, epsilon = 0.02);
    }
}

#[test]
fn test_auto_sampling_on_uniform_sky_removes_everything() {
    init_logging();
    let sky = SyntheticSky::new(50, 40).with_uniform_glow([0.25, 0.2, 0.3]).generate();
    let removal = GlowRemover::new(GlowConfig::default()).unwrap().remove(&sky.image).unwrap();
    for y in (0..40).step_by(7) {
        for x in (0..50).step_by(7) {
            let pixel = removal.output.native_pixel(x, y);
            for c in 0..3 {
                assert_abs_diff_eq!(pixel[c], 0.0, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_linear_subtraction_keeps_white_at_one() {
    let mut input = ArrayImage::filled(10, 10, ColorModel::Rgb, &[0.3, 0.3, 0.3]);
    shared::PixelBuffer::set_native_pixel(&mut input, 5, 5, [1.0, 1.0, 1.0]);
    let config = GlowConfig::single_color([0.3, 0.3, 0.3]);
    let removal = GlowRemover::new(config).unwrap().remove(&input).unwrap();
    assert_abs_diff_eq!(removal.output.native_pixel(5, 5)[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(removal.output.native_pixel(0, 0)[0], 0.0, epsilon = 1e-12);
}

#[test]
fn test_spline_subtraction_compresses_glow_level() {
    let input = ArrayImage::filled(4, 4, ColorModel::Rgb, &[0.2, 0.2, 0.2]);
    let config = GlowConfig::single_color([0.2, 0.2, 0.2]).with_subtraction(SubtractionStrategy::spline_1());
    let removal = GlowRemover::new(config).unwrap().remove(&input).unwrap();
    assert_abs_diff_eq!(removal.output.native_pixel(2, 2)[1], 0.002, epsilon = 1e-12);
}

#[test]
fn test_subtraction_scenarios() {
    let spline = SubtractSpline::new(0.05, vec![(0.6, 0.7)]).unwrap();
    for glow in [0.1, 0.3, 0.5] {
        assert_eq!(spline.subtract(0.0, glow), 0.0);
        assert_abs_diff_eq!(spline.subtract(glow, glow), glow * 0.05, epsilon = 1e-12);
        assert_eq!(spline.subtract(1.0, glow), 1.0);
    }

    assert!(matches!(
        SubtractLinear.checked_subtract(0.5, 1.0),
        Err(GlowError::DivisionByZero { .. })
    ));
    assert_eq!(SubtractLinear.checked_subtract(0.5, 0.5).unwrap(), 0.0);
}

#[test]
fn test_three_anchor_scenario() {
    let mut gradient = GradientInterpolation::default();
    gradient
        .set_fix_points_with_colors(
            &[Point::new(10, 10), Point::new(90, 10), Point::new(50, 90)],
            &[[0.2, 0.2, 0.2], [0.4, 0.2, 0.2], [0.2, 0.4, 0.2]],
        )
        .unwrap();

    let glow = gradient.glow_at(Point::new(50, 10)).unwrap();
    assert!(glow[0] > 0.2 && glow[0] < 0.4);

    // moving right brings the red anchor closer
    let right = gradient.glow_at(Point::new(80, 10)).unwrap();
    assert!(right[0] > glow[0]);

    let distances = [40.0, 40.0, 80.0];
    let sum: f64 = idw_factors(&distances, 3.0).iter().sum();
    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
}

#[test]
fn test_voronoi_fallback_for_small_sets() {
    use glow::PointSelector;
    let mut selector = VoronoiPoints::new();
    let anchors = vec![Point::new(1, 1), Point::new(30, 2), Point::new(4, 40)];
    selector.set_anchors(&anchors);
    assert_eq!(selector.relevant_anchors(Point::new(100, 100)), anchors);
}

#[test]
fn test_filters_preserve_flat_images() {
    let color = [0.31, 0.27, 0.22];
    let flat = ArrayImage::filled(25, 17, ColorModel::Rgb, &color);
    let filters: Vec<Box<dyn Filter>> = vec![
        Box::new(GaussianBlurFilter::new(7, ColorModel::Rgb)),
        Box::new(MedianFilter::new(2, ColorModel::Rgb)),
        Box::new(PseudoMedianFilter::new(3, ColorModel::Rgb)),
    ];
    for filter in filters {
        let out = filter.filter_same_size(&flat);
        assert!(max_abs_difference(&out, &flat) < 1e-12);
    }
}

#[test]
fn test_delta_image_after_removal() {
    let sky = SyntheticSky::new(30, 20).with_uniform_glow([0.2, 0.2, 0.2]).generate();
    let config = GlowConfig::single_color([0.3, 0.2, 0.1]);
    let removal = GlowRemover::new(config).unwrap().remove(&sky.image).unwrap();
    let delta = removal.delta(&sky.image, SampleChannel::Red, 5.0).unwrap();
    assert_eq!(delta.size(), sky.image.size());
    let pixel = delta.native_pixel(3, 3);
    // glow exceeds the input in red
    assert_abs_diff_eq!(pixel[0], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(pixel[2], 0.25, epsilon = 1e-12);
}

#[test]
fn test_empty_gradient_fails_fast() {
    let gradient = GradientInterpolation::default();
    assert!(matches!(gradient.estimate(10, 10), Err(GlowError::NoAnchors)));
}
