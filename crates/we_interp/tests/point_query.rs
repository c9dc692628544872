// crates/we_interp/tests/point_query.rs

//! 单点查询集成测试

use we_config::{DiscretizationConfig, Region, SimulationRequest, SpectrumConfig, TimeConfig};
use we_interp::{frames_to_wave_grid, query_point, PointInterpolator};
use we_physics::{simulate_dense, ComputePool, SimulationStepper};

fn request() -> SimulationRequest {
    SimulationRequest::new(Region::new(120.0, 30.0, 120.5, 30.5))
        .with_spectrum(SpectrumConfig::default().with_seed(7))
        .with_discretization(DiscretizationConfig {
            dx: 0.05,
            dy: 0.05,
            max_points: 5000,
        })
        .with_time(TimeConfig::default().with_total(1.0))
}

#[test]
fn test_query_at_grid_point_returns_stored_height() {
    let pool = ComputePool::new(2).unwrap();
    let grid = simulate_dense(&request(), &pool).unwrap();
    let interp = PointInterpolator::new(&grid).unwrap();

    for &(point_idx, time_idx) in &[(0usize, 0usize), (37, 2), (60, 5), (120, 3)] {
        let p = grid.grid_points[point_idx];
        let t = grid.times[time_idx];
        let h = interp.query(p.lon, p.lat, t).unwrap();
        let expected = grid.wave_heights[time_idx][point_idx];
        assert!(
            (h - expected).abs() < 1e-5,
            "point {} t={}: {} vs {}",
            point_idx,
            t,
            h,
            expected
        );
    }
}

#[test]
fn test_centroid_at_t0_is_phase_sum() {
    let req = request();
    let pool = ComputePool::new(2).unwrap();
    let stepper = SimulationStepper::new(&req, &pool).unwrap();
    let expected = stepper.spectrum().height_at_origin();

    let grid = simulate_dense(&req, &pool).unwrap();
    let (lon, lat) = req.region.centroid();
    let h = query_point(&grid, lon, lat, 0.0).unwrap();

    assert!(h.is_finite());
    assert!((h - expected).abs() < 1e-6, "{} vs {}", h, expected);
}

#[test]
fn test_frames_and_dense_agree() {
    let req = request();
    let pool = ComputePool::new(2).unwrap();
    let dense = simulate_dense(&req, &pool).unwrap();
    let frames = dense.to_frames(req.region);
    let rebuilt = frames_to_wave_grid(&frames).unwrap();

    assert_eq!(rebuilt.num_points(), dense.num_points());
    assert_eq!(rebuilt.times, dense.times);
    for (a, b) in rebuilt.grid_points.iter().zip(&dense.grid_points) {
        assert_eq!((a.lon, a.lat), (b.lon, b.lat));
        assert!((a.x - b.x).abs() < 1e-6);
        assert!((a.y - b.y).abs() < 1e-6);
    }

    let h1 = query_point(&dense, 120.13, 30.37, 0.5).unwrap();
    let h2 = query_point(&rebuilt, 120.13, 30.37, 0.5).unwrap();
    assert!((h1 - h2).abs() < 1e-9);
}

#[test]
fn test_query_time_is_clamped() {
    let pool = ComputePool::new(1).unwrap();
    let grid = simulate_dense(&request(), &pool).unwrap();
    let p = grid.grid_points[10];
    let late = query_point(&grid, p.lon, p.lat, 100.0).unwrap();
    let last = query_point(&grid, p.lon, p.lat, 1.0).unwrap();
    assert_eq!(late, last);
}
