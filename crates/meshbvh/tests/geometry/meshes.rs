use meshbvh::math::{Point, Real, Vector};
use meshbvh::shape::{PointCloud, Polyline, PolylineMode, TriMesh};

pub fn random_point(rng: &mut oorandom::Rand32, scale: Real) -> Point<Real> {
    Point::new(rng.rand_float(), rng.rand_float(), rng.rand_float()) * scale
}

/// Small random triangles scattered in a `[0, 10]³` box.
pub fn triangle_soup(seed: u64, count: usize) -> TriMesh {
    let mut rng = oorandom::Rand32::new(seed);
    let mut vertices = Vec::with_capacity(count * 3);

    for _ in 0..count {
        let center = random_point(&mut rng, 10.0);
        for _ in 0..3 {
            let offset = Vector::new(rng.rand_float(), rng.rand_float(), rng.rand_float());
            vertices.push(center + (offset - Vector::repeat(0.5)) * 0.8);
        }
    }

    TriMesh::new(vertices, None).unwrap()
}

pub fn point_cloud(seed: u64, count: usize) -> PointCloud {
    let mut rng = oorandom::Rand32::new(seed);
    PointCloud::new((0..count).map(|_| random_point(&mut rng, 10.0)).collect())
}

/// A random walk joined as a strip.
pub fn random_strip(seed: u64, count: usize) -> Polyline {
    let mut rng = oorandom::Rand32::new(seed);
    let mut pt = Point::new(5.0, 5.0, 5.0);
    let vertices = (0..count)
        .map(|_| {
            pt += (Vector::new(rng.rand_float(), rng.rand_float(), rng.rand_float())
                - Vector::repeat(0.5))
                * 0.6;
            pt
        })
        .collect();

    Polyline::new(vertices, None, PolylineMode::Strip).unwrap()
}

/// The 12 triangles of an axis-aligned cube of side 1 centered at the origin, facing outward.
pub fn cube() -> TriMesh {
    let vertices = vec![
        Point::new(-0.5, -0.5, -0.5),
        Point::new(0.5, -0.5, -0.5),
        Point::new(0.5, 0.5, -0.5),
        Point::new(-0.5, 0.5, -0.5),
        Point::new(-0.5, -0.5, 0.5),
        Point::new(0.5, -0.5, 0.5),
        Point::new(0.5, 0.5, 0.5),
        Point::new(-0.5, 0.5, 0.5),
    ];
    let triangles = [
        [0, 3, 2],
        [0, 2, 1],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];

    TriMesh::from_triangles(vertices, &triangles).unwrap()
}
