//! Polyline profiles: projected geometry, along-path distance, and normals.
//!
//! A [`Profile`] is an ordered sequence of geographic vertices describing a
//! sampling path (a flowline, a flux gate). Construction projects the
//! vertices into the mapplane, accumulates the along-path distance, and
//! attaches a right-hand unit normal to every vertex.

use ndarray::Array1;
use tracing::debug;

use crate::error::{FlowlineError, Result};
use crate::grid::MapplaneGrid;

/// Unit normal orthogonal to the chord from `p0` to `p1`, pointing to the
/// right of the direction of travel.
///
/// A chord parallel to the x-axis gets the default normal (0, 1) before the
/// orientation check. A zero-length chord (coincident points) is degenerate
/// input geometry and fails with a numeric error.
pub fn normal(p0: (f64, f64), p1: (f64, f64)) -> Result<(f64, f64)> {
    let ax = p0.0 - p1.0;
    let ay = p0.1 - p1.1;

    if ax == 0.0 && ay == 0.0 {
        return Err(FlowlineError::Numeric {
            message: format!(
                "zero-length chord at ({}, {}); deduplicate the vertices first",
                p0.0, p0.1
            ),
        });
    }

    let (mut nx, mut ny) = if ay != 0.0 {
        let slope = -ax / ay;
        let len = (1.0 + slope * slope).sqrt();
        (1.0 / len, slope / len)
    } else {
        (0.0, 1.0)
    };

    // flip so the normal sits to the right of travel
    if ax * ny - ay * nx < 0.0 {
        nx = -nx;
        ny = -ny;
    }

    Ok((nx, ny))
}

/// An ordered polyline of geographic points with derived mapplane geometry.
#[derive(Debug, Clone)]
pub struct Profile {
    name: String,
    lat: Array1<f64>,
    lon: Array1<f64>,
    x: Array1<f64>,
    y: Array1<f64>,
    distance: Array1<f64>,
    normal_x: Array1<f64>,
    normal_y: Array1<f64>,
    center_lat: f64,
    center_lon: f64,
}

impl Profile {
    /// Build a profile from geographic vertices.
    ///
    /// `projection` maps (lon, lat) to projected plane coordinates (x, y).
    /// `flip` reverses the vertex order before projecting, turning a profile
    /// digitized the wrong way around. At least two distinct vertices are
    /// required; coincident consecutive vertices fail the normal computation
    /// (see [`dedup_by_cell`](Self::dedup_by_cell)).
    pub fn new<P>(
        name: impl Into<String>,
        lat: Vec<f64>,
        lon: Vec<f64>,
        projection: P,
        flip: bool,
    ) -> Result<Self>
    where
        P: Fn(f64, f64) -> (f64, f64),
    {
        if lat.len() != lon.len() {
            return Err(FlowlineError::InvalidParameter {
                param: "profile".to_string(),
                message: format!(
                    "lat and lon must have the same length (got {} and {})",
                    lat.len(),
                    lon.len()
                ),
            });
        }

        let (lat, lon) = if flip {
            (
                lat.into_iter().rev().collect::<Vec<_>>(),
                lon.into_iter().rev().collect::<Vec<_>>(),
            )
        } else {
            (lat, lon)
        };

        let mut x = Vec::with_capacity(lat.len());
        let mut y = Vec::with_capacity(lat.len());
        for (&lat_k, &lon_k) in lat.iter().zip(lon.iter()) {
            let (px, py) = projection(lon_k, lat_k);
            x.push(px);
            y.push(py);
        }

        Self::from_parts(
            name.into(),
            Array1::from(lat),
            Array1::from(lon),
            Array1::from(x),
            Array1::from(y),
        )
    }

    fn from_parts(
        name: String,
        lat: Array1<f64>,
        lon: Array1<f64>,
        x: Array1<f64>,
        y: Array1<f64>,
    ) -> Result<Self> {
        let n = x.len();
        if n < 2 {
            return Err(FlowlineError::InvalidParameter {
                param: "profile".to_string(),
                message: format!("a profile needs at least 2 vertices (got {})", n),
            });
        }

        let mut distance = Array1::zeros(n);
        for k in 1..n {
            let step = ((x[k] - x[k - 1]).powi(2) + (y[k] - y[k - 1]).powi(2)).sqrt();
            distance[k] = distance[k - 1] + step;
        }

        let mut normal_x = Array1::zeros(n);
        let mut normal_y = Array1::zeros(n);
        let p = |k: usize| (x[k], y[k]);

        let (nx, ny) = normal(p(0), p(1))?;
        normal_x[0] = nx;
        normal_y[0] = ny;
        for k in 1..n - 1 {
            // interior vertices use the chord between their neighbors
            let (nx, ny) = normal(p(k - 1), p(k + 1))?;
            normal_x[k] = nx;
            normal_y[k] = ny;
        }
        let (nx, ny) = normal(p(n - 2), p(n - 1))?;
        normal_x[n - 1] = nx;
        normal_y[n - 1] = ny;

        let center_lat = lat.sum() / n as f64;
        let center_lon = lon.sum() / n as f64;

        Ok(Self {
            name,
            lat,
            lon,
            x,
            y,
            distance,
            normal_x,
            normal_y,
            center_lat,
            center_lon,
        })
    }

    /// Profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vertex latitudes, in travel order.
    pub fn lat(&self) -> &Array1<f64> {
        &self.lat
    }

    /// Vertex longitudes, in travel order.
    pub fn lon(&self) -> &Array1<f64> {
        &self.lon
    }

    /// Projected x coordinates.
    pub fn x(&self) -> &Array1<f64> {
        &self.x
    }

    /// Projected y coordinates.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Cumulative along-path distance, starting at 0.
    pub fn distance(&self) -> &Array1<f64> {
        &self.distance
    }

    /// x components of the right-hand unit normals.
    pub fn normal_x(&self) -> &Array1<f64> {
        &self.normal_x
    }

    /// y components of the right-hand unit normals.
    pub fn normal_y(&self) -> &Array1<f64> {
        &self.normal_y
    }

    /// Latitude of the profile midpoint (mean of the vertices).
    pub fn center_lat(&self) -> f64 {
        self.center_lat
    }

    /// Longitude of the profile midpoint (mean of the vertices).
    pub fn center_lon(&self) -> f64 {
        self.center_lon
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the profile has no vertices. Construction guarantees at least
    /// two, so this is false for any live profile.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Drop vertices sharing their grid cell with the following vertex.
    ///
    /// Densely digitized profiles can place several consecutive vertices in
    /// the same grid cell; each run is collapsed to its last vertex and the
    /// distances and normals are recomputed. Fails if fewer than two
    /// vertices remain.
    pub fn dedup_by_cell(&self, grid: &MapplaneGrid) -> Result<Profile> {
        let n = self.len();
        let mut keep = vec![true; n];
        for k in 0..n - 1 {
            let same_cell = grid.column_index(self.x[k]) == grid.column_index(self.x[k + 1])
                && grid.row_index(self.y[k]) == grid.row_index(self.y[k + 1]);
            if same_cell {
                keep[k] = false;
            }
        }

        let dropped = keep.iter().filter(|&&k| !k).count();
        if dropped > 0 {
            debug!(
                "Profile '{}': dropped {} of {} vertices sharing a grid cell",
                self.name, dropped, n
            );
        }

        let select = |a: &Array1<f64>| {
            Array1::from_iter(
                a.iter()
                    .zip(keep.iter())
                    .filter(|(_, &k)| k)
                    .map(|(&v, _)| v),
            )
        };

        Self::from_parts(
            self.name.clone(),
            select(&self.lat),
            select(&self.lon),
            select(&self.x),
            select(&self.y),
        )
    }
}
