//! Wind rose and wind direction binning.

/// Number of compass sectors in the rose (22.5° each).
pub const SECTORS: usize = 16;

/// Lower edges of the speed classes in m/s; the last class is open ended.
pub const SPEED_EDGES: [f64; 5] = [0.0, 2.0, 4.0, 6.0, 8.0];

pub const COMPASS: [&str; SECTORS] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Frequency table of wind observations.
#[derive(Debug, Clone, PartialEq)]
pub struct WindRose {
    /// `frequencies[sector][speed_class]` in percent of all observations.
    pub frequencies: Vec<Vec<f64>>,
    pub observations: usize,
}

impl WindRose {
    pub fn sector_width() -> f64 {
        360.0 / SECTORS as f64
    }

    /// Centre bearing of a sector, clockwise from north.
    pub fn sector_center(sector: usize) -> f64 {
        sector as f64 * Self::sector_width()
    }

    pub fn speed_labels() -> Vec<String> {
        SPEED_EDGES
            .iter()
            .enumerate()
            .map(|(i, lo)| match SPEED_EDGES.get(i + 1) {
                Some(hi) => format!("{lo}–{hi} m/s"),
                None => format!("≥{lo} m/s"),
            })
            .collect()
    }

    /// Sum over speed classes for one sector.
    pub fn sector_total(&self, sector: usize) -> f64 {
        self.frequencies[sector].iter().sum()
    }
}

/// Sector index for a bearing in degrees. Sectors are centred on the compass
/// points, so sector 0 spans 348.75°–11.25°.
pub fn sector_of(direction: f64) -> usize {
    let width = WindRose::sector_width();
    let shifted = (direction + width / 2.0).rem_euclid(360.0);
    ((shifted / width) as usize) % SECTORS
}

fn speed_class(speed: f64) -> usize {
    SPEED_EDGES
        .iter()
        .rposition(|edge| speed >= *edge)
        .unwrap_or(0)
}

/// Bin paired direction/speed readings. Rows missing either value or with a
/// negative speed are ignored.
pub fn wind_rose(directions: &[Option<f64>], speeds: &[Option<f64>]) -> WindRose {
    let mut counts = vec![vec![0usize; SPEED_EDGES.len()]; SECTORS];
    let mut observations = 0;

    for (d, s) in directions.iter().zip(speeds) {
        let (Some(d), Some(s)) = (d, s) else { continue };
        if *s < 0.0 {
            continue;
        }
        counts[sector_of(*d)][speed_class(*s)] += 1;
        observations += 1;
    }

    let frequencies = counts
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|c| {
                    if observations == 0 {
                        0.0
                    } else {
                        c as f64 * 100.0 / observations as f64
                    }
                })
                .collect()
        })
        .collect();

    WindRose {
        frequencies,
        observations,
    }
}

/// Counts of directions in fixed-width bins over `[0, 360)`.
pub fn direction_histogram(directions: &[f64], bin_width: f64) -> Vec<(f64, usize)> {
    let bins = (360.0 / bin_width).round() as usize;
    let mut counts = vec![0usize; bins];
    for d in directions {
        let idx = ((d.rem_euclid(360.0) / bin_width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (i as f64 * bin_width, c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sectors_are_centred_on_compass_points() {
        assert_eq!(sector_of(0.0), 0);
        assert_eq!(sector_of(359.0), 0);
        assert_eq!(sector_of(11.0), 0);
        assert_eq!(sector_of(12.0), 1);
        assert_eq!(sector_of(90.0), 4);
        assert_eq!(sector_of(-90.0), 12);
        assert_eq!(COMPASS[sector_of(225.0)], "SW");
    }

    #[test]
    fn rose_frequencies_sum_to_hundred() {
        let dirs = [Some(0.0), Some(90.0), Some(90.0), None, Some(180.0)];
        let speeds = [Some(1.0), Some(3.0), Some(9.5), Some(2.0), None];
        let rose = wind_rose(&dirs, &speeds);

        assert_eq!(rose.observations, 3);
        let total: f64 = (0..SECTORS).map(|s| rose.sector_total(s)).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert!((rose.frequencies[4][1] - 100.0 / 3.0).abs() < 1e-9);
        assert!((rose.frequencies[4][4] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_rose_is_all_zero() {
        let rose = wind_rose(&[], &[]);
        assert_eq!(rose.observations, 0);
        assert!(rose.frequencies.iter().flatten().all(|f| *f == 0.0));
    }

    #[test]
    fn speed_labels_cover_every_class() {
        let labels = WindRose::speed_labels();
        assert_eq!(labels.len(), SPEED_EDGES.len());
        assert_eq!(labels.last().unwrap(), "≥8 m/s");
    }

    #[test]
    fn direction_histogram_wraps() {
        let h = direction_histogram(&[5.0, 355.0, 360.0, 15.0], 10.0);
        assert_eq!(h.len(), 36);
        assert_eq!(h[0], (0.0, 2));
        assert_eq!(h[1].1, 1);
        assert_eq!(h[35].1, 1);
    }
}
