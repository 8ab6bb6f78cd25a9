use crate::TrendStatus;

// Each axis is an ordered tier table evaluated top to bottom; the floor
// applies when no tier matches.

const RECENCY_TIERS: &[(f64, u8)] = &[
    (24.0, 40),
    (48.0, 35),
    (72.0, 30),
    (168.0, 20),
    (336.0, 10),
];
const RECENCY_FLOOR: u8 = 5;

const VELOCITY_TIERS: &[(u64, u8)] = &[
    (50_000, 40),
    (20_000, 35),
    (10_000, 30),
    (5_000, 25),
    (2_000, 20),
    (1_000, 15),
    (500, 10),
];
const VELOCITY_FLOOR: u8 = 5;

const ENGAGEMENT_TIERS: &[(f64, u8)] = &[(15.0, 20), (10.0, 17), (7.0, 14), (5.0, 10), (3.0, 6)];
const ENGAGEMENT_FLOOR: u8 = 3;

/// Recency axis, 0-40 points.
pub fn recency_points(age_hours: f64) -> u8 {
    for &(limit, points) in RECENCY_TIERS {
        if age_hours <= limit {
            return points;
        }
    }
    RECENCY_FLOOR
}

/// Velocity axis, 0-40 points.
pub fn velocity_points(views_per_hour: u64) -> u8 {
    for &(threshold, points) in VELOCITY_TIERS {
        if views_per_hour >= threshold {
            return points;
        }
    }
    VELOCITY_FLOOR
}

/// Engagement axis, 0-20 points. `rate` is a percentage.
pub fn engagement_points(rate: f64) -> u8 {
    for &(threshold, points) in ENGAGEMENT_TIERS {
        if rate >= threshold {
            return points;
        }
    }
    ENGAGEMENT_FLOOR
}

/// Combined viral-potential score, 0-100. Items with no measurable age or
/// no views score zero outright so division artifacts never leak through.
pub fn viral_potential(age_hours: f64, views: u64, views_per_hour: u64, engagement_rate: f64) -> u8 {
    if age_hours == 0.0 || views == 0 {
        return 0;
    }
    let total = recency_points(age_hours) as u16
        + velocity_points(views_per_hour) as u16
        + engagement_points(engagement_rate) as u16;
    total.min(100) as u8
}

/// Categorical label derived from potential and age. Recomputed on every
/// analysis call, never persisted.
pub fn trend_status(viral_potential: u8, age_hours: f64) -> TrendStatus {
    if viral_potential >= 80 {
        TrendStatus::Viral
    } else if viral_potential >= 60 {
        TrendStatus::Trending
    } else if age_hours <= 48.0 {
        TrendStatus::Emerging
    } else {
        TrendStatus::Mature
    }
}
