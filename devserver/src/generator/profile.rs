use super::catalog::{catalog, COMMENTS, FIXTURE_USERS, NAME_PREFIXES, REVIEW_LINES, STREETS};
use crate::dataset::{Dataset, StoredReview, StoredVisit};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hankkicore::map::DEFAULT_CENTER;
use hankkicore::model::{Category, LatLng, RestaurantDetail, RestaurantSummary, User};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Knobs for the generated data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub seed: u64,
    pub count: usize,
    pub center: LatLng,
    pub spread_deg: f64,
    /// Days of visit and review history to back-fill.
    pub history_days: i64,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            count: 120,
            center: DEFAULT_CENTER,
            spread_deg: 0.012,
            history_days: 30,
        }
    }
}

fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn build_restaurant<R: Rng>(rng: &mut R, config: &FixtureConfig, index: usize) -> RestaurantDetail {
    let category = Category::ALL[index % Category::ALL.len()];
    let (suffixes, menus) = catalog(category);
    let spread = config.spread_deg.abs().max(1e-6);
    let lat = config.center.lat + rng.gen_range(-spread..spread);
    let lng = config.center.lng + rng.gen_range(-spread..spread);
    let mut menu: Vec<String> = menus
        .choose_multiple(rng, 3)
        .map(|item| item.to_string())
        .collect();
    menu.sort();

    RestaurantDetail {
        summary: RestaurantSummary {
            id: index as u64 + 1,
            name: format!("{} {}", pick(rng, &NAME_PREFIXES), pick(rng, suffixes)),
            address: format!(
                "경기도 수원시 영통구 {} {}",
                pick(rng, &STREETS),
                rng.gen_range(1..300)
            ),
            phone: rng
                .gen_bool(0.7)
                .then(|| format!("031-{:03}-{:04}", rng.gen_range(200..999), rng.gen_range(0..10_000))),
            category: category.label().to_string(),
            lat: format!("{lat:.6}"),
            lng: format!("{lng:.6}"),
            local_currency: rng.gen_bool(0.5),
            goodness: rng.gen_bool(0.2),
            kind_price: rng.gen_bool(0.15),
            review_count: 0,
            visit_count: 0,
            avg_score: 0.0,
            restaurant_score: Some((rng.gen_range(25..50) as f64) / 10.0),
        },
        menus: menu,
        one_line_comment: pick(rng, &COMMENTS).to_string(),
    }
}

/// Seeded data set around `config.center`, with history ending at `now`.
pub fn generate(config: &FixtureConfig, now: DateTime<Utc>) -> Dataset {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let restaurants: Vec<RestaurantDetail> = (0..config.count)
        .map(|index| build_restaurant(&mut rng, config, index))
        .collect();
    let users: Vec<User> = FIXTURE_USERS
        .iter()
        .map(|(login_id, name)| User {
            user_login_id: login_id.to_string(),
            user_name: name.to_string(),
        })
        .collect();
    let ids: Vec<u64> = restaurants.iter().map(|r| r.summary.id).collect();
    let mut data = Dataset::new(restaurants, users);

    let history_days = config.history_days.max(1);
    let mut visit_id = 1;
    let mut review_id = 1;
    let mut seen_days = HashSet::new();
    for id in ids {
        let visits = rng.gen_range(0..12);
        for _ in 0..visits {
            let (login_id, _) = FIXTURE_USERS[rng.gen_range(0..FIXTURE_USERS.len())];
            let day = rng.gen_range(0..history_days);
            if !seen_days.insert((id, login_id, day)) {
                continue;
            }
            let at = now - ChronoDuration::days(day) - ChronoDuration::minutes(rng.gen_range(0..600));
            data.seed_visit(StoredVisit {
                visit_id,
                restaurant_id: id,
                user_login_id: login_id.to_string(),
                at,
            });
            visit_id += 1;

            if rng.gen_bool(0.3) {
                data.seed_review(StoredReview {
                    review_id,
                    restaurant_id: id,
                    user_login_id: login_id.to_string(),
                    score: rng.gen_range(1..=5),
                    comment: pick(&mut rng, &REVIEW_LINES).to_string(),
                    at: at + ChronoDuration::minutes(40),
                });
                review_id += 1;
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hankkicore::model::BoundingBox;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 2, 3, 0, 0).unwrap()
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = FixtureConfig::default();
        let a = generate(&config, now());
        let b = generate(&config, now());
        assert_eq!(a.restaurant_count(), 120);
        assert_eq!(a.list(None, None, 1).restaurants, b.list(None, None, 1).restaurants);
        assert_eq!(a.visit_count(), b.visit_count());
    }

    #[test]
    fn restaurants_stay_inside_spread() {
        let config = FixtureConfig {
            count: 40,
            spread_deg: 0.01,
            ..Default::default()
        };
        let data = generate(&config, now());
        let c = config.center;
        let bounds =
            BoundingBox::new(c.lat + 0.011, c.lng + 0.011, c.lat - 0.011, c.lng - 0.011).unwrap();
        assert_eq!(data.list(Some(bounds), None, 1).total_count, 40);
        assert!(data
            .category_counts()
            .iter()
            .all(|(_, count)| *count >= 4));
    }
}
