/// One choice on the five-step review scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingOption {
    pub value: u8,
    pub label: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
}

pub const RATING_OPTIONS: [RatingOption; 5] = [
    RatingOption {
        value: 1,
        label: "화나요",
        emoji: "😡",
        description: "매우 불만족",
    },
    RatingOption {
        value: 2,
        label: "쏘쏘",
        emoji: "🤔",
        description: "아쉬움",
    },
    RatingOption {
        value: 3,
        label: "괜찮아요",
        emoji: "👍",
        description: "보통",
    },
    RatingOption {
        value: 4,
        label: "추천",
        emoji: "👍👍",
        description: "만족",
    },
    RatingOption {
        value: 5,
        label: "꼭 가세요",
        emoji: "👍👍👍",
        description: "매우 만족",
    },
];

const SCORE_BADGES: [&str; 6] = ["❓", "😡", "😐", "👍", "👍👍", "👍👍👍"];

pub fn rating_option(score: u8) -> Option<&'static RatingOption> {
    RATING_OPTIONS.iter().find(|option| option.value == score)
}

/// Badge for an average score; 0 (no reviews yet) shows a question mark.
pub fn score_badge(avg_score: f64) -> &'static str {
    if !avg_score.is_finite() {
        return SCORE_BADGES[0];
    }
    let index = avg_score.round().clamp(0.0, 5.0) as usize;
    SCORE_BADGES[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_rounds_half_up() {
        assert_eq!(score_badge(0.0), "❓");
        assert_eq!(score_badge(2.5), "👍");
        assert_eq!(score_badge(4.49), "👍👍");
        assert_eq!(score_badge(7.0), "👍👍👍");
        assert_eq!(score_badge(f64::NAN), "❓");
    }

    #[test]
    fn options_cover_scale() {
        assert_eq!(rating_option(1).unwrap().label, "화나요");
        assert_eq!(rating_option(5).unwrap().emoji, "👍👍👍");
        assert!(rating_option(0).is_none());
    }
}
