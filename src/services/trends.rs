use crate::models::SentimentBreakdown;

/// Fraction of analyzed sentiment that is positive, in [0, 1].
/// An all-zero breakdown (provider returned nothing useful) maps to 0.
pub fn positive_ratio(sentiment: &SentimentBreakdown) -> f64 {
    let total = sentiment.positive as f64 + sentiment.neutral as f64 + sentiment.negative as f64;
    if total == 0.0 {
        return 0.0;
    }
    sentiment.positive as f64 / total
}

/// Combines engagement counters and sentiment into a 0..=100 trend score.
///
/// Engagement contributes up to 80 points (views/likes/comments normalized
/// against 10k/1k/100 and weighted 30/30/20), sentiment up to 20.
pub fn trend_score(views: u64, likes: u64, comments: u64, positive_ratio: f64) -> u8 {
    let normalized_views = (views as f64 / 10_000.0).min(1.0);
    let normalized_likes = (likes as f64 / 1_000.0).min(1.0);
    let normalized_comments = (comments as f64 / 100.0).min(1.0);

    let engagement_score =
        normalized_views * 30.0 + normalized_likes * 30.0 + normalized_comments * 20.0;
    let sentiment_score = positive_ratio.clamp(0.0, 1.0) * 20.0;

    (engagement_score + sentiment_score).round().clamp(0.0, 100.0) as u8
}
