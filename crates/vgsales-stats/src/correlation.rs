/// Pearson product-moment correlation coefficient over paired observations.
///
/// Returns `None` when fewer than two pairs are given or when either side has
/// zero variance, since the coefficient is undefined there.
///
/// # Examples
///
/// ```
/// use vgsales_stats::correlation::pearson;
///
/// let pairs = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
/// assert!((pearson(pairs).unwrap() - 1.0).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pairs = pairs.into_iter().collect::<Vec<_>>();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_coefficient() {
        let pairs = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
        let r = pearson(pairs).unwrap();
        assert!((r - 0.774_596_669_241_483_4).abs() < 1e-12);
    }

    #[test]
    fn test_negative_correlation() {
        let r = pearson([(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_cases() {
        assert_eq!(pearson(Vec::new()), None);
        assert_eq!(pearson([(1.0, 1.0)]), None);
        assert_eq!(pearson([(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]), None);
    }
}
