use crate::types::HistoryEntry;

/// Most frequently viewed category in `history`.
///
/// Counts are kept in first-seen order and only a strictly greater count
/// replaces the current pick, so ties go to the category seen first.
pub fn recommend_category(history: &[HistoryEntry]) -> Option<String> {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for category in history.iter().filter_map(|h| h.category.as_deref()) {
        if category.is_empty() {
            continue;
        }
        match tally.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => tally.push((category, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (category, count) in tally {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            title: "t".to_string(),
            description: None,
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_highest_count_wins() {
        let history = vec![entry(Some("tech")), entry(Some("tech")), entry(Some("sports"))];
        assert_eq!(recommend_category(&history).as_deref(), Some("tech"));
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let history = vec![
            entry(Some("sports")),
            entry(Some("tech")),
            entry(Some("tech")),
            entry(Some("sports")),
        ];
        assert_eq!(recommend_category(&history).as_deref(), Some("sports"));
    }

    #[test]
    fn test_no_categories_means_no_recommendation() {
        assert_eq!(recommend_category(&[]), None);
        assert_eq!(recommend_category(&[entry(None), entry(Some(""))]), None);
    }
}
