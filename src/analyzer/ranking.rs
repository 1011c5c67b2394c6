use std::collections::HashMap;

use crate::models::RankedEntry;

/// 把统计表转换为按数值降序排列的列表
///
/// 数值相同时按键的字典序排列，保证同样的输入总是得到同样的输出。
pub fn rank(map: &HashMap<String, u64>) -> Vec<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = map
        .iter()
        .map(|(key, value)| RankedEntry::new(key.clone(), *value))
        .collect();

    ranked.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    ranked
}

/// 只保留前 `n` 项
pub fn top_n(mut ranked: Vec<RankedEntry>, n: usize) -> Vec<RankedEntry> {
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(items: &[(&str, u64)]) -> HashMap<String, u64> {
        items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_rank_descending() {
        let ranked = rank(&map(&[("src", 10), ("docs", 300), (".", 42)]));

        let keys: Vec<&str> = ranked.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["docs", ".", "src"]);
    }

    #[test]
    fn test_ties_broken_by_key() {
        let ranked = rank(&map(&[("b", 5), ("a", 5), ("c", 9)]));

        assert_eq!(
            ranked,
            vec![
                RankedEntry::new("c", 9),
                RankedEntry::new("a", 5),
                RankedEntry::new("b", 5),
            ]
        );
    }

    #[test]
    fn test_top_n_truncates_and_tolerates_short_lists() {
        let items: Vec<(String, u64)> = (0..25).map(|i| (format!("dir{i}"), i)).collect();
        let big: HashMap<String, u64> = items.into_iter().collect();

        let top = top_n(rank(&big), 10);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0], RankedEntry::new("dir24", 24));

        assert_eq!(top_n(rank(&map(&[("only", 1)])), 10).len(), 1);
        assert!(top_n(rank(&HashMap::new()), 10).is_empty());
    }
}
