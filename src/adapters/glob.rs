// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 单通配符匹配（`prefix*suffix`）
///
/// 空模式或 `*` 匹配一切；不含 `*` 时要求完全相等；
/// 含多个 `*` 的模式在写入配置时已被拒绝，此处按字面比较
pub fn matches(pattern: &str, value: &str) -> bool {
    if pattern.is_empty() || pattern == "*" {
        return true;
    }

    let mut parts = pattern.splitn(2, '*');
    let prefix = parts.next().unwrap_or_default();
    let Some(suffix) = parts.next() else {
        return pattern == value;
    };
    if suffix.contains('*') {
        return pattern == value;
    }

    value.len() >= prefix.len() + suffix.len()
        && value.starts_with(prefix)
        && value.ends_with(suffix)
}

/// 值是否命中任一模式，模式列表为空时放行
pub fn matches_any(patterns: &[String], value: &str) -> bool {
    patterns.is_empty() || patterns.iter().any(|p| matches(p, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_wildcard() {
        assert!(matches("release-*", "release-1.0"));
        assert!(!matches("release-*", "hotfix-1.0"));
    }

    #[test]
    fn test_empty_and_star_match_everything() {
        for value in ["", "main", "feature/x"] {
            assert!(matches("", value));
            assert!(matches("*", value));
        }
    }

    #[test]
    fn test_prefix_and_suffix() {
        assert!(matches("feature/*-ui", "feature/login-ui"));
        assert!(!matches("feature/*-ui", "feature/login-api"));
        assert!(!matches("ab*ba", "aba"));
    }

    #[test]
    fn test_exact_match_without_wildcard() {
        assert!(matches("main", "main"));
        assert!(!matches("main", "main2"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["group/app".to_string(), "infra/*".to_string()];
        assert!(matches_any(&patterns, "infra/terraform"));
        assert!(matches_any(&patterns, "group/app"));
        assert!(!matches_any(&patterns, "group/other"));
        assert!(matches_any(&[], "anything"));
    }
}
