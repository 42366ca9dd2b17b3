//! Release note parsing and notification wording.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{IssueKind, IssueNumber};

/// A release body containing this marker is not tracked.
pub const NO_TRACKING_MARKER: &str = "{!no_release_tracking}";

static ISSUE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("valid regex"));

/// Issue numbers referenced as `#N` anywhere in a release body.
///
/// Numbers too large for `u64` are ignored.
pub fn extract_issue_numbers(body: &str) -> BTreeSet<IssueNumber> {
    ISSUE_REFERENCE
        .captures_iter(body)
        .filter_map(|c| c[1].parse::<u64>().ok())
        .map(IssueNumber)
        .collect()
}

pub fn is_tracking_disabled(body: &str) -> bool {
    body.contains(NO_TRACKING_MARKER)
}

/// The comment posted on an issue shipped in a release.
///
/// Prereleases go out on the preview channel, which users must opt into.
pub fn notification(kind: IssueKind, release_name: &str, release_url: &str, prerelease: bool) -> String {
    let noun = kind.noun();
    if prerelease {
        format!(
            "包含此{noun}的版本已在测试通道[{release_name}]({release_url})发布，请及时更新以获取包含此{noun}的版本。\
             要在应用内升级到此版本，您可能需要在【应用设置】->【更新】->【更新设置】中将更新通道切换到对应的测试通道。"
        )
    } else {
        format!(
            "包含此{noun}的版本已在稳定通道[{release_name}]({release_url})发布，请及时更新以获取包含此{noun}的版本。"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn numbers(body: &str) -> Vec<u64> {
        extract_issue_numbers(body).into_iter().map(|n| n.0).collect()
    }

    #[test]
    fn finds_references_anywhere() {
        assert_eq!(numbers("- 修复 #10\n- 新增 #11 (#10)"), vec![10, 11]);
        assert_eq!(numbers("see ClassIsland/ClassIsland#7"), vec![7]);
        assert!(numbers("no references, # alone, #abc").is_empty());
    }

    #[test]
    fn oversized_numbers_are_skipped() {
        assert_eq!(numbers("#99999999999999999999999 #3"), vec![3]);
    }

    #[test]
    fn marker_disables_tracking() {
        assert!(is_tracking_disabled("hotfix {!no_release_tracking}"));
        assert!(!is_tracking_disabled("hotfix #3"));
    }

    #[test]
    fn preview_wording_mentions_channel_switch() {
        let text = notification(
            IssueKind::FeatureRequest,
            "1.5.0.0",
            "https://example.com/r",
            true,
        );
        assert!(text.starts_with("包含此功能请求的版本已在测试通道[1.5.0.0](https://example.com/r)发布"));
        assert!(text.contains("【更新设置】"));
    }

    #[test]
    fn stable_wording_uses_kind_noun_twice() {
        let text = notification(IssueKind::BugFix, "1.5.0.0", "u", false);
        assert_eq!(
            text,
            "包含此 Bug 的修复的版本已在稳定通道[1.5.0.0](u)发布，请及时更新以获取包含此 Bug 的修复的版本。"
        );
    }

    proptest! {
        #[test]
        fn every_written_reference_is_found(ns in prop::collection::btree_set(1u64..1_000_000, 0..8)) {
            let body: String = ns.iter().map(|n| format!("- fix #{n}\n")).collect();
            prop_assert_eq!(numbers(&body), ns.into_iter().collect::<Vec<_>>());
        }

        #[test]
        fn arbitrary_body_never_panics(body: String) {
            let _ = extract_issue_numbers(&body);
        }
    }
}
