//! Text the bot posts when opening a vote.

use crate::types::IssueSnapshot;

/// Body of a voting discussion: the issue body plus a footer linking back.
pub fn discussion_body(issue: &IssueSnapshot) -> String {
    format!(
        "{body}\n\n***\n\n\
         > [!note]\n\
         > 这个 Discussion 复制自 Issue [{number}]({url}) 。点击左下角的“↑”来给这个功能进行投票，开发者会优先处理票数较高的帖子。\n\
         >\n\
         > 请在源 Issue 下进行讨论，不要在这个 Discussion 下面发表评论，**否则您的评论可能会在清除此 Discussion 时被清除**。",
        body = issue.body,
        number = issue.number,
        url = issue.url,
    )
}

/// Comment left on the issue pointing at its discussion.
pub fn cross_reference_comment(discussion_url: &str) -> String {
    format!(
        "此功能请求已开放投票：{discussion_url}\n\n\
         请在对应的 Discussion 中点击“↑”为此功能投票，讨论请继续在本 Issue 下进行。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::issue;

    #[test]
    fn footer_links_back_to_issue() {
        let mut i = issue("I_1", 42, &[]);
        i.body = "Please add dark mode.".to_string();
        i.url = "https://github.com/o/r/issues/42".to_string();

        let body = discussion_body(&i);
        assert!(body.starts_with("Please add dark mode.\n\n***"));
        assert!(body.contains("[#42](https://github.com/o/r/issues/42)"));
    }

    #[test]
    fn cross_reference_contains_url() {
        let c = cross_reference_comment("https://github.com/o/votes/discussions/7");
        assert!(c.contains("https://github.com/o/votes/discussions/7"));
    }
}
