//! # Text Normalizer
//!
//! Pure helpers that clean mention tokens out of raw message text before it is
//! handed to behaviors (and from there to the language model). Malformed tokens
//! never match and pass through unchanged.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::domain::message::{InboundMessage, Mention};

/// Also matches the legacy nickname form `<@!id>`.
static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?(\d+)>").expect("user mention pattern"));
static ROLE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@&\d+>").expect("role mention pattern"));

/// Remove the first `<@digits>` (or `<@!digits>`) token only.
pub fn strip_first_self_mention(text: &str) -> String {
    USER_MENTION.replacen(text, 1, "").into_owned()
}

/// Replace each mentioned user's token with `prefix + display_name + suffix`.
///
/// Tokens are resolved in a single pass, so inserted names are never scanned
/// again. When an id appears twice in `mentions`, the first entry wins. Tokens
/// for users not in `mentions` are left alone.
pub fn replace_mentions_with_names(
    text: &str,
    mentions: &[Mention],
    prefix: &str,
    suffix: &str,
) -> String {
    if mentions.is_empty() {
        return text.to_string();
    }
    USER_MENTION
        .replace_all(text, |caps: &Captures| {
            match mentions.iter().find(|m| m.id == caps[1]) {
                Some(mention) => format!("{prefix}{}{suffix}", mention.display_name),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Remove every `<@&digits>` role token.
pub fn strip_role_mentions(text: &str) -> String {
    ROLE_MENTION.replace_all(text, "").into_owned()
}

/// False when the bot's own id is not known yet.
pub fn is_self_mentioned(message: &InboundMessage, self_id: Option<&str>) -> bool {
    match self_id {
        Some(id) => message.mentions.iter().any(|m| m.id == id),
        None => false,
    }
}

/// Text as the character service should see it: invocation mention dropped,
/// other users named, roles removed, whitespace trimmed.
pub fn preprocess(message: &InboundMessage) -> String {
    let text = strip_first_self_mention(&message.content);
    let text = replace_mentions_with_names(&text, &message.mentions, "", "");
    strip_role_mentions(&text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::Author;

    fn mention(id: &str, name: &str) -> Mention {
        Mention {
            id: id.to_string(),
            display_name: name.to_string(),
        }
    }

    fn message(content: &str, mentions: Vec<Mention>) -> InboundMessage {
        InboundMessage {
            id: "1".to_string(),
            channel_id: "10".to_string(),
            guild_id: Some("20".to_string()),
            author: Author {
                id: "5".to_string(),
                display_name: "alice".to_string(),
                bot: false,
            },
            content: content.to_string(),
            mentions,
        }
    }

    #[test]
    fn strips_only_the_first_mention() {
        assert_eq!(strip_first_self_mention("<@1> hi <@1> again"), " hi <@1> again");
    }

    #[test]
    fn strip_leaves_role_and_malformed_tokens() {
        assert_eq!(strip_first_self_mention("<@&7> <@abc> hi"), "<@&7> <@abc> hi");
        assert_eq!(strip_first_self_mention("no mentions"), "no mentions");
    }

    #[test]
    fn replaces_mention_with_display_name() {
        let mentions = vec![mention("42", "Rex")];
        assert_eq!(
            replace_mentions_with_names("hello <@42>", &mentions, "", ""),
            "hello Rex"
        );
    }

    #[test]
    fn replaces_every_occurrence_with_wrapping() {
        let mentions = vec![mention("42", "Rex"), mention("43", "Bo")];
        assert_eq!(
            replace_mentions_with_names("<@42> meet <@43>, <@!42>", &mentions, "**", "**"),
            "**Rex** meet **Bo**, **Rex**"
        );
    }

    #[test]
    fn substituted_names_are_not_rescanned() {
        let mentions = vec![mention("42", "<@43>"), mention("43", "Bo")];
        assert_eq!(
            replace_mentions_with_names("hi <@42>", &mentions, "", ""),
            "hi <@43>"
        );
    }

    #[test]
    fn unknown_ids_pass_through() {
        let mentions = vec![mention("42", "Rex")];
        assert_eq!(
            replace_mentions_with_names("hi <@99>", &mentions, "", ""),
            "hi <@99>"
        );
    }

    #[test]
    fn strips_all_role_mentions() {
        assert_eq!(strip_role_mentions("ping <@&7> now"), "ping  now");
        assert_eq!(strip_role_mentions("<@&1><@&2>x"), "x");
    }

    #[test]
    fn self_mention_requires_known_id() {
        let msg = message("<@42> hi", vec![mention("42", "Rex")]);
        assert!(is_self_mentioned(&msg, Some("42")));
        assert!(!is_self_mentioned(&msg, Some("7")));
        assert!(!is_self_mentioned(&msg, None));
        assert!(!is_self_mentioned(&message("hi", vec![]), None));
    }

    #[test]
    fn preprocess_cleans_invocation_text() {
        let msg = message(
            "<@42> tell <@43> a joke <@&9>  ",
            vec![mention("42", "Rex"), mention("43", "Bo")],
        );
        assert_eq!(preprocess(&msg), "tell Bo a joke");
    }

    #[test]
    fn nickname_form_invocation_is_stripped() {
        assert_eq!(strip_first_self_mention("<@!42> hi <@!42>"), " hi <@!42>");
        let msg = message("<@!42> hi", vec![mention("42", "Rex")]);
        assert_eq!(preprocess(&msg), "hi");
    }
}
