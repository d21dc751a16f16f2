//! Default prompt generation and placeholder substitution.
//!
//! A prompt template is plain text carrying `{{name}}` tokens drawn from a
//! fixed vocabulary. Tokens are only replaced when a prompt is pushed to the
//! voice platform; stored templates always keep them.

use sha2::{Digest, Sha256};

use crate::error::ConsoleError;
use crate::mode::Mode;
use crate::profile::UserProfile;

/// A prompt that may still contain placeholder tokens.
pub type PromptTemplate = String;

/// The placeholder vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    RestaurantName,
    BotName,
    Tone,
    SeatingCapacity,
    Address,
    Menu,
}

impl Placeholder {
    /// Every placeholder, in the order the default preamble uses them.
    pub const ALL: [Placeholder; 6] = [
        Placeholder::RestaurantName,
        Placeholder::BotName,
        Placeholder::Tone,
        Placeholder::SeatingCapacity,
        Placeholder::Address,
        Placeholder::Menu,
    ];

    /// Name between the braces.
    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::RestaurantName => "restaurantName",
            Placeholder::BotName => "botName",
            Placeholder::Tone => "tone",
            Placeholder::SeatingCapacity => "seatingCapacity",
            Placeholder::Address => "address",
            Placeholder::Menu => "menu",
        }
    }

    /// The full token, e.g. `{{botName}}`.
    pub fn token(&self) -> String {
        format!("{{{{{}}}}}", self.name())
    }

    /// Look up a placeholder by the name between the braces.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The profile value this placeholder stands for.
    fn value(&self, profile: &UserProfile, mode: Mode) -> Option<String> {
        let restaurant = &profile.restaurant;
        let settings = profile.mode(mode);
        match self {
            Placeholder::RestaurantName => restaurant.name.clone(),
            Placeholder::BotName => settings.bot_name.clone(),
            Placeholder::Tone => settings.tone.clone(),
            Placeholder::SeatingCapacity => restaurant.seating_capacity.map(|c| c.to_string()),
            Placeholder::Address => restaurant.address.clone(),
            Placeholder::Menu => restaurant.menu.clone(),
        }
    }
}

const PREAMBLE: &str = "You are an AI assistant caller for a restaurant named {{restaurantName}}. \
Your name is {{botName}}. You should maintain a {{tone}} tone throughout the conversation.\n\n\
The details of the restaurant are:\n\n\
Seating Capacity: {{seatingCapacity}}\n\
Address: {{address}}\n\n\
Menu:\n{{menu}}";

const CLOSING: &str = "Please use this information to assist callers accurately. \
If asked about matters outside your domain, politely redirect them to the appropriate department. \
Always maintain a {{tone}} tone throughout the conversation.";

/// The fixed role paragraph for a mode.
pub fn role_paragraph(mode: Mode) -> &'static str {
    match mode {
        Mode::Customer => {
            "Your role is to assist callers with inquiries about the restaurant, take reservations, \
             and provide information about the menu and services."
        }
        Mode::Operations => {
            "Your role is to assist with internal operations, including inventory management, \
             staff scheduling, and kitchen coordination."
        }
        Mode::Sales => {
            "Your role is to handle business inquiries, catering requests, and partnership opportunities."
        }
    }
}

/// The generated template for a mode: preamble, role paragraph, closing.
pub fn default_prompt(mode: Mode) -> PromptTemplate {
    [PREAMBLE, role_paragraph(mode), CLOSING].join("\n\n")
}

/// The template in effect for a mode: the stored override when it is
/// non-empty, otherwise the generated default.
pub fn resolve_prompt(profile: &UserProfile, mode: Mode) -> PromptTemplate {
    match profile.mode(mode).general_prompt.as_deref() {
        Some(custom) if !custom.trim().is_empty() => custom.to_string(),
        _ => default_prompt(mode),
    }
}

/// Find the next placeholder token in `text`: its byte offset and kind.
///
/// Every `{{` is a candidate start, so extra braces around a token do not
/// hide it.
fn next_placeholder(text: &str) -> Option<(usize, Placeholder)> {
    let mut from = 0;
    while let Some(found) = text[from..].find("{{") {
        let open = from + found;
        let after_open = &text[open + 2..];
        let hit = Placeholder::ALL.into_iter().find(|p| {
            after_open
                .strip_prefix(p.name())
                .is_some_and(|tail| tail.starts_with("}}"))
        });
        if let Some(placeholder) = hit {
            return Some((open, placeholder));
        }
        from = open + 1;
    }
    None
}

/// Replace placeholder tokens with profile values in one left-to-right pass.
///
/// Substituted values are never rescanned. Unknown `{{...}}` tokens are
/// kept verbatim. Only placeholders that actually occur need a value.
pub fn substitute_placeholders(
    template: &str,
    profile: &UserProfile,
    mode: Mode,
) -> Result<String, ConsoleError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((open, placeholder)) = next_placeholder(rest) {
        output.push_str(&rest[..open]);
        let value = placeholder
            .value(profile, mode)
            .ok_or(ConsoleError::MissingField {
                field: placeholder.name(),
                mode,
            })?;
        output.push_str(&value);
        rest = &rest[open + placeholder.name().len() + 4..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Distinct placeholders occurring in `text`, in order of first occurrence.
pub fn placeholders_in(text: &str) -> Vec<Placeholder> {
    let mut found: Vec<Placeholder> = Vec::new();
    let mut rest = text;

    while let Some((open, placeholder)) = next_placeholder(rest) {
        if !found.contains(&placeholder) {
            found.push(placeholder);
        }
        rest = &rest[open + placeholder.name().len() + 4..];
    }

    found
}

/// Placeholders present in `original` that `edited` no longer contains.
pub fn missing_placeholders(original: &str, edited: &str) -> Vec<Placeholder> {
    let kept = placeholders_in(edited);
    placeholders_in(original)
        .into_iter()
        .filter(|p| !kept.contains(p))
        .collect()
}

/// SHA-256 fingerprint of a prompt, used when logging applied prompts.
pub fn hash_prompt(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luigis() -> UserProfile {
        let mut profile = UserProfile::new("owner-1");
        profile.restaurant.name = Some("Luigi's".to_string());
        profile.restaurant.seating_capacity = Some(40);
        profile.restaurant.address = Some("12 Mulberry St".to_string());
        profile.restaurant.menu = Some("Margherita, Carbonara".to_string());
        let customer = profile.mode_mut(Mode::Customer);
        customer.bot_name = Some("Mia".to_string());
        customer.tone = Some("friendly".to_string());
        profile
    }

    #[test]
    fn test_default_contains_every_placeholder() {
        for mode in Mode::ALL {
            let prompt = default_prompt(mode);
            for placeholder in Placeholder::ALL {
                assert!(
                    prompt.contains(&placeholder.token()),
                    "{} missing from {} default",
                    placeholder.name(),
                    mode
                );
            }
            assert!(prompt.contains(role_paragraph(mode)));
        }
    }

    #[test]
    fn test_preamble_has_each_placeholder_once() {
        for placeholder in Placeholder::ALL {
            assert_eq!(PREAMBLE.matches(&placeholder.token()).count(), 1);
        }
        assert!(CLOSING.contains("{{tone}}"));
    }

    #[test]
    fn test_role_paragraph_matches_mode() {
        let sales = default_prompt(Mode::Sales);
        assert!(sales.contains("catering requests"));
        assert!(!sales.contains("take reservations"));
        assert!(!sales.contains("kitchen coordination"));
    }

    #[test]
    fn test_resolve_prefers_override() {
        let mut profile = luigis();
        assert_eq!(resolve_prompt(&profile, Mode::Customer), default_prompt(Mode::Customer));

        profile.mode_mut(Mode::Customer).general_prompt = Some("Be brief, {{botName}}.".to_string());
        assert_eq!(resolve_prompt(&profile, Mode::Customer), "Be brief, {{botName}}.");
        assert_eq!(resolve_prompt(&profile, Mode::Sales), default_prompt(Mode::Sales));

        profile.mode_mut(Mode::Customer).general_prompt = Some("  ".to_string());
        assert_eq!(resolve_prompt(&profile, Mode::Customer), default_prompt(Mode::Customer));
    }

    #[test]
    fn test_luigis_substitution() {
        let profile = luigis();
        let prompt = default_prompt(Mode::Customer);

        let applied = substitute_placeholders(&prompt, &profile, Mode::Customer).unwrap();
        assert!(applied.starts_with("You are an AI assistant caller for a restaurant named Luigi's."));
        assert!(applied.contains("Your name is Mia."));
        assert!(applied.contains("Seating Capacity: 40"));
        assert!(applied.contains("Always maintain a friendly tone"));
        assert!(placeholders_in(&applied).is_empty());
    }

    #[test]
    fn test_substitution_is_noop_without_tokens() {
        let profile = UserProfile::default();
        let text = "Greet the caller warmly. Braces { like } these {stay}.";
        assert_eq!(
            substitute_placeholders(text, &profile, Mode::Sales).unwrap(),
            text
        );
    }

    #[test]
    fn test_missing_field_only_when_referenced() {
        let mut profile = luigis();
        profile.restaurant.menu = None;

        let ok = substitute_placeholders("Hi from {{restaurantName}}", &profile, Mode::Customer);
        assert_eq!(ok.unwrap(), "Hi from Luigi's");

        let err = substitute_placeholders("Menu: {{menu}}", &profile, Mode::Customer).unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::MissingField { field: "menu", mode: Mode::Customer }
        ));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut profile = luigis();
        profile.restaurant.name = Some("{{tone}} Bistro".to_string());

        let applied =
            substitute_placeholders("{{restaurantName}} / {{tone}}", &profile, Mode::Customer)
                .unwrap();
        assert_eq!(applied, "{{tone}} Bistro / friendly");
    }

    #[test]
    fn test_unknown_and_unterminated_tokens_kept() {
        let profile = luigis();
        let applied =
            substitute_placeholders("{{specials}} at {{restaurantName}} {{open", &profile, Mode::Customer)
                .unwrap();
        assert_eq!(applied, "{{specials}} at Luigi's {{open");
    }

    #[test]
    fn test_extra_braces_do_not_hide_tokens() {
        let profile = luigis();
        let applied =
            substitute_placeholders("{{{restaurantName}}} and {{ {{tone}}", &profile, Mode::Customer)
                .unwrap();
        assert_eq!(applied, "{Luigi's} and {{ friendly");
        assert_eq!(
            placeholders_in("{{ {{tone}} {{{botName}}}"),
            vec![Placeholder::Tone, Placeholder::BotName]
        );
    }

    #[test]
    fn test_missing_placeholders() {
        let original = "{{botName}} at {{restaurantName}} speaks {{tone}}";
        let edited = "{{botName}} at {{restaurantName}} speaks casually";
        assert_eq!(missing_placeholders(original, edited), vec![Placeholder::Tone]);
        assert!(missing_placeholders(original, original).is_empty());
    }

    #[test]
    fn test_hash_prompt_stable() {
        let first = hash_prompt("test prompt");
        assert_eq!(first, hash_prompt("test prompt"));
        assert_ne!(first, hash_prompt("another prompt"));
        assert_eq!(first.len(), 64);
    }
}
