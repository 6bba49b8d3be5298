//! Placeholder templates for the post-game commentary request.
//!
//! A template is parsed once into segments. Named placeholders come from a
//! closed [`Variable`] set and `{{random:a,b,c}}` picks one option per render.
//! Any other `{{...}}` token is kept verbatim so the host can expand its own
//! macros.

use crate::dice::Dice;
use derive_new::new;
use parley_tictactoe::Symbol;
use std::str::FromStr;

/// Commentary request sent after a decided game.
pub const DEFAULT_COMMENTARY_TEMPLATE: &str = "[{{user}} ({{playerSymbol}}) just finished a game \
of Tic-Tac-Toe against {{char}} ({{aiSymbol}}). Outcome: {{outcome}}. \
{{random:React to the result in character,Comment on the game in character,\
Give a short in-character reaction to how it went}}.]";

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const RANDOM_PREFIX: &str = "random:";

/// Named placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum Variable {
    /// The oracle's display name.
    #[strum(serialize = "char")]
    Char,
    /// The human's display name.
    #[strum(serialize = "user")]
    User,
    /// The human's symbol.
    #[strum(serialize = "playerSymbol")]
    PlayerSymbol,
    /// The oracle's symbol.
    #[strum(serialize = "aiSymbol")]
    AiSymbol,
    /// Outcome sentence.
    #[strum(serialize = "outcome")]
    Outcome,
}

/// Values bound to [`Variable`]s for one render.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TemplateContext {
    /// Value of `{{char}}`.
    pub char_name: String,
    /// Value of `{{user}}`.
    pub user_name: String,
    /// Value of `{{playerSymbol}}`.
    pub player_symbol: Symbol,
    /// Value of `{{aiSymbol}}`.
    pub ai_symbol: Symbol,
    /// Value of `{{outcome}}`.
    pub outcome: String,
}

impl TemplateContext {
    fn value(&self, variable: Variable) -> String {
        match variable {
            Variable::Char => self.char_name.clone(),
            Variable::User => self.user_name.clone(),
            Variable::PlayerSymbol => self.player_symbol.to_string(),
            Variable::AiSymbol => self.ai_symbol.to_string(),
            Variable::Outcome => self.outcome.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var(Variable),
    Random(Vec<String>),
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parses `source`. Never fails; malformed tokens stay literal text.
    pub fn parse(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                break;
            };
            text.push_str(&rest[..start]);
            let token = &after_open[..end];

            match Self::classify(token) {
                Some(segment) => {
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(segment);
                }
                None => {
                    text.push_str(OPEN);
                    text.push_str(token);
                    text.push_str(CLOSE);
                }
            }
            rest = &after_open[end + CLOSE.len()..];
        }

        text.push_str(rest);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }
        Self { segments }
    }

    fn classify(token: &str) -> Option<Segment> {
        let token = token.trim();
        if let Some(options) = token.strip_prefix(RANDOM_PREFIX) {
            let options = options.split(',').map(|o| o.trim().to_string()).collect();
            return Some(Segment::Random(options));
        }
        Variable::from_str(token).ok().map(Segment::Var)
    }

    /// Named placeholders used, in order of appearance.
    pub fn variables(&self) -> Vec<Variable> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Var(variable) => Some(*variable),
                _ => None,
            })
            .collect()
    }

    /// Substitutes every placeholder.
    pub fn render(&self, context: &TemplateContext, dice: &Dice) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var(variable) => out.push_str(&context.value(*variable)),
                Segment::Random(options) => {
                    if let Some(choice) = dice.choose(options) {
                        out.push_str(choice);
                    }
                }
            }
        }
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::parse(DEFAULT_COMMENTARY_TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TemplateContext {
        TemplateContext::new(
            "Seraphina".to_string(),
            "Alex".to_string(),
            Symbol::X,
            Symbol::O,
            "Alex wins".to_string(),
        )
    }

    #[test]
    fn substitutes_named_placeholders() {
        let template = Template::parse(
            "{{user}} ({{playerSymbol}}) vs {{char}} ({{aiSymbol}}): {{outcome}}",
        );
        assert_eq!(
            template.render(&context(), &Dice::seeded(0)),
            "Alex (X) vs Seraphina (O): Alex wins"
        );
        assert_eq!(
            template.variables(),
            vec![
                Variable::User,
                Variable::PlayerSymbol,
                Variable::Char,
                Variable::AiSymbol,
                Variable::Outcome
            ]
        );
    }

    #[test]
    fn random_picks_one_option() {
        let template = Template::parse("{{random:gloat, sulk ,shrug}}!");
        let dice = Dice::seeded(11);
        for _ in 0..20 {
            let out = template.render(&context(), &dice);
            assert!(
                ["gloat!", "sulk!", "shrug!"].contains(&out.as_str()),
                "unexpected {out}"
            );
        }
    }

    #[test]
    fn unknown_tokens_pass_through() {
        let template = Template::parse("Hi {{persona}} and {{user}}");
        assert_eq!(
            template.render(&context(), &Dice::seeded(0)),
            "Hi {{persona}} and Alex"
        );
    }

    #[test]
    fn unterminated_token_is_literal() {
        let template = Template::parse("score {{user");
        assert_eq!(template.render(&context(), &Dice::seeded(0)), "score {{user");
        assert!(template.variables().is_empty());
    }

    #[test]
    fn names_are_case_insensitive() {
        let template = Template::parse("{{USER}}/{{PlayerSymbol}}");
        assert_eq!(template.render(&context(), &Dice::seeded(0)), "Alex/X");
    }

    #[test]
    fn default_template_uses_every_variable() {
        let out = Template::default().render(&context(), &Dice::seeded(5));
        assert!(out.starts_with("[Alex (X) just finished a game of Tic-Tac-Toe against Seraphina (O)."));
        assert!(out.contains("Outcome: Alex wins."));
        assert!(!out.contains("{{"));
    }
}
