use async_trait::async_trait;

use crate::assistant::{AssistantBackend, AssistantError};

const DEFAULT_REPLY: &str =
    "Je ne suis pas sûr de comprendre votre question. Essayez: 'Créer un CV', 'Exporter', 'Compétences'.";

/// Keyword replies that need no external service. Later rules win.
const RULES: &[(&[&str], &str)] = &[
    (
        &["créer", "nouveau"],
        "Pour créer un nouveau CV, utilisez le bouton Créer un CV.",
    ),
    (
        &["compétence", "skill"],
        "Compétences exemples: React, Python, SQL, Gestion de projet.",
    ),
    (
        &["exporter", "export"],
        "Utilisez le bouton Exporter en PDF depuis la carte ou l'aperçu.",
    ),
];

pub fn rule_reply(prompt: &str) -> &'static str {
    let message = prompt.to_lowercase();
    RULES
        .iter()
        .rev()
        .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedBackend;

#[async_trait]
impl AssistantBackend for RuleBasedBackend {
    fn name(&self) -> &'static str {
        "rules"
    }

    async fn reply(&self, prompt: &str) -> Result<String, AssistantError> {
        Ok(rule_reply(prompt).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_replies() {
        assert!(rule_reply("Je veux CRÉER un CV").contains("Créer un CV"));
        assert!(rule_reply("quelles skills ?").contains("React"));
        assert!(rule_reply("export pdf").contains("Exporter en PDF"));
        assert_eq!(rule_reply("bonjour"), DEFAULT_REPLY);
    }

    #[test]
    fn test_export_rule_wins_over_others() {
        assert!(rule_reply("créer puis exporter").contains("Exporter en PDF"));
    }
}
