//! Cover letter: the second document kind the builder produces.

use serde::{Deserialize, Serialize};

use crate::models::document::ValidationError;

/// Letter layouts offered by the letter builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterTemplate {
    /// Coloured rule under the sender block.
    Modern,
    /// Coloured bar down the left edge of every page.
    Creative,
    /// Serif face and a centred sender block.
    Academic,
    #[default]
    #[serde(other)]
    Professional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetter {
    pub sender_name: String,
    /// Address, phone and e-mail, one per line.
    pub sender_contact: String,
    pub recipient_name: String,
    pub recipient_title: String,
    pub company_name: String,
    pub company_address: String,
    pub position: String,
    /// Printed as given. The client formats it in its own locale.
    pub date: String,
    pub introduction: String,
    pub body: String,
    pub conclusion: String,
    pub template: LetterTemplate,
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

impl CoverLetter {
    /// A letter needs a sender and some content.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.sender_name.trim().is_empty() {
            missing.push("senderName");
        }
        if self.introduction.trim().is_empty() && self.body.trim().is_empty() {
            missing.push("introduction or body");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    pub fn sender_lines(&self) -> Vec<&str> {
        non_blank_lines(&self.sender_contact).collect()
    }

    /// Recipient, title, company and address lines, blanks left out.
    pub fn recipient_lines(&self) -> Vec<&str> {
        [
            &self.recipient_name,
            &self.recipient_title,
            &self.company_name,
            &self.company_address,
        ]
        .into_iter()
        .flat_map(|field| non_blank_lines(field))
        .collect()
    }

    pub fn subject(&self) -> Option<String> {
        let position = self.position.trim();
        (!position.is_empty()).then(|| format!("Objet : Candidature au poste de {position}"))
    }

    pub fn salutation(&self) -> String {
        match self.recipient_name.trim() {
            "" => "Madame, Monsieur,".to_string(),
            name => format!("Madame, Monsieur {name},"),
        }
    }

    pub fn closing(&self) -> String {
        format!(
            "Je vous prie d'agréer, {} l'expression de mes salutations distinguées.",
            self.salutation()
        )
    }

    /// Introduction, body and conclusion split on blank lines, in that order.
    pub fn paragraphs(&self) -> Vec<String> {
        [&self.introduction, &self.body, &self.conclusion]
            .into_iter()
            .flat_map(|part| part.split("\n\n"))
            .map(|paragraph| non_blank_lines(paragraph).collect::<Vec<_>>().join(" "))
            .filter(|paragraph| !paragraph.is_empty())
            .collect()
    }

    pub fn default_filename(&self) -> String {
        match self.sender_name.trim() {
            "" => "Lettre-Motivation.pdf".to_string(),
            name => format!("Lettre-{name}.pdf"),
        }
    }
}
