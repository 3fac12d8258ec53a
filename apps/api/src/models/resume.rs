use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::document::{DocumentModel, Skills, SkillsInput};

/// A read-only sample record served by `/api/resumes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResume {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: String,
    pub category: String,
    pub full_text: String,
    pub html: String,
}

impl SampleResume {
    /// Seeds a document model from the sample. Name and e-mail stay empty; the
    /// builder asks for them before export.
    pub fn to_document(&self) -> DocumentModel {
        DocumentModel {
            title: self.title.clone(),
            summary: self.summary.clone(),
            experience: self.experience.clone(),
            skills: Skills::normalize(SkillsInput::Sequence(self.skills.clone())),
            category: self.category.clone(),
            ..Default::default()
        }
    }
}

/// A document as persisted by the repository: the model plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(flatten)]
    pub document: DocumentModel,
}

fn sample(
    id: &str,
    title: &str,
    summary: &str,
    skills: &[&str],
    experience: &str,
    category: &str,
    ordinal: u8,
) -> SampleResume {
    SampleResume {
        id: id.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        experience: experience.to_string(),
        category: category.to_string(),
        full_text: format!("Sample resume {ordinal} full text"),
        html: String::new(),
    }
}

/// The built-in sample records, in listing order.
pub fn sample_resumes() -> Vec<SampleResume> {
    vec![
        sample(
            "sample-1",
            "Développeur Frontend",
            "Développeur React spécialisé en interfaces performantes.",
            &["React", "TypeScript", "CSS"],
            "3 years",
            "IT",
            1,
        ),
        sample(
            "sample-2",
            "Data Analyst Junior",
            "Analyste de données avec Excel et SQL.",
            &["SQL", "Python", "Tableau"],
            "2 years",
            "Data",
            2,
        ),
        sample(
            "sample-3",
            "Chef de Projet",
            "Gestion de projets IT et coordination d'équipes.",
            &["Gestion", "Agile", "Communication"],
            "5 years",
            "Management",
            3,
        ),
        sample(
            "sample-4",
            "Designer UX",
            "Conception d'interfaces centrées utilisateur.",
            &["Figma", "UX Research", "Prototyping"],
            "4 years",
            "Design",
            4,
        ),
        sample(
            "sample-5",
            "Technicien Réseau",
            "Administration réseaux et support.",
            &["TCP/IP", "Firewall", "Linux"],
            "6 years",
            "IT",
            5,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sample_ids_are_unique() {
        let samples = sample_resumes();
        let mut ids: Vec<&str> = samples.iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), samples.len());
    }

    #[test]
    fn test_sample_serializes_camel_case() {
        let value = serde_json::to_value(&sample_resumes()[0]).unwrap();
        assert_eq!(value["fullText"], "Sample resume 1 full text");
        assert_eq!(value["skills"], json!(["React", "TypeScript", "CSS"]));
    }

    #[test]
    fn test_sample_to_document_keeps_skills_order() {
        let doc = sample_resumes()[1].to_document();
        assert_eq!(doc.skills.as_slice(), &["SQL", "Python", "Tableau"]);
        assert_eq!(doc.category, "Data");
    }

    #[test]
    fn test_stored_document_flattens_model() {
        let value = json!({
            "id": "42",
            "created": "2024-01-15T10:00:00Z",
            "updated": "2024-01-16T10:00:00Z",
            "fullName": "Jean Dupont",
            "skills": "React, Node.js"
        });
        let stored: StoredDocument = serde_json::from_value(value).unwrap();
        assert_eq!(stored.id, "42");
        assert_eq!(stored.document.full_name, "Jean Dupont");
        assert_eq!(stored.document.skills.len(), 2);

        let back = serde_json::to_value(&stored).unwrap();
        assert_eq!(back["fullName"], "Jean Dupont");
        assert_eq!(back["id"], "42");
    }
}
