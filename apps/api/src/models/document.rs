//! Document model: one resume as edited in the builder, plus its presentation choices.
//!
//! The model is owned by the caller. Export code only ever borrows it and never
//! writes back into it.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::letter::{CoverLetter, LetterTemplate};

// ────────────────────────────────────────────────────────────────────────────
// Colours and themes
// ────────────────────────────────────────────────────────────────────────────

/// An opaque RGB colour, 0–255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const FOOTER_GREY: Rgb = Rgb(150, 150, 150);

    /// `#rrggbb` form, used by the HTML serializers.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Channel values scaled to 0.0–1.0, as PDF colour operators expect.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
        ]
    }
}

/// The primary / secondary / light triad a colour scheme resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub light: Rgb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Green,
    Purple,
    Dark,
    Red,
    Orange,
    /// Also stands in for any scheme name the picker no longer offers.
    #[default]
    #[serde(other)]
    Blue,
}

impl ColorScheme {
    pub fn theme(self) -> Theme {
        let (primary, secondary, light) = match self {
            ColorScheme::Blue => (Rgb(52, 152, 219), Rgb(41, 128, 185), Rgb(236, 240, 241)),
            ColorScheme::Green => (Rgb(39, 174, 96), Rgb(33, 150, 83), Rgb(213, 244, 230)),
            ColorScheme::Purple => (Rgb(155, 89, 182), Rgb(142, 68, 173), Rgb(244, 236, 247)),
            ColorScheme::Dark => (Rgb(44, 62, 80), Rgb(26, 37, 47), Rgb(189, 195, 199)),
            ColorScheme::Red => (Rgb(231, 76, 60), Rgb(192, 57, 43), Rgb(250, 219, 216)),
            ColorScheme::Orange => (Rgb(230, 126, 34), Rgb(211, 84, 0), Rgb(253, 235, 208)),
        };
        Theme {
            primary,
            secondary,
            light,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Presentation selectors
// ────────────────────────────────────────────────────────────────────────────

/// Layout variants offered by the template picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Classic,
    Creative,
    Minimal,
    Executive,
    Tech,
    #[default]
    #[serde(other)]
    Modern,
}

impl Template {
    /// Whether the template draws the coloured header band behind name and title.
    pub fn has_header_band(self) -> bool {
        !matches!(self, Template::Minimal | Template::Classic)
    }

    /// Creative and tech put the short list sections in a left sidebar.
    pub fn is_two_column(self) -> bool {
        matches!(self, Template::Creative | Template::Tech)
    }
}

/// Font families offered by the font picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontChoice {
    Georgia,
    Helvetica,
    Times,
    Calibri,
    Roboto,
    #[default]
    #[serde(other)]
    Arial,
}

impl FontChoice {
    /// CSS `font-family` stack used by the preview HTML.
    pub fn css_family(self) -> &'static str {
        match self {
            FontChoice::Arial => "Arial, sans-serif",
            FontChoice::Georgia => "Georgia, serif",
            FontChoice::Helvetica => "Helvetica, Arial, sans-serif",
            FontChoice::Times => "'Times New Roman', serif",
            FontChoice::Calibri => "Calibri, sans-serif",
            FontChoice::Roboto => "Roboto, sans-serif",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// Skills as the client sends them: either one delimited string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillsInput {
    Sequence(Vec<String>),
    Delimited(String),
}

const SKILL_DELIMITERS: &[char] = &[',', ';', '\n'];

/// Canonical skills list: ordered, trimmed, no empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SkillsInput", into = "Vec<String>")]
pub struct Skills(Vec<String>);

impl Skills {
    pub fn normalize(input: SkillsInput) -> Self {
        let items = match input {
            SkillsInput::Delimited(text) => text
                .split(SKILL_DELIMITERS)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            SkillsInput::Sequence(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        Skills(items)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<SkillsInput> for Skills {
    fn from(input: SkillsInput) -> Self {
        Skills::normalize(input)
    }
}

impl From<Skills> for Vec<String> {
    fn from(skills: Skills) -> Self {
        skills.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profile photo
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum PhotoError {
    #[error("profile photo must be a base64 data URL")]
    NotADataUrl,
    #[error("profile photo payload is not valid base64: {0}")]
    InvalidBase64(String),
}

/// Encoded image bytes (PNG or JPEG). Travels over JSON as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfilePhoto {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ProfilePhoto {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl TryFrom<String> for ProfilePhoto {
    type Error = PhotoError;

    fn try_from(url: String) -> Result<Self, Self::Error> {
        let rest = url.strip_prefix("data:").ok_or(PhotoError::NotADataUrl)?;
        let (header, payload) = rest.split_once(',').ok_or(PhotoError::NotADataUrl)?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or(PhotoError::NotADataUrl)?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| PhotoError::InvalidBase64(e.to_string()))?;
        Ok(ProfilePhoto {
            mime: mime.to_string(),
            bytes,
        })
    }
}

impl From<ProfilePhoto> for String {
    fn from(photo: ProfilePhoto) -> Self {
        photo.to_data_url()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Body sections in the order they are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
    Interests,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
        SectionKind::Certifications,
        SectionKind::Languages,
        SectionKind::Interests,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            SectionKind::Summary => "PROFILE",
            SectionKind::Experience => "EXPERIENCE",
            SectionKind::Education => "EDUCATION",
            SectionKind::Skills => "SKILLS",
            SectionKind::Projects => "PROJECTS",
            SectionKind::Certifications => "CERTIFICATIONS",
            SectionKind::Languages => "LANGUAGES",
            SectionKind::Interests => "INTERESTS",
        }
    }

    /// Sections that move to the sidebar in two-column templates.
    pub fn is_sidebar(self) -> bool {
        matches!(
            self,
            SectionKind::Skills
                | SectionKind::Certifications
                | SectionKind::Languages
                | SectionKind::Interests
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("nothing to export: no document and no visual surface")]
    EmptySource,
}

/// What the builder produced: a resume or a cover letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Resume,
    Letter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentModel {
    pub kind: DocumentKind,
    pub title: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub summary: String,
    pub experience: String,
    pub education: String,
    pub skills: Skills,
    pub projects: String,
    pub certifications: String,
    pub languages: String,
    pub interests: String,
    pub category: String,
    pub profile_photo: Option<ProfilePhoto>,
    pub template: Template,
    pub color_scheme: ColorScheme,
    pub font: FontChoice,
    /// Letter content, read when `kind` is `letter`. The colour scheme and
    /// font above still apply.
    pub letter: CoverLetter,
}

impl DocumentModel {
    /// Fields the builder refuses to export without.
    pub fn validate_for_export(&self) -> Result<(), ValidationError> {
        if self.kind == DocumentKind::Letter {
            return self.letter.validate();
        }
        let required = [
            ("title", &self.title),
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("summary", &self.summary),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    pub fn theme(&self) -> Theme {
        self.color_scheme.theme()
    }

    pub fn is_letter(&self) -> bool {
        self.kind == DocumentKind::Letter
    }

    /// The person the document is about: resume owner or letter sender.
    pub fn author_name(&self) -> &str {
        match self.kind {
            DocumentKind::Resume => &self.full_name,
            DocumentKind::Letter => &self.letter.sender_name,
        }
    }

    /// Face used for layout. Academic letters are always set in a serif.
    pub fn font_choice(&self) -> FontChoice {
        match self.kind {
            DocumentKind::Letter if self.letter.template == LetterTemplate::Academic => {
                FontChoice::Times
            }
            _ => self.font,
        }
    }

    /// Download name when the client gives none.
    pub fn default_filename(&self) -> String {
        match self.kind {
            DocumentKind::Resume => "cv.pdf".to_string(),
            DocumentKind::Letter => self.letter.default_filename(),
        }
    }

    /// Non-empty contact details, in display order.
    pub fn contact_pieces(&self) -> Vec<&str> {
        [
            &self.phone,
            &self.email,
            &self.city,
            &self.linkedin,
            &self.github,
            &self.portfolio,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
    }

    /// Free text of a body section. Skills are a list and return `None`.
    pub fn section_text(&self, kind: SectionKind) -> Option<&str> {
        let text = match kind {
            SectionKind::Summary => &self.summary,
            SectionKind::Experience => &self.experience,
            SectionKind::Education => &self.education,
            SectionKind::Projects => &self.projects,
            SectionKind::Certifications => &self.certifications,
            SectionKind::Languages => &self.languages,
            SectionKind::Interests => &self.interests,
            SectionKind::Skills => return None,
        };
        Some(text.as_str())
    }

    /// Whether a section has anything to show.
    pub fn has_section(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Skills => !self.skills.is_empty(),
            other => self
                .section_text(other)
                .is_some_and(|text| !text.trim().is_empty()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
