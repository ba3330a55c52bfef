//! Field selectors for the CV document.
//!
//! Every editable attribute is named by a typed selector rather than a free-form string.
//! The wire names (`jobTitle`, `startDate`, ...) are the names the form posts; `parse`
//! turns them into selectors and reports unknown names instead of guessing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One attribute of `PersonalInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    Name,
    JobTitle,
    Email,
    Phone,
    Address,
    Linkedin,
    Website,
}

/// The three repeated sections of a CV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Experience,
    Education,
    Skills,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Experience => "experience",
            ListKind::Education => "education",
            ListKind::Skills => "skills",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceField {
    Company,
    Role,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EducationField {
    Institution,
    Degree,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillField {
    Name,
}

/// A field of a list entry, tagged by the list it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    Experience(ExperienceField),
    Education(EducationField),
    Skill(SkillField),
}

impl EntryField {
    /// The list this field lives in.
    pub fn list(&self) -> ListKind {
        match self {
            EntryField::Experience(_) => ListKind::Experience,
            EntryField::Education(_) => ListKind::Education,
            EntryField::Skill(_) => ListKind::Skills,
        }
    }

    /// Resolves a form field name within `list`. Returns `None` for names the list
    /// does not have (e.g. `description` on an education entry).
    pub fn parse(list: ListKind, name: &str) -> Option<EntryField> {
        let field = match (list, name) {
            (ListKind::Experience, "company") => EntryField::Experience(ExperienceField::Company),
            (ListKind::Experience, "role") => EntryField::Experience(ExperienceField::Role),
            (ListKind::Experience, "startDate") => {
                EntryField::Experience(ExperienceField::StartDate)
            }
            (ListKind::Experience, "endDate") => EntryField::Experience(ExperienceField::EndDate),
            (ListKind::Experience, "description") => {
                EntryField::Experience(ExperienceField::Description)
            }
            (ListKind::Education, "institution") => {
                EntryField::Education(EducationField::Institution)
            }
            (ListKind::Education, "degree") => EntryField::Education(EducationField::Degree),
            (ListKind::Education, "startDate") => EntryField::Education(EducationField::StartDate),
            (ListKind::Education, "endDate") => EntryField::Education(EducationField::EndDate),
            (ListKind::Skills, "name") => EntryField::Skill(SkillField::Name),
            _ => return None,
        };
        Some(field)
    }
}
