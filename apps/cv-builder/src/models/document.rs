//! The CV document and its pure update operations.
//!
//! Every operation takes `&self` and returns a new `Document`; nothing mutates in place.
//! The session swaps the whole value on each edit.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::fields::{
    EducationField, EntryField, ExperienceField, ListKind, PersonalField, SkillField,
};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Opaque list-identity key. Generated once per entry and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        EntryId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub id: EntryId,
    pub institution: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub id: EntryId,
    pub name: String,
}

impl ExperienceEntry {
    fn empty() -> Self {
        Self {
            id: EntryId::generate(),
            company: String::new(),
            role: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            description: String::new(),
        }
    }

    fn field_mut(&mut self, field: ExperienceField) -> &mut String {
        match field {
            ExperienceField::Company => &mut self.company,
            ExperienceField::Role => &mut self.role,
            ExperienceField::StartDate => &mut self.start_date,
            ExperienceField::EndDate => &mut self.end_date,
            ExperienceField::Description => &mut self.description,
        }
    }
}

impl EducationEntry {
    fn empty() -> Self {
        Self {
            id: EntryId::generate(),
            institution: String::new(),
            degree: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }

    fn field_mut(&mut self, field: EducationField) -> &mut String {
        match field {
            EducationField::Institution => &mut self.institution,
            EducationField::Degree => &mut self.degree,
            EducationField::StartDate => &mut self.start_date,
            EducationField::EndDate => &mut self.end_date,
        }
    }
}

impl SkillEntry {
    fn empty() -> Self {
        Self {
            id: EntryId::generate(),
            name: String::new(),
        }
    }

    fn field_mut(&mut self, field: SkillField) -> &mut String {
        match field {
            SkillField::Name => &mut self.name,
        }
    }
}

/// The whole CV. One per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub personal: PersonalInfo,
    pub summary: String,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub skills: Vec<SkillEntry>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pure operations
// ────────────────────────────────────────────────────────────────────────────

impl Document {
    /// A document with every field empty and no entries.
    pub fn blank() -> Self {
        Self {
            personal: PersonalInfo::default(),
            summary: String::new(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
        }
    }

    #[must_use]
    pub fn set_personal_field(&self, field: PersonalField, value: &str) -> Document {
        let mut next = self.clone();
        let slot = match field {
            PersonalField::Name => &mut next.personal.name,
            PersonalField::JobTitle => &mut next.personal.job_title,
            PersonalField::Email => &mut next.personal.email,
            PersonalField::Phone => &mut next.personal.phone,
            PersonalField::Address => &mut next.personal.address,
            PersonalField::Linkedin => &mut next.personal.linkedin,
            PersonalField::Website => &mut next.personal.website,
        };
        *slot = value.to_string();
        next
    }

    #[must_use]
    pub fn set_summary(&self, value: &str) -> Document {
        Document {
            summary: value.to_string(),
            ..self.clone()
        }
    }

    /// Replaces one attribute of the entry at `index` in `list`.
    ///
    /// # Panics
    /// If `index` is out of bounds, or `field` does not belong to `list`. Both are caller
    /// bugs; the HTTP surface validates user-supplied indices before calling this.
    #[must_use]
    pub fn set_entry_field(
        &self,
        list: ListKind,
        index: usize,
        field: EntryField,
        value: &str,
    ) -> Document {
        assert_eq!(
            field.list(),
            list,
            "field {field:?} does not belong to the {list} list"
        );
        let mut next = self.clone();
        let len = next.entries_len(list);
        assert!(index < len, "{list} index {index} out of bounds (len {len})");

        let slot = match field {
            EntryField::Experience(f) => next.experience[index].field_mut(f),
            EntryField::Education(f) => next.education[index].field_mut(f),
            EntryField::Skill(f) => next.skills[index].field_mut(f),
        };
        *slot = value.to_string();
        next
    }

    /// Appends an empty entry with a fresh id to the end of `list`.
    #[must_use]
    pub fn add_entry(&self, list: ListKind) -> Document {
        let mut next = self.clone();
        match list {
            ListKind::Experience => next.experience.push(ExperienceEntry::empty()),
            ListKind::Education => next.education.push(EducationEntry::empty()),
            ListKind::Skills => next.skills.push(SkillEntry::empty()),
        }
        next
    }

    /// Removes the entry at `index`; later entries shift left and keep their ids.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[must_use]
    pub fn remove_entry(&self, list: ListKind, index: usize) -> Document {
        let mut next = self.clone();
        let len = next.entries_len(list);
        assert!(index < len, "{list} index {index} out of bounds (len {len})");

        match list {
            ListKind::Experience => {
                next.experience.remove(index);
            }
            ListKind::Education => {
                next.education.remove(index);
            }
            ListKind::Skills => {
                next.skills.remove(index);
            }
        }
        next
    }

    pub fn entries_len(&self, list: ListKind) -> usize {
        match list {
            ListKind::Experience => self.experience.len(),
            ListKind::Education => self.education.len(),
            ListKind::Skills => self.skills.len(),
        }
    }

    pub fn entry_id(&self, list: ListKind, index: usize) -> Option<&EntryId> {
        match list {
            ListKind::Experience => self.experience.get(index).map(|e| &e.id),
            ListKind::Education => self.education.get(index).map(|e| &e.id),
            ListKind::Skills => self.skills.get(index).map(|e| &e.id),
        }
    }

    /// Current position of the entry with `id`, if it still exists.
    pub fn position_of(&self, list: ListKind, id: &EntryId) -> Option<usize> {
        (0..self.entries_len(list)).find(|&i| self.entry_id(list, i) == Some(id))
    }

    /// The sample CV a new session starts with.
    pub fn sample() -> Self {
        Self {
            personal: PersonalInfo {
                name: "Jane Doe".to_string(),
                job_title: "Senior Frontend Engineer".to_string(),
                email: "jane.doe@example.com".to_string(),
                phone: "123-456-7890".to_string(),
                address: "San Francisco, CA".to_string(),
                linkedin: "linkedin.com/in/janedoe".to_string(),
                website: "janedoe.dev".to_string(),
            },
            summary: "Experienced Senior Frontend Engineer with over 8 years of expertise in \
                creating responsive, high-performance web applications using React, TypeScript, \
                and modern JavaScript frameworks. Proven ability to lead projects, mentor junior \
                developers, and collaborate effectively with cross-functional teams to deliver \
                exceptional user experiences."
                .to_string(),
            experience: vec![
                ExperienceEntry {
                    id: EntryId::generate(),
                    company: "Tech Solutions Inc.".to_string(),
                    role: "Senior Frontend Engineer".to_string(),
                    start_date: "Jan 2020".to_string(),
                    end_date: "Present".to_string(),
                    description: "Led the development of a customer-facing analytics dashboard \
                        using React and D3.js, resulting in a 30% increase in user engagement. \
                        Mentored a team of 4 junior developers."
                        .to_string(),
                },
                ExperienceEntry {
                    id: EntryId::generate(),
                    company: "Web Innovators".to_string(),
                    role: "Frontend Developer".to_string(),
                    start_date: "Jun 2016".to_string(),
                    end_date: "Dec 2019".to_string(),
                    description: "Developed and maintained client websites using HTML, CSS, and \
                        JavaScript. Collaborated with designers to implement pixel-perfect user \
                        interfaces."
                        .to_string(),
                },
            ],
            education: vec![EducationEntry {
                id: EntryId::generate(),
                institution: "University of Technology".to_string(),
                degree: "B.S. in Computer Science".to_string(),
                start_date: "Sep 2012".to_string(),
                end_date: "May 2016".to_string(),
            }],
            skills: [
                "React",
                "TypeScript",
                "JavaScript (ES6+)",
                "Tailwind CSS",
                "Node.js",
                "GraphQL",
            ]
            .into_iter()
            .map(|name| SkillEntry {
                id: EntryId::generate(),
                name: name.to_string(),
            })
            .collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
