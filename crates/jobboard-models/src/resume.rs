//! Student resumes built through the resume editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::UserId;

/// Maximum number of skills on one resume.
pub const MAX_SKILLS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Education {
    #[validate(length(min = 1, max = 200))]
    pub institution: String,
    #[validate(length(max = 200))]
    pub degree: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Experience {
    #[validate(length(min = 1, max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

/// A student's resume. One per student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub student_id: UserId,
    pub headline: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of a student's resume.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ResumeUpdate {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub headline: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub summary: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub education: Vec<Education>,
    #[serde(default)]
    #[validate(nested)]
    pub experience: Vec<Experience>,
}

impl ResumeUpdate {
    /// Build the stored resume, trimming and de-duplicating skills.
    pub fn into_resume(self, student_id: UserId) -> Resume {
        let mut skills: Vec<String> = Vec::with_capacity(self.skills.len());
        for skill in self.skills {
            let skill = skill.trim();
            if skill.is_empty() || skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
                continue;
            }
            skills.push(skill.to_string());
        }
        skills.truncate(MAX_SKILLS);

        Resume {
            student_id,
            headline: self.headline.trim().to_string(),
            summary: self.summary.trim().to_string(),
            skills,
            education: self.education,
            experience: self.experience,
            updated_at: Utc::now(),
        }
    }
}
