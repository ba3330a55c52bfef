//! Prompt builders for the draftable fields.

use crate::models::Document;

/// Prompt for the professional summary. The whole CV is embedded as JSON context.
pub fn summary_prompt(doc: &Document) -> String {
    let cv_json = serde_json::to_string(doc).unwrap_or_default();
    format!("Based on this CV data: {cv_json}, write a professional summary of 2-4 sentences.")
}

/// Prompt for one experience entry's description.
pub fn experience_prompt(role: &str, company: &str) -> String {
    format!(
        "Write 2-3 bullet points for a CV describing the role of a {role} at {company}. \
         Focus on quantifiable achievements."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompt_embeds_document() {
        let doc = Document::sample();
        let prompt = summary_prompt(&doc);
        assert!(prompt.starts_with("Based on this CV data: {"));
        assert!(prompt.contains("\"jobTitle\":\"Senior Frontend Engineer\""));
        assert!(prompt.ends_with("write a professional summary of 2-4 sentences."));
    }

    #[test]
    fn test_experience_prompt_names_role_and_company() {
        let prompt = experience_prompt("Frontend Developer", "Web Innovators");
        assert!(prompt.contains("role of a Frontend Developer at Web Innovators"));
        assert!(prompt.contains("quantifiable achievements"));
    }
}
