//! Live preview: renders the document as the HTML page that gets captured for export.

use minijinja::Environment;

use crate::models::Document;

const PREVIEW_TEMPLATE: &str = "preview.html";

/// Holds the compiled preview template. Autoescaping is on (the template name ends in
/// `.html`), so user text can never inject markup into the preview.
pub struct PreviewRenderer {
    env: Environment<'static>,
}

impl PreviewRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(
            PREVIEW_TEMPLATE,
            include_str!("../../templates/preview.html"),
        )?;
        Ok(Self { env })
    }

    pub fn render(&self, doc: &Document) -> Result<String, minijinja::Error> {
        self.env.get_template(PREVIEW_TEMPLATE)?.render(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListKind, PersonalField};

    #[test]
    fn test_renders_sections_in_order() {
        let html = PreviewRenderer::new()
            .unwrap()
            .render(&Document::sample())
            .unwrap();
        let summary = html.find("<h3>Summary</h3>").unwrap();
        let experience = html.find("<h3>Work Experience</h3>").unwrap();
        let education = html.find("<h3>Education</h3>").unwrap();
        let skills = html.find("<h3>Skills</h3>").unwrap();
        assert!(summary < experience && experience < education && education < skills);

        let first = html.find("Tech Solutions Inc.").unwrap();
        let second = html.find("Web Innovators").unwrap();
        assert!(first < second, "entries render in insertion order");
    }

    #[test]
    fn test_blank_document_uses_placeholders() {
        let html = PreviewRenderer::new()
            .unwrap()
            .render(&Document::blank())
            .unwrap();
        assert!(html.contains("Your Name"));
        assert!(html.contains("Your Job Title"));
        assert!(!html.contains("<h3>Skills</h3>"));
    }

    #[test]
    fn test_blank_skill_is_not_rendered() {
        let doc = Document::sample().add_entry(ListKind::Skills);
        assert_eq!(doc.skills.len(), 7);
        let html = PreviewRenderer::new().unwrap().render(&doc).unwrap();
        assert_eq!(html.matches("class=\"skill\"").count(), 6);
        assert!(!html.contains("<span class=\"skill\"></span>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let doc = Document::sample().set_personal_field(PersonalField::Name, "<script>x</script>");
        let html = PreviewRenderer::new().unwrap().render(&doc).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
