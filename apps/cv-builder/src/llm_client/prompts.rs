// Shared prompt constants for every drafting call.
// Per-field prompt builders live in generation/prompts.rs.

/// System instruction sent with every drafting request.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional resume writer. \
    Your responses should be concise, professional, and tailored for a CV. \
    Use action verbs and focus on achievements.";

pub const TEMPERATURE: f32 = 0.7;
