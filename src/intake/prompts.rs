//! Instruction prompts for question and assignment generation.

/// Ask for `count` numbered interview questions about `tech`, pitched at a
/// candidate with `years` of experience.
pub fn tech_questions_prompt(tech: &str, years: &str, count: u32) -> String {
    format!(
        "You are a senior technical interviewer. \
         Generate {count} technical interview questions to assess a candidate's proficiency in {tech}. \
         The candidate has {years} years of professional experience. \
         Return only the questions, numbered."
    )
}

/// Ask for one short, practical assignment in `category`.
pub fn assignment_prompt(category: &str) -> String {
    format!(
        "You are an expert task designer for technical hiring. \
         Please create one challenging and practical coding or project assignment suitable for \
         evaluating a candidate in {category}. \
         Keep it concise, about 2-3 sentences."
    )
}
