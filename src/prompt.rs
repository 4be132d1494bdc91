//! Prompt composition: the standard template, caller-supplied custom
//! prompts, and the personalization builder (reading level, interests,
//! age group).

use crate::core::models::FeedbackKind;
use crate::errors::GatewayError;

/// Standard prompt for document summarization.
pub const STANDARD_PROMPT: &str = "Analyze this document and provide a clear, comprehensive summary that highlights the main points, key findings, and important details. Structure the summary in a well-organized format using markdown.";

/// Output budget for personalized summaries, which run longer and are
/// more structured than generic ones.
pub const PERSONALIZED_MAX_OUTPUT_TOKENS: usize = 1500;
pub const STANDARD_MAX_OUTPUT_TOKENS: usize = 1000;

/// Personalized requests use a lower temperature so the structured
/// sections vary less run to run.
pub const PERSONALIZED_TEMPERATURE: f32 = 0.5;
pub const STANDARD_TEMPERATURE: f32 = 0.7;

/// List of disallowed patterns in custom prompts (prompt injection protection)
pub const DISALLOWED_PATTERNS: [&str; 4] = ["system:", "assistant:", "user:", "{{"];

/// Maximum length allowed for caller-supplied custom prompts
pub const MAX_CUSTOM_PROMPT_LENGTH: usize = 800;

/// Audience knowledge level a personalized summary is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingLevel {
    Basic,
    Intermediate,
    Advanced,
}

impl ReadingLevel {
    /// Parse a caller-supplied level. Unrecognized or absent input falls
    /// back to intermediate.
    pub fn parse(level: Option<&str>) -> Self {
        match level.map(str::trim) {
            Some(l) if l.eq_ignore_ascii_case("basic") => ReadingLevel::Basic,
            Some(l) if l.eq_ignore_ascii_case("advanced") => ReadingLevel::Advanced,
            _ => ReadingLevel::Intermediate,
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            ReadingLevel::Basic => {
                "You are an insurance expert creating a PERSONALIZED summary for someone with BASIC insurance knowledge.\n\n\
                Analyze this document and provide a clear, simple summary that:\n\
                - Uses straightforward language and avoids jargon completely\n\
                - Explains ALL insurance terms in simple, everyday words\n\
                - Focuses on the most important coverage details and exclusions\n\
                - Highlights practical implications for the policyholder with real-world examples\n\
                - Uses short sentences and paragraphs (no more than 2-3 sentences per paragraph)\n\
                - Includes bullet points for key information\n\
                - Uses analogies or comparisons to explain complex concepts\n\n\
                Your summary should be well-organized with clear headings and subheadings in markdown format.\n\
                Remember that the reader has minimal insurance knowledge, so make everything as accessible as possible."
            }
            ReadingLevel::Intermediate => {
                "You are an insurance expert creating a PERSONALIZED summary for someone with INTERMEDIATE insurance knowledge.\n\n\
                Analyze this document and provide a comprehensive summary that:\n\
                - Balances technical accuracy with accessibility\n\
                - Uses proper insurance terminology but explains more complex or uncommon terms\n\
                - Covers important details about coverage, exclusions, and conditions\n\
                - Highlights practical implications and considerations with relevant examples\n\
                - Organizes information in a logical flow with clear transitions\n\
                - Uses a mix of paragraphs and bullet points for readability\n\
                - Includes enough detail for informed decision-making\n\n\
                Your summary should be well-organized with clear headings and subheadings in markdown format.\n\
                Remember that the reader has moderate insurance knowledge but will benefit from some explanations of more complex concepts."
            }
            ReadingLevel::Advanced => {
                "You are an insurance expert creating a PERSONALIZED summary for someone with ADVANCED insurance knowledge.\n\n\
                Analyze this document and provide a detailed, technical summary that:\n\
                - Uses proper insurance terminology and industry-standard language throughout\n\
                - Provides in-depth analysis of coverage details, exclusions, and conditions\n\
                - Includes nuanced interpretations of policy provisions and their implications\n\
                - References relevant insurance principles or regulations when applicable\n\
                - Maintains a professional, technical tone appropriate for industry professionals\n\
                - Highlights unusual or noteworthy provisions that differ from standard policies\n\n\
                Your summary should be well-organized with clear headings and subheadings in markdown format.\n\
                Remember that the reader has extensive insurance knowledge and expects a technically precise and comprehensive analysis."
            }
        }
    }
}

/// Fixed registry of recognized customer interests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    CoverageDetails,
    CostSavings,
    ClaimProcess,
    PolicyExclusions,
    LegalRequirements,
    BenefitsComparison,
    RiskAssessment,
    PremiumCalculation,
}

impl Interest {
    pub const ALL: [Interest; 8] = [
        Interest::CoverageDetails,
        Interest::CostSavings,
        Interest::ClaimProcess,
        Interest::PolicyExclusions,
        Interest::LegalRequirements,
        Interest::BenefitsComparison,
        Interest::RiskAssessment,
        Interest::PremiumCalculation,
    ];

    /// Look up an interest by its registry code. Unknown codes yield
    /// `None` and are silently ignored by the builder.
    pub fn from_code(code: &str) -> Option<Interest> {
        Interest::ALL
            .into_iter()
            .find(|interest| interest.code() == code.trim())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Interest::CoverageDetails => "coverage_details",
            Interest::CostSavings => "cost_savings",
            Interest::ClaimProcess => "claim_process",
            Interest::PolicyExclusions => "policy_exclusions",
            Interest::LegalRequirements => "legal_requirements",
            Interest::BenefitsComparison => "benefits_comparison",
            Interest::RiskAssessment => "risk_assessment",
            Interest::PremiumCalculation => "premium_calculation",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Interest::CoverageDetails => "Coverage Details",
            Interest::CostSavings => "Cost Savings",
            Interest::ClaimProcess => "Claim Process",
            Interest::PolicyExclusions => "Policy Exclusions",
            Interest::LegalRequirements => "Legal Requirements",
            Interest::BenefitsComparison => "Benefits Comparison",
            Interest::RiskAssessment => "Risk Assessment",
            Interest::PremiumCalculation => "Premium Calculation",
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Interest::CoverageDetails => "For COVERAGE DETAILS: Create a dedicated section that thoroughly explains what is covered under the policy. List all covered items, situations, and conditions. Use bullet points or tables to clearly present coverage limits, deductibles, and special provisions. Highlight any unique or exceptional coverage features.",
            Interest::CostSavings => "For COST SAVINGS: Create a dedicated section that identifies all possible ways to save money with this policy. Include information about discounts, loyalty programs, bundling options, and premium reduction strategies. Explain how deductible choices affect premiums. Highlight any special offers or time-limited savings opportunities mentioned in the document.",
            Interest::ClaimProcess => "For CLAIM PROCESS: Create a dedicated section that provides a step-by-step explanation of how to file a claim. Include required documentation, reporting timeframes, contact information, and what to expect during the claims review process. Note any special claim requirements or exceptions.",
            Interest::PolicyExclusions => "For POLICY EXCLUSIONS: Create a dedicated section that clearly lists and explains ALL exclusions and limitations in the policy. Group similar exclusions together and explain the rationale behind key exclusions when possible. Highlight particularly important or commonly misunderstood exclusions.",
            Interest::LegalRequirements => "For LEGAL REQUIREMENTS: Create a dedicated section that outlines all legal and regulatory aspects of the policy. Include information about required disclosures, state-specific regulations, compliance requirements, and any legal obligations of the policyholder.",
            Interest::BenefitsComparison => "For BENEFITS COMPARISON: Create a dedicated section that compares the benefits of this policy to industry standards or other common policies in this category. Highlight where this policy exceeds typical coverage and note any areas where coverage might be less comprehensive than alternatives.",
            Interest::RiskAssessment => "For RISK ASSESSMENT: Create a dedicated section that explains how risks are evaluated and managed under this policy. Include information about risk factors that affect coverage or premiums, and how the policy addresses different levels of risk.",
            Interest::PremiumCalculation => "For PREMIUM CALCULATION: Create a dedicated section that details all factors that influence how premiums are calculated. Include information about rating factors, premium adjustment mechanisms, and how changes in circumstances might affect future premiums.",
        }
    }
}

/// Composed instruction text plus sampling parameters for one backend
/// request. The variant decides output budget and temperature; nothing is
/// inferred from marker substrings in the prompt text.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptSpec {
    Standard,
    Custom(String),
    Personalized {
        reading_level: ReadingLevel,
        interests: Vec<Interest>,
        age_group: Option<String>,
    },
}

impl PromptSpec {
    /// Build the spec for an upload request. Personalization wins over a
    /// custom prompt when either a reading level or interests were
    /// supplied; unknown interest codes are dropped without error.
    /// Over-length or injection-bearing custom prompts are rejected.
    pub fn from_request(
        custom_prompt: Option<&str>,
        reading_level: Option<&str>,
        interests: &[String],
        age_group: Option<&str>,
    ) -> Result<PromptSpec, GatewayError> {
        if reading_level.is_none() && interests.is_empty() {
            return match custom_prompt {
                Some(custom) if !custom.trim().is_empty() => {
                    let sanitized =
                        sanitize_custom_prompt(custom).map_err(GatewayError::Prompt)?;
                    Ok(PromptSpec::Custom(sanitized))
                }
                _ => Ok(PromptSpec::Standard),
            };
        }

        let matched = interests
            .iter()
            .filter_map(|code| Interest::from_code(code))
            .collect();

        Ok(PromptSpec::Personalized {
            reading_level: ReadingLevel::parse(reading_level),
            interests: matched,
            age_group: age_group
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        })
    }

    pub fn is_personalized(&self) -> bool {
        matches!(self, PromptSpec::Personalized { .. })
    }

    pub fn system_prompt(&self) -> String {
        match self {
            PromptSpec::Standard => STANDARD_PROMPT.to_string(),
            PromptSpec::Custom(custom) => custom.clone(),
            PromptSpec::Personalized {
                reading_level,
                interests,
                age_group,
            } => {
                let mut prompt = reading_level.template().to_string();

                if !interests.is_empty() {
                    let names = interests
                        .iter()
                        .map(|i| i.display_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    prompt.push_str(&format!(
                        "\n\n### IMPORTANT: This user is specifically interested in: {names}."
                    ));
                    prompt.push_str(
                        "\nYou MUST prioritize these topics in your summary and provide detailed information about them.",
                    );
                    prompt.push_str(
                        "\nMake sure each of these interest areas is addressed with its own section in the summary.",
                    );
                    prompt.push_str(
                        "\n\n### For each interest area, follow these specific instructions:\n",
                    );
                    prompt.push_str(
                        &interests
                            .iter()
                            .map(|i| i.instruction())
                            .collect::<Vec<_>>()
                            .join("\n"),
                    );
                }

                if let Some(age) = age_group {
                    prompt.push_str(&format!(
                        "\n\n### This summary is for someone in the {age} age group. Adjust your explanation accordingly."
                    ));
                }

                if !interests.is_empty() {
                    prompt.push_str(
                        "\n\n### FINAL INSTRUCTION: Review your summary before submitting to ensure you've adequately addressed ALL the user's specified interests. If any interest area isn't thoroughly covered, expand that section.",
                    );
                }

                prompt.push_str(
                    "\n\n### If the document is large and has been split into sections, make sure to create a cohesive summary that covers all important aspects from all sections.",
                );

                prompt
            }
        }
    }

    pub fn max_output_tokens(&self) -> usize {
        if self.is_personalized() {
            PERSONALIZED_MAX_OUTPUT_TOKENS
        } else {
            STANDARD_MAX_OUTPUT_TOKENS
        }
    }

    pub fn temperature(&self) -> f32 {
        if self.is_personalized() {
            PERSONALIZED_TEMPERATURE
        } else {
            STANDARD_TEMPERATURE
        }
    }

    /// Identity of this prompt for cache keying: the composed instruction
    /// text, so distinct personalizations never collide.
    pub fn signature(&self) -> String {
        self.system_prompt()
    }
}

/// Chunk-level prompt carrying the positional marker for part `index`
/// (zero-based) of `total`.
pub fn chunk_prompt(base: &str, index: usize, total: usize) -> String {
    format!(
        "{base}\n\nThis is part {} of {} of a larger document. Focus on extracting the key information from this section.",
        index + 1,
        total
    )
}

/// Prompt for the final integration pass over per-section summaries.
pub fn integration_prompt(base: &str) -> String {
    format!(
        "{base}\n\nBelow are summaries of different sections of a document. Create a cohesive, complete summary that integrates all the information."
    )
}

fn generic_guidance(kind: FeedbackKind) -> &'static str {
    match kind {
        FeedbackKind::Unclear => {
            "The previous summary was unclear. Please provide a clearer, better structured summary that is easier to understand."
        }
        FeedbackKind::Inaccurate => {
            "The previous summary contained inaccuracies. Please provide a more accurate summary strictly based on the document content."
        }
        FeedbackKind::NeedsImprovement => {
            "Taking into account the user's specific feedback, please improve the summary by addressing the mentioned concerns while maintaining the strong points of the original."
        }
    }
}

/// System prompt for feedback-driven refinement. Free-text feedback is
/// embedded verbatim; without it the kind's generic guidance is used.
pub fn refinement_prompt(kind: FeedbackKind, feedback_text: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an expert document summarizer tasked with improving a summary based on user feedback.",
    );
    prompt.push_str(&format!(
        "\n\nThe user indicated that the summary was {}.",
        kind.as_str()
    ));

    match feedback_text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => {
            prompt.push_str(&format!("\n\nSpecific feedback from the user: \"{text}\""));
        }
        None => {
            prompt.push_str(&format!("\n\nGeneral guidance: {}", generic_guidance(kind)));
        }
    }

    prompt.push_str(
        "\n\nPlease provide a revised summary that addresses these concerns while maintaining accuracy and clarity.",
    );
    prompt
}

/// Sanitizes a custom prompt to prevent prompt injection attacks
/// Returns a Result with either the sanitized prompt or an error message
pub fn sanitize_custom_prompt(prompt: &str) -> Result<String, String> {
    if prompt.len() > MAX_CUSTOM_PROMPT_LENGTH {
        return Err(format!(
            "Custom prompt exceeds maximum length of {} characters",
            MAX_CUSTOM_PROMPT_LENGTH
        ));
    }

    for pattern in DISALLOWED_PATTERNS.iter() {
        if prompt.to_lowercase().contains(&pattern.to_lowercase()) {
            return Err(format!(
                "Custom prompt contains disallowed pattern: {}",
                pattern
            ));
        }
    }

    let sanitized = prompt
        .chars()
        .filter(|&c| !c.is_control())
        .collect::<String>();

    Ok(sanitized)
}
