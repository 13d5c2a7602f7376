//! AI domain value objects
//!
//! Provider identities with API-key validation, generation knobs, and the
//! handlebars prompt library shared by every provider.

use crate::domains::ai::errors::AiDomainError;
use handlebars::Handlebars;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

static GEMINI_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^AIza[0-9A-Za-z_-]{30,}$").expect("static key pattern"));
static OPENAI_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sk-(?:proj-)?[A-Za-z0-9_-]{20,}$").expect("static key pattern"));
static ANTHROPIC_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sk-ant-[A-Za-z0-9_-]{20,}$").expect("static key pattern"));

/// Supported AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
}

impl AiProviderKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    /// Checks the key shape at construction time. The rejection error never
    /// carries the key itself.
    pub fn validate_api_key(&self, key: &str) -> Result<(), AiDomainError> {
        let pattern = match self {
            Self::Gemini => &*GEMINI_KEY,
            Self::OpenAi => &*OPENAI_KEY,
            Self::Anthropic => &*ANTHROPIC_KEY,
        };
        if pattern.is_match(key) {
            Ok(())
        } else {
            Err(AiDomainError::InvalidApiKey {
                provider: self.display_name().to_string(),
            })
        }
    }
}

impl fmt::Display for AiProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Voice of the generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Friendly,
    Technical,
    Enthusiastic,
}

impl Tone {
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Professional => "Use a measured, professional voice.",
            Self::Friendly => "Use a warm, approachable voice.",
            Self::Technical => "Be precise and implementation-focused.",
            Self::Enthusiastic => "Be upbeat and celebrate the changes.",
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::Professional
    }
}

/// Who the generated text is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Developers,
    Users,
    Stakeholders,
}

impl Audience {
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Developers => "Write for developers; concrete APIs and behavior changes matter.",
            Self::Users => "Write for end users; focus on visible improvements, avoid jargon.",
            Self::Stakeholders => "Write for stakeholders; emphasize outcomes and impact.",
        }
    }
}

impl Default for Audience {
    fn default() -> Self {
        Self::Developers
    }
}

/// Resilience knobs for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    pub requests_per_minute: u32,
    pub max_attempts: u32,
    pub request_timeout: Duration,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            requests_per_minute: 10,
            max_attempts: 3,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// A system/user prompt pair ready for a chat provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// One commit line as rendered into a prompt
#[derive(Debug, Clone, Serialize)]
pub struct ChangeLine {
    pub commit_type: String,
    pub scope: Option<String>,
    pub subject: String,
    pub breaking: bool,
}

/// Everything the generation templates can reference
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub repository_name: String,
    pub version: String,
    pub previous_version: Option<String>,
    pub release_type: String,
    pub tone_guidance: String,
    pub audience_guidance: String,
    pub changes: Vec<ChangeLine>,
}

impl GenerationRequest {
    pub fn with_voice(mut self, tone: Tone, audience: Audience) -> Self {
        self.tone_guidance = tone.guidance().to_string();
        self.audience_guidance = audience.guidance().to_string();
        self
    }
}

/// The structured classification an AI provider returns for one commit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCommitClassification {
    pub commit_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub is_breaking: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

const NOTES_SYSTEM: &str = "\
You write release documentation for the software project {{repository_name}}. \
{{tone_guidance}} {{audience_guidance}} \
Respond with the document only, no preamble.";

const NOTES_USER: &str = "\
Write release notes for version {{version}}{{#if previous_version}} \
(previous version {{previous_version}}){{/if}}. Release type: {{release_type}}.

Changes:
{{#each changes}}
- {{#if breaking}}[BREAKING] {{/if}}{{commit_type}}{{#if scope}}({{scope}}){{/if}}: {{subject}}
{{/each}}";

const CHANGELOG_USER: &str = "\
Write a Keep-a-Changelog style changelog section for version {{version}}. \
Group entries by change type and list breaking changes first.

Changes:
{{#each changes}}
- {{#if breaking}}[BREAKING] {{/if}}{{commit_type}}{{#if scope}}({{scope}}){{/if}}: {{subject}}
{{/each}}";

const SUMMARY_USER: &str = "\
Summarize the following changes for version {{version}} in at most three sentences.

Changes:
{{#each changes}}
- {{commit_type}}: {{subject}}
{{/each}}";

const MARKETING_USER: &str = "\
Write a short, energetic announcement blurb for version {{version}} of \
{{repository_name}}. One paragraph, no bullet lists.

Highlights:
{{#each changes}}
- {{commit_type}}: {{subject}}
{{/each}}";

const CLASSIFY_SYSTEM: &str = "\
You classify git commits for semantic-release tooling. Respond with a single \
JSON object with the fields commitType, scope, isBreaking, reason, and \
confidence (0.0 to 1.0). No markdown fences, no text outside the JSON.";

const CLASSIFY_USER: &str = "\
Classify this commit.

Commit message:
{{message}}

Unified diff:
{{diff}}";

/// Registered prompt templates
pub struct PromptLibrary {
    registry: Handlebars<'static>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        for (name, template) in [
            ("notes_system", NOTES_SYSTEM),
            ("notes_user", NOTES_USER),
            ("changelog_user", CHANGELOG_USER),
            ("summary_user", SUMMARY_USER),
            ("marketing_user", MARKETING_USER),
            ("classify_user", CLASSIFY_USER),
        ] {
            registry
                .register_template_string(name, template)
                .expect("static prompt template");
        }
        Self { registry }
    }

    fn render(&self, name: &str, request: &GenerationRequest) -> Result<String, AiDomainError> {
        self.registry
            .render(name, request)
            .map_err(|e| AiDomainError::TemplateRender {
                message: e.to_string(),
            })
    }

    fn prompt(&self, user_template: &str, request: &GenerationRequest) -> Result<ChatPrompt, AiDomainError> {
        Ok(ChatPrompt {
            system: self.render("notes_system", request)?,
            user: self.render(user_template, request)?,
        })
    }

    pub fn release_notes(&self, request: &GenerationRequest) -> Result<ChatPrompt, AiDomainError> {
        self.prompt("notes_user", request)
    }

    pub fn changelog(&self, request: &GenerationRequest) -> Result<ChatPrompt, AiDomainError> {
        self.prompt("changelog_user", request)
    }

    pub fn summary(&self, request: &GenerationRequest) -> Result<ChatPrompt, AiDomainError> {
        self.prompt("summary_user", request)
    }

    pub fn marketing(&self, request: &GenerationRequest) -> Result<ChatPrompt, AiDomainError> {
        self.prompt("marketing_user", request)
    }

    pub fn classify(&self, message: &str, diff: &str) -> Result<ChatPrompt, AiDomainError> {
        #[derive(Serialize)]
        struct ClassifyInput<'a> {
            message: &'a str,
            diff: &'a str,
        }
        let user = self
            .registry
            .render("classify_user", &ClassifyInput { message, diff })
            .map_err(|e| AiDomainError::TemplateRender {
                message: e.to_string(),
            })?;
        Ok(ChatPrompt {
            system: CLASSIFY_SYSTEM.to_string(),
            user,
        })
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}
