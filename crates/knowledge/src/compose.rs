//! Conversational response composition.
//!
//! Every random choice draws from a caller-supplied `Rng`, so the same seed
//! always yields the same reply and no random state is shared between requests.

use crate::catalog::{PhraseSubstitution, ResponseCatalog};
use crate::types::Category;
use faqbot_core::{AppError, AppResult};
use handlebars::Handlebars;
use rand::seq::SliceRandom;
use rand::Rng;

/// Collapse every run of whitespace (newlines included) into one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Apply the substitution table in order, each one globally.
///
/// Replacements are literal and case-sensitive; a later rule sees the output
/// of the earlier ones.
pub fn apply_substitutions(text: &str, substitutions: &[PhraseSubstitution]) -> String {
    substitutions
        .iter()
        .filter(|s| !s.from.is_empty())
        .fold(text.to_string(), |acc, s| acc.replace(&s.from, &s.to))
}

/// Lowercase the first character, leaving the rest untouched.
///
/// Text opening with an acronym ("VCB Digibank") is returned unchanged.
pub fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.clone().next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            text.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(chars).collect(),
        (None, _) => String::new(),
    }
}

/// Uniform pick from `items`; "" when there is nothing to pick.
pub fn choose<'a, R: Rng + ?Sized>(items: &'a [String], rng: &mut R) -> &'a str {
    items.choose(rng).map(String::as_str).unwrap_or("")
}

/// Rewrite a stored answer into a conversational reply.
///
/// Layout: greeting, then for categories with templates an intro followed by
/// the answer body with its first letter lowercased, a space and an outro;
/// finally a closing. Greeting and closing may be empty strings.
pub fn compose_natural<R: Rng + ?Sized>(
    answer: &str,
    category: Category,
    catalog: &ResponseCatalog,
    rng: &mut R,
) -> String {
    let body = apply_substitutions(
        &normalize_whitespace(answer),
        &catalog.phrase_substitutions,
    );

    let greeting = choose(&catalog.greetings, rng);

    let composed = match catalog.templates_for(category) {
        Some(templates) => {
            let intro = choose(&templates.intros, rng);
            let outro = choose(&templates.outros, rng);
            let closing = choose(&catalog.closings, rng);
            format!(
                "{}{}{} {}{}",
                greeting,
                intro,
                lowercase_first(&body),
                outro,
                closing
            )
        }
        None => {
            let closing = choose(&catalog.closings, rng);
            format!("{}{}{}", greeting, body, closing)
        }
    };

    composed.trim().to_string()
}

/// Append the runner-up's answer under the catalog's fixed label.
pub fn append_additional_info(primary: &str, label: &str, runner_up_answer: &str) -> String {
    format!("{}\n\n{} {}", primary, label, runner_up_answer)
}

/// Compiled fallback templates, each rendered with the original query.
#[derive(Debug)]
pub struct FallbackTemplates {
    registry: Handlebars<'static>,
    names: Vec<String>,
}

impl FallbackTemplates {
    /// Compile the non-blank templates of the catalog.
    pub fn new(templates: &[String]) -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Replies are plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        let mut names = Vec::new();
        for (i, template) in templates.iter().enumerate() {
            if template.trim().is_empty() {
                continue;
            }
            let name = format!("fallback-{}", i);
            registry
                .register_template_string(&name, template)
                .map_err(|e| {
                    AppError::Template(format!("Failed to register fallback #{}: {}", i, e))
                })?;
            names.push(name);
        }

        if names.is_empty() {
            return Err(AppError::Config(
                "At least one non-empty fallback template is required".to_string(),
            ));
        }

        Ok(Self { registry, names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render one template chosen uniformly at random.
    pub fn render<R: Rng + ?Sized>(&self, query: &str, rng: &mut R) -> AppResult<String> {
        let name = choose(&self.names, rng);
        self.render_named(name, query)
    }

    /// Render every template, in catalog order.
    pub fn render_all(&self, query: &str) -> AppResult<Vec<String>> {
        self.names
            .iter()
            .map(|name| self.render_named(name, query))
            .collect()
    }

    fn render_named(&self, name: &str, query: &str) -> AppResult<String> {
        self.registry
            .render(name, &serde_json::json!({ "query": query }))
            .map_err(|e| AppError::Template(format!("Failed to render {}: {}", name, e)))
    }
}
