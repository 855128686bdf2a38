//! Compliance evaluation of reviews against the rule catalog.
//!
//! [`evaluate_rules`] is a pure function: the same review and rules always
//! produce the same checks, one per rule, in rule order. [`ComplianceEvaluator`]
//! pairs it with a [`RuleCatalog`] so callers evaluate against whatever rules
//! are currently in force.

use crate::domain::{ChangeType, ComplianceCheck, Review, Rule, RulePredicate, TextField};
use crate::error::Result;
use crate::storage::RuleCatalog;
use std::sync::Arc;

/// Deployment description phrases that count as a multi-site declaration.
///
/// Only consulted by `multi_site_deployment` rules with `min_sites <= 2`;
/// prose can claim redundancy but not a specific site count above two.
pub const MULTI_SITE_KEYWORDS: &[&str] = &["multi-site", "active-active", "dual data center"];

/// Highest `min_sites` a multi-site keyword can satisfy.
const KEYWORD_SITE_EQUIVALENT: usize = 2;

/// Evaluates reviews against the rules currently in the catalog.
#[derive(Clone)]
pub struct ComplianceEvaluator {
    rules: Arc<dyn RuleCatalog>,
}

impl ComplianceEvaluator {
    /// Create an evaluator reading rules from `rules`.
    pub fn new(rules: Arc<dyn RuleCatalog>) -> Self {
        Self { rules }
    }

    /// Evaluate `review` against every active rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if any rule has unusable predicate
    /// parameters, or a storage error if the catalog cannot be read.
    pub async fn evaluate(&self, review: &Review) -> Result<Vec<ComplianceCheck>> {
        let rules = self.rules.list_active_rules().await?;
        evaluate_rules(review, &rules)
    }
}

/// Evaluate `review` against `rules`, producing one check per rule in order.
///
/// The check set is all or nothing: a single invalid rule fails the whole
/// evaluation rather than yielding a partial set.
///
/// # Errors
///
/// Returns `Error::Validation` naming the first invalid rule.
pub fn evaluate_rules(review: &Review, rules: &[Rule]) -> Result<Vec<ComplianceCheck>> {
    rules
        .iter()
        .map(|rule| {
            rule.validate()?;
            let (passed, message) = evaluate_predicate(review, &rule.evaluation_hint);
            Ok(ComplianceCheck {
                rule_id: rule.id.clone(),
                passed,
                severity: rule.severity,
                message,
            })
        })
        .collect()
}

/// True when any check is a failed CRITICAL check.
#[must_use]
pub fn has_critical_failure(checks: &[ComplianceCheck]) -> bool {
    checks.iter().any(ComplianceCheck::is_critical_failure)
}

fn evaluate_predicate(review: &Review, predicate: &RulePredicate) -> (bool, String) {
    match predicate {
        RulePredicate::MultiSiteDeployment { min_sites } => multi_site(review, *min_sites),
        RulePredicate::DescriptionMentions { field, keywords } => {
            mentions(review, *field, keywords)
        }
        RulePredicate::ExcludesTechnologies { deprecated } => excludes(review, deprecated),
        RulePredicate::RollbackPlanDeclared => rollback_plan(review),
        RulePredicate::TargetLevelAtMost { level } => {
            if review.target_level <= *level {
                (
                    true,
                    format!("target level {} is within level {level}", review.target_level),
                )
            } else {
                (
                    false,
                    format!(
                        "target level {} exceeds the permitted level {level}",
                        review.target_level
                    ),
                )
            }
        }
    }
}

fn multi_site(review: &Review, min_sites: usize) -> (bool, String) {
    let deployment = review.attributes.deployment();
    let count = deployment.site_count();
    if count >= min_sites {
        return (
            true,
            format!("deployment declares {count} distinct sites (minimum {min_sites})"),
        );
    }

    if min_sites <= KEYWORD_SITE_EQUIVALENT {
        let description = deployment.description.to_lowercase();
        if let Some(keyword) = MULTI_SITE_KEYWORDS
            .iter()
            .find(|k| description.contains(*k))
        {
            return (
                true,
                format!("deployment description declares a {keyword} topology"),
            );
        }
    }

    (
        false,
        format!("deployment declares {count} distinct sites, at least {min_sites} required"),
    )
}

fn mentions(review: &Review, field: TextField, keywords: &[String]) -> (bool, String) {
    let Some(text) = review.text_field(field) else {
        return (false, format!("{field} is not declared"));
    };
    let text = text.to_lowercase();
    match keywords
        .iter()
        .find(|k| text.contains(&k.trim().to_lowercase()))
    {
        Some(keyword) => (true, format!("{field} mentions '{}'", keyword.trim())),
        None => (
            false,
            format!("{field} does not mention any of: {}", keywords.join(", ")),
        ),
    }
}

fn excludes(review: &Review, deprecated: &[String]) -> (bool, String) {
    let tech_stack = review.attributes.tech_stack();
    let components: Vec<String> = tech_stack
        .components
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    let description = tech_stack.description.to_lowercase();

    let found: Vec<&str> = deprecated
        .iter()
        .map(|d| d.trim())
        .filter(|d| {
            let needle = d.to_lowercase();
            components.iter().any(|c| *c == needle) || description.contains(&needle)
        })
        .collect();

    if found.is_empty() {
        (true, "no deprecated technologies declared".to_string())
    } else {
        (
            false,
            format!("tech stack uses deprecated technology: {}", found.join(", ")),
        )
    }
}

fn rollback_plan(review: &Review) -> (bool, String) {
    match review.change_type {
        ChangeType::NewBuild => {
            (true, "not applicable to NEW_BUILD reviews".to_string())
        }
        ChangeType::Change => match review.attributes.rollback_plan() {
            Some(plan) if !plan.trim().is_empty() => (true, "rollback plan declared".to_string()),
            _ => (false, "CHANGE review has no rollback plan".to_string()),
        },
    }
}
