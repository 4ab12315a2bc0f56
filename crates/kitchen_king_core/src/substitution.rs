//! crates/kitchen_king_core/src/substitution.rs
//!
//! Best-effort ingredient substitution suggestions. This path never fails:
//! anything that goes wrong turns into [`NO_SUBSTITUTION`].

use std::sync::Arc;
use tracing::{info, warn};

use crate::ports::InferenceService;

/// Returned whenever no suggestion could be produced.
pub const NO_SUBSTITUTION: &str = "No substitution found.";

const PROMPT_TEMPLATE: &str = r#"Act as a professional chef.
The user is making "{recipe}".
They are missing this ingredient: "{ingredient}".
{available}
Suggest 1 best suitable substitute. If one of the available ingredients works well, prioritize it.
Keep the answer friendly and short (max 1 sentence).
Example: "You can use Greek Yogurt instead.""#;

#[derive(Clone)]
pub struct SubstitutionAdvisor {
    inference: Arc<dyn InferenceService>,
}

impl SubstitutionAdvisor {
    pub fn new(inference: Arc<dyn InferenceService>) -> Self {
        Self { inference }
    }

    /// Suggests one substitute for `missing` in `recipe_name`.
    pub async fn suggest(&self, missing: &str, recipe_name: &str, available: &[String]) -> String {
        let prompt = build_prompt(missing, recipe_name, available);

        match self.inference.generate_text(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => {
                info!(ingredient = missing, recipe = recipe_name, "Substitution suggested.");
                reply.trim().to_string()
            }
            Ok(_) => {
                warn!(ingredient = missing, "Substitution reply was empty.");
                NO_SUBSTITUTION.to_string()
            }
            Err(e) => {
                warn!(ingredient = missing, "Substitution request failed: {}", e);
                NO_SUBSTITUTION.to_string()
            }
        }
    }
}

fn build_prompt(missing: &str, recipe_name: &str, available: &[String]) -> String {
    let available_line = if available.is_empty() {
        String::new()
    } else {
        format!("Available ingredients in kitchen: {}.", available.join(", "))
    };

    PROMPT_TEMPLATE
        .replace("{recipe}", recipe_name)
        .replace("{ingredient}", missing)
        .replace("{available}", &available_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::FakeInferenceService;
    use crate::ports::PortError;

    #[tokio::test]
    async fn returns_the_service_reply() {
        let fake = Arc::new(FakeInferenceService::new());
        fake.push_text(Ok(" You can use curd instead. \n".to_string()));
        let advisor = SubstitutionAdvisor::new(fake);

        let reply = advisor
            .suggest("yogurt", "Raita", &["curd".to_string()])
            .await;
        assert_eq!(reply, "You can use curd instead.");
    }

    #[tokio::test]
    async fn service_failure_becomes_the_fallback() {
        let fake = Arc::new(FakeInferenceService::new());
        fake.push_text(Err(PortError::Unexpected("503".to_string())));
        let advisor = SubstitutionAdvisor::new(fake);

        let reply = advisor.suggest("saffron", "Kheer", &[]).await;
        assert_eq!(reply, NO_SUBSTITUTION);
        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn blank_reply_becomes_the_fallback() {
        let fake = Arc::new(FakeInferenceService::new().with_default_text("   "));
        let advisor = SubstitutionAdvisor::new(fake);
        assert_eq!(advisor.suggest("ghee", "Halwa", &[]).await, NO_SUBSTITUTION);
    }

    #[test]
    fn prompt_lists_available_ingredients_only_when_present() {
        let with = build_prompt("ghee", "Halwa", &["butter".to_string(), "oil".to_string()]);
        assert!(with.contains("Available ingredients in kitchen: butter, oil."));
        assert!(with.contains("\"Halwa\""));

        let without = build_prompt("ghee", "Halwa", &[]);
        assert!(!without.contains("Available ingredients"));
    }
}
