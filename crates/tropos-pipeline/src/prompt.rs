//! Prompt templates for the two analysis stages
//!
//! Stage 1 casts a deliberately wide but criteria-bound net; stage 2 embeds
//! the full candidate list and filters with strict approval criteria. Both
//! stages contract for a JSON object response (`candidates` / `metaphors`).

use tropos_domain::MetaphorCandidate;

const VALID_EXAMPLES: &str = r#"VALID METAPHORS (physical domain -> financial domain):

- "fire sales" -> FIRE (consumes quickly, destructive) -> SALES (quick, destroy value)
- "weather a downturn" -> CLIMATE/STORM (resist natural elements) -> CRISIS (resist economic difficulties)
- "tangled and opaque picture" -> TANGLED PHYSICAL OBJECT -> COMPLEX MARKET
- "hub-and-spoke network" -> PHYSICAL WHEEL (center and spokes) -> MARKET STRUCTURE
- "feedback loop" -> MECHANICAL SYSTEM (closed circuit) -> ECONOMIC SYSTEM
- "adverse feedback loop" -> UNCONTROLLED MACHINE -> PROBLEMATIC ECONOMIC SYSTEM
- "buildup of risk" -> PHYSICAL CONSTRUCTION/ACCUMULATION -> RISK ACCUMULATION
- "near collapse" -> PHYSICAL STRUCTURE FALLING -> FINANCIAL SYSTEM FAILING"#;

const INVALID_EXAMPLES: &str = r#"INVALID EXPRESSIONS (reject these types):

- "take stock" -> common idiomatic expression, no systematic conceptual mapping
- "move forward" -> very common, no specific source domain
- "area of interest" -> standard language, not metaphorical
- "market participants" -> normal technical terminology
- "financial institutions" -> sector terminology
- "regulatory framework" -> technical concept, not metaphor
- "liquidity provision" -> standard financial terminology
- "access to capital" -> normal technical language
- "under the right circumstances" -> common expression
- "make progress" -> very common expression
- "address issues" -> technical terminology"#;

/// Build the stage-1 detection prompt for a speech text
pub fn detection_prompt(text: &str) -> String {
    format!(
        r#"Analyze the following text:

{text}

You are a linguistics expert who identifies ONLY very specific conceptual metaphors.

STRICT RULE: Only find metaphors that EXPLICITLY map physical/concrete concepts to financial/abstract concepts.

MANDATORY CRITERIA for a valid metaphor:
1. Must use vocabulary from a physical/concrete domain (weather, construction, machines, fire, etc.)
2. Must apply that vocabulary to abstract financial/economic concepts
3. Must create a systematic conceptual mapping

EXAMPLES of VALID metaphors of the type you're looking for:
- "fire sales" (FIRE -> quick/destructive sales)
- "weather a downturn" (WEATHER -> resist crisis)
- "feedback loop" (MACHINE -> economic system)
- "tangled picture" (TANGLED PHYSICAL OBJECT -> complex market)
- "hub-and-spoke network" (PHYSICAL WHEEL -> market structure)

ABSOLUTE EXCLUSIONS (DO NOT include):
- "build up", "take stock", "move forward" (too common)
- "financial institutions", "market participants" (normal technical language)
- "regulatory framework", "oversight" (specialized terminology)
- "access to capital", "liquidity provision" (standard financial concepts)
- Any phrase that is standard financial terminology

FINAL INSTRUCTION: If you find more than 5 metaphors, you're being too permissive. Only the most obvious and clear ones.

Respond in JSON format:
{{
    "candidates": [
        {{
            "text": "exact metaphor text",
            "context": "complete context where it appears"
        }}
    ]
}}
"#
    )
}

/// Build the stage-2 validation prompt embedding the full candidate list
pub fn validation_prompt(candidates: &[MetaphorCandidate]) -> String {
    let candidates_json =
        serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"YOU ARE THE VALIDATION STAGE: EXPERT FILTER FOR CONCEPTUAL METAPHORS

The detection stage identified these candidates:
{candidates_json}

YOUR MISSION: Filter and keep ONLY true conceptual metaphors.

STRICT APPROVAL CRITERIA:
1. Must map a specific PHYSICAL/CONCRETE domain to an ABSTRACT/FINANCIAL one
2. The mapping must be SYSTEMATIC and STRUCTURAL (not decorative)
3. Must use specific vocabulary from the source domain (weather, fire, machines, construction, etc.)

{valid}

{invalid}

FILTERING INSTRUCTIONS:
- Only approve candidates clearly similar to the valid examples
- If you have doubts about a candidate, REJECT IT
- Maximum 5 approved metaphors (if more, take the clearest ones)

SIMPLIFIED RESPONSE FORMAT:
{{
    "metaphors": [
        {{
            "text": "approved metaphor",
            "context": "complete context where it appears"
        }}
    ]
}}
"#,
        valid = VALID_EXAMPLES,
        invalid = INVALID_EXAMPLES,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_prompt_embeds_text() {
        let prompt = detection_prompt("Markets weathered the storm last quarter.");
        assert!(prompt.contains("Markets weathered the storm last quarter."));
        assert!(prompt.contains("\"candidates\""));
    }

    #[test]
    fn test_detection_prompt_states_criteria() {
        let prompt = detection_prompt("text");
        assert!(prompt.contains("MANDATORY CRITERIA"));
        assert!(prompt.contains("ABSOLUTE EXCLUSIONS"));
    }

    #[test]
    fn test_validation_prompt_embeds_candidates_with_context() {
        let candidates = vec![
            MetaphorCandidate::new("fire sales", "forced into fire sales of assets"),
            MetaphorCandidate::new("headwinds", "the economy faces strong headwinds"),
        ];
        let prompt = validation_prompt(&candidates);

        assert!(prompt.contains("fire sales"));
        assert!(prompt.contains("forced into fire sales of assets"));
        assert!(prompt.contains("headwinds"));
        assert!(prompt.contains("\"metaphors\""));
    }

    #[test]
    fn test_validation_prompt_includes_examples() {
        let prompt = validation_prompt(&[]);
        assert!(prompt.contains("VALID METAPHORS"));
        assert!(prompt.contains("INVALID EXPRESSIONS"));
        assert!(prompt.contains("REJECT IT"));
    }
}
