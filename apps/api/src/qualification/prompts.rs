// Lead qualification prompt template and its renderer.
// The JSON keys requested here are exactly the keys the normalizer reads.

use crate::qualification::models::LeadInput;

pub const NOT_PROVIDED: &str = "Not provided";

/// Replace: {name}, {email}, {phone}, {company}, {website}, {message}, {source}
pub const LEAD_QUALIFICATION_PROMPT_TEMPLATE: &str = r#"You are a lead qualification expert.
Analyze this lead and provide structured insights.

Lead Information:
- Name: {name}
- Email: {email}
- Phone: {phone}
- Company: {company}
- Website: {website}
- Message: {message}
- Source: {source}

Return a JSON object with this EXACT schema (no extra fields):
{
  "industry": "Primary industry of the company (or 'Unknown')",
  "company_size": "Estimated size: Startup/Small/Medium/Large/Enterprise",
  "budget_signals": ["List of 0-3 signals indicating budget/buying power"],
  "pain_points": ["List of 2-4 business pain points mentioned or implied"],
  "urgency_level": "high" | "medium" | "low",
  "buying_intent": "ready_to_buy" | "evaluating" | "exploring" | "just_browsing",
  "recommended_action": "Specific next step for sales team (one sentence)"
}

RULES:
1. Be realistic with company_size estimation
2. Identify REAL pain points from the message, do not invent them
3. urgency_level: "high" only if explicit urgency keywords are present
4. buying_intent: consider actual purchase signals only
5. recommended_action: be specific and actionable
6. Respond ONLY with the JSON object. No explanation, no markdown, no ``` code fences."#;

/// Renders a lead into the qualification prompt. Pure and deterministic.
///
/// Lead fields are substituted in a single left-to-right pass so that
/// placeholder-looking text inside user input (e.g. a message containing
/// `{email}`) is emitted verbatim and never expanded.
pub fn build_prompt(lead: &LeadInput) -> String {
    let source = lead.source.as_str();
    let values: [(&str, &str); 7] = [
        ("{name}", lead.name.as_str()),
        ("{email}", lead.email.as_str()),
        ("{phone}", lead.phone.as_deref().unwrap_or(NOT_PROVIDED)),
        ("{company}", lead.company.as_deref().unwrap_or(NOT_PROVIDED)),
        ("{website}", lead.website.as_deref().unwrap_or(NOT_PROVIDED)),
        ("{message}", lead.message.as_str()),
        ("{source}", source),
    ];

    let mut out = String::with_capacity(LEAD_QUALIFICATION_PROMPT_TEMPLATE.len() + 256);
    let mut rest = LEAD_QUALIFICATION_PROMPT_TEMPLATE;

    'scan: while let Some(pos) = rest.find('{') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        for (placeholder, value) in values {
            if let Some(after) = tail.strip_prefix(placeholder) {
                out.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}
