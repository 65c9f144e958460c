//! Prompts sent to the model.

use serde::Serialize;
use std::collections::BTreeMap;

use playrec_protocols::{OutputFormat, Step, StepType, StepValue};

use crate::dialect::Dialect;

/// The part of a step the model gets to see.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptStep<'a> {
    #[serde(rename = "type")]
    kind: StepType,
    tag_name: Option<&'a str>,
    url: &'a str,
    value: Option<&'a StepValue>,
    text: Option<&'a str>,
    label: Option<&'a str>,
    attributes: &'a BTreeMap<String, String>,
    in_iframe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
}

impl<'a> PromptStep<'a> {
    fn from_step(step: &'a Step, with_timestamp: bool) -> Self {
        let action = &step.action;
        Self {
            kind: action.kind,
            tag_name: action.tag_name.as_deref(),
            url: &action.url,
            value: action.value.as_ref(),
            text: action.text.as_deref(),
            label: action.label.as_deref(),
            attributes: &action.attributes,
            in_iframe: action.in_iframe,
            timestamp: with_timestamp.then_some(action.timestamp),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Prompt for one step. The first step asks for a complete program built on
/// the dialect skeleton, later steps for exactly one line.
pub fn step_prompt(step: &Step, format: OutputFormat, is_first_step: bool) -> String {
    let dialect = Dialect::of(format);
    let language = dialect.language;
    let payload = to_json(&PromptStep::from_step(step, false));
    let is_pytest = format == OutputFormat::Pytest;

    if is_first_step {
        let heading = if is_pytest {
            format!(
                "Generate a complete {language} Playwright (pytest) test function using the sync API with a 'page' fixture."
            )
        } else {
            format!("Generate a complete {language} Playwright code framework for the first recorded action.")
        };
        format!(
            "{heading}

Action (JSON):
{payload}

Rules:
1. Use Playwright locator best practices, prefer in order: getByRole(name), getByLabel, getByPlaceholder, getByTestId, getByText.
2. If none of the above apply, use an XPath selector (prefix with xpath=). Only as a last resort, use a CSS selector. Never use nth-child unless absolutely necessary.
3. Use {api} with proper waits (waitForLoadState where needed).
4. Return only runnable {language} code, with NO comments or explanations.
5. If the action is inside an iframe (inIframe=true), use frameLocator('iframe[src*=\"<host>\"]') or its Python equivalent to scope operations to that frame.

{skeleton}

Generate the complete runnable code integrating the action using locator best practices.",
            api = if dialect.is_async { "the async/await API" } else { "the sync API" },
            skeleton = dialect.skeleton,
        )
    } else {
        let heading = if is_pytest {
            "Generate a single line of Python Playwright (pytest, sync API) code using the 'page' fixture.".to_string()
        } else {
            format!("Generate a single line of {language} Playwright code for this action using best-practice locators.")
        };
        format!(
            "{heading}

Action (JSON):
{payload}

Rules:
1. Prefer: getByRole(name), getByLabel, getByPlaceholder, getByTestId, getByText.
2. If those are not applicable, use an XPath selector (xpath=...). Only if XPath is not possible, use CSS. Never use nth-child.
3. Return only ONE line of code with NO comments."
        )
    }
}

/// The page the test starts on: the first navigation target, else the first step's URL.
pub fn main_url(steps: &[Step]) -> String {
    steps
        .iter()
        .find(|s| s.kind() == StepType::Navigation)
        .and_then(|s| s.action.value.as_ref())
        .map(StepValue::as_text)
        .filter(|url| !url.is_empty())
        .or_else(|| steps.first().map(|s| s.action.url.clone()))
        .unwrap_or_default()
}

/// Prompt for a complete program covering every step.
pub fn batch_prompt(steps: &[Step], format: OutputFormat) -> String {
    let dialect = Dialect::of(format);
    let language = dialect.language;
    let payload = to_json(
        &steps
            .iter()
            .map(|s| PromptStep::from_step(s, true))
            .collect::<Vec<_>>(),
    );
    let heading = if format == OutputFormat::Pytest {
        "Based on the following steps, generate a Python Playwright test for pytest (sync API, using the page fixture) with optimized locators:".to_string()
    } else {
        format!(
            "Based on the following recorded web actions (including element attributes and accessible names), generate {language} Playwright code with optimized locators:"
        )
    };

    format!(
        "{heading}

Steps (JSON):
{payload}

Main page URL: {main_url}

Locator rules (important, must be followed):
1. Prefer locators in this order: getByRole({{ name }}), getByLabel, getByPlaceholder, getByTestId, getByText.
2. If none apply, use an XPath selector (prefixed with xpath=); use CSS only when no XPath can be built. Do not use nth-child unless absolutely necessary.
3. Use modern Playwright syntax.
4. Open the first URL with page.goto() and wait with waitForLoadState where needed.
5. Return only complete runnable code, without explanations or comments.
6. When a step has inIframe=true (and its url differs from the main page), scope it with frameLocator('iframe[src*=\"<host>\"]') or the Python equivalent, building <host> from the domain of the step url.

Follow this skeleton strictly:

{skeleton}

Generate the complete runnable {language} code:",
        main_url = main_url(steps),
        skeleton = dialect.skeleton,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use playrec_protocols::CapturedStep;

    fn click() -> Step {
        CapturedStep::new(StepType::Click, "#login")
            .with_tag("BUTTON")
            .with_text("Log in")
            .with_attribute("data-testid", "login")
            .with_url("https://example.com/login")
            .accept(0, 0, 0)
    }

    #[test]
    fn test_first_step_prompt_embeds_skeleton() {
        let prompt = step_prompt(&click(), OutputFormat::Javascript, true);
        assert!(prompt.contains("complete JavaScript Playwright code framework"));
        assert!(prompt.contains("await browser.close();"));
        assert!(prompt.contains("\"tagName\": \"BUTTON\""));
        assert!(prompt.contains("\"type\": \"click\""));
        assert!(!prompt.contains("stepIndex"));
    }

    #[test]
    fn test_incremental_prompt_asks_for_one_line() {
        let prompt = step_prompt(&click(), OutputFormat::Python, false);
        assert!(prompt.contains("single line of Python"));
        assert!(prompt.contains("ONE line"));
        assert!(!prompt.contains("async_playwright"));
    }

    #[test]
    fn test_pytest_prompts() {
        let first = step_prompt(&click(), OutputFormat::Pytest, true);
        assert!(first.contains("pytest"));
        assert!(first.contains("def test_ai_steps_recorder(page: Page):"));
        assert!(first.contains("the sync API"));
    }

    #[test]
    fn test_main_url_prefers_navigation_value() {
        let steps = vec![
            click(),
            CapturedStep::new(StepType::Navigation, "")
                .with_value("https://example.com/start")
                .accept(1, 1, 0),
        ];
        assert_eq!(main_url(&steps), "https://example.com/start");
        assert_eq!(main_url(&steps[..1]), "https://example.com/login");
        assert_eq!(main_url(&[]), "");
    }

    #[test]
    fn test_batch_prompt_lists_steps_with_timestamps() {
        let prompt = batch_prompt(&[click()], OutputFormat::Javascript);
        assert!(prompt.contains("Main page URL: https://example.com/login"));
        assert!(prompt.contains("\"timestamp\": 0"));
        assert!(prompt.contains("getByRole({ name })"));
        assert!(prompt.contains("require('playwright')"));
    }
}
