//! Rule-based code generation, used when the model cannot be reached.

use playrec_protocols::{OutputFormat, Step, StepType};

use crate::dialect::Dialect;

const TEST_ID_ATTRIBUTES: [&str; 4] = ["data-testid", "data-test-id", "data-test", "data-qa"];

/// Deterministic generator covering the same step vocabulary as the model prompts.
pub struct FallbackGenerator {
    dialect: Dialect,
}

impl FallbackGenerator {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            dialect: Dialect::of(format),
        }
    }

    /// A complete program for `steps`.
    pub fn generate(steps: &[Step], format: OutputFormat) -> String {
        Self::new(format).program(steps)
    }

    fn program(&self, steps: &[Step]) -> String {
        let d = &self.dialect;
        let start_url = steps
            .iter()
            .map(|s| s.action.url.as_str())
            .find(|url| !url.is_empty());

        let mut body: Vec<String> = Vec::new();
        if let Some(url) = start_url {
            body.extend(self.goto(url));
        }
        for step in steps {
            body.extend(self.step_lines(step, start_url));
        }

        let indented: Vec<String> = body
            .iter()
            .map(|line| format!("{}{}", d.indent, line))
            .collect();

        match d.format {
            OutputFormat::Javascript => format!(
                "const {{ chromium }} = require('playwright');\n\n(async () => {{\n  const browser = await chromium.launch({{ headless: false }});\n  const page = await browser.newPage();\n\n{}\n  await browser.close();\n}})();",
                indented.join("\n")
            ),
            OutputFormat::Python => format!(
                "import asyncio\nfrom playwright.async_api import async_playwright\n\nasync def run():\n    async with async_playwright() as p:\n        browser = await p.chromium.launch(headless=False)\n        page = await browser.new_page()\n\n{}\n        await browser.close()\n\nif __name__ == \"__main__\":\n    asyncio.run(run())",
                indented.join("\n")
            ),
            OutputFormat::Pytest => {
                let body = if indented.is_empty() {
                    format!("{}pass", d.indent)
                } else {
                    indented.join("\n")
                };
                format!(
                    "from playwright.sync_api import Page, expect\n\ndef test_ai_steps_recorder(page: Page):\n{}\n",
                    body
                )
            }
        }
    }

    fn goto(&self, url: &str) -> Vec<String> {
        let d = &self.dialect;
        let wait = if d.is_python() {
            "page.wait_for_load_state(\"networkidle\")"
        } else {
            "page.waitForLoadState('networkidle')"
        };
        vec![
            d.statement(&format!("page.goto({})", d.quote(url))),
            d.statement(wait),
        ]
    }

    fn step_lines(&self, step: &Step, start_url: Option<&str>) -> Vec<String> {
        let d = &self.dialect;
        let action = &step.action;
        let value = action.value.as_ref().filter(|v| v.is_present()).map(|v| v.as_text());

        match action.kind {
            StepType::Navigation => match value {
                Some(url) if Some(url.as_str()) != start_url => self.goto(&url),
                _ => Vec::new(),
            },
            StepType::Click => vec![d.statement(&format!("{}.click()", self.locator(step)))],
            StepType::Input | StepType::Change => {
                let Some(value) = value else {
                    return Vec::new();
                };
                let method = if action.tag() == "SELECT" {
                    if d.is_python() { "select_option" } else { "selectOption" }
                } else {
                    "fill"
                };
                vec![d.statement(&format!(
                    "{}.{}({})",
                    self.locator(step),
                    method,
                    d.quote(&value)
                ))]
            }
            StepType::Keydown if value.as_deref() == Some("Enter") => vec![d.statement(&format!(
                "{}.press({})",
                self.locator(step),
                d.quote("Enter")
            ))],
            StepType::Keydown | StepType::Submit => Vec::new(),
        }
    }

    /// Locator preference: test id, label or placeholder for form fields,
    /// button/link role, explicit role, visible text, XPath, CSS.
    pub fn locator(&self, step: &Step) -> String {
        let d = &self.dialect;
        let py = d.is_python();
        let action = &step.action;
        let attr = |key: &str| non_blank(action.attribute(key));

        let label = non_blank(action.label.as_deref()).or_else(|| attr("aria-label"));
        let placeholder = attr("placeholder");
        let test_id = TEST_ID_ATTRIBUTES.iter().find_map(|key| attr(key));
        let text = non_blank(action.text.as_deref());
        let role = attr("role");
        let input_type = attr("type");
        let tag = action.tag().to_ascii_lowercase();

        let by_role = |role: &str, name: &str| {
            if py {
                format!("page.get_by_role({}, name={})", d.quote(role), d.quote(name))
            } else {
                format!("page.getByRole({}, {{ name: {} }})", d.quote(role), d.quote(name))
            }
        };

        if let Some(id) = test_id {
            let call = if py { "get_by_test_id" } else { "getByTestId" };
            return format!("page.{}({})", call, d.quote(id));
        }
        if matches!(tag.as_str(), "input" | "textarea" | "select") {
            if let Some(label) = label {
                let call = if py { "get_by_label" } else { "getByLabel" };
                return format!("page.{}({})", call, d.quote(label));
            }
            if let Some(placeholder) = placeholder {
                let call = if py { "get_by_placeholder" } else { "getByPlaceholder" };
                return format!("page.{}({})", call, d.quote(placeholder));
            }
        }
        let name = label.or(text);
        let is_button = tag == "button"
            || (tag == "input" && matches!(input_type, Some("button" | "submit" | "reset")));
        if let Some(name) = name {
            if is_button {
                return by_role("button", name);
            }
            if tag == "a" {
                return by_role("link", name);
            }
            if let Some(role) = role {
                return by_role(role, name);
            }
        }
        if let Some(text) = text {
            let call = if py { "get_by_text" } else { "getByText" };
            return format!("page.{}({})", call, d.quote(text));
        }

        let mut conditions: Vec<String> = Vec::new();
        for (key, value) in [
            ("id", attr("id")),
            ("name", attr("name")),
            ("type", input_type),
            ("placeholder", placeholder),
        ] {
            if let Some(value) = value {
                conditions.push(format!("@{}={}", key, xpath_literal(value)));
            }
        }
        if let Some(class) = attr("class") {
            conditions.extend(
                class
                    .split_whitespace()
                    .take(2)
                    .map(|c| format!("contains(@class,{})", xpath_literal(c))),
            );
        }
        if !conditions.is_empty() {
            let x_tag = if tag.is_empty() { "*" } else { tag.as_str() };
            let xpath = format!("//{}[{}]", x_tag, conditions.join(" and "));
            return format!("page.locator({})", d.quote(&format!("xpath={}", xpath)));
        }

        if !action.selector.is_empty() {
            return format!("page.locator({})", d.quote(&action.selector));
        }
        let x_tag = if tag.is_empty() { "*" } else { tag.as_str() };
        format!("page.locator({})", d.quote(&format!("xpath=//{}", x_tag)))
    }
}

/// XPath 1.0 has no escapes: pick the quote the value lacks, or splice
/// both kinds with `concat()`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
