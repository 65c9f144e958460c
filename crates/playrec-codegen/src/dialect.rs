//! Output dialects.

use playrec_protocols::OutputFormat;

const JAVASCRIPT_SKELETON: &str = "const { chromium } = require('playwright');

(async () => {
  const browser = await chromium.launch({ headless: false });
  const page = await browser.newPage();

  await browser.close();
})();";

const PYTHON_SKELETON: &str = "import asyncio
from playwright.async_api import async_playwright

async def run():
    async with async_playwright() as p:
        browser = await p.chromium.launch(headless=False)
        page = await browser.new_page()

        await browser.close()

if __name__ == \"__main__\":
    asyncio.run(run())";

const PYTEST_SKELETON: &str = "from playwright.sync_api import Page, expect

def test_ai_steps_recorder(page: Page):
    pass";

/// How code for one output format is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub format: OutputFormat,
    /// Language name used in prompts.
    pub language: &'static str,
    /// Program the first generation is asked to fill in.
    pub skeleton: &'static str,
    /// Statement that tears the browser down; new lines go before it.
    pub teardown: Option<&'static str>,
    /// Indentation of statements inside the test body.
    pub indent: &'static str,
    /// Whether statements are awaited (`await x;`) or synchronous.
    pub is_async: bool,
}

impl Dialect {
    pub fn of(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Javascript => Dialect {
                format,
                language: "JavaScript",
                skeleton: JAVASCRIPT_SKELETON,
                teardown: Some("await browser.close();"),
                indent: "  ",
                is_async: true,
            },
            OutputFormat::Python => Dialect {
                format,
                language: "Python",
                skeleton: PYTHON_SKELETON,
                teardown: Some("await browser.close()"),
                indent: "        ",
                is_async: true,
            },
            OutputFormat::Pytest => Dialect {
                format,
                language: "Python",
                skeleton: PYTEST_SKELETON,
                teardown: None,
                indent: "    ",
                is_async: false,
            },
        }
    }

    pub fn is_python(&self) -> bool {
        !matches!(self.format, OutputFormat::Javascript)
    }

    /// Quote a string literal in the dialect's preferred style.
    pub fn quote(&self, value: &str) -> String {
        let q = if self.is_python() { '"' } else { '\'' };
        let mut out = String::with_capacity(value.len() + 2);
        out.push(q);
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                c if c == q => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(q);
        out
    }

    /// Turn `target.method(args)` into a full statement for this dialect.
    pub fn statement(&self, call: &str) -> String {
        match self.format {
            OutputFormat::Javascript => format!("await {};", call),
            OutputFormat::Python => format!("await {}", call),
            OutputFormat::Pytest => call.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeletons_contain_teardown() {
        for format in [OutputFormat::Javascript, OutputFormat::Python] {
            let dialect = Dialect::of(format);
            let teardown = dialect.teardown.unwrap();
            assert_eq!(dialect.skeleton.matches(teardown).count(), 1);
        }
        assert!(Dialect::of(OutputFormat::Pytest).teardown.is_none());
    }

    #[test]
    fn test_quote_styles() {
        let js = Dialect::of(OutputFormat::Javascript);
        let py = Dialect::of(OutputFormat::Python);
        assert_eq!(js.quote("it's"), "'it\\'s'");
        assert_eq!(py.quote("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(py.quote("it's"), "\"it's\"");
    }

    #[test]
    fn test_statements() {
        assert_eq!(
            Dialect::of(OutputFormat::Javascript).statement("page.click('#a')"),
            "await page.click('#a');"
        );
        assert_eq!(
            Dialect::of(OutputFormat::Python).statement("page.click(\"#a\")"),
            "await page.click(\"#a\")"
        );
        assert_eq!(
            Dialect::of(OutputFormat::Pytest).statement("page.click(\"#a\")"),
            "page.click(\"#a\")"
        );
    }
}
