use std::fmt::Display;

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
pub use text_size::TextRange;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    message: String,
    range: TextRange,
}

impl Diagnostic {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn error(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    /// Renders the diagnostic against its source, `rustc` style.
    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextSize;

    use super::*;

    #[test]
    fn render_points_at_range() {
        let text = "local x = = 1\nprint(x)\n";
        let diagnostic =
            Diagnostic::error("expected expression", TextRange::at(TextSize::new(10), 1.into()));
        let rendered = diagnostic.render(&Renderer::plain(), "main.lua", text).to_string();

        assert!(rendered.starts_with("error: expected expression"), "{rendered}");
        assert!(rendered.contains("main.lua"), "{rendered}");
        assert!(rendered.contains("local x = = 1"), "{rendered}");
    }
}
