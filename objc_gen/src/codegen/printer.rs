use crate::codegen::field::GenerationFacts;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrinterError {
    #[error("template references unknown variable '${0}$'")]
    UnknownVariable(String),

    #[error("template has an unterminated variable starting at byte {0}")]
    UnterminatedVariable(usize),
}

/// Text sink for generated source.
///
/// Templates are written as indented raw strings: a leading newline is
/// dropped, the common indentation is stripped and `$name$` placeholders are
/// replaced from the supplied facts. `$$` emits a literal `$`.
#[derive(Debug, Default)]
pub struct Printer {
    output: String,
}

impl Printer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, vars: &GenerationFacts, template: &str) -> Result<(), PrinterError> {
        let text = dedent(template);
        let substituted = substitute(&text, vars)?;
        self.output.push_str(&substituted);
        Ok(())
    }

    /// Append text verbatim, without dedenting or substitution.
    pub fn emit_raw(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

fn dedent(template: &str) -> String {
    let body = template.strip_prefix('\n').unwrap_or(template);
    let mut lines: Vec<&str> = body.lines().collect();

    /* Closing indentation of the raw string is not content */
    if lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    let mut out = String::new();
    for line in lines {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&line[indent..]);
            out.push('\n');
        }
    }
    out
}

fn substitute(text: &str, vars: &GenerationFacts) -> Result<String, PrinterError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after.find('$').ok_or(PrinterError::UnterminatedVariable(offset + start))?;
        let name = &after[..end];

        if name.is_empty() {
            out.push('$');
        } else {
            let value = vars.get(name).ok_or_else(|| PrinterError::UnknownVariable(name.to_string()))?;
            out.push_str(value);
        }

        let consumed = start + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    Ok(out)
}
