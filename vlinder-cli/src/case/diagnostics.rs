//! Non-fatal findings collected during an import

/// Kind of non-fatal finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A table carries columns the template does not know
    ExtraColumns,
    /// A fixed input is declared but never used as an argument
    UnusedFixedInput,
    /// The case text element is empty or not a text
    MissingCaseText,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::ExtraColumns => write!(f, "extra columns"),
            WarningKind::UnusedFixedInput => write!(f, "unused fixed input"),
            WarningKind::MissingCaseText => write!(f, "missing case text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: WarningKind,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TemplateWarning: {}", self.message)
    }
}

/// Warnings raised by one import, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it once through the log
    pub fn warn(&mut self, kind: WarningKind, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            message: message.into(),
        };
        log::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn has(&self, kind: WarningKind) -> bool {
        self.of_kind(kind).next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
