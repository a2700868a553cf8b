//! Call signatures and their textual notation.
//!
//! Annotations and defaults are stored pre-rendered by the host, so the
//! notation here only deals with ordering, separators and markers.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    PositionalOnly,
    #[default]
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::PositionalOrKeyword,
            annotation: None,
            default: None,
        }
    }

    pub fn kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParameterKind::VarPositional => f.write_str("*")?,
            ParameterKind::VarKeyword => f.write_str("**")?,
            _ => {}
        }
        f.write_str(&self.name)?;
        if let Some(annotation) = &self.annotation {
            write!(f, ": {annotation}")?;
        }
        if let Some(default) = &self.default {
            if self.annotation.is_some() {
                write!(f, " = {default}")?;
            } else {
                write!(f, "={default}")?;
            }
        }
        Ok(())
    }
}

/// Ordered parameter list plus an optional return annotation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
}

impl Signature {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self {
            parameters,
            returns: None,
        }
    }

    pub fn returning(mut self, annotation: impl Into<String>) -> Self {
        self.returns = Some(annotation.into());
        self
    }

    /// Signature of a constructor that accepts anything: `(self, /, *args, **kwargs)`.
    pub fn default_constructor() -> Self {
        Self::new(vec![
            Parameter::new("self").kind(ParameterKind::PositionalOnly),
            Parameter::new("args").kind(ParameterKind::VarPositional),
            Parameter::new("kwargs").kind(ParameterKind::VarKeyword),
        ])
    }

    /// Drops the first parameter (the receiver) and the return annotation.
    pub fn without_first(&self) -> Self {
        Self::new(self.parameters.iter().skip(1).cloned().collect())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(self.parameters.len() + 2);
        let mut pending_positional_marker = false;
        let mut keyword_marker_allowed = true;

        for parameter in &self.parameters {
            if parameter.kind == ParameterKind::PositionalOnly {
                pending_positional_marker = true;
            } else if pending_positional_marker {
                parts.push("/".into());
                pending_positional_marker = false;
            }

            match parameter.kind {
                ParameterKind::VarPositional => keyword_marker_allowed = false,
                ParameterKind::KeywordOnly if keyword_marker_allowed => {
                    parts.push("*".into());
                    keyword_marker_allowed = false;
                }
                _ => {}
            }

            parts.push(parameter.to_string());
        }

        if pending_positional_marker {
            parts.push("/".into());
        }

        write!(f, "({})", parts.join(", "))?;
        if let Some(returns) = &self.returns {
            write!(f, " -> {returns}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_annotations_and_defaults() {
        let sig = Signature::new(vec![
            Parameter::new("x").annotated("int"),
            Parameter::new("y").annotated("str").with_default("'a'"),
            Parameter::new("z").with_default("3"),
        ]);
        assert_eq!(sig.to_string(), "(x: int, y: str = 'a', z=3)");
    }

    #[test]
    fn renders_keyword_only_marker_once() {
        let sig = Signature::new(vec![
            Parameter::new("a"),
            Parameter::new("b").kind(ParameterKind::KeywordOnly),
            Parameter::new("c").kind(ParameterKind::KeywordOnly),
        ]);
        assert_eq!(sig.to_string(), "(a, *, b, c)");
    }

    #[test]
    fn var_positional_suppresses_keyword_marker() {
        let sig = Signature::new(vec![
            Parameter::new("args").kind(ParameterKind::VarPositional),
            Parameter::new("flag").kind(ParameterKind::KeywordOnly),
            Parameter::new("kwargs").kind(ParameterKind::VarKeyword),
        ]);
        assert_eq!(sig.to_string(), "(*args, flag, **kwargs)");
    }

    #[test]
    fn positional_only_marker_placement() {
        let trailing = Signature::new(vec![
            Parameter::new("a").kind(ParameterKind::PositionalOnly),
        ]);
        assert_eq!(trailing.to_string(), "(a, /)");

        assert_eq!(
            Signature::default_constructor().to_string(),
            "(self, /, *args, **kwargs)"
        );
    }

    #[test]
    fn without_first_drops_receiver_and_return() {
        let sig = Signature::new(vec![
            Parameter::new("self"),
            Parameter::new("x").annotated("float"),
        ])
        .returning("None");
        assert_eq!(sig.to_string(), "(self, x: float) -> None");
        assert_eq!(sig.without_first().to_string(), "(x: float)");
        assert_eq!(
            Signature::default_constructor().without_first().to_string(),
            "(*args, **kwargs)"
        );
    }
}
