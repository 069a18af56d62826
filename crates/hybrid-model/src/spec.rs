// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

//! Extraction of `HybridSpec` annotations.
//!
//! Specifications are written as `[HybridSpec: Requires("x >= 0")]`, i.e. a
//! data constructor naming the clause kind applied to a string literal with
//! dL source text.

use crate::ast::{Annotation, PureExp};
use crate::ModelError;
use std::fmt::{Display, Formatter};

const HYBRID_SPEC: &str = "HybridSpec";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecTag {
    Requires,
    Ensures,
    ObjInv,
    Tactic,
}

impl SpecTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecTag::Requires => "Requires",
            SpecTag::Ensures => "Ensures",
            SpecTag::ObjInv => "ObjInv",
            SpecTag::Tactic => "Tactic",
        }
    }
}

impl Display for SpecTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How several annotations with the same tag are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Conjoin all occurrences.
    Conjoin,
    /// Keep only the last occurrence.
    Last,
}

/// Extract the specification with the given tag from a list of annotations.
///
/// Returns `None` if no annotation carries the tag. Annotations of other types
/// are ignored; a `HybridSpec` annotation that is not a constructor applied to a
/// string literal is a malformed model.
pub fn extract_spec(
    annotations: &[Annotation],
    tag: SpecTag,
    resolution: Resolution,
) -> anyhow::Result<Option<String>> {
    let mut result: Option<String> = None;
    for annotation in annotations {
        if !annotation.ty.ends_with(HYBRID_SPEC) {
            continue;
        }
        let PureExp::DataConstructor { constructor, args } = &annotation.value else {
            return Err(ModelError::MalformedAnnotation(format!(
                "expected a specification constructor while looking for {tag}, found {:?}",
                annotation.value
            ))
            .into());
        };
        if constructor != tag.as_str() {
            continue;
        }
        let content = match args.as_slice() {
            [PureExp::StringLiteral(content)] => content.clone(),
            other => {
                return Err(ModelError::MalformedAnnotation(format!(
                    "{tag} expects a single string literal, found {other:?}"
                ))
                .into())
            }
        };
        result = Some(match (resolution, result) {
            (Resolution::Conjoin, Some(prev)) => format!("({prev}) & ({content})"),
            _ => content,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(constructor: &str, content: &str) -> Annotation {
        Annotation {
            ty: "ABS.DC.HybridSpec".to_string(),
            value: PureExp::DataConstructor {
                constructor: constructor.to_string(),
                args: vec![PureExp::StringLiteral(content.to_string())],
            },
        }
    }

    #[test]
    fn test_conjoin_and_last() {
        let annotations = vec![
            spec("Requires", "x > 0"),
            spec("Tactic", "master"),
            spec("Requires", "y > 0"),
            spec("Tactic", "expandAllDefs; auto"),
        ];
        assert_eq!(
            extract_spec(&annotations, SpecTag::Requires, Resolution::Conjoin).unwrap(),
            Some("(x > 0) & (y > 0)".to_string())
        );
        assert_eq!(
            extract_spec(&annotations, SpecTag::Tactic, Resolution::Last).unwrap(),
            Some("expandAllDefs; auto".to_string())
        );
        assert_eq!(
            extract_spec(&annotations, SpecTag::Ensures, Resolution::Conjoin).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_payload() {
        let annotations = vec![Annotation {
            ty: "HybridSpec".to_string(),
            value: PureExp::DataConstructor {
                constructor: "Requires".to_string(),
                args: vec![PureExp::IntLiteral("1".to_string())],
            },
        }];
        let err = extract_spec(&annotations, SpecTag::Requires, Resolution::Conjoin).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::MalformedAnnotation(_))
        ));
    }

    #[test]
    fn test_other_annotations_ignored() {
        let annotations = vec![Annotation {
            ty: "ABS.StdLib.Deadline".to_string(),
            value: PureExp::IntLiteral("3".to_string()),
        }];
        assert_eq!(
            extract_spec(&annotations, SpecTag::Requires, Resolution::Last).unwrap(),
            None
        );
    }
}
