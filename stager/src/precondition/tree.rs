//! Leaf/tree composition of checks.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::precondition::{Check, CheckContext, Verdict};

/// Outcome of evaluating a [`Precondition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// Every leaf passed.
    Fulfilled {
        /// The evaluated precondition's fulfilled message.
        message: String,
    },
    /// Evaluation stopped at the first failing leaf.
    Unfulfilled {
        /// Name of the failing leaf.
        leaf: String,
        /// The failing leaf's status message.
        message: String,
    },
}

impl Evaluation {
    /// Whether every leaf passed.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    /// The status message produced by this evaluation.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Fulfilled { message } | Self::Unfulfilled { message, .. } => message,
        }
    }
}

/// Status of one leaf in a full report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafStatus {
    /// The leaf's name.
    pub name: String,
    /// The leaf's rule.
    pub description: String,
    /// Whether the leaf passed.
    pub fulfilled: bool,
    /// The leaf's current status message.
    pub message: String,
}

/// An AND-composition of preconditions.
///
/// Children are evaluated in declaration order and evaluation stops at the
/// first unfulfilled one. A tree with no children is fulfilled.
#[derive(Debug)]
pub struct PreconditionTree {
    name: String,
    description: String,
    fulfilled_message: String,
    children: Vec<Precondition>,
}

impl PreconditionTree {
    /// Create a tree.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        fulfilled_message: impl Into<String>,
        children: Vec<Precondition>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fulfilled_message: fulfilled_message.into(),
            children,
        }
    }

    /// The direct children, in declaration order.
    #[must_use]
    pub fn children(&self) -> &[Precondition] {
        &self.children
    }
}

/// A check or a tree of checks.
#[derive(Debug)]
pub enum Precondition {
    /// An atomic check.
    Leaf(Box<dyn Check>),
    /// A composite of other preconditions.
    Tree(PreconditionTree),
}

impl Precondition {
    /// Wrap a check.
    pub fn leaf(check: impl Check + 'static) -> Self {
        Self::Leaf(Box::new(check))
    }

    /// The precondition's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(check) => check.name(),
            Self::Tree(tree) => &tree.name,
        }
    }

    /// The precondition's rule.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Leaf(check) => check.description(),
            Self::Tree(tree) => &tree.description,
        }
    }

    /// The message reported when the precondition holds.
    #[must_use]
    pub fn fulfilled_message(&self) -> &str {
        match self {
            Self::Leaf(check) => check.fulfilled_message(),
            Self::Tree(tree) => &tree.fulfilled_message,
        }
    }

    /// Evaluate depth-first, stopping at the first unfulfilled leaf.
    ///
    /// # Errors
    ///
    /// Propagates the first error a leaf returns.
    pub fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<Evaluation> {
        match self {
            Self::Leaf(check) => {
                let verdict = check.evaluate(ctx)?;
                log::debug!("precondition {}: {:?}", check.name(), verdict);
                Ok(match verdict {
                    Verdict::Fulfilled => Evaluation::Fulfilled {
                        message: check.fulfilled_message().to_string(),
                    },
                    Verdict::Unfulfilled(message) => Evaluation::Unfulfilled {
                        leaf: check.name().to_string(),
                        message,
                    },
                })
            }
            Self::Tree(tree) => {
                for child in &tree.children {
                    let evaluation = child.evaluate(ctx)?;
                    if !evaluation.is_fulfilled() {
                        return Ok(evaluation);
                    }
                }
                Ok(Evaluation::Fulfilled {
                    message: tree.fulfilled_message.clone(),
                })
            }
        }
    }

    /// Whether every leaf is fulfilled.
    ///
    /// # Errors
    ///
    /// Propagates the first error a leaf returns.
    pub fn is_fulfilled(&self, ctx: &CheckContext<'_>) -> Result<bool> {
        Ok(self.evaluate(ctx)?.is_fulfilled())
    }

    /// The fulfilled message, or the first failing leaf's message.
    ///
    /// # Errors
    ///
    /// Propagates the first error a leaf returns.
    pub fn status_message(&self, ctx: &CheckContext<'_>) -> Result<String> {
        Ok(match self.evaluate(ctx)? {
            Evaluation::Fulfilled { message } | Evaluation::Unfulfilled { message, .. } => message,
        })
    }

    /// Fail unless every leaf is fulfilled.
    ///
    /// # Errors
    ///
    /// - [`Error::PreconditionUnfulfilled`] naming this precondition, the
    ///   failing leaf, and its message.
    /// - Any error a leaf returns while being evaluated.
    pub fn assert_is_fulfilled(&self, ctx: &CheckContext<'_>) -> Result<()> {
        match self.evaluate(ctx)? {
            Evaluation::Fulfilled { .. } => Ok(()),
            Evaluation::Unfulfilled { leaf, message } => Err(Error::PreconditionUnfulfilled {
                precondition: self.name().to_string(),
                leaf,
                message,
            }),
        }
    }

    /// Every leaf, depth-first in declaration order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&dyn Check> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, into: &mut Vec<&'a dyn Check>) {
        match self {
            Self::Leaf(check) => into.push(check.as_ref()),
            Self::Tree(tree) => {
                for child in &tree.children {
                    child.collect_leaves(into);
                }
            }
        }
    }

    /// Evaluate every leaf without short-circuiting.
    ///
    /// # Errors
    ///
    /// Propagates the first error a leaf returns.
    pub fn report(&self, ctx: &CheckContext<'_>) -> Result<Vec<LeafStatus>> {
        self.leaves()
            .into_iter()
            .map(|check| {
                let verdict = check.evaluate(ctx)?;
                let (fulfilled, message) = match verdict {
                    Verdict::Fulfilled => (true, check.fulfilled_message().to_string()),
                    Verdict::Unfulfilled(message) => (false, message),
                };
                Ok(LeafStatus {
                    name: check.name().to_string(),
                    description: check.description().to_string(),
                    fulfilled,
                    message,
                })
            })
            .collect()
    }
}

impl From<PreconditionTree> for Precondition {
    fn from(tree: PreconditionTree) -> Self {
        Self::Tree(tree)
    }
}
