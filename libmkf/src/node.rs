use crate::parser::syntax::RuleName;
use std::fmt;

/// One node of a parse tree. `text` is always a slice of the matched input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node<'i> {
    /// The rule that produced this node; `None` for the leaves produced by
    /// terminals.
    pub rule: Option<RuleName>,
    pub text: &'i str,
    pub children: Vec<Node<'i>>,
}

impl<'i> Node<'i> {
    pub(crate) fn leaf(text: &'i str) -> Self {
        Self {
            rule: None,
            text,
            children: vec![],
        }
    }

    pub(crate) fn named(rule: RuleName, text: &'i str, children: Vec<Node<'i>>) -> Self {
        Self {
            rule: Some(rule),
            text,
            children,
        }
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_ref().map(AsRef::as_ref)
    }

    pub fn text(&self) -> &'i str {
        self.text
    }

    pub fn children(&self) -> &[Node<'i>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Childless nodes, depth first and left to right. Their texts, joined,
    /// give back the text of `self`.
    pub fn leaves(&self) -> Leaves<'_, 'i> {
        Leaves { stack: vec![self] }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        match &self.rule {
            Some(rule) => writeln!(f, "{} {:?}", rule, self.text)?,
            None => writeln!(f, "{:?}", self.text)?,
        }
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

pub struct Leaves<'n, 'i> {
    stack: Vec<&'n Node<'i>>,
}

impl<'n, 'i> Iterator for Leaves<'n, 'i> {
    type Item = &'n Node<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }
            self.stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// An indented outline: rule nodes as `name "text"`, leaves as `"text"`.
impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
