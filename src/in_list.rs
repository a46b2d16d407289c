use crate::value::{Params, Value};
use regex::Regex;
use std::fmt;

/// Expansion of one list-valued parameter into numbered placeholders.
///
/// `InList::new("ids", vec![7, 8, 9])` produces the synthetic parameters
/// `ids0`, `ids1`, `ids2` and the fragment `(:ids0,:ids1,:ids2)`, ready to sit
/// after an `IN` keyword.
///
/// ```
/// use sqlx_named_params::InList;
///
/// let list = InList::new("ids", vec![7, 8, 9])?;
/// let sql = list.expand("SELECT * FROM users WHERE id IN :ids")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id IN (:ids0,:ids1,:ids2)");
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InList {
    name: String,
    values: Vec<Value>,
}

impl InList {
    /// Builds the expansion, dropping NULL items.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInList`](crate::Error::InvalidInList) when nothing is
    /// left after dropping NULLs, [`Error::InvalidIdentifier`](crate::Error::InvalidIdentifier)
    /// when `name` is blank.
    pub fn new<N, I, V>(name: N, values: I) -> crate::Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(crate::Error::InvalidIdentifier(name));
        }
        let values: Vec<Value> = values
            .into_iter()
            .map(Into::into)
            .filter(|v| !v.is_null())
            .collect();
        if values.is_empty() {
            return Err(crate::Error::InvalidInList(name));
        }
        Ok(Self { name, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Synthetic parameter names, `name0..nameN-1`.
    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.values.len()).map(move |i| format!("{}{}", self.name, i))
    }

    /// Synthetic parameters, in list order.
    pub fn params(&self) -> Params {
        self.names().zip(self.values.iter().cloned()).collect()
    }

    /// Comma-joined placeholders without surrounding parentheses.
    pub fn placeholders(&self) -> String {
        self.names()
            .map(|n| format!(":{n}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Comma-joined placeholders wrapped in parentheses.
    pub fn fragment(&self) -> String {
        format!("({})", self.placeholders())
    }

    /// Replaces every `:name` token of `template` with the placeholder list.
    ///
    /// Tokens already written inside parentheses, as in `IN (:ids)`, keep a
    /// single pair of parentheses.
    pub fn expand(&self, template: &str) -> crate::Result<String> {
        let token = Regex::new(&format!(r":{}\b", regex::escape(&self.name)))?;
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for m in token.find_iter(template) {
            out.push_str(&template[last..m.start()]);
            out.push_str(&self.replacement(template, m.start(), m.end()));
            last = m.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }

    /// Replaces the first `?` marker of `template` with the placeholder list.
    ///
    /// Returns the template unchanged when it has no marker.
    pub fn expand_marker(&self, template: &str) -> String {
        match template.find('?') {
            Some(at) => format!(
                "{}{}{}",
                &template[..at],
                self.replacement(template, at, at + 1),
                &template[at + 1..]
            ),
            None => template.to_owned(),
        }
    }

    fn replacement(&self, template: &str, start: usize, end: usize) -> String {
        let opened = template[..start].trim_end().ends_with('(');
        let closed = template[end..].trim_start().starts_with(')');
        if opened && closed {
            self.placeholders()
        } else {
            self.fragment()
        }
    }
}

impl fmt::Display for InList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}
