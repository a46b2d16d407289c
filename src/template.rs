use crate::in_list::InList;
use crate::value::{Params, Value};
use regex::Regex;

/// A template resolved into positional SQL plus its ordered bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    sql: String,
    order: Vec<String>,
    values: Vec<Value>,
}

impl Prepared {
    /// SQL with every named placeholder replaced by `?`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in occurrence order; repeated names appear repeatedly.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// `(name, value)` pairs in positional order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub(crate) fn from_parts(sql: String, order: Vec<String>, values: Vec<Value>) -> Self {
        Self { sql, order, values }
    }
}

/// Converts named placeholders (`:name`) to positional placeholders (`?`).
///
/// List-valued parameters are expanded first (see [`InList`]), then every
/// `:name` token is replaced, left to right. A `:` that is not followed by a
/// word character stays in the SQL untouched.
///
/// # Errors
///
/// - [`Error::EmptyTemplate`](crate::Error::EmptyTemplate) for a blank template
/// - [`Error::InvalidInList`](crate::Error::InvalidInList) for an empty list parameter
/// - [`Error::DuplicateParameter`](crate::Error::DuplicateParameter) when a
///   generated IN-list name (`ids0`, ...) is also supplied by the caller
/// - [`Error::MissingParameter`](crate::Error::MissingParameter) for the first
///   placeholder without a value
/// - [`Error::NullParameter`](crate::Error::NullParameter) for any value that
///   is NULL without a declared type
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{prepare, Params};
///
/// let params = Params::new().with("y", 5).with("zs", vec![1, 2, 3]);
/// let prepared = prepare("SELECT x FROM t WHERE y = :y AND z IN :zs", &params)?;
///
/// assert_eq!(prepared.sql(), "SELECT x FROM t WHERE y = ? AND z IN (?,?,?)");
/// assert_eq!(prepared.order(), ["y", "zs0", "zs1", "zs2"]);
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub fn prepare(template: &str, params: &Params) -> crate::Result<Prepared> {
    if template.trim().is_empty() {
        return Err(crate::Error::EmptyTemplate);
    }

    let mut expanded = template.to_owned();
    let mut bound = Params::new();
    for (name, value) in params.iter() {
        match value {
            Value::List(items) => {
                let list = InList::new(name, items.iter().cloned())?;
                expanded = list.expand(&expanded)?;
                for (synthetic, item) in list.params().iter() {
                    if params.contains(synthetic) || bound.contains(synthetic) {
                        return Err(crate::Error::DuplicateParameter(synthetic.to_owned()));
                    }
                    bound.insert(synthetic, item.clone());
                }
            }
            other => {
                bound.insert(name, other.clone());
            }
        }
    }

    let placeholder = Regex::new(r":([a-zA-Z0-9_]+)")?;
    let order: Vec<String> = placeholder
        .captures_iter(&expanded)
        .map(|c| c[1].to_owned())
        .collect();

    let mut values = Vec::with_capacity(order.len());
    for name in &order {
        match bound.get(name) {
            Some(value) => values.push(value.clone()),
            None => return Err(crate::Error::MissingParameter(name.clone())),
        }
    }
    if let Some((name, _)) = bound.iter().find(|(_, v)| matches!(v, Value::Null(None))) {
        return Err(crate::Error::NullParameter(name.to_owned()));
    }

    let sql = placeholder.replace_all(&expanded, "?").into_owned();
    log::debug!("Prepared `{}` with {} binding(s)", sql, order.len());
    Ok(Prepared { sql, order, values })
}
