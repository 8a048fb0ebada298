use std::{fmt, sync::Arc};

/// Identifies a failing rule, e.g. `required`.
pub type ErrorKey = &'static str;

pub const REQUIRED: ErrorKey = "required";
pub const MIN_LENGTH: ErrorKey = "minlength";
pub const MAX_LENGTH: ErrorKey = "maxlength";
pub const EMAIL_DOMAIN: ErrorKey = "emailDomain";

type Check = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single constraint attached to a control.
#[derive(Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    /// `check` returns `true` when the value is acceptable.
    Custom { key: ErrorKey, check: Check },
}

impl Rule {
    pub fn custom(key: ErrorKey, check: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Rule::Custom {
            key,
            check: Arc::new(check),
        }
    }

    pub fn key(&self) -> ErrorKey {
        match self {
            Rule::Required => REQUIRED,
            Rule::MinLength(_) => MIN_LENGTH,
            Rule::MaxLength(_) => MAX_LENGTH,
            Rule::Custom { key, .. } => *key,
        }
    }

    /// Returns the error key when `value` violates the rule.
    pub fn validate(&self, value: &str) -> Option<ErrorKey> {
        let ok = match self {
            Rule::Required => !value.is_empty(),
            // Empty values are left to `Required`.
            Rule::MinLength(min) => value.is_empty() || value.chars().count() >= *min,
            Rule::MaxLength(max) => value.chars().count() <= *max,
            Rule::Custom { check, .. } => check(value),
        };
        if ok { None } else { Some(self.key()) }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("Required"),
            Rule::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Rule::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Rule::Custom { key, .. } => f.debug_struct("Custom").field("key", key).finish(),
        }
    }
}

/// Union of failing keys, in declaration order.
pub fn evaluate(rules: &[Rule], value: &str) -> Vec<ErrorKey> {
    let mut errors: Vec<ErrorKey> = Vec::new();
    for key in rules.iter().filter_map(|rule| rule.validate(value)) {
        if !errors.contains(&key) {
            errors.push(key);
        }
    }
    errors
}

/// Accepts empty values and values whose part after the last `@` equals
/// `domain`, ignoring case. Fails with [`EMAIL_DOMAIN`].
pub fn email_domain(domain: impl Into<String>) -> Rule {
    let domain = domain.into();
    Rule::custom(EMAIL_DOMAIN, move |value| {
        if value.is_empty() {
            return true;
        }
        let suffix = match value.rfind('@') {
            Some(at) => &value[at + 1..],
            None => value,
        };
        suffix.eq_ignore_ascii_case(&domain)
    })
}
