use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps contact details so `Debug`/`Display` (and therefore `tracing` fields)
/// never print them in full. Serialization still emits the real value since
/// the gateway needs it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Masked<T>(pub T);

fn redact(value: &str) -> String {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        _ => "********".to_string(),
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0.as_ref()))
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0.as_ref()))
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_domain_only() {
        let email = Masked("traveller@example.com".to_string());
        assert_eq!(format!("{email:?}"), "t***@example.com");
        assert_eq!(email.to_string(), "t***@example.com");
    }

    #[test]
    fn hides_non_email_values_entirely() {
        assert_eq!(Masked("0911223344").to_string(), "********");
        assert_eq!(Masked("@example.com").to_string(), "********");
    }
}
