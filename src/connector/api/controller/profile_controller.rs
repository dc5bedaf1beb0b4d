use anyhow::{anyhow, Result};
use serde_json::{Map, Value};

use crate::application::{Access, Route};
use crate::domain::{Identity, UserProfile};

use super::super::Container;

pub struct ProfileController<'a> {
    container: &'a Container,
}

impl<'a> ProfileController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn setup(
        &self,
        uid: String,
        email: Option<String>,
        fields: Vec<String>,
    ) -> Result<String> {
        let identity = Identity::new(uid, email);

        if let Access::Redirect(destination) = self
            .container
            .guards(Route::ProfileSetup)
            .evaluate(Some(&identity))
            .await?
        {
            return Ok(format!("Access refused: redirecting to {}.", destination));
        }

        let fields = parse_fields(&fields)?;
        let use_case = self.container.profile_setup_use_case();
        let profile = use_case.setup(&identity, Value::Object(fields)).await?;

        Ok(self.format_profile(identity.uid(), &profile))
    }

    fn format_profile(&self, uid: &str, profile: &UserProfile) -> String {
        let mut output = format!("Profile saved for {}", uid);
        if !profile.email().is_empty() {
            output.push_str(&format!(" ({})", profile.email()));
        }
        for (key, value) in profile.fields() {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            output.push_str(&format!("\n  {}: {}", key, shown));
        }
        output
    }
}

/// Parses `key=value` pairs. Values that read as JSON (numbers, booleans,
/// arrays) keep their type; anything else is stored as a string.
pub fn parse_fields(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid field '{}': expected key=value", pair))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(anyhow!("Invalid field '{}': empty key", pair));
        }
        let raw = raw.trim();
        let value = serde_json::from_str::<Value>(raw)
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fields_keeps_json_types() {
        let fields = parse_fields(&[
            "age=42".to_string(),
            "village=Rampur".to_string(),
            "diabetic=false".to_string(),
        ])
        .unwrap();

        assert_eq!(fields["age"], Value::from(42));
        assert_eq!(fields["village"], Value::from("Rampur"));
        assert_eq!(fields["diabetic"], Value::from(false));
    }

    #[test]
    fn parse_fields_rejects_missing_separator() {
        assert!(parse_fields(&["age".to_string()]).is_err());
        assert!(parse_fields(&["=5".to_string()]).is_err());
    }
}
