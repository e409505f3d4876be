use serde::{Deserialize, Deserializer};

/// The hub returns `null` for most optional fields instead of omitting them.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Lists where individual entries may be `null`, e.g. `[Strategy]` in the hub schema.
pub fn deserialize_skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<Option<T>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "deserialize_null_default")]
        body: String,
        #[serde(default, deserialize_with = "deserialize_skip_nulls")]
        choices: Vec<String>,
    }

    #[test]
    fn nulls_become_defaults() {
        let record: Record = serde_json::from_str(r#"{"body": null, "choices": ["A", null, "B"]}"#).unwrap();
        assert_eq!(record.body, "");
        assert_eq!(record.choices, vec!["A", "B"]);

        let record: Record = serde_json::from_str(r#"{"choices": null}"#).unwrap();
        assert!(record.choices.is_empty());
    }
}
